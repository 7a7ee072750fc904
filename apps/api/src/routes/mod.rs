pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::salary::handlers as salary;
use crate::state::AppState;

/// Upper bound for a multipart request carrying several resumes.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis
        .route("/api/analyze-resumes", post(analysis::handle_analyze_resumes))
        .route("/api/analyze-files", post(analysis::handle_analyze_files))
        // Resume files
        .route("/api/upload", post(resumes::handle_upload))
        .route("/api/resumes", get(resumes::handle_list_resumes))
        .route("/api/resume/:name", get(resumes::handle_get_resume))
        // Job descriptions
        .route(
            "/api/job-descriptions",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/job-descriptions/upload",
            post(jobs::handle_upload_job),
        )
        .route(
            "/api/job-descriptions/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        // Salary
        .route(
            "/api/jobs/salary-prediction",
            post(salary::handle_salary_prediction),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::KeywordAnalyzer;
    use crate::config::tests::test_config;
    use crate::extraction::testing::mock_extractor;
    use crate::jobs::JobStore;
    use crate::llm_client::LlmClient;
    use crate::salary::{SalaryFeature, SalaryService};
    use crate::storage::FsBlobStore;

    const BOUNDARY: &str = "screener-test-boundary";

    fn test_state(dir: &Path, salary: SalaryFeature) -> AppState {
        AppState {
            config: test_config(),
            // Nothing listens on the discard port.
            llm: LlmClient::new("http://127.0.0.1:9", "mistral", 1, 0).unwrap(),
            extractor: Arc::new(mock_extractor(None)),
            analyzer: Arc::new(KeywordAnalyzer),
            resumes: Arc::new(FsBlobStore::new(dir.join("resumes"))),
            jobs: JobStore::new(Arc::new(FsBlobStore::new(dir.join("job_descriptions")))),
            salary: Arc::new(salary),
        }
    }

    fn app(dir: &Path) -> Router {
        build_router(test_state(
            dir,
            SalaryFeature::Enabled(SalaryService::built_in()),
        ))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// Parts are `(field name, optional file name, content)`.
    fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_model_as_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(dir.path()), get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "screener-api");
        assert_eq!(body["analyzer"], "keyword");
        assert_eq!(body["model"]["reachable"], false);
        assert_eq!(body["salary"], "enabled");
    }

    #[tokio::test]
    async fn test_analyze_resumes_returns_one_row_per_resume() {
        let dir = tempfile::tempdir().unwrap();
        let request = json_request(
            "POST",
            "/api/analyze-resumes",
            json!({
                "jobDescription": "Python developer with AWS, 3+ years",
                "resumes": [
                    {"id": 1, "name": "Jane Roe", "content": "Python, AWS, Docker. 5 years experience."},
                    {"id": "b", "content": "Jon Doe\nJava and Spring."},
                    {"content": ""}
                ]
            }),
        );
        let (status, body) = send(app(dir.path()), request).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["id"], "1");
        assert_eq!(rows[0]["name"], "Jane Roe");
        assert!(rows[0]["score"].as_u64().unwrap() > rows[1]["score"].as_u64().unwrap());
        assert_eq!(rows[1]["name"], "Jon Doe");
        assert_eq!(rows[2]["error"]["kind"], "invalid_input");
        assert!(!rows[2]["id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_resumes_validation() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            app(dir.path()),
            json_request(
                "POST",
                "/api/analyze-resumes",
                json!({"jobDescription": "  ", "resumes": [{"content": "x"}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            app(dir.path()),
            json_request(
                "POST",
                "/api/analyze-resumes",
                json!({"jobDescription": "Python", "resumes": []}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app(dir.path()),
            json_request(
                "POST",
                "/api/analyze-resumes",
                json!({
                    "jobDescription": "Python",
                    "resumes": [{"content": "Python"}],
                    "weights": {"skills": 0, "experience": 0, "education": 0}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("weights"));
    }

    #[tokio::test]
    async fn test_analyze_files_with_stored_job() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, _) = send(
            app.clone(),
            json_request(
                "POST",
                "/api/job-descriptions",
                json!({"title": "Backend Engineer", "description": "Services in Python.", "requirements": ["AWS"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let request = multipart_request(
            "/api/analyze-files",
            &[
                ("jobDescriptionId", None, "backend-engineer"),
                ("files", Some("jane_roe.txt"), "Python and AWS, 4 years"),
                ("files", Some("notes.xls"), "binary"),
            ],
        );
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "jane_roe.txt");
        assert_eq!(rows[0]["name"], "Jane Roe");
        assert_eq!(rows[0]["skills"]["match_score"], 100);
        assert_eq!(rows[1]["error"]["kind"], "extraction_failed");
    }

    #[tokio::test]
    async fn test_analyze_files_unknown_job_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/analyze-files",
            &[
                ("jobDescriptionId", None, "nope"),
                ("files", Some("cv.txt"), "Python"),
            ],
        );
        let (status, _) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_files_same_name_gets_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart_request(
            "/api/analyze-files",
            &[
                ("jobDescription", None, "Python developer"),
                ("files", Some("cv.txt"), "Python, 3 years"),
                ("files", Some("cv.txt"), "Java, 2 years"),
            ],
        );
        let (status, body) = send(app(dir.path()), request).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body.as_array().unwrap();
        assert_eq!(rows[0]["id"], "cv.txt");
        assert_eq!(rows[1]["id"], "cv.txt#2");
    }

    #[tokio::test]
    async fn test_upload_then_read_resume() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = send(
            app.clone(),
            multipart_request(
                "/api/upload",
                &[("file", Some("jane.txt"), "Jane Roe\n\nPython   developer")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "jane.txt");
        assert_eq!(body["format"], "txt");
        assert_eq!(body["method"], "plain_text");

        let (status, body) = send(app.clone(), get_request("/api/resumes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"name": "jane.txt", "format": "txt"}]));

        let (status, body) = send(app, get_request("/api/resume/jane.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Jane Roe Python developer");
        assert_eq!(body["raw_text"], "Jane Roe\n\nPython   developer");
    }

    #[tokio::test]
    async fn test_upload_failures() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = send(
            app.clone(),
            multipart_request("/api/upload", &[("file", Some("cv.pages"), "data")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");

        // Whitespace-only text: extraction fails but the file is kept.
        let (status, body) = send(
            app.clone(),
            multipart_request("/api/upload", &[("file", Some("blank.txt"), "  \n ")]),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILED");

        let (_, body) = send(app, get_request("/api/resumes")).await;
        assert_eq!(body[0]["name"], "blank.txt");
    }

    #[tokio::test]
    async fn test_job_description_crud() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = send(
            app.clone(),
            multipart_request(
                "/api/job-descriptions/upload",
                &[("file", Some("data_scientist.txt"), "SQL and statistics.")],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "data-scientist");
        assert_eq!(body["title"], "Data Scientist");

        let (status, body) = send(app.clone(), get_request("/api/job-descriptions")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(app.clone(), get_request("/api/job-descriptions/data-scientist")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["description"], "SQL and statistics.");

        let delete = Request::builder()
            .method("DELETE")
            .uri("/api/job-descriptions/data-scientist")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app.clone(), delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(app, get_request("/api/job-descriptions/data-scientist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_job_requires_title() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = send(
            app(dir.path()),
            json_request("POST", "/api/job-descriptions", json!({"description": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_salary_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(dir.path()),
            json_request(
                "POST",
                "/api/jobs/salary-prediction",
                json!({"title": "Senior Engineer", "experienceLevel": "Mid-Senior level", "asMonthly": false}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["salaryValue"], 150);
        assert_eq!(body["estimatedSalary"], "$150,000.00/year");
        assert_eq!(body["fallback"], true);
    }

    #[tokio::test]
    async fn test_salary_level_defaults_to_entry_level() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(dir.path()),
            json_request("POST", "/api/jobs/salary-prediction", json!({"title": "Analyst"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["salaryValue"], 73);
        assert_eq!(body["yearly"], "$72,500.00/year");
        assert_eq!(body["estimatedSalary"], "$6,041.67/month");
    }

    #[tokio::test]
    async fn test_disabled_salary_is_503() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            SalaryFeature::Disabled {
                reason: "table missing".to_string(),
            },
        );
        let (status, body) = send(
            build_router(state),
            json_request("POST", "/api/jobs/salary-prediction", json!({"title": "Engineer"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "FEATURE_DISABLED");
    }
}
