//! Analyzer backends: pluggable, trait-based scoring of one resume against one
//! job description.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`, chosen at startup from
//! `ANALYZER_BACKEND`.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::extraction::normalize_text;
use crate::llm_client::LlmClient;

use super::keyword::analyze_keywords;
use super::models::{AnalysisResult, ScoringWeights};
use super::parser::parse_model_response;
use super::prompts::build_analysis_prompt;
use super::scoring::{aggregate_score_with, ScoreInputs};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap backends without touching handlers or the batch pipeline.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    /// `resume_text` is the raw extracted text; backends normalise as they need.
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
        candidate_name: &str,
        weights: &ScoringWeights,
    ) -> Result<AnalysisResult, AppError>;

    /// Short backend name reported by `/health`.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Prompt → model → parse. The overall score is always recomputed from the
/// parsed sub-scores so it follows the configured weights, whatever the model
/// wrote in `score`.
pub struct LlmAnalyzer {
    llm: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeAnalyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
        candidate_name: &str,
        weights: &ScoringWeights,
    ) -> Result<AnalysisResult, AppError> {
        let prompt = build_analysis_prompt(job_description, &normalize_text(resume_text));
        debug!("Analysis prompt for {candidate_name}: {} chars", prompt.len());

        // Gateway failures propagate; only a malformed reply is recovered locally.
        let raw = self.llm.generate(&prompt).await?;

        let mut result = parse_model_response(&raw, candidate_name);
        if !result.is_failed() {
            result.score = aggregate_score_with(ScoreInputs::from_result(&result), weights);
        }

        info!(
            "Analyzed {candidate_name} with {}: score {}",
            self.llm.model(),
            result.score
        );
        Ok(result)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Keyword overlap only. Fast, deterministic, and never calls the network.
pub struct KeywordAnalyzer;

#[async_trait]
impl ResumeAnalyzer for KeywordAnalyzer {
    async fn analyze(
        &self,
        job_description: &str,
        resume_text: &str,
        candidate_name: &str,
        weights: &ScoringWeights,
    ) -> Result<AnalysisResult, AppError> {
        let result = analyze_keywords(job_description, resume_text, candidate_name, weights);
        info!("Keyword analysis of {candidate_name}: score {}", result.score);
        Ok(result)
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::post, Router};
    use serde_json::json;

    use super::*;
    use crate::analysis::models::AiVerdict;
    use crate::llm_client::tests::{fixed_reply_server, spawn_model_server};

    const REPLY: &str = r#"Here you go:
{"score": 12,
 "skills": {"match_score": 80, "matched_skills": ["Python"], "missing_skills": [], "skill_summary": "good", "additional_skills": ["Rust", "Go"]},
 "experience": {"match_score": 60, "years": 4, "relevant_experience": [], "experience_summary": "ok", "experience_details": [], "additional_experience": ["Mentoring"]},
 "education": {"match_score": 50, "degree": "BSc", "education_summary": "fine", "education_details": []},
 "aiDetection": {"verdict": "Possibly AI-Assisted", "reasoning": "generic phrasing"},
 "onlinePresence": {"linkedIn": {"urls": [], "status": "not found"}, "github": {"urls": [], "status": "not found"}, "personalWebsites": {"urls": [], "status": "not found"}}}"#;

    async fn llm_analyzer(base: String) -> LlmAnalyzer {
        LlmAnalyzer::new(LlmClient::new(base, "mistral", 5, 0).unwrap())
    }

    #[tokio::test]
    async fn test_llm_score_is_recomputed_from_subscores() {
        let analyzer = llm_analyzer(fixed_reply_server(REPLY).await).await;
        let result = analyzer
            .analyze("jd", "resume", "Jane Roe", &ScoringWeights::default())
            .await
            .unwrap();

        // (80+10)×0.4 + (60+5)×0.4 + 50×0.2 = 36 + 26 + 10
        assert_eq!(result.score, 72);
        assert_eq!(result.ai_detection.verdict, AiVerdict::PossiblyAiAssisted);
        assert!(result.online_presence.linked_in.search_url.is_some());
    }

    #[tokio::test]
    async fn test_malformed_reply_is_default_record_not_error() {
        let analyzer = llm_analyzer(fixed_reply_server("I am unable to comply.").await).await;
        let result = analyzer
            .analyze("jd", "resume", "Jane Roe", &ScoringWeights::default())
            .await
            .unwrap();
        assert_eq!(result.score, 0);
        assert!(result.is_failed());
    }

    #[tokio::test]
    async fn test_model_summary_text_does_not_mark_failure() {
        let reply = REPLY.replace(
            r#""skill_summary": "good""#,
            r#""skill_summary": "Analysis failed to find Go""#,
        );
        let reply: &'static str = Box::leak(reply.into_boxed_str());
        let analyzer = llm_analyzer(fixed_reply_server(reply).await).await;
        let result = analyzer
            .analyze("jd", "resume", "Jane Roe", &ScoringWeights::default())
            .await
            .unwrap();
        assert!(!result.is_failed());
        assert_eq!(result.score, 72);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_model_unavailable() {
        let router = Router::new().route(
            "/api/generate",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "loading") }),
        );
        let analyzer = llm_analyzer(spawn_model_server(router).await).await;
        let err = analyzer
            .analyze("jd", "resume", "Jane Roe", &ScoringWeights::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ModelUnavailable(_)));
    }

    #[tokio::test]
    async fn test_prompt_carries_normalised_resume() {
        let router = Router::new().route(
            "/api/generate",
            post(|axum::Json(body): axum::Json<serde_json::Value>| async move {
                let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
                assert!(prompt.contains("Resume Text:\nJane Roe Python"));
                axum::Json(json!({ "response": "{}" }))
            }),
        );
        let analyzer = llm_analyzer(spawn_model_server(router).await).await;
        analyzer
            .analyze("jd", "  Jane   Roe ★\n\n Python ", "Jane Roe", &ScoringWeights::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_keyword_backend_needs_no_network() {
        let result = KeywordAnalyzer
            .analyze(
                "Need Python and AWS",
                "Python Developer, 5 years, AWS",
                "Jane Roe",
                &ScoringWeights::default(),
            )
            .await
            .unwrap();
        assert!(result.skills.match_score > 0);
        assert_eq!(KeywordAnalyzer.backend(), "keyword");
    }
}
