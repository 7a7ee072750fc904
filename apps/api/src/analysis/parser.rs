//! Response Parser: raw model text → `AnalysisResult`, never an error.
//!
//! 1. cut the span from the first `{` to the last `}`;
//! 2. repair control characters and bad escapes that strict JSON rejects;
//! 3. deserialize leniently, or fall back to `AnalysisResult::failed`;
//! 4. backfill profile search URLs when the model found neither LinkedIn nor GitHub.

use reqwest::Url;
use tracing::{debug, warn};

use super::models::{AnalysisResult, OnlinePresence, PresenceStatus};

/// Candidate JSON object: first `{` through last `}` inclusive.
pub fn locate_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Makes model-produced JSON acceptable to a strict parser.
///
/// Inside string literals raw newlines, CRs and tabs are escaped and other
/// control characters dropped. An escape that JSON does not define keeps the
/// escaped character and loses the backslash; a `\u` without four hex digits
/// loses the backslash. Outside strings, control characters other than
/// whitespace are dropped.
pub fn sanitize_json(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len());
    let mut in_string = false;
    let mut chars = candidate.chars().peekable();

    while let Some(c) = chars.next() {
        if !in_string {
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                c if c.is_control() && !matches!(c, '\n' | '\r' | '\t') => {}
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\\' => match chars.peek().copied() {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {
                    out.push('\\');
                    out.extend(chars.next());
                }
                Some('u') => {
                    let hex: String = chars.clone().skip(1).take(4).collect();
                    if hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()) {
                        out.push('\\');
                    }
                    // Without a valid code the `u` is kept as plain text.
                }
                _ => {}
            },
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            _ => out.push(c),
        }
    }

    // A reply cut off mid-string would otherwise never parse.
    if in_string {
        out.push('"');
    }
    out
}

/// Parses a model reply. Never fails: unusable replies produce the default-zero
/// record. `candidate_name` seeds the search-URL backfill.
pub fn parse_model_response(raw: &str, candidate_name: &str) -> AnalysisResult {
    let Some(candidate) = locate_json(raw) else {
        warn!("Model reply contains no JSON object ({} chars)", raw.len());
        return AnalysisResult::failed("the model reply contained no JSON object");
    };

    let sanitized = sanitize_json(candidate);
    let mut result = match serde_json::from_str::<serde_json::Value>(&sanitized)
        .and_then(serde_json::from_value::<AnalysisResult>)
    {
        Ok(result) => result,
        Err(e) => {
            warn!("Model reply is not valid JSON after repair: {e}");
            debug!("Unparseable reply: {sanitized}");
            return AnalysisResult::failed("the model reply was not valid JSON");
        }
    };

    backfill_search_urls(&mut result.online_presence, candidate_name);
    result
}

/// When neither LinkedIn nor GitHub URLs were found, attaches people-search
/// links for both. No lookup is performed, so the status becomes "not found".
pub fn backfill_search_urls(presence: &mut OnlinePresence, candidate_name: &str) {
    if !presence.linked_in.urls.is_empty() || !presence.github.urls.is_empty() {
        return;
    }

    let name = candidate_name.trim();
    presence.linked_in.search_url = Url::parse_with_params(
        "https://www.linkedin.com/search/results/people/",
        &[("keywords", name)],
    )
    .ok()
    .map(String::from);
    presence.github.search_url =
        Url::parse_with_params("https://github.com/search", &[("q", name), ("type", "users")])
            .ok()
            .map(String::from);

    presence.linked_in.status = PresenceStatus::NotFound;
    presence.github.status = PresenceStatus::NotFound;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::analysis::models::{AiVerdict, MissingItem};

    fn full_reply() -> serde_json::Value {
        json!({
            "score": 78,
            "skills": {
                "match_score": 85,
                "matched_skills": ["Python", "AWS"],
                "missing_skills": [{"skill": "Kubernetes", "importance": "high"}],
                "skill_summary": "Strong backend match",
                "additional_skills": ["Rust"]
            },
            "experience": {
                "match_score": 70,
                "years": 5,
                "relevant_experience": ["Backend at Acme"],
                "experience_summary": "Solid",
                "experience_details": [
                    {"title": "Engineer", "company": "Acme", "duration": "2019-2024", "description": "APIs"}
                ],
                "additional_experience": []
            },
            "education": {
                "match_score": 60,
                "degree": "B.S.",
                "education_summary": "Relevant degree",
                "education_details": [
                    {"degree": "B.S.", "field": "CS", "institution": "State U", "graduation_year": "2018", "gpa": "3.6", "relevance": "High"}
                ]
            },
            "aiDetection": {"verdict": "Human-Written", "reasoning": "Specific details"},
            "onlinePresence": {
                "linkedIn": {"urls": ["https://linkedin.com/in/jane"], "status": "unverified"},
                "github": {"urls": [], "status": "not found"},
                "personalWebsites": {"urls": [], "status": "not found"}
            }
        })
    }

    #[test]
    fn test_locate_json_trims_commentary() {
        assert_eq!(locate_json("Sure! {\"a\": {\"b\": 1}} Hope it helps"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(locate_json("no braces"), None);
        assert_eq!(locate_json("} backwards {"), None);
    }

    #[test]
    fn test_no_braces_yields_default_record() {
        for raw in ["", "I cannot help with that.", "only { opening", "closing } only"] {
            let result = parse_model_response(raw, "Jane Roe");
            assert_eq!(result.score, 0, "for {raw:?}");
            assert_eq!(result.ai_detection.verdict, AiVerdict::NotAnalyzed);
            assert_eq!(result.online_presence.linked_in.status, PresenceStatus::NotFound);
        }
    }

    #[test]
    fn test_embedded_object_is_returned_unmodified() {
        let raw = format!("Here is my analysis:\n{}\nLet me know!", full_reply());
        let result = parse_model_response(&raw, "Jane Roe");

        // LinkedIn was present, so no backfill.
        let expected: AnalysisResult = serde_json::from_value(full_reply()).unwrap();
        assert_eq!(result, expected);
        assert_eq!(result.skills.matched_skills, vec!["Python", "AWS"]);
        assert_eq!(
            result.skills.missing_skills,
            vec![MissingItem::Tagged {
                skill: "Kubernetes".into(),
                importance: Some("high".into())
            }]
        );
        assert_eq!(result.experience.years, 5.0);
        assert_eq!(result.ai_detection.verdict, AiVerdict::HumanWritten);
        assert!(result.online_presence.github.search_url.is_none());
    }

    #[test]
    fn test_backfill_when_both_profiles_missing() {
        let mut reply = full_reply();
        reply["onlinePresence"]["linkedIn"] = json!({"urls": [], "status": "valid"});
        let result = parse_model_response(&reply.to_string(), "Jane Q. Roe");

        let linked_in = &result.online_presence.linked_in;
        assert_eq!(linked_in.status, PresenceStatus::NotFound);
        assert_eq!(
            linked_in.search_url.as_deref(),
            Some("https://www.linkedin.com/search/results/people/?keywords=Jane+Q.+Roe")
        );
        assert_eq!(
            result.online_presence.github.search_url.as_deref(),
            Some("https://github.com/search?q=Jane+Q.+Roe&type=users")
        );
        // Everything else untouched.
        assert_eq!(result.skills.match_score, 85);
    }

    #[test]
    fn test_raw_newlines_and_tabs_inside_strings_are_repaired() {
        let raw = "{\"score\": 50, \"skills\": {\"skill_summary\": \"line one\nline\ttwo\"}}";
        let result = parse_model_response(raw, "X");
        assert_eq!(result.score, 50);
        assert_eq!(result.skills.skill_summary, "line one\nline\ttwo");
    }

    #[test]
    fn test_invalid_escapes_are_repaired() {
        let raw = r#"{"skills": {"skill_summary": "C\# and é and \uZZ and path\x"}}"#;
        let result = parse_model_response(raw, "X");
        assert_eq!(result.skills.skill_summary, "C# and é and uZZ and pathx");
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let raw = "{\"score\": \u{0007}42, \"skills\": {\"skill_summary\": \"ok\u{0000}\"}}";
        let result = parse_model_response(raw, "X");
        assert_eq!(result.score, 42);
        assert_eq!(result.skills.skill_summary, "ok");
    }

    #[test]
    fn test_sanitize_leaves_valid_json_alone() {
        let valid = full_reply().to_string();
        assert_eq!(sanitize_json(&valid), valid);
    }

    #[test]
    fn test_unparseable_object_yields_default_record() {
        let result = parse_model_response("{ score: eighty, skills: [ }", "X");
        assert!(result.is_failed());
        assert_eq!(result.ai_detection.verdict, AiVerdict::NotAnalyzed);
    }

    #[test]
    fn test_wrong_typed_fields_degrade_to_defaults() {
        let raw = r#"{"score": "91", "skills": {"match_score": "high", "matched_skills": "Python"}, "education": null}"#;
        let result = parse_model_response(raw, "X");
        assert_eq!(result.score, 91);
        assert_eq!(result.skills.match_score, 0);
        assert_eq!(result.skills.matched_skills, vec!["Python"]);
        assert_eq!(result.education.match_score, 0);
    }
}
