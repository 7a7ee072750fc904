use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;

// ────────────────────────────────────────────────────────────────────────────
// AnalysisResult: the one record every analyzer backend produces
// ────────────────────────────────────────────────────────────────────────────

/// Assessment of one resume against one job description.
///
/// Field names on the wire match the JSON schema the model is asked for, so a
/// parsed reply serializes back to the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "lenient::score")]
    pub score: u8,
    #[serde(default, deserialize_with = "lenient::record")]
    pub skills: SkillsReport,
    #[serde(default, deserialize_with = "lenient::record")]
    pub experience: ExperienceReport,
    #[serde(default, deserialize_with = "lenient::record")]
    pub education: EducationReport,
    #[serde(rename = "aiDetection", default, deserialize_with = "lenient::record")]
    pub ai_detection: AiDetection,
    #[serde(rename = "onlinePresence", default, deserialize_with = "lenient::record")]
    pub online_presence: OnlinePresence,
    /// Set only by `failed`; never read from or written to the wire.
    #[serde(skip)]
    pub failed: bool,
}

impl AnalysisResult {
    /// The fixed default-zero record used whenever the model reply is unusable.
    pub fn failed(reason: &str) -> Self {
        let summary = format!("Analysis failed: {reason}");
        Self {
            score: 0,
            skills: SkillsReport {
                skill_summary: summary.clone(),
                ..Default::default()
            },
            experience: ExperienceReport {
                experience_summary: summary.clone(),
                ..Default::default()
            },
            education: EducationReport {
                education_summary: summary,
                ..Default::default()
            },
            ai_detection: AiDetection {
                verdict: AiVerdict::NotAnalyzed,
                reasoning: "Analysis failed".to_string(),
            },
            online_presence: OnlinePresence::default(),
            failed: true,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsReport {
    #[serde(default, deserialize_with = "lenient::score")]
    pub match_score: u8,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub matched_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::record_list")]
    pub missing_skills: Vec<MissingItem>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub skill_summary: String,
    /// Skills beyond the job's requirements. Each one feeds the skills bonus.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub additional_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceReport {
    #[serde(default, deserialize_with = "lenient::score")]
    pub match_score: u8,
    #[serde(default, deserialize_with = "lenient::number")]
    pub years: f64,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub relevant_experience: Vec<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub experience_summary: String,
    #[serde(default, deserialize_with = "lenient::record_list")]
    pub experience_details: Vec<ExperienceDetail>,
    /// Experience beyond the job's requirements. Each item feeds the experience bonus.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub additional_experience: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationReport {
    #[serde(default, deserialize_with = "lenient::score")]
    pub match_score: u8,
    #[serde(default, deserialize_with = "lenient::text")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub education_summary: String,
    #[serde(default, deserialize_with = "lenient::record_list")]
    pub education_details: Vec<EducationDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceDetail {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationDetail {
    #[serde(default, deserialize_with = "lenient::text")]
    pub degree: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub field: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub institution: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub graduation_year: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub gpa: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub relevance: String,
}

/// A requirement the resume does not cover. Models emit either a bare string
/// or `{"skill": ..., "importance": ...}`; both are kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissingItem {
    Plain(String),
    Tagged {
        #[serde(alias = "item", alias = "name")]
        skill: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        importance: Option<String>,
    },
}

impl MissingItem {
    pub fn name(&self) -> &str {
        match self {
            MissingItem::Plain(s) => s,
            MissingItem::Tagged { skill, .. } => skill,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// AI-generation verdict
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AiVerdict {
    #[serde(rename = "Likely AI-Generated")]
    LikelyAiGenerated,
    #[serde(rename = "Possibly AI-Assisted")]
    PossiblyAiAssisted,
    #[serde(rename = "Human-Written")]
    HumanWritten,
    #[default]
    #[serde(rename = "Not Analyzed")]
    NotAnalyzed,
}

impl AiVerdict {
    pub const ALL: [AiVerdict; 4] = [
        AiVerdict::LikelyAiGenerated,
        AiVerdict::PossiblyAiAssisted,
        AiVerdict::HumanWritten,
        AiVerdict::NotAnalyzed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiVerdict::LikelyAiGenerated => "Likely AI-Generated",
            AiVerdict::PossiblyAiAssisted => "Possibly AI-Assisted",
            AiVerdict::HumanWritten => "Human-Written",
            AiVerdict::NotAnalyzed => "Not Analyzed",
        }
    }

    /// Case- and punctuation-insensitive match; unknown text is `NotAnalyzed`.
    pub fn parse_lenient(raw: &str) -> Self {
        let squashed: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| {
                v.as_str()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_ascii_lowercase()
                    == squashed
            })
            .unwrap_or(AiVerdict::NotAnalyzed)
    }
}

impl<'de> Deserialize<'de> for AiVerdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(AiVerdict::parse_lenient(&lenient::text_from_value(&value)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiDetection {
    #[serde(default)]
    pub verdict: AiVerdict,
    #[serde(default, deserialize_with = "lenient::text")]
    pub reasoning: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Online presence
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PresenceStatus {
    #[serde(rename = "valid")]
    Valid,
    #[serde(rename = "unverified")]
    Unverified,
    #[serde(rename = "invalid")]
    Invalid,
    #[default]
    #[serde(rename = "not found")]
    NotFound,
}

impl<'de> Deserialize<'de> for PresenceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(
            match lenient::text_from_value(&value).trim().to_ascii_lowercase().as_str() {
                "valid" => PresenceStatus::Valid,
                "unverified" => PresenceStatus::Unverified,
                "invalid" => PresenceStatus::Invalid,
                _ => PresenceStatus::NotFound,
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceEntry {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

impl PresenceEntry {
    pub fn found(urls: Vec<String>) -> Self {
        if urls.is_empty() {
            return Self::default();
        }
        Self {
            urls,
            status: PresenceStatus::Unverified,
            search_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlinePresence {
    #[serde(
        rename = "linkedIn",
        alias = "linkedin",
        default,
        deserialize_with = "lenient::record"
    )]
    pub linked_in: PresenceEntry,
    #[serde(default, deserialize_with = "lenient::record")]
    pub github: PresenceEntry,
    #[serde(
        rename = "personalWebsites",
        alias = "personal_websites",
        default,
        deserialize_with = "lenient::record"
    )]
    pub personal_websites: PresenceEntry,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring weights
// ────────────────────────────────────────────────────────────────────────────

/// Relative weight of each sub-score in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.4,
            experience: 0.4,
            education: 0.2,
        }
    }
}

impl ScoringWeights {
    /// Finite, non-negative and with a positive sum.
    pub fn validate(&self) -> Result<(), String> {
        let parts = [self.skills, self.experience, self.education];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("weights must be finite and non-negative".to_string());
        }
        if parts.iter().sum::<f64>() <= 0.0 {
            return Err("weights must not all be zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_failed_record_shape() {
        let failed = AnalysisResult::failed("no JSON object in reply");
        assert_eq!(failed.score, 0);
        assert_eq!(failed.skills.match_score, 0);
        assert!(failed.skills.matched_skills.is_empty());
        assert!(failed.skills.missing_skills.is_empty());
        assert!(failed.experience.experience_summary.contains("no JSON object"));
        assert_eq!(failed.ai_detection.verdict, AiVerdict::NotAnalyzed);
        assert_eq!(failed.online_presence.linked_in.status, PresenceStatus::NotFound);
        assert!(failed.is_failed());
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(AnalysisResult::failed("x")).unwrap();
        assert_eq!(value["aiDetection"]["verdict"], "Not Analyzed");
        assert_eq!(value["onlinePresence"]["linkedIn"]["status"], "not found");
        assert!(value["onlinePresence"]["personalWebsites"].is_object());
        assert!(value["onlinePresence"]["github"].get("search_url").is_none());
    }

    #[test]
    fn test_verdict_parsing_is_forgiving() {
        assert_eq!(AiVerdict::parse_lenient("Human-Written"), AiVerdict::HumanWritten);
        assert_eq!(AiVerdict::parse_lenient("human written"), AiVerdict::HumanWritten);
        assert_eq!(
            AiVerdict::parse_lenient("LIKELY AI GENERATED"),
            AiVerdict::LikelyAiGenerated
        );
        assert_eq!(AiVerdict::parse_lenient("who knows"), AiVerdict::NotAnalyzed);
    }

    #[test]
    fn test_unknown_presence_status_is_not_found() {
        let entry: PresenceEntry =
            serde_json::from_value(json!({"urls": [], "status": "maybe"})).unwrap();
        assert_eq!(entry.status, PresenceStatus::NotFound);
    }

    #[test]
    fn test_missing_items_keep_their_shape() {
        let report: SkillsReport = serde_json::from_value(json!({
            "missing_skills": ["Kubernetes", {"skill": "Go", "importance": "high"}, 7]
        }))
        .unwrap();
        assert_eq!(report.missing_skills.len(), 2);
        assert_eq!(report.missing_skills[0], MissingItem::Plain("Kubernetes".into()));
        assert_eq!(report.missing_skills[1].name(), "Go");

        let back = serde_json::to_value(&report.missing_skills).unwrap();
        assert_eq!(back, json!(["Kubernetes", {"skill": "Go", "importance": "high"}]));
    }

    #[test]
    fn test_weights_validation() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!(ScoringWeights { skills: -0.1, ..Default::default() }.validate().is_err());
        assert!(ScoringWeights { skills: f64::NAN, ..Default::default() }.validate().is_err());
        assert!(ScoringWeights { skills: 0.0, experience: 0.0, education: 0.0 }
            .validate()
            .is_err());
    }
}
