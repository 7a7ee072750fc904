//! Score Aggregator: folds the three sub-scores and the bonus counts into one
//! overall percentage.
//!
//! overall = round((skills + skills_bonus) × w_s + (experience + experience_bonus) × w_e
//!                 + education × w_ed), clamped to 100.
//!
//! Each "additional" item is worth 5 points to its category, capped at 20.

use super::models::{AnalysisResult, ScoringWeights};

pub const BONUS_PER_ITEM: f64 = 5.0;
pub const BONUS_CAP: f64 = 20.0;

/// Raw aggregator inputs. Sub-scores may be anything the caller has; they are
/// sanitised here.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreInputs {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
    pub additional_skills: usize,
    pub additional_experience: usize,
}

impl ScoreInputs {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            skills: f64::from(result.skills.match_score),
            experience: f64::from(result.experience.match_score),
            education: f64::from(result.education.match_score),
            additional_skills: result.skills.additional_skills.len(),
            additional_experience: result.experience.additional_experience.len(),
        }
    }
}

/// Overall score with the default 40/40/20 weights.
pub fn aggregate_score(inputs: ScoreInputs) -> u8 {
    aggregate_score_with(inputs, &ScoringWeights::default())
}

/// Overall score with caller-supplied weights. Weights are normalised to sum to
/// 1, so the defaults reproduce the fixed formula exactly. Invalid weights fall
/// back to the defaults.
pub fn aggregate_score_with(inputs: ScoreInputs, weights: &ScoringWeights) -> u8 {
    let weights = if weights.validate().is_ok() {
        *weights
    } else {
        ScoringWeights::default()
    };
    let total = weights.skills + weights.experience + weights.education;

    let skills = sanitize(inputs.skills) + bonus(inputs.additional_skills);
    let experience = sanitize(inputs.experience) + bonus(inputs.additional_experience);
    let education = sanitize(inputs.education);

    let overall = (skills * weights.skills
        + experience * weights.experience
        + education * weights.education)
        / total;

    overall.round().clamp(0.0, 100.0) as u8
}

fn sanitize(score: f64) -> f64 {
    if score.is_nan() || score < 0.0 {
        0.0
    } else {
        score.min(100.0)
    }
}

fn bonus(items: usize) -> f64 {
    (items as f64 * BONUS_PER_ITEM).min(BONUS_CAP)
}
