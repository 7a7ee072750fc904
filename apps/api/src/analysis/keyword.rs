//! Keyword-overlap analysis. Used when no model is deployed: deterministic,
//! offline, and cheap enough to run on every request.
//!
//! Matching runs on the raw extracted text rather than the normalised form,
//! because normalisation strips the `+` and `#` that `C++` and `C#` need.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Datelike, Local};
use regex::Regex;

use super::contact::extract_profile_urls;
use super::history::{covered_months, dated_roles, education_rows, YearMonth};
use super::models::{
    AnalysisResult, EducationReport, ExperienceReport, MissingItem, OnlinePresence,
    PresenceEntry, ScoringWeights, SkillsReport,
};
use super::parser::backfill_search_urls;
use super::scoring::{aggregate_score_with, ScoreInputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    Technical,
    Tool,
    Soft,
    Language,
}

/// (term as it appears in lowercase text, display name, category)
const VOCABULARY: &[(&str, &str, SkillCategory)] = &[
    ("python", "Python", SkillCategory::Technical),
    ("java", "Java", SkillCategory::Technical),
    ("javascript", "JavaScript", SkillCategory::Technical),
    ("typescript", "TypeScript", SkillCategory::Technical),
    ("c++", "C++", SkillCategory::Technical),
    ("c#", "C#", SkillCategory::Technical),
    ("ruby", "Ruby", SkillCategory::Technical),
    ("php", "PHP", SkillCategory::Technical),
    ("swift", "Swift", SkillCategory::Technical),
    ("kotlin", "Kotlin", SkillCategory::Technical),
    ("rust", "Rust", SkillCategory::Technical),
    ("go", "Go", SkillCategory::Technical),
    ("golang", "Go", SkillCategory::Technical),
    ("html", "HTML", SkillCategory::Technical),
    ("css", "CSS", SkillCategory::Technical),
    ("sql", "SQL", SkillCategory::Technical),
    ("nosql", "NoSQL", SkillCategory::Technical),
    ("mongodb", "MongoDB", SkillCategory::Technical),
    ("postgresql", "PostgreSQL", SkillCategory::Technical),
    ("postgres", "PostgreSQL", SkillCategory::Technical),
    ("mysql", "MySQL", SkillCategory::Technical),
    ("oracle", "Oracle", SkillCategory::Technical),
    ("aws", "AWS", SkillCategory::Technical),
    ("azure", "Azure", SkillCategory::Technical),
    ("gcp", "GCP", SkillCategory::Technical),
    ("react", "React", SkillCategory::Technical),
    ("angular", "Angular", SkillCategory::Technical),
    ("vue", "Vue", SkillCategory::Technical),
    ("node.js", "Node.js", SkillCategory::Technical),
    ("nodejs", "Node.js", SkillCategory::Technical),
    ("express", "Express", SkillCategory::Technical),
    ("django", "Django", SkillCategory::Technical),
    ("flask", "Flask", SkillCategory::Technical),
    ("spring", "Spring", SkillCategory::Technical),
    ("asp.net", "ASP.NET", SkillCategory::Technical),
    ("machine learning", "Machine Learning", SkillCategory::Technical),
    ("data science", "Data Science", SkillCategory::Technical),
    ("big data", "Big Data", SkillCategory::Technical),
    ("hadoop", "Hadoop", SkillCategory::Technical),
    ("spark", "Spark", SkillCategory::Technical),
    ("tensorflow", "TensorFlow", SkillCategory::Technical),
    ("pytorch", "PyTorch", SkillCategory::Technical),
    ("git", "Git", SkillCategory::Tool),
    ("github", "GitHub", SkillCategory::Tool),
    ("gitlab", "GitLab", SkillCategory::Tool),
    ("bitbucket", "Bitbucket", SkillCategory::Tool),
    ("jenkins", "Jenkins", SkillCategory::Tool),
    ("jira", "Jira", SkillCategory::Tool),
    ("confluence", "Confluence", SkillCategory::Tool),
    ("figma", "Figma", SkillCategory::Tool),
    ("photoshop", "Photoshop", SkillCategory::Tool),
    ("excel", "Excel", SkillCategory::Tool),
    ("postman", "Postman", SkillCategory::Tool),
    ("docker", "Docker", SkillCategory::Tool),
    ("kubernetes", "Kubernetes", SkillCategory::Tool),
    ("terraform", "Terraform", SkillCategory::Tool),
    ("ansible", "Ansible", SkillCategory::Tool),
    ("leadership", "Leadership", SkillCategory::Soft),
    ("communication", "Communication", SkillCategory::Soft),
    ("teamwork", "Teamwork", SkillCategory::Soft),
    ("problem solving", "Problem Solving", SkillCategory::Soft),
    ("critical thinking", "Critical Thinking", SkillCategory::Soft),
    ("time management", "Time Management", SkillCategory::Soft),
    ("project management", "Project Management", SkillCategory::Soft),
    ("agile", "Agile", SkillCategory::Soft),
    ("scrum", "Scrum", SkillCategory::Soft),
    ("collaboration", "Collaboration", SkillCategory::Soft),
    ("adaptability", "Adaptability", SkillCategory::Soft),
    ("creativity", "Creativity", SkillCategory::Soft),
    ("strategic thinking", "Strategic Thinking", SkillCategory::Soft),
    ("decision making", "Decision Making", SkillCategory::Soft),
    ("english", "English", SkillCategory::Language),
    ("spanish", "Spanish", SkillCategory::Language),
    ("french", "French", SkillCategory::Language),
    ("german", "German", SkillCategory::Language),
    ("chinese", "Chinese", SkillCategory::Language),
    ("japanese", "Japanese", SkillCategory::Language),
    ("korean", "Korean", SkillCategory::Language),
    ("russian", "Russian", SkillCategory::Language),
    ("arabic", "Arabic", SkillCategory::Language),
    ("hindi", "Hindi", SkillCategory::Language),
    ("portuguese", "Portuguese", SkillCategory::Language),
    ("italian", "Italian", SkillCategory::Language),
];

static SKILL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    VOCABULARY
        .iter()
        .map(|(term, name, _)| {
            let pattern = format!(
                r"(?i)(?:^|[^a-z0-9]){}(?:$|[^a-z0-9+#])",
                regex::escape(term)
            );
            (*name, Regex::new(&pattern).unwrap())
        })
        .collect()
});

static YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2}(?:\.\d)?)\s*\+?\s*(?:years?|yrs?)\b").unwrap());

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z][a-z0-9+#.]{3,}").unwrap());

const STOPWORDS: &[&str] = &[
    "with", "that", "this", "have", "will", "from", "your", "their", "they", "about", "into",
    "must", "should", "would", "could", "need", "needs", "looking", "seeking", "strong",
    "experience", "years", "work", "working", "team", "role", "candidate", "ability", "skills",
    "knowledge", "required", "preferred", "plus", "including", "other", "more", "also",
    "able", "well", "good", "great", "using", "within", "across", "and/or",
];

/// Degree ladder: (rank, display name, pattern).
static DEGREES: LazyLock<Vec<(u8, &'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            4,
            "Doctorate",
            r"(?i)(?:^|[^a-z])(?:ph\.?\s?d\.?|doctorate|doctoral)(?:$|[^a-z])",
        ),
        (
            3,
            "Master's",
            r"(?i)(?:^|[^a-z])(?:masters?|master's|m\.s\.|m\.sc\.?|msc|mba|m\.tech|m\.a\.)(?:$|[^a-z])",
        ),
        (
            2,
            "Bachelor's",
            r"(?i)(?:^|[^a-z])(?:bachelors?|bachelor's|b\.s\.|b\.sc\.?|bsc|b\.a\.|b\.tech|b\.e\.|undergraduate degree)(?:$|[^a-z])",
        ),
        (
            1,
            "Associate",
            r"(?i)(?:^|[^a-z])(?:associate'?s? degree|diploma)(?:$|[^a-z])",
        ),
    ]
    .into_iter()
    .map(|(rank, name, pattern)| (rank, name, Regex::new(pattern).unwrap()))
    .collect()
});

/// Display names of vocabulary skills mentioned in `text`, in vocabulary order
/// and without duplicates.
pub fn find_skills(text: &str) -> Vec<&'static str> {
    let mut seen = HashSet::new();
    SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .filter_map(|(name, _)| seen.insert(*name).then_some(*name))
        .collect()
}

pub fn skill_category(name: &str) -> Option<SkillCategory> {
    VOCABULARY
        .iter()
        .find(|(_, display, _)| *display == name)
        .map(|(_, _, category)| *category)
}

/// Largest "N years" / "N+ yrs" figure in the text.
pub fn max_years(text: &str) -> Option<f64> {
    YEARS
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
        .fold(None, |best, y| Some(best.map_or(y, |b: f64| b.max(y))))
}

/// Highest degree mentioned: (rank, display name).
pub fn highest_degree(text: &str) -> Option<(u8, &'static str)> {
    DEGREES
        .iter()
        .find(|(_, _, re)| re.is_match(text))
        .map(|(rank, name, _)| (*rank, *name))
}

fn significant_terms(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|w| w.len() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

pub fn analyze_keywords(
    job_description: &str,
    resume_text: &str,
    candidate_name: &str,
    weights: &ScoringWeights,
) -> AnalysisResult {
    let skills = skills_report(job_description, resume_text);
    let experience = experience_report(job_description, resume_text);
    let education = education_report(job_description, resume_text);

    let urls = extract_profile_urls(resume_text);
    let mut online_presence = OnlinePresence {
        linked_in: PresenceEntry::found(urls.linked_in),
        github: PresenceEntry::found(urls.github),
        personal_websites: PresenceEntry::found(urls.websites),
    };
    backfill_search_urls(&mut online_presence, candidate_name);

    let mut result = AnalysisResult {
        score: 0,
        skills,
        experience,
        education,
        ai_detection: Default::default(),
        online_presence,
        failed: false,
    };
    result.ai_detection.reasoning =
        "Keyword analysis does not assess AI generation".to_string();
    result.score = aggregate_score_with(ScoreInputs::from_result(&result), weights);
    result
}

fn skills_report(job_description: &str, resume_text: &str) -> SkillsReport {
    let required = find_skills(job_description);
    let present: HashSet<&str> = find_skills(resume_text).into_iter().collect();

    let matched: Vec<String> = required
        .iter()
        .filter(|s| present.contains(*s))
        .map(|s| s.to_string())
        .collect();
    let missing: Vec<MissingItem> = required
        .iter()
        .filter(|s| !present.contains(*s))
        .map(|s| MissingItem::Plain(s.to_string()))
        .collect();
    let additional: Vec<String> = find_skills(resume_text)
        .into_iter()
        .filter(|s| !required.contains(s))
        .map(str::to_string)
        .collect();

    let mut skill_summary = if required.is_empty() {
        "No recognised skills in the job description".to_string()
    } else {
        format!(
            "Matched {} of {} required skills",
            matched.len(),
            required.len()
        )
    };
    let missing_technical: Vec<&str> = missing
        .iter()
        .map(MissingItem::name)
        .filter(|name| skill_category(name) == Some(SkillCategory::Technical))
        .collect();
    if !missing_technical.is_empty() {
        skill_summary.push_str(&format!(
            "; missing technical skills: {}",
            missing_technical.join(", ")
        ));
    }

    SkillsReport {
        match_score: percent(matched.len(), required.len()).round() as u8,
        matched_skills: matched,
        missing_skills: missing,
        skill_summary,
        additional_skills: additional,
    }
}

fn experience_report(job_description: &str, resume_text: &str) -> ExperienceReport {
    let now = Local::now();
    experience_report_at(job_description, resume_text, (now.year(), now.month()))
}

/// `today` closes ranges that end in "Present".
fn experience_report_at(
    job_description: &str,
    resume_text: &str,
    today: YearMonth,
) -> ExperienceReport {
    let roles = dated_roles(resume_text, today);
    let dated_years = (f64::from(covered_months(&roles)) / 12.0 * 10.0).round() / 10.0;
    let years = max_years(resume_text).unwrap_or(0.0).max(dated_years);
    let jd_terms = significant_terms(job_description);
    let resume_lower = resume_text.to_lowercase();

    let relevant_experience: Vec<String> = resume_text
        .split(['\n', '.'])
        .map(str::trim)
        .filter(|line| line.len() > 3)
        .filter(|line| {
            let lower = line.to_lowercase();
            jd_terms.iter().any(|t| lower.contains(t.as_str()))
        })
        .take(5)
        .map(str::to_string)
        .collect();

    // Dated roles whose heading shares nothing with the job description.
    let additional_experience: Vec<String> = roles
        .iter()
        .filter(|role| !role.title.is_empty())
        .filter(|role| {
            significant_terms(&format!("{} {}", role.title, role.company)).is_disjoint(&jd_terms)
        })
        .map(|role| format!("{} ({})", role.title, role.duration()))
        .collect();

    let (match_score, experience_summary) = match max_years(job_description) {
        Some(required) if required > 0.0 => (
            (years / required).min(1.0) * 100.0,
            format!("{years} years found against {required} required"),
        ),
        _ => {
            let covered = jd_terms
                .iter()
                .filter(|t| resume_lower.contains(t.as_str()))
                .count();
            (
                percent(covered, jd_terms.len()),
                format!(
                    "{covered} of {} job description terms appear in the resume",
                    jd_terms.len()
                ),
            )
        }
    };

    ExperienceReport {
        match_score: match_score.round().clamp(0.0, 100.0) as u8,
        years,
        relevant_experience,
        experience_summary,
        experience_details: roles.iter().map(|role| role.to_detail()).collect(),
        additional_experience,
    }
}

fn education_report(job_description: &str, resume_text: &str) -> EducationReport {
    let held = highest_degree(resume_text);
    let required = highest_degree(job_description);

    let (match_score, education_summary) = match (held, required) {
        (Some((rank, name)), Some((needed, needed_name))) if rank >= needed => {
            (100, format!("{name} meets the {needed_name} requirement"))
        }
        (Some((rank, name)), Some((needed, needed_name))) => (
            (f64::from(rank) / f64::from(needed) * 100.0).round() as u8,
            format!("{name} is below the {needed_name} requirement"),
        ),
        (None, Some((_, needed_name))) => (
            0,
            format!("No degree found; the role asks for {needed_name}"),
        ),
        (Some((_, name)), None) => (100, format!("{name}; no degree requirement stated")),
        (None, None) => (50, "No degree found and none required".to_string()),
    };

    let jd_terms = significant_terms(job_description);
    let mut education_details = education_rows(resume_text);
    for row in &mut education_details {
        if !row.field.is_empty() && !significant_terms(&row.field).is_disjoint(&jd_terms) {
            row.relevance = "Field appears in the job description".to_string();
        }
    }

    EducationReport {
        match_score,
        degree: held.map(|(_, name)| name.to_string()).unwrap_or_default(),
        education_summary,
        education_details,
    }
}
