use serde::{Deserialize, Serialize};

/// A stored job description. `id` is the slug of the title and doubles as the
/// storage key stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl JobDescription {
    pub fn new(title: &str, description: &str, requirements: Vec<String>) -> Self {
        Self {
            id: slugify(title),
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            requirements: requirements
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Text handed to the analyzers: title, free text, then requirements.
    pub fn analysis_text(&self) -> String {
        let mut text = format!("{}\n\n{}", self.title, self.description);
        if !self.requirements.is_empty() {
            text.push_str("\n\nRequirements:\n");
            for requirement in &self.requirements {
                text.push_str("- ");
                text.push_str(requirement);
                text.push('\n');
            }
        }
        text.trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Lowercase ASCII slug: alphanumeric runs joined by single dashes.
/// A title with no usable characters becomes `job`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "job".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Senior Backend Engineer"), "senior-backend-engineer");
        assert_eq!(slugify("  C++ / Rust Dev!! "), "c-rust-dev");
        assert_eq!(slugify("Data--Scientist (ML)"), "data-scientist-ml");
        assert_eq!(slugify("???"), "job");
    }

    #[test]
    fn test_new_trims_and_drops_blank_requirements() {
        let job = JobDescription::new(
            " Backend Engineer ",
            " Build APIs. ",
            vec!["Python".into(), "  ".into(), " AWS ".into()],
        );
        assert_eq!(job.id, "backend-engineer");
        assert_eq!(job.title, "Backend Engineer");
        assert_eq!(job.requirements, vec!["Python", "AWS"]);
    }

    #[test]
    fn test_analysis_text_includes_requirements() {
        let job = JobDescription::new("Backend Engineer", "Build APIs.", vec!["Python".into()]);
        assert_eq!(
            job.analysis_text(),
            "Backend Engineer\n\nBuild APIs.\n\nRequirements:\n- Python"
        );
    }
}
