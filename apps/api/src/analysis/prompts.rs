use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Every field name the parser reads. Each one must appear in the rendered prompt.
pub const REQUIRED_FIELDS: &[&str] = &[
    "score",
    "skills",
    "match_score",
    "matched_skills",
    "missing_skills",
    "skill_summary",
    "additional_skills",
    "experience",
    "years",
    "relevant_experience",
    "experience_summary",
    "experience_details",
    "additional_experience",
    "education",
    "degree",
    "education_summary",
    "education_details",
    "aiDetection",
    "verdict",
    "reasoning",
    "onlinePresence",
    "linkedIn",
    "github",
    "personalWebsites",
    "urls",
    "status",
];

pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert resume analyzer and job matching specialist.
Compare the resume below against the job description and assess how well the candidate fits.

Scoring rules:
- skills.match_score, experience.match_score and education.match_score are integers from 0 to 100.
- score is the overall fit: skills 40%, experience 40%, education 20%.
- List in additional_skills the relevant skills the candidate has beyond the job's requirements.
- List in additional_experience the relevant experience beyond the job's requirements.
- missing_skills lists requirements the resume does not show, most important first.
- aiDetection.verdict must be exactly one of: "Likely AI-Generated", "Possibly AI-Assisted", "Human-Written", "Not Analyzed".
- onlinePresence lists only URLs that literally appear in the resume. Use status "unverified" when URLs are listed and "not found" when none are.

Reply with this JSON structure:
{
  "score": 0,
  "skills": {
    "match_score": 0,
    "matched_skills": ["skill"],
    "missing_skills": ["skill"],
    "skill_summary": "text",
    "additional_skills": ["skill"]
  },
  "experience": {
    "match_score": 0,
    "years": 0,
    "relevant_experience": ["text"],
    "experience_summary": "text",
    "experience_details": [
      {"title": "text", "company": "text", "duration": "text", "description": "text"}
    ],
    "additional_experience": ["text"]
  },
  "education": {
    "match_score": 0,
    "degree": "text",
    "education_summary": "text",
    "education_details": [
      {"degree": "text", "field": "text", "institution": "text", "graduation_year": "text", "gpa": "text", "relevance": "text"}
    ]
  },
  "aiDetection": {"verdict": "Not Analyzed", "reasoning": "text"},
  "onlinePresence": {
    "linkedIn": {"urls": [], "status": "not found"},
    "github": {"urls": [], "status": "not found"},
    "personalWebsites": {"urls": [], "status": "not found"}
  }
}

{json_only}

Job Description:
{job_description}

Resume Text:
{resume_text}
"#;

/// Renders the analysis prompt. Inputs are inserted verbatim.
pub fn build_analysis_prompt(job_description: &str, resume_text: &str) -> String {
    // Resume text goes in last so braces inside it cannot be mistaken for placeholders.
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{job_description}", job_description.trim())
        .replace("{resume_text}", resume_text.trim())
}
