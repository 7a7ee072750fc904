//! Resume analysis: prompt, model reply parsing, scoring and the batch pipeline.

pub mod analyzer;
pub mod contact;
pub mod handlers;
pub mod history;
pub mod keyword;
pub mod lenient;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod scoring;

pub use analyzer::{KeywordAnalyzer, LlmAnalyzer, ResumeAnalyzer};
