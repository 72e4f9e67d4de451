pub mod browser;
pub mod config;
pub mod credentials;
pub mod evaluation;
pub mod llm;
pub mod output;
pub mod paper;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod retrieval;
pub mod review;
pub mod scopus;
pub mod scoring;
