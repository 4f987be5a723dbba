// src/lib.rs

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod rate_limit;
pub mod report;
pub mod sanitize;
pub mod web;

pub use config::VibeConfig;
pub use error::{UpstreamError, VibeError};
pub use pipeline::{Analysis, AnalysisRequest, ReportSource, VibePipeline};
pub use report::VibeReport;
pub use web::ApiError;
