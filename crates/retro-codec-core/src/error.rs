use thiserror::Error;

use crate::profile::DimensionIssue;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid dimensions: {}", join_issues(.issues))]
    Dimension { issues: Vec<DimensionIssue> },
    #[error("Too many colors: {count} used, maximum is {max}")]
    ColorLimit { count: usize, max: usize },
    #[error("Color {color} is not in the {console} palette")]
    NotInPalette { color: String, console: String },
    #[error("Format {format} is not supported by {console}")]
    UnsupportedFormat { console: String, format: String },
    #[error("Unknown console profile: {0}")]
    UnknownProfile(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn join_issues(issues: &[DimensionIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CodecError>;
