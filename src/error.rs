//! Error types for the holiday pipeline.
//!
//! Row-level failures (`Encoding`, `DateParse`) are recovered inside the
//! extraction and load passes and only surface through their stats.
//! Pass-level failures (`Fetch`, `ArtifactIo`, `Csv`) propagate to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HolidayError {
    /// Network failure while downloading the upstream source.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("bad status from {url}: {status}")]
    BadStatus { url: String, status: u16 },

    /// Byte sequence not valid for the declared encoding.
    #[error("invalid {encoding} byte sequence")]
    Encoding { encoding: &'static str },

    /// No configured layout matched the date column.
    #[error("unparseable date {input:?}")]
    DateParse { input: String },

    /// Creating, writing, opening or reading the durable artifact failed.
    #[error("artifact {path:?}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("render: {0}")]
    Render(#[from] askama::Error),

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

impl HolidayError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HolidayError::ArtifactIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = HolidayError> = std::result::Result<T, E>;
