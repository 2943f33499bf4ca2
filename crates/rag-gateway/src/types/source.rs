//! Source references handed to the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the pipeline should parse a source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// A single HTML page
    WebPage,
    /// An XML sitemap whose entries are crawled
    Sitemap,
    /// A PDF document
    #[serde(alias = "pdf_file")]
    Pdf,
    /// A CSV file
    Csv,
}

impl DataType {
    /// Wire tag for this data type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::WebPage => "web_page",
            DataType::Sitemap => "sitemap",
            DataType::Pdf => "pdf",
            DataType::Csv => "csv",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URI or file path plus an optional data type.
///
/// `data_type: None` leaves detection to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// URI or path of the source
    pub source: String,
    /// Parse hint (auto-detect when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
}

impl SourceRef {
    /// Source with auto-detected data type
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            data_type: None,
        }
    }

    /// Source with an explicit data type
    pub fn typed(source: impl Into<String>, data_type: DataType) -> Self {
        Self {
            source: source.into(),
            data_type: Some(data_type),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_type {
            Some(dt) => write!(f, "{} ({})", self.source, dt),
            None => write!(f, "{}", self.source),
        }
    }
}
