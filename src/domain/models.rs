use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Episode,
    Unknown,
}

/// What a filename says about the media it belongs to. Built once per video
/// and once per candidate subtitle name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoTarget {
    pub title: String, // lowercase
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub year: Option<u32>,
    pub kind: MediaKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Pick the best positive score, or nothing.
    Automatic,
    /// Pick the best score even when it is not positive.
    Query,
    /// A human picks an entry from the catalog.
    Manual,
}

/// One subtitle scheduled for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub logical_path: String,
    pub decoded_name: String, // base name, after name recovery
    pub extension: String,    // with the leading dot, original case
}

/// At most two files: the winner and an optional companion in the other format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub files: Vec<PlannedFile>,
}

impl ExtractionPlan {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub name: String, // file name without directory
    pub video_dir: PathBuf,
    pub store_dir: PathBuf,
    pub has_subtitle: bool,
}

impl Video {
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) if pos > 0 => &self.name[..pos],
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub name: String,
    pub path: String,
    pub error: String,
    pub trace_back: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub fail: usize,
    pub fail_videos: Vec<FailureRecord>,
}
