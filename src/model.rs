use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PageNumberReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub command: String,
    pub max_gap: u64,
    pub file_count: usize,
    pub files: Vec<PageNumberFileEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageNumberFileEntry {
    pub path: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub sha256: Option<String>,
    pub line_count: usize,
    pub candidate_count: usize,
    pub first_pass_sequence_count: usize,
    pub refined_sequence_count: usize,
    pub page_length: Option<f64>,
    pub repaired_count: usize,
    pub page_numbers: Vec<DetectedPageNumber>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectedPageNumber {
    pub number: u64,
    pub line_index: usize,
    pub repaired: bool,
}
