use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use super::{PageNumberDetection, PageNumberOptions};
use crate::model::{DetectedPageNumber, PageNumberFileEntry, PageNumberReport};
use crate::util::{now_utc_string, sha256_text, write_json_pretty};

const REPORT_MANIFEST_VERSION: u32 = 1;

/// Per-file page number detections gathered over one run.
#[derive(Debug, Default)]
pub(crate) struct ReportCollector {
    entries: Vec<PageNumberFileEntry>,
}

impl ReportCollector {
    pub(crate) fn record(&mut self, path: &Path, text: &str, detection: &PageNumberDetection) {
        self.entries.push(PageNumberFileEntry {
            path: path.display().to_string(),
            status: "processed".to_string(),
            failure_reason: None,
            sha256: Some(sha256_text(text)),
            line_count: detection.line_count,
            candidate_count: detection.candidate_count,
            first_pass_sequence_count: detection.first_pass_sequence_count,
            refined_sequence_count: detection.refined_sequence_count,
            page_length: detection.page_length,
            repaired_count: detection.repaired_count(),
            page_numbers: detection
                .sequence
                .iter()
                .map(|candidate| DetectedPageNumber {
                    number: candidate.number,
                    line_index: candidate.line_index,
                    repaired: candidate.span.is_some(),
                })
                .collect(),
        });
    }

    pub(crate) fn build(
        mut self,
        options: &PageNumberOptions,
        failures: &[(PathBuf, String)],
    ) -> PageNumberReport {
        for (path, reason) in failures {
            self.entries.push(PageNumberFileEntry {
                path: path.display().to_string(),
                status: "failed".to_string(),
                failure_reason: Some(reason.clone()),
                sha256: None,
                line_count: 0,
                candidate_count: 0,
                first_pass_sequence_count: 0,
                refined_sequence_count: 0,
                page_length: None,
                repaired_count: 0,
                page_numbers: Vec::new(),
            });
        }

        PageNumberReport {
            manifest_version: REPORT_MANIFEST_VERSION,
            generated_at: now_utc_string(),
            command: std::env::args().collect::<Vec<String>>().join(" "),
            max_gap: options.max_gap,
            file_count: self.entries.len(),
            files: self.entries,
        }
    }

    pub(crate) fn write(
        self,
        report_path: &Path,
        options: &PageNumberOptions,
        failures: &[(PathBuf, String)],
    ) -> Result<()> {
        let report = self.build(options, failures);
        write_json_pretty(report_path, &report)?;
        info!(
            path = %report_path.display(),
            files = report.file_count,
            "wrote page number report"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::page_numbers::filter_page_numbers_with_detection;

    #[test]
    fn report_lists_processed_and_failed_files() {
        let options = PageNumberOptions::default();
        let text = "intro\n1\nbody\nmore\n2\ntext\n3\nend";
        let (_, detection) = filter_page_numbers_with_detection(text, &options);

        let mut collector = ReportCollector::default();
        collector.record(Path::new("doc.txt"), text, &detection);
        let failures = vec![(PathBuf::from("missing.txt"), "failed to read".to_string())];
        let report = collector.build(&options, &failures);

        assert_eq!(report.file_count, 2);
        assert_eq!(report.max_gap, 10);

        let processed = &report.files[0];
        assert_eq!(processed.status, "processed");
        assert_eq!(processed.line_count, 8);
        assert_eq!(processed.page_numbers.len(), 3);
        assert_eq!(processed.page_numbers[1].line_index, 4);
        assert_eq!(processed.sha256.as_deref(), Some(sha256_text(text).as_str()));

        let failed = &report.files[1];
        assert_eq!(failed.status, "failed");
        assert_eq!(failed.failure_reason.as_deref(), Some("failed to read"));
        assert!(failed.page_numbers.is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        let report = ReportCollector::default().build(&PageNumberOptions::default(), &[]);
        let json = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(json["manifest_version"], 1);
        assert_eq!(json["file_count"], 0);
        assert!(json["files"].as_array().is_some_and(Vec::is_empty));
    }
}
