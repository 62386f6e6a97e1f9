use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CleanArgs;
use crate::commands::normalize::{NormalizeOptions, normalize_text};
use crate::commands::page_numbers::{
    PageNumberDetection, PageNumberOptions, ReportCollector, filter_page_numbers_with_detection,
    log_detection,
};
use crate::commands::tocs::{TocOptions, filter_tocs};
use crate::util::clean_each_file;

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub normalize: NormalizeOptions,
    pub page_numbers: PageNumberOptions,
    pub tocs: TocOptions,
}

pub fn run(args: CleanArgs) -> Result<()> {
    let options = CleanOptions {
        normalize: args.normalize.options(),
        page_numbers: args.page_numbers.options(),
        tocs: args.tocs.options(),
    };
    info!(
        normalization = options.normalize.normalization.as_str(),
        max_gap = options.page_numbers.max_gap,
        mark = options.page_numbers.mark,
        mark_tocs = options.tocs.mark_tocs,
        "starting clean"
    );

    let mut report = ReportCollector::default();
    let summary = clean_each_file(&args.input.text, |path, text| {
        let (cleaned, detection) = clean_text_with_detection(&text, &options);
        log_detection(path, &detection);
        report.record(path, &text, &detection);
        Ok(cleaned)
    })?;

    if let Some(report_path) = &args.page_numbers.report_path {
        report.write(report_path, &options.page_numbers, &summary.failures)?;
    }

    summary.into_result()
}

/// Encoding normalization, then page number filtering, then TOC filtering.
pub fn clean_text_with_detection(
    text: &str,
    options: &CleanOptions,
) -> (String, PageNumberDetection) {
    let text = normalize_text(text, &options.normalize);
    debug!(chars = text.chars().count(), "normalized encoding");

    let (text, detection) = filter_page_numbers_with_detection(&text, &options.page_numbers);
    (filter_tocs(&text, &options.tocs), detection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_normalizes_strips_page_numbers_and_tocs() {
        let mut lines = vec![
            "Sisällysluettelo".to_string(),
            "1 Johdanto .................. 3".to_string(),
            "2 Menetelmät ................ 5".to_string(),
            "3 Tulokset .................. 7".to_string(),
            "4 Pohdinta .................. 9".to_string(),
            "5 Lähteet ................... 11".to_string(),
        ];
        for page in 1..=6u64 {
            for row in 0..9 {
                lines.push(format!("Kappaleen ﬁ rivi {row} ilman sivunumeroa"));
            }
            lines.push(format!("- {page} -"));
        }
        let text = lines.join("\n");

        let (cleaned, detection) = clean_text_with_detection(&text, &CleanOptions::default());
        assert_eq!(detection.sequence.len(), 6);
        let cleaned_lines = cleaned.lines().collect::<Vec<&str>>();

        assert_eq!(cleaned_lines[0], "");
        assert!(!cleaned.contains("Johdanto"));
        assert!(!cleaned_lines.iter().any(|line| line.starts_with("- ")));
        assert!(!cleaned.contains('ﬁ'));
        assert_eq!(cleaned_lines.len(), 1 + 6 * 9);
    }

    #[test]
    fn plain_text_survives_pipeline() {
        let text = "Hello world\nSecond line\n";
        let (cleaned, detection) = clean_text_with_detection(text, &CleanOptions::default());
        assert_eq!(cleaned, text);
        assert!(detection.sequence.is_empty());
    }
}
