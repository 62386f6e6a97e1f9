use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::PageNumbersArgs;
use crate::util::clean_each_file;

mod candidate;
mod estimate;
mod lis;
mod render;
mod repair;
mod report;
mod selection;
mod sequences;

pub use candidate::Candidate;
pub(crate) use report::ReportCollector;

use candidate::page_number_candidates;
use estimate::estimate_page_length;
use lis::longest_increasing_subsequence;
use render::render_lines;
use repair::repair_sequence;
use selection::{select_best_sequence, trim_sequence};
use sequences::candidate_sequences;

pub const DEFAULT_MAX_GAP: u64 = 10;
pub const DEFAULT_PAGE_NUMBER_TAG: &str = "pagenumber";
pub const DEFAULT_MAX_CANDIDATE_SEQUENCES: usize = 10_000;

const SEQUENCE_COUNT_WARNING: usize = 100;

#[derive(Debug, Clone)]
pub struct PageNumberOptions {
    pub max_gap: u64,
    pub mark: bool,
    pub tag: String,
    pub max_sequences: usize,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self {
            max_gap: DEFAULT_MAX_GAP,
            mark: false,
            tag: DEFAULT_PAGE_NUMBER_TAG.to_string(),
            max_sequences: DEFAULT_MAX_CANDIDATE_SEQUENCES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageNumberDetection {
    pub line_count: usize,
    pub candidate_count: usize,
    pub first_pass_sequence_count: usize,
    pub refined_sequence_count: usize,
    pub page_length: Option<f64>,
    pub sequence: Vec<Candidate>,
}

impl PageNumberDetection {
    /// Candidates in the final sequence that were found by gap repair.
    pub fn repaired_count(&self) -> usize {
        self.sequence
            .iter()
            .filter(|candidate| candidate.span.is_some())
            .count()
    }
}

struct SequencePass {
    sequence_count: usize,
    best: Option<(Vec<Candidate>, f64)>,
}

pub fn run(args: PageNumbersArgs) -> Result<()> {
    let options = args.page_numbers.options();
    let mut report = ReportCollector::default();

    let summary = clean_each_file(&args.input.text, |path, text| {
        let (cleaned, detection) = filter_page_numbers_with_detection(&text, &options);
        log_detection(path, &detection);
        report.record(path, &text, &detection);
        Ok(cleaned)
    })?;

    if let Some(report_path) = &args.page_numbers.report_path {
        report.write(report_path, &options, &summary.failures)?;
    }

    summary.into_result()
}

pub fn filter_page_numbers_with_detection(
    text: &str,
    options: &PageNumberOptions,
) -> (String, PageNumberDetection) {
    let lines = text.lines().collect::<Vec<&str>>();
    let detection = detect_page_numbers(&lines, options);

    if detection.sequence.is_empty() {
        return (text.to_string(), detection);
    }

    let rendered = render_lines(&lines, &detection.sequence, options.mark, &options.tag);
    (rendered, detection)
}

/// Infers the page number sequence of a document in two passes: the first
/// gives a page length estimate good enough to aim the search for missing
/// numbers, the second re-selects over the repaired candidates.
pub fn detect_page_numbers<S: AsRef<str>>(
    lines: &[S],
    options: &PageNumberOptions,
) -> PageNumberDetection {
    let candidates = page_number_candidates(lines);
    let mut detection = PageNumberDetection {
        line_count: lines.len(),
        candidate_count: candidates.len(),
        ..PageNumberDetection::default()
    };

    let first_pass = make_page_number_sequence(&candidates, options);
    detection.first_pass_sequence_count = first_pass.sequence_count;
    let Some((sequence, page_length)) = first_pass.best else {
        debug!(
            candidates = candidates.len(),
            "no page length estimate, leaving text unchanged"
        );
        return detection;
    };

    let mut repaired = repair_sequence(&sequence, lines, page_length, options.max_gap);
    repaired.sort_by_key(|candidate| (candidate.line_index, candidate.number));

    let refined = make_page_number_sequence(&repaired, options);
    detection.refined_sequence_count = refined.sequence_count;
    let (sequence, page_length) = match refined.best {
        Some(best) => best,
        None => {
            warn!("refinement pass produced no estimate, keeping first pass");
            (sequence, page_length)
        }
    };

    detection.page_length = Some(page_length);
    detection.sequence = sequence;
    detection
}

fn make_page_number_sequence(
    candidates: &[Candidate],
    options: &PageNumberOptions,
) -> SequencePass {
    let lis = longest_increasing_subsequence(
        &candidates
            .iter()
            .map(|candidate| candidate.number)
            .collect::<Vec<u64>>(),
    );

    // keep every occurrence of a number on the LIS, not just the chosen one
    let lis_numbers = lis.iter().copied().collect::<HashSet<u64>>();
    let candidates = candidates
        .iter()
        .filter(|candidate| lis_numbers.contains(&candidate.number))
        .cloned()
        .collect::<Vec<Candidate>>();

    let enumeration = candidate_sequences(&lis, &candidates, options.max_sequences);
    let sequence_count = enumeration.sequences.len();
    if enumeration.truncated {
        warn!(
            limit = options.max_sequences,
            "stopped enumerating candidate page number sequences at limit"
        );
    } else if sequence_count > SEQUENCE_COUNT_WARNING {
        warn!(sequences = sequence_count, "many candidate page number sequences");
    }

    let Some(page_length) = estimate_page_length(&enumeration.sequences) else {
        return SequencePass {
            sequence_count,
            best: None,
        };
    };
    debug!(page_length, "estimated page length");

    let trimmed = enumeration
        .sequences
        .iter()
        .map(|sequence| trim_sequence(sequence, page_length, options.max_gap))
        .collect::<Vec<&[&Candidate]>>();

    let best = select_best_sequence(&trimmed, page_length).map(|index| {
        let sequence = trimmed[index]
            .iter()
            .map(|candidate| (*candidate).clone())
            .collect::<Vec<Candidate>>();
        (sequence, page_length)
    });

    SequencePass {
        sequence_count,
        best,
    }
}

pub(crate) fn log_detection(path: &Path, detection: &PageNumberDetection) {
    let first = detection.sequence.first().map(|candidate| candidate.number);
    let last = detection.sequence.last().map(|candidate| candidate.number);
    info!(
        path = %path.display(),
        candidates = detection.candidate_count,
        page_numbers = detection.sequence.len(),
        repaired = detection.repaired_count(),
        page_length = detection.page_length.unwrap_or_default(),
        first = first.unwrap_or_default(),
        last = last.unwrap_or_default(),
        "filtered page numbers"
    );

    for candidate in &detection.sequence {
        debug!(candidate = %candidate, "page number");
    }
}
