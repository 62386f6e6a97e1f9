use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)\s*$").expect("number-only regex is valid"));

static DASHED_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*-+\s*([0-9]+)\s*-+\s*$").expect("dashed-number regex is valid")
});

/// A place in the document where a number might be a page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub number: u64,
    pub line: String,
    pub line_index: usize,
    /// Byte range of the page number within `line`; `None` when the whole
    /// line is the page number.
    pub span: Option<(usize, usize)>,
}

impl Candidate {
    pub fn new(number: u64, line: &str, line_index: usize, span: Option<(usize, usize)>) -> Self {
        Self {
            number,
            line: line.to_string(),
            line_index,
            span,
        }
    }

    pub fn marked_line(&self, tag: &str) -> String {
        match self.span {
            None => format!("<{tag}>{}</{tag}>", self.line),
            Some((start, end)) => format!(
                "{}<{tag}>{}</{tag}>{}",
                &self.line[..start],
                &self.line[start..end],
                &self.line[end..]
            ),
        }
    }

    pub fn line_without_page_number(&self) -> Option<String> {
        let (start, end) = self.span?;
        Some(format!("{}{}", &self.line[..start], &self.line[end..]))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{:?} \"{}\"",
            self.number, self.line_index, self.span, self.line
        )
    }
}

/// Lines that consist of only a number, optionally bracketed by dashes.
pub(super) fn page_number_candidates<S: AsRef<str>>(lines: &[S]) -> Vec<Candidate> {
    let mut candidates = Vec::<Candidate>::new();

    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let number = [&*NUMBER_ONLY_RE, &*DASHED_NUMBER_RE]
            .into_iter()
            .find_map(|regex| regex.captures(line))
            .and_then(|captures| captures.get(1))
            .and_then(|value| value.as_str().parse::<u64>().ok());

        if let Some(number) = number {
            candidates.push(Candidate::new(number, line, index, None));
        }
    }

    candidates
}
