//! Heuristic removal of tables of contents: lines ending in dot leaders and a
//! page number seed TOC blocks, which then grow over headers and short
//! in-between lines, get smoothed, merged across small gaps and finally
//! filtered by length.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::cli::TocsArgs;
use crate::util::clean_each_file;

pub const DEFAULT_MIN_TOC_LENGTH: usize = 5;
pub const DEFAULT_MAX_TOC_GAP: usize = 3;
pub const DEFAULT_TOC_TAG: &str = "cleanpdfextract:tableofcontents";

const SMOOTHING_WIDTH: usize = 1;

static TOC_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\.\s*){5,}([0-9]+)\s*$").expect("toc line regex is valid"));

// lines tolerated between a TOC header or TOC lines and the next TOC line
static BETWEEN_LINE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\s*$",
        r"^.{0,10}$",
        r"^.*\.\s*[0-9]+\s*$",
        r"^.*(\.\s*){5}.*$",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("toc in-between regex is valid"))
    .collect()
});

static TOC_HEADER_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "fi",
            r"(?i)^\s*(?:[0-9]+\.?\s*)?(sisällys(?:luettelo)?|sisältö)\s*$",
        ),
        (
            "en",
            r"(?i)^\s*(?:[0-9]+\.?\s*)?((?:table\s+of\s+)?contents)\s*$",
        ),
    ]
    .into_iter()
    .map(|(language, pattern)| {
        (
            language,
            Regex::new(pattern).expect("toc header regex is valid"),
        )
    })
    .collect()
});

#[derive(Debug, Clone)]
pub struct TocOptions {
    pub min_toc_length: usize,
    pub max_toc_gap: usize,
    pub mark_tocs: bool,
    pub toc_tag: String,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            min_toc_length: DEFAULT_MIN_TOC_LENGTH,
            max_toc_gap: DEFAULT_MAX_TOC_GAP,
            mark_tocs: false,
            toc_tag: DEFAULT_TOC_TAG.to_string(),
        }
    }
}

/// Half-open `[start, end)` range of line indices.
type Block = (usize, usize);

pub fn run(args: TocsArgs) -> Result<()> {
    let options = args.tocs.options();
    clean_each_file(&args.input.text, |path, text| {
        let (filtered, blocks) = filter_tocs_with_blocks(&text, &options);
        info!(path = %path.display(), tocs = blocks.len(), "filtered tables of contents");
        Ok(filtered)
    })?
    .into_result()
}

pub fn filter_tocs(text: &str, options: &TocOptions) -> String {
    filter_tocs_with_blocks(text, options).0
}

fn filter_tocs_with_blocks(text: &str, options: &TocOptions) -> (String, Vec<Block>) {
    let lines = text.lines().collect::<Vec<&str>>();

    let categories = categorize_toc_lines(&lines);
    let categories = recategorize_preceding_lines(&lines, &categories);
    let categories = recategorize_in_between_lines(&lines, &categories);
    let categories = smooth_categories(&categories, SMOOTHING_WIDTH);

    let blocks = group_toc_lines(&categories);
    let blocks = combine_blocks(blocks, options);
    let blocks = blocks
        .into_iter()
        .filter(|block| acceptable_block(*block, options))
        .collect::<Vec<Block>>();

    for (start, end) in &blocks {
        debug!(start, end, "table of contents block");
    }

    (rebuild_text(&lines, &blocks, options), blocks)
}

fn categorize_toc_lines(lines: &[&str]) -> Vec<bool> {
    lines.iter().map(|line| TOC_LINE_RE.is_match(line)).collect()
}

fn is_between_line(line: &str) -> bool {
    BETWEEN_LINE_RES.iter().any(|regex| regex.is_match(line))
}

fn toc_header_language(line: &str) -> Option<&'static str> {
    TOC_HEADER_RES
        .iter()
        .find(|(_, regex)| regex.is_match(line))
        .map(|(language, _)| *language)
}

/// True when every line from `index` up to the next TOC line may sit inside a
/// TOC, and such a TOC line exists.
fn leads_to_toc_line(lines: &[&str], categories: &[bool], index: usize) -> bool {
    for (line, is_toc) in lines.iter().zip(categories).skip(index) {
        if *is_toc {
            return true;
        }
        if !is_between_line(line) {
            return false;
        }
    }
    false
}

/// Marks TOC headers, and the lines following them, as TOC when they lead
/// into TOC lines.
fn recategorize_preceding_lines(lines: &[&str], categories: &[bool]) -> Vec<bool> {
    let mut recategorized = Vec::<bool>::with_capacity(categories.len());
    let mut in_block = false;

    for (index, line) in lines.iter().enumerate() {
        let header = toc_header_language(line);
        if let Some(language) = header {
            debug!(line_index = index, language, "table of contents header");
        }
        in_block =
            (in_block || header.is_some()) && leads_to_toc_line(lines, categories, index + 1);
        recategorized.push(categories[index] || in_block);
    }

    recategorized
}

fn recategorize_in_between_lines(lines: &[&str], categories: &[bool]) -> Vec<bool> {
    let mut recategorized = Vec::<bool>::with_capacity(categories.len());
    let mut in_block = false;

    for (index, is_toc) in categories.iter().copied().enumerate() {
        if is_toc {
            in_block = true;
            recategorized.push(true);
        } else if in_block && leads_to_toc_line(lines, categories, index) {
            recategorized.push(true);
        } else {
            in_block = false;
            recategorized.push(false);
        }
    }

    recategorized
}

/// A line becomes TOC when the majority of its window is.
fn smooth_categories(categories: &[bool], width: usize) -> Vec<bool> {
    (0..categories.len())
        .map(|index| {
            let window =
                &categories[index.saturating_sub(width)..(index + width + 1).min(categories.len())];
            let toc_count = window.iter().filter(|is_toc| **is_toc).count();
            categories[index] || toc_count * 2 > window.len()
        })
        .collect()
}

fn group_toc_lines(categories: &[bool]) -> Vec<Block> {
    let mut blocks = Vec::<Block>::new();
    let mut block_start = None;

    for (index, is_toc) in categories.iter().copied().enumerate() {
        match (is_toc, block_start) {
            (true, None) => block_start = Some(index),
            (false, Some(start)) => {
                blocks.push((start, index));
                block_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = block_start {
        blocks.push((start, categories.len()));
    }

    blocks
}

fn acceptable_block(block: Block, options: &TocOptions) -> bool {
    block.1 - block.0 >= options.min_toc_length
}

/// Merges neighbouring blocks separated by at most `max_toc_gap` lines when
/// either of them is long enough to be a TOC on its own, until nothing more
/// merges.
fn combine_blocks(mut blocks: Vec<Block>, options: &TocOptions) -> Vec<Block> {
    loop {
        let mergeable = blocks.windows(2).position(|pair| {
            let (first, second) = (pair[0], pair[1]);
            second.0 - first.1 <= options.max_toc_gap
                && (acceptable_block(first, options) || acceptable_block(second, options))
        });

        let Some(index) = mergeable else {
            return blocks;
        };

        blocks[index].1 = blocks[index + 1].1;
        blocks.remove(index + 1);
    }
}

fn rebuild_text(lines: &[&str], blocks: &[Block], options: &TocOptions) -> String {
    let mut rebuilt = Vec::<String>::with_capacity(lines.len());
    let mut blocks = blocks.iter().peekable();

    let mut index = 0usize;
    while index < lines.len() {
        let Some(&&(start, end)) = blocks.peek().filter(|block| block.0 == index) else {
            rebuilt.push(lines[index].to_string());
            index += 1;
            continue;
        };
        blocks.next();

        if options.mark_tocs {
            rebuilt.push(format!("<{}>", options.toc_tag));
            rebuilt.extend(lines[start..end].iter().map(|line| line.to_string()));
            rebuilt.push(format!("</{}>", options.toc_tag));
        } else {
            rebuilt.push(String::new());
        }
        index = end;
    }

    rebuilt.into_iter().map(|line| line + "\n").collect()
}
