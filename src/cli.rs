use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::normalize::NormalizeOptions;
use crate::commands::page_numbers::{
    DEFAULT_MAX_CANDIDATE_SEQUENCES, DEFAULT_MAX_GAP, DEFAULT_PAGE_NUMBER_TAG, PageNumberOptions,
};
use crate::commands::tocs::{
    DEFAULT_MAX_TOC_GAP, DEFAULT_MIN_TOC_LENGTH, DEFAULT_TOC_TAG, TocOptions,
};

#[derive(Parser, Debug)]
#[command(
    name = "cleanpdfextract",
    version,
    about = "Clean up plain text extracted from PDF or OCR output"
)]
pub struct Cli {
    /// Print debug info (overrides RUST_LOG)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize encoding, filter page numbers, then filter tables of contents
    Clean(CleanArgs),
    /// Remove or mark page numbers
    PageNumbers(PageNumbersArgs),
    /// Remove or mark tables of contents
    Tocs(TocsArgs),
    /// Repair mis-decoded text and apply unicode normalization
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Text file(s) extracted from PDF
    #[arg(required = true)]
    pub text: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[command(flatten)]
    pub normalize: NormalizeFlags,

    #[command(flatten)]
    pub page_numbers: PageNumberFlags,

    #[command(flatten)]
    pub tocs: TocFlags,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PageNumbersArgs {
    #[command(flatten)]
    pub page_numbers: PageNumberFlags,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TocsArgs {
    #[command(flatten)]
    pub tocs: TocFlags,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub normalize: NormalizeFlags,

    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PageNumberFlags {
    /// Maximum gap in page number sequence
    #[arg(long, default_value_t = DEFAULT_MAX_GAP)]
    pub max_gap: u64,

    /// Mark page numbers instead of filtering
    #[arg(long, default_value_t = false)]
    pub mark: bool,

    /// Tag to use with --mark
    #[arg(long, default_value = DEFAULT_PAGE_NUMBER_TAG)]
    pub page_number_tag: String,

    /// Stop enumerating candidate page number sequences past this count
    #[arg(long, default_value_t = DEFAULT_MAX_CANDIDATE_SEQUENCES)]
    pub max_sequences: usize,

    /// Write a JSON report of detected page numbers
    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

impl PageNumberFlags {
    pub fn options(&self) -> PageNumberOptions {
        PageNumberOptions {
            max_gap: self.max_gap,
            mark: self.mark,
            tag: self.page_number_tag.clone(),
            max_sequences: self.max_sequences,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TocFlags {
    /// Minimum TOC length in lines
    #[arg(long, default_value_t = DEFAULT_MIN_TOC_LENGTH)]
    pub min_toc_length: usize,

    /// Maximum gap length between TOC blocks in lines
    #[arg(long, default_value_t = DEFAULT_MAX_TOC_GAP)]
    pub max_toc_gap: usize,

    /// Mark TOCs instead of filtering
    #[arg(long, default_value_t = false)]
    pub mark_tocs: bool,

    /// Tag to use with --mark-tocs
    #[arg(long, default_value = DEFAULT_TOC_TAG)]
    pub toc_tag: String,
}

impl TocFlags {
    pub fn options(&self) -> TocOptions {
        TocOptions {
            min_toc_length: self.min_toc_length,
            max_toc_gap: self.max_toc_gap,
            mark_tocs: self.mark_tocs,
            toc_tag: self.toc_tag.clone(),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum NormalizationForm {
    Nfc,
    Nfkc,
    Nfd,
    Nfkd,
    None,
}

impl NormalizationForm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nfc => "NFC",
            Self::Nfkc => "NFKC",
            Self::Nfd => "NFD",
            Self::Nfkd => "NFKD",
            Self::None => "None",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct NormalizeFlags {
    /// Do not attempt to repair mis-decoded text
    #[arg(long, default_value_t = false)]
    pub no_fix: bool,

    /// Keep all non-printable characters
    #[arg(long, default_value_t = false)]
    pub keep_nonprintable: bool,

    /// Unicode normalization to apply
    #[arg(long, value_enum, default_value_t = NormalizationForm::Nfkc)]
    pub normalization: NormalizationForm,
}

impl NormalizeFlags {
    pub fn options(&self) -> NormalizeOptions {
        NormalizeOptions {
            fix_encoding: !self.no_fix,
            keep_nonprintable: self.keep_nonprintable,
            normalization: self.normalization,
        }
    }
}
