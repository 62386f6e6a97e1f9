use std::borrow::Cow;

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::cli::{NormalizeArgs, NormalizationForm};
use crate::util::clean_each_file;

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub fix_encoding: bool,
    pub keep_nonprintable: bool,
    pub normalization: NormalizationForm,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            fix_encoding: true,
            keep_nonprintable: false,
            normalization: NormalizationForm::Nfkc,
        }
    }
}

/// Characters that do not print: controls, format characters, unassigned
/// and private use code points, line and paragraph separators, every space
/// separator other than the ASCII space, and the replacement character.
/// Newline, tab and soft hyphen survive.
static NONPRINTABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[[\p{Cc}\p{Cf}\p{Co}\p{Cn}\p{Zl}\p{Zp}\p{Zs}\x{FFFD}]--[ \n\t\x{00AD}]]")
        .expect("non-printable regex is valid")
});

pub fn run(args: NormalizeArgs) -> Result<()> {
    let options = args.normalize.options();
    clean_each_file(&args.input.text, |path, text| {
        let normalized = normalize_text(&text, &options);
        info!(
            path = %path.display(),
            normalization = options.normalization.as_str(),
            "normalized text"
        );
        Ok(normalized)
    })?
    .into_result()
}

pub fn normalize_text(text: &str, options: &NormalizeOptions) -> String {
    let mut text = Cow::Borrowed(text);

    if options.fix_encoding {
        text = Cow::Owned(fix_encoding(&text));
    }

    text = match options.normalization {
        NormalizationForm::Nfc => Cow::Owned(text.nfc().collect()),
        NormalizationForm::Nfkc => Cow::Owned(text.nfkc().collect()),
        NormalizationForm::Nfd => Cow::Owned(text.nfd().collect()),
        NormalizationForm::Nfkd => Cow::Owned(text.nfkd().collect()),
        NormalizationForm::None => text,
    };

    if !options.keep_nonprintable {
        text = Cow::Owned(remove_nonprintable(&text));
    }

    text.into_owned()
}

/// Undoes UTF-8 text that was decoded as Windows-1252, line by line. A line
/// is only replaced when it round-trips to valid UTF-8 with fewer mojibake
/// pairs than before.
pub fn fix_encoding(text: &str) -> String {
    let mut repaired_lines = 0usize;
    let fixed = text
        .split_inclusive('\n')
        .map(|line| match repair_line(line) {
            Some(repaired) => {
                repaired_lines += 1;
                Cow::Owned(repaired)
            }
            None => Cow::Borrowed(line),
        })
        .collect::<String>();

    if repaired_lines > 0 {
        debug!(lines = repaired_lines, "repaired mis-decoded lines");
    }
    fixed
}

fn repair_line(line: &str) -> Option<String> {
    let before = mojibake_pairs(line);
    if before == 0 {
        return None;
    }

    let (bytes, _, unmappable) = WINDOWS_1252.encode(line);
    if unmappable {
        return None;
    }

    let decoded = std::str::from_utf8(&bytes).ok()?;
    (mojibake_pairs(decoded) < before).then(|| decoded.to_string())
}

/// Counts adjacent characters that look like a UTF-8 lead byte followed by a
/// continuation byte, both seen through Windows-1252.
fn mojibake_pairs(text: &str) -> usize {
    text.chars()
        .zip(text.chars().skip(1))
        .filter(|(lead, continuation)| {
            ('\u{00C2}'..='\u{00EF}').contains(lead) && looks_like_continuation(*continuation)
        })
        .count()
}

fn looks_like_continuation(character: char) -> bool {
    let mut buffer = [0u8; 4];
    let (bytes, _, unmappable) = WINDOWS_1252.encode(character.encode_utf8(&mut buffer));
    !unmappable && bytes.len() == 1 && (0x80..=0xBF).contains(&bytes[0])
}

pub fn remove_nonprintable(text: &str) -> String {
    NONPRINTABLE_RE.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mis_decoded_utf8_is_repaired() {
        assert_eq!(fix_encoding("JÃ¤rjestelmÃ¤n kuvaus\n"), "Järjestelmän kuvaus\n");
        assert_eq!(fix_encoding("itâ€™s\nfine"), "it\u{2019}s\nfine");
    }

    #[test]
    fn correct_text_is_left_alone() {
        let text = "Järjestelmän kuvaus – “quoted” ½\n";
        assert_eq!(fix_encoding(text), text);
    }

    #[test]
    fn nfkc_folds_compatibility_characters() {
        let options = NormalizeOptions::default();
        assert_eq!(normalize_text("ﬁnal ２", &options), "final 2");
    }

    #[test]
    fn normalization_can_be_disabled() {
        let options = NormalizeOptions {
            normalization: NormalizationForm::None,
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize_text("ﬁnal", &options), "ﬁnal");
    }

    #[test]
    fn nonprintable_characters_are_stripped_except_layout() {
        let text = "a\u{200B}b\u{FFFD}c\u{0007}\td\u{00AD}e\r\nf\u{E000}";
        assert_eq!(remove_nonprintable(text), "abc\td\u{00AD}e\nf");
    }

    #[test]
    fn unassigned_format_and_odd_spaces_are_stripped() {
        let text = "a\u{0378}b\u{08E2}c\u{13430}d\u{2029}e\u{3000}f g\u{00A0}h";
        assert_eq!(remove_nonprintable(text), "abcdef gh");
    }

    #[test]
    fn nonprintable_characters_kept_on_request() {
        let options = NormalizeOptions {
            keep_nonprintable: true,
            normalization: NormalizationForm::None,
            fix_encoding: false,
        };
        let text = "a\u{200B}b";
        assert_eq!(normalize_text(text, &options), text);
    }

    #[test]
    fn no_fix_leaves_mojibake() {
        let options = NormalizeOptions {
            fix_encoding: false,
            normalization: NormalizationForm::None,
            ..NormalizeOptions::default()
        };
        assert_eq!(normalize_text("JÃ¤rjestelmÃ¤", &options), "JÃ¤rjestelmÃ¤");
    }
}
