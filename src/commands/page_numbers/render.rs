use std::collections::HashMap;

use super::candidate::Candidate;

/// Rebuilds the text with each detected page number removed, or wrapped in
/// `<tag>` when `mark` is set. Lines left empty once the page number is
/// removed are dropped.
pub(super) fn render_lines<S: AsRef<str>>(
    lines: &[S],
    sequence: &[Candidate],
    mark: bool,
    tag: &str,
) -> String {
    let candidate_by_line_index = sequence
        .iter()
        .map(|candidate| (candidate.line_index, candidate))
        .collect::<HashMap<usize, &Candidate>>();

    let mut rendered = String::new();
    for (index, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        let output = match candidate_by_line_index.get(&index) {
            None => Some(line.to_string()),
            Some(candidate) if mark => Some(candidate.marked_line(tag)),
            Some(candidate) => candidate
                .line_without_page_number()
                .filter(|rest| !rest.is_empty()),
        };

        if let Some(output) = output {
            rendered.push_str(&output);
            rendered.push('\n');
        }
    }

    rendered
}
