//! Text normalization shared by the extractors.

/// Bullet glyphs commonly emitted by PDF text extraction.
const BULLETS: &[char] = &['•', '◦', '▪', '▫', '➤', '‣', '⁃'];

/// Flattens text for searches that don't need line structure: every
/// whitespace run (newlines included) becomes one space and bullet glyphs
/// become `-`.
pub fn flatten(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| if BULLETS.contains(&c) { '-' } else { c })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits text into trimmed lines. Blank lines are kept as `""` so that line
/// indices stay aligned with the source document.
pub fn lines(text: &str) -> Vec<&str> {
    text.split('\n').map(str::trim).collect()
}

/// `true` if the line is made only of ASCII digits (page numbers, lone years).
pub fn is_numeric(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Splits a line once on its separator dash. A spaced dash (`" - "` or
/// `" – "`) wins over a bare hyphen so that hyphenated names survive.
pub fn split_dash(line: &str) -> Option<(&str, &str)> {
    [" - ", " – "]
        .iter()
        .find_map(|sep| line.split_once(sep))
        .or_else(|| line.split_once(&['-', '–'][..]))
        .map(|(left, right)| (left.trim(), right.trim()))
}

pub fn has_dash(line: &str) -> bool {
    line.contains(&['-', '–'][..])
}

/// Title-cases a single token: `"PYTHON"` → `"Python"`.
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
