use serde::Deserialize;

use super::EngineState;

/// How occurrences of the search term are located in a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFlags {
    #[serde(default)]
    pub case_sensitive: bool,
    /// Match must have non-word characters (or buffer edges) on both sides.
    #[serde(default)]
    pub whole_word: bool,
    /// Match must have a non-word character (or the buffer start) on its left.
    #[serde(default)]
    pub word_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedText {
    pub text: String,
    pub replacements: usize,
}

/// Replace every non-overlapping occurrence of `search` in `text` with its
/// conversion. Occurrences that do not convert are left as they are.
pub fn convert_matches(
    text: &str,
    search: &str,
    flags: SearchFlags,
    state: &EngineState,
) -> ConvertedText {
    let hay = text.as_bytes();
    let needle = search.as_bytes();
    let n = needle.len();

    let mut out = String::with_capacity(text.len());
    let mut replacements = 0;
    let mut copied = 0;
    let mut i = 0;

    while n > 0 && i + n <= hay.len() {
        let window = &hay[i..i + n];
        let hit = if flags.case_sensitive {
            window == needle
        } else {
            window.eq_ignore_ascii_case(needle)
        };

        if hit && at_boundaries(hay, i, i + n, flags) {
            if let Some(found) = text.get(i..i + n) {
                if let Some(converted) = state.convert(found) {
                    out.push_str(&text[copied..i]);
                    out.push_str(&converted);
                    copied = i + n;
                    replacements += 1;
                }
                i += n;
                continue;
            }
        }
        i += 1;
    }

    out.push_str(&text[copied..]);
    tracing::debug!("Converted {} occurrence(s) of '{}'", replacements, search);

    ConvertedText {
        text: out,
        replacements,
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn at_boundaries(hay: &[u8], start: usize, end: usize, flags: SearchFlags) -> bool {
    let left = start == 0 || !is_word_byte(hay[start - 1]);
    let right = end == hay.len() || !is_word_byte(hay[end]);
    if flags.whole_word {
        left && right
    } else if flags.word_start {
        left
    } else {
        true
    }
}
