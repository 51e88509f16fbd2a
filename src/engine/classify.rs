use serde::Serialize;
use std::fmt;

/// Detected identifier case of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Case {
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "unrecognized")]
    Unrecognized,
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Case::SnakeCase => "snake_case",
            Case::CamelCase => "camelCase",
            Case::Unrecognized => "unrecognized",
        })
    }
}

/// The snake test wins over the camel test.
pub fn classify(text: &str) -> Case {
    if is_snake_case(text) {
        Case::SnakeCase
    } else if is_camel_case(text) {
        Case::CamelCase
    } else {
        Case::Unrecognized
    }
}

/// True if the text holds a lone `_` that comes after some lowercase letter.
///
/// Runs of two or more underscores are skipped whole and never count as a
/// separator, so `"__INIT__"` and `"foo__bar"` are not snake_case.
pub fn is_snake_case(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    let mut seen_lower = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '_' {
            if chars.get(i + 1) == Some(&'_') {
                while chars.get(i + 1) == Some(&'_') {
                    i += 1;
                }
            } else if seen_lower {
                return true;
            }
        } else if c.is_ascii_lowercase() {
            seen_lower = true;
        }
        i += 1;
    }
    false
}

/// True if some uppercase ASCII letter has a lowercase ASCII neighbour.
/// Digits and punctuation never qualify as the neighbour (`"ID2"` is not camel).
pub fn is_camel_case(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.iter().enumerate().any(|(i, c)| {
        c.is_ascii_uppercase()
            && ((i > 0 && chars[i - 1].is_ascii_lowercase())
                || chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()))
    })
}
