use super::rules::{ActionKind, Rule};
use crate::error::ConvertError;

/// What a matched rule does to the input around the case transformation.
///
/// `begin..end` is the byte range kept from the input after all
/// remove-prefix/remove-suffix actions; `prefix`/`suffix` are the last
/// non-empty add actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffixPlan<'r> {
    pub begin: usize,
    pub end: usize,
    pub prefix: Option<&'r str>,
    pub suffix: Option<&'r str>,
}

impl<'r> AffixPlan<'r> {
    pub fn new(rule: Option<&'r Rule>, input_len: usize) -> Self {
        let mut begin = 0;
        let mut removed_suffix = 0;
        let mut prefix = None;
        let mut suffix = None;

        for action in rule.map(|r| r.actions.as_slice()).unwrap_or_default() {
            let value = action.value.as_str();
            match action.kind {
                ActionKind::AddPrefix => prefix = Some(value).filter(|v| !v.is_empty()),
                ActionKind::AddSuffix => suffix = Some(value).filter(|v| !v.is_empty()),
                ActionKind::RemovePrefix => begin += value.len(),
                ActionKind::RemoveSuffix => removed_suffix += value.len(),
            }
        }

        Self {
            begin,
            end: input_len.saturating_sub(removed_suffix),
            prefix,
            suffix,
        }
    }

    /// The part of `input` that survives stripping.
    pub fn body<'i>(&self, input: &'i str) -> Result<&'i str, ConvertError> {
        if self.end <= self.begin {
            return Err(ConvertError::EmptyAfterStrip);
        }
        input
            .get(self.begin..self.end)
            .ok_or(ConvertError::MisalignedStrip {
                begin: self.begin,
                end: self.end,
            })
    }

    /// Effective input for the snake → camel transformer. The first body
    /// character is uppercased after an added prefix so it reads as a new word.
    pub fn camel_input(&self, body: &str) -> String {
        let mut out = String::with_capacity(
            body.len() + self.prefix.map_or(0, str::len) + self.suffix.map_or(0, str::len),
        );
        match self.prefix {
            Some(prefix) => {
                out.push_str(prefix);
                let mut chars = body.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                }
                out.push_str(chars.as_str());
            }
            None => out.push_str(body),
        }
        if let Some(suffix) = self.suffix {
            out.push_str(suffix);
        }
        out
    }

    /// Attach the affixes to an already snake_cased body, with a `_` between
    /// affix and body unless one side already has it. Affixes are lowercased
    /// like the body.
    pub fn snake_output(&self, snake_body: &str) -> String {
        let mut out = String::with_capacity(
            snake_body.len()
                + self.prefix.map_or(0, |p| p.len() + 1)
                + self.suffix.map_or(0, |s| s.len() + 1),
        );
        if let Some(prefix) = self.prefix {
            out.push_str(&prefix.to_ascii_lowercase());
            if !prefix.ends_with('_') && !snake_body.starts_with('_') {
                out.push('_');
            }
        }
        out.push_str(snake_body);
        if let Some(suffix) = self.suffix {
            if !suffix.starts_with('_') && !snake_body.ends_with('_') {
                out.push('_');
            }
            out.push_str(&suffix.to_ascii_lowercase());
        }
        out
    }
}
