use thiserror::Error;

use crate::engine::rules::RuleId;

/// Reasons a conversion produced no result.
///
/// None of these are failures from the caller's point of view: they are the
/// "nothing to do" outcomes, reported so a front-end can explain why the
/// selection was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("input is neither snake_case nor camelCase")]
    UnrecognizedCase,

    #[error("rule actions strip the entire input")]
    EmptyAfterStrip,

    #[error("rule strips {begin}..{end}, which splits a multi-byte character")]
    MisalignedStrip { begin: usize, end: usize },
}

/// Rule construction and rule store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("prefix/suffix conditions need a non-empty value")]
    EmptyConditionValue,

    #[error("a rule needs at least one action")]
    NoActions,

    #[error("no rule with id {0}")]
    UnknownRule(RuleId),
}

/// A persisted rule record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("record has {0} fields, expected an even count of at least 8")]
    FieldCount(usize),

    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },

    #[error("field `{field}` has unknown code {code}")]
    UnknownCode { field: &'static str, code: i64 },

    #[error("record starting at byte {0} is never closed")]
    Unterminated(usize),

    #[error("invalid rule: {0}")]
    InvalidRule(#[from] RuleError),
}
