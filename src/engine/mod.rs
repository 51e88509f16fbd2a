pub mod affix;
pub mod classify;
pub mod matcher;
pub mod rules;
pub mod search;
pub mod transform;

use crate::error::ConvertError;
use affix::AffixPlan;
use classify::{classify, Case};
use rules::{Domain, Rule, RuleStore};

/// Everything a conversion depends on besides the input text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    /// Uppercase the first letter of camelCase output (PascalCase).
    pub capitalize: bool,
    pub rules: RuleStore,
}

impl EngineState {
    pub fn new(capitalize: bool, rules: RuleStore) -> Self {
        Self { capitalize, rules }
    }

    pub fn convert(&self, text: &str) -> Option<String> {
        convert(text, &self.rules, self.capitalize)
    }

    pub fn try_convert(&self, text: &str) -> Result<String, ConvertError> {
        try_convert(text, &self.rules, self.capitalize)
    }
}

/// Convert `text` to the opposite case, or `None` when there is nothing to do.
pub fn convert(text: &str, rules: &RuleStore, capitalize: bool) -> Option<String> {
    try_convert(text, rules, capitalize).ok()
}

/// Like [`convert`], but says why no conversion happened.
pub fn try_convert(text: &str, rules: &RuleStore, capitalize: bool) -> Result<String, ConvertError> {
    let (direction, rule) = resolve(text, rules)?;
    if let Some(rule) = rule {
        tracing::debug!("Rule {} ({}) matched '{}'", rule.id, rule.condition, text);
    }

    let plan = AffixPlan::new(rule, text.len());
    let body = plan.body(text)?;

    let out = match direction {
        Domain::SnakeToCamel => transform::to_camel(&plan.camel_input(body), capitalize),
        Domain::CamelToSnake => plan.snake_output(&transform::to_snake(body)),
    };

    tracing::debug!("Converted '{}' => '{}' ({:?})", text, out, direction);
    Ok(out)
}

/// Pick the conversion direction and the rule that applies to it.
///
/// A bare lowercase word (`"singleton"`) has no case of its own, but is
/// treated as one-word snake_case when a snake → camel rule claims it.
fn resolve<'r>(text: &str, rules: &'r RuleStore) -> Result<(Domain, Option<&'r Rule>), ConvertError> {
    let direction = match classify(text) {
        Case::SnakeCase => Domain::SnakeToCamel,
        Case::CamelCase => Domain::CamelToSnake,
        Case::Unrecognized if is_single_word(text) => {
            return matcher::find_rule(rules, Domain::SnakeToCamel, text)
                .map(|rule| (Domain::SnakeToCamel, Some(rule)))
                .ok_or(ConvertError::UnrecognizedCase);
        }
        Case::Unrecognized => return Err(ConvertError::UnrecognizedCase),
    };
    tracing::debug!("Input '{}' classified as {:?}", text, direction);
    Ok((direction, matcher::find_rule(rules, direction, text)))
}

/// A lowercase letter followed by lowercase letters or digits.
fn is_single_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::rules::{Action, Condition};

    fn store(rules: Vec<Rule>) -> RuleStore {
        rules.into_iter().collect()
    }

    #[test]
    fn test_convert_without_rules() {
        let none = RuleStore::new();
        assert_eq!(convert("foo_bar", &none, false).as_deref(), Some("fooBar"));
        assert_eq!(convert("fooBar", &none, false).as_deref(), Some("foo_bar"));
        assert_eq!(convert("foo_bar__", &none, false).as_deref(), Some("fooBar__"));
        assert_eq!(convert("foo_bar", &none, true).as_deref(), Some("FooBar"));
        assert_eq!(convert("mCURLObj", &none, false).as_deref(), Some("m_curl_obj"));
    }

    #[test]
    fn test_round_trip_without_rules() {
        let none = RuleStore::new();
        let camel = convert("parse_http_header", &none, false).unwrap();
        assert_eq!(camel, "parseHttpHeader");
        assert_eq!(convert(&camel, &none, false).as_deref(), Some("parse_http_header"));
    }

    #[test]
    fn test_unrecognized() {
        let none = RuleStore::new();
        assert_eq!(try_convert("FOO", &none, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(try_convert("singleton", &none, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(try_convert("", &none, false), Err(ConvertError::UnrecognizedCase));
    }

    #[test]
    fn test_add_prefix_snake_to_camel() {
        let rules = store(vec![Rule::new(
            Domain::SnakeToCamel,
            Condition::always_true(),
            vec![Action::add_prefix("get")],
        )
        .unwrap()]);
        assert_eq!(convert("singleton", &rules, false).as_deref(), Some("getSingleton"));
        assert_eq!(convert("foo_bar", &rules, false).as_deref(), Some("getFooBar"));
        assert_eq!(convert("foo_bar", &rules, true).as_deref(), Some("GetFooBar"));
    }

    #[test]
    fn test_single_word_must_be_an_identifier() {
        let rules = store(vec![Rule::new(
            Domain::SnakeToCamel,
            Condition::always_true(),
            vec![Action::add_prefix("get")],
        )
        .unwrap()]);
        assert_eq!(try_convert("foo bar", &rules, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(try_convert("foo-bar", &rules, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(try_convert("x.y", &rules, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(try_convert("1st", &rules, false), Err(ConvertError::UnrecognizedCase));
        assert_eq!(convert("utf8", &rules, false).as_deref(), Some("getUtf8"));
    }

    #[test]
    fn test_single_word_ignores_camel_rules() {
        let rules = store(vec![Rule::new(
            Domain::CamelToSnake,
            Condition::always_true(),
            vec![Action::add_prefix("get")],
        )
        .unwrap()]);
        assert_eq!(convert("singleton", &rules, false), None);
    }

    #[test]
    fn test_member_rules_round_trip() {
        let rules = store(vec![
            Rule::new(
                Domain::CamelToSnake,
                Condition::has_prefix("m").unwrap(),
                vec![Action::remove_prefix("m"), Action::add_suffix("_")],
            )
            .unwrap(),
            Rule::new(
                Domain::SnakeToCamel,
                Condition::has_suffix("_").unwrap(),
                vec![Action::remove_suffix("_"), Action::add_prefix("m")],
            )
            .unwrap(),
        ]);
        assert_eq!(convert("mMember", &rules, false).as_deref(), Some("member_"));
        assert_eq!(convert("member_", &rules, false).as_deref(), Some("mMember"));
        assert_eq!(convert("mFooBar", &rules, false).as_deref(), Some("foo_bar_"));
    }

    #[test]
    fn test_add_prefix_camel_to_snake() {
        let rules = store(vec![Rule::new(
            Domain::CamelToSnake,
            Condition::always_true(),
            vec![Action::add_prefix("get")],
        )
        .unwrap()]);
        assert_eq!(convert("fooBar", &rules, false).as_deref(), Some("get_foo_bar"));
    }

    #[test]
    fn test_first_match_wins() {
        let rules = store(vec![
            Rule::new(Domain::SnakeToCamel, Condition::always_true(), vec![Action::add_prefix("get")])
                .unwrap(),
            Rule::new(Domain::SnakeToCamel, Condition::always_true(), vec![Action::add_prefix("set")])
                .unwrap(),
        ]);
        assert_eq!(convert("foo_bar", &rules, false).as_deref(), Some("getFooBar"));
    }

    #[test]
    fn test_disabled_rule_never_matches() {
        let mut rules = RuleStore::new();
        let id = rules.add_rule(
            Rule::new(Domain::SnakeToCamel, Condition::always_true(), vec![Action::add_prefix("get")])
                .unwrap(),
        );
        rules.set_enabled(id, false).unwrap();
        assert_eq!(convert("foo_bar", &rules, false).as_deref(), Some("fooBar"));
        assert_eq!(convert("singleton", &rules, false), None);
    }

    #[test]
    fn test_empty_after_strip() {
        let rules = store(vec![Rule::new(
            Domain::CamelToSnake,
            Condition::always_true(),
            vec![Action::remove_suffix("aVeryLongSuffix")],
        )
        .unwrap()]);
        assert_eq!(try_convert("fooBar", &rules, false), Err(ConvertError::EmptyAfterStrip));
        assert_eq!(convert("fooBar", &rules, false), None);
    }

    #[test]
    fn test_engine_state() {
        let state = EngineState::new(true, RuleStore::new());
        assert_eq!(state.convert("foo_bar").as_deref(), Some("FooBar"));
        assert_eq!(EngineState::default().convert("foo_bar").as_deref(), Some("fooBar"));
    }
}
