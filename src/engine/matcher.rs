use super::rules::{Domain, Rule, RuleStore};

/// First enabled rule for `direction` whose condition holds for `input`.
/// Later rules are never consulted once one matches.
pub fn find_rule<'a>(rules: &'a RuleStore, direction: Domain, input: &str) -> Option<&'a Rule> {
    rules
        .get_rules()
        .iter()
        .filter(|r| r.enabled && r.domain == direction)
        .find(|r| r.condition.holds(input))
}
