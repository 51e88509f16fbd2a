use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RuleError;

/// Stable handle of a rule inside a [`RuleStore`].
pub type RuleId = u32;

/// Id carried by rules that have not been added to a store yet.
pub const UNASSIGNED_ID: RuleId = 0;

// ─── Rule Building Blocks ──────────────────────────────────────────────────

/// The conversion direction a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    SnakeToCamel,
    CamelToSnake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    HasPrefix,
    HasSuffix,
    AlwaysTrue,
}

/// Predicate gating whether a rule's actions apply to an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    /// Ignored for [`ConditionKind::AlwaysTrue`].
    #[serde(default)]
    pub value: String,
}

impl Condition {
    pub fn has_prefix(value: impl Into<String>) -> Result<Self, RuleError> {
        Self::new(ConditionKind::HasPrefix, value)
    }

    pub fn has_suffix(value: impl Into<String>) -> Result<Self, RuleError> {
        Self::new(ConditionKind::HasSuffix, value)
    }

    pub fn always_true() -> Self {
        Self {
            kind: ConditionKind::AlwaysTrue,
            value: String::new(),
        }
    }

    pub fn new(kind: ConditionKind, value: impl Into<String>) -> Result<Self, RuleError> {
        let condition = Self {
            kind,
            value: value.into(),
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        match self.kind {
            ConditionKind::HasPrefix | ConditionKind::HasSuffix if self.value.is_empty() => {
                Err(RuleError::EmptyConditionValue)
            }
            _ => Ok(()),
        }
    }

    /// Evaluate against the raw (unstripped) input. Case-sensitive.
    pub fn holds(&self, input: &str) -> bool {
        match self.kind {
            ConditionKind::HasPrefix => input.starts_with(self.value.as_str()),
            ConditionKind::HasSuffix => input.ends_with(self.value.as_str()),
            ConditionKind::AlwaysTrue => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConditionKind::HasPrefix => write!(f, "Begins with {}", self.value),
            ConditionKind::HasSuffix => write!(f, "Ends with {}", self.value),
            ConditionKind::AlwaysTrue => f.write_str("Always true"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AddPrefix,
    RemovePrefix,
    AddSuffix,
    RemoveSuffix,
}

/// An affix mutation applied when a rule matches. The value may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    #[serde(default)]
    pub value: String,
}

impl Action {
    pub fn new(kind: ActionKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn add_prefix(value: impl Into<String>) -> Self {
        Self::new(ActionKind::AddPrefix, value)
    }

    pub fn remove_prefix(value: impl Into<String>) -> Self {
        Self::new(ActionKind::RemovePrefix, value)
    }

    pub fn add_suffix(value: impl Into<String>) -> Self {
        Self::new(ActionKind::AddSuffix, value)
    }

    pub fn remove_suffix(value: impl Into<String>) -> Self {
        Self::new(ActionKind::RemoveSuffix, value)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ActionKind::AddPrefix => "Add Prefix",
            ActionKind::RemovePrefix => "Rem Prefix",
            ActionKind::AddSuffix => "Add Suffix",
            ActionKind::RemoveSuffix => "Rem Suffix",
        };
        write!(f, "{verb} {}", self.value)
    }
}

// ─── Rule ──────────────────────────────────────────────────────────────────

/// A conversion rule: when `condition` holds for an input converted in
/// `domain`'s direction, every action in `actions` is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Assigned by [`RuleStore::add_rule`] when left at [`UNASSIGNED_ID`].
    #[serde(default)]
    pub id: RuleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub domain: Domain,
    pub condition: Condition,
    pub actions: Vec<Action>,
}

fn enabled_by_default() -> bool {
    true
}

impl Rule {
    /// Build an enabled, unlabelled rule awaiting an id.
    pub fn new(domain: Domain, condition: Condition, actions: Vec<Action>) -> Result<Self, RuleError> {
        let rule = Self {
            id: UNASSIGNED_ID,
            label: None,
            enabled: true,
            domain,
            condition,
            actions,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        self.condition.validate()?;
        if self.actions.is_empty() {
            return Err(RuleError::NoActions);
        }
        Ok(())
    }

    /// "Add Prefix get, Rem Suffix _"
    pub fn describe_actions(&self) -> String {
        self.actions
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("Unlabelled")
    }
}

// ─── Rule Store ────────────────────────────────────────────────────────────

/// Insertion-ordered rule collection. Order is match priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule, assigning `max id + 1` when it has no id yet or its id
    /// is already taken. Returns the id the rule ends up with.
    pub fn add_rule(&mut self, mut rule: Rule) -> RuleId {
        if rule.id == UNASSIGNED_ID || self.get_rule(rule.id).is_some() {
            let assigned = self.next_id();
            if rule.id != UNASSIGNED_ID {
                tracing::warn!("Rule id {} already in use, reassigning to {}", rule.id, assigned);
            }
            rule.id = assigned;
        }
        let id = rule.id;
        self.rules.push(rule);
        id
    }

    pub fn remove_rule(&mut self, id: RuleId) -> bool {
        match self.rules.iter().position(|r| r.id == id) {
            Some(idx) => {
                self.rules.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn get_rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn get_rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn set_enabled(&mut self, id: RuleId, enabled: bool) -> Result<&Rule, RuleError> {
        let rule = self.get_rule_mut(id)?;
        rule.enabled = enabled;
        Ok(rule)
    }

    /// Empty labels clear the label.
    pub fn set_label(&mut self, id: RuleId, label: &str) -> Result<&Rule, RuleError> {
        let rule = self.get_rule_mut(id)?;
        rule.label = (!label.is_empty()).then(|| label.to_string());
        Ok(rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn get_rule_mut(&mut self, id: RuleId) -> Result<&mut Rule, RuleError> {
        self.rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RuleError::UnknownRule(id))
    }

    /// One past the highest id; once that would overflow, the lowest free id.
    fn next_id(&self) -> RuleId {
        let max = self.rules.iter().map(|r| r.id).max().unwrap_or(UNASSIGNED_ID);
        max.checked_add(1).unwrap_or_else(|| {
            (1..RuleId::MAX)
                .find(|&id| self.get_rule(id).is_none())
                .unwrap_or(UNASSIGNED_ID)
        })
    }
}

impl FromIterator<Rule> for RuleStore {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut store = Self::new();
        for rule in iter {
            store.add_rule(rule);
        }
        store
    }
}
