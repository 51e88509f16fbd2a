//! Flat text encoding of a rule list.
//!
//! One bracketed record per rule, records concatenated without separators:
//!
//! ```text
//! [id,label,enabled,domain,cond_type,cond_value,act_type,act_value,...]
//! ```
//!
//! `enabled` is `0`/`1`. Domains, conditions and actions use the numeric
//! codes below. `\`, `,`, `[` and `]` inside labels and values are escaped
//! with a backslash.

use crate::engine::rules::{
    Action, ActionKind, Condition, ConditionKind, Domain, Rule, RuleId, RuleStore,
};
use crate::error::CodecError;

const FIXED_FIELDS: usize = 6;

fn domain_code(domain: Domain) -> i64 {
    match domain {
        Domain::SnakeToCamel => 1,
        Domain::CamelToSnake => 2,
    }
}

fn domain_from_code(code: i64) -> Result<Domain, CodecError> {
    match code {
        1 => Ok(Domain::SnakeToCamel),
        2 => Ok(Domain::CamelToSnake),
        code => Err(CodecError::UnknownCode { field: "domain", code }),
    }
}

fn condition_code(kind: ConditionKind) -> i64 {
    match kind {
        ConditionKind::HasPrefix => 1,
        ConditionKind::HasSuffix => 2,
        ConditionKind::AlwaysTrue => 3,
    }
}

fn condition_from_code(code: i64) -> Result<ConditionKind, CodecError> {
    match code {
        1 => Ok(ConditionKind::HasPrefix),
        2 => Ok(ConditionKind::HasSuffix),
        3 => Ok(ConditionKind::AlwaysTrue),
        code => Err(CodecError::UnknownCode { field: "cond_type", code }),
    }
}

fn action_code(kind: ActionKind) -> i64 {
    match kind {
        ActionKind::AddPrefix => 1,
        ActionKind::RemovePrefix => 2,
        ActionKind::AddSuffix => 3,
        ActionKind::RemoveSuffix => 4,
    }
}

fn action_from_code(code: i64) -> Result<ActionKind, CodecError> {
    match code {
        1 => Ok(ActionKind::AddPrefix),
        2 => Ok(ActionKind::RemovePrefix),
        3 => Ok(ActionKind::AddSuffix),
        4 => Ok(ActionKind::RemoveSuffix),
        code => Err(CodecError::UnknownCode { field: "act_type", code }),
    }
}

// ─── Encoding ──────────────────────────────────────────────────────────────

pub fn encode_rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    for rule in rules {
        encode_rule(rule, &mut out);
    }
    out
}

fn encode_rule(rule: &Rule, out: &mut String) {
    out.push('[');
    out.push_str(&rule.id.to_string());
    out.push(',');
    push_escaped(out, rule.label.as_deref().unwrap_or(""));
    out.push(',');
    out.push(if rule.enabled { '1' } else { '0' });
    out.push(',');
    out.push_str(&domain_code(rule.domain).to_string());
    out.push(',');
    out.push_str(&condition_code(rule.condition.kind).to_string());
    out.push(',');
    push_escaped(out, &rule.condition.value);
    for action in &rule.actions {
        out.push(',');
        out.push_str(&action_code(action.kind).to_string());
        out.push(',');
        push_escaped(out, &action.value);
    }
    out.push(']');
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        if matches!(c, '\\' | ',' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
}

// ─── Decoding ──────────────────────────────────────────────────────────────

/// Decode every valid record. Invalid records are logged and skipped.
pub fn decode_rules(text: &str) -> RuleStore {
    let mut store = RuleStore::new();
    for record in split_records(text) {
        match record.and_then(|fields| decode_record(&fields)) {
            Ok(rule) => {
                store.add_rule(rule);
            }
            Err(e) => tracing::warn!("Skipping invalid rule record: {e}"),
        }
    }
    store
}

/// Split the text into records of unescaped fields.
fn split_records(text: &str) -> Vec<Result<Vec<String>, CodecError>> {
    let mut records = Vec::new();
    let mut chars = text.char_indices();

    while let Some((start, c)) = chars.next() {
        if c != '[' {
            if !c.is_whitespace() {
                tracing::warn!("Ignoring stray character {:?} at byte {} between records", c, start);
            }
            continue;
        }

        let mut fields = Vec::new();
        let mut field = String::new();
        let mut closed = false;
        while let Some((_, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        field.push(escaped);
                    }
                }
                ',' => fields.push(std::mem::take(&mut field)),
                ']' => {
                    fields.push(std::mem::take(&mut field));
                    closed = true;
                    break;
                }
                c => field.push(c),
            }
        }

        records.push(if closed {
            Ok(fields)
        } else {
            Err(CodecError::Unterminated(start))
        });
    }

    records
}

fn decode_record(fields: &[String]) -> Result<Rule, CodecError> {
    if fields.len() < FIXED_FIELDS + 2 || fields.len() % 2 != 0 {
        return Err(CodecError::FieldCount(fields.len()));
    }

    let id: RuleId = parse_int(&fields[0], "id")?
        .try_into()
        .map_err(|_| CodecError::InvalidInteger {
            field: "id",
            value: fields[0].clone(),
        })?;
    let label = (!fields[1].is_empty()).then(|| fields[1].clone());
    let enabled = match parse_int(&fields[2], "enabled")? {
        0 => false,
        1 => true,
        code => return Err(CodecError::UnknownCode { field: "enabled", code }),
    };
    let domain = domain_from_code(parse_int(&fields[3], "domain")?)?;
    let condition = Condition::new(
        condition_from_code(parse_int(&fields[4], "cond_type")?)?,
        fields[5].clone(),
    )?;

    let actions = fields[FIXED_FIELDS..]
        .chunks(2)
        .map(|pair| {
            let kind = action_from_code(parse_int(&pair[0], "act_type")?)?;
            Ok(Action::new(kind, pair[1].clone()))
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    let rule = Rule {
        id,
        label,
        enabled,
        domain,
        condition,
        actions,
    };
    rule.validate()?;
    Ok(rule)
}

fn parse_int(value: &str, field: &'static str) -> Result<i64, CodecError> {
    value.trim().parse().map_err(|_| CodecError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> RuleStore {
        let mut store = RuleStore::new();
        store.add_rule(
            Rule::new(
                Domain::CamelToSnake,
                Condition::has_prefix("m").unwrap(),
                vec![Action::remove_prefix("m"), Action::add_suffix("_")],
            )
            .unwrap()
            .with_label("members"),
        );
        let id = store.add_rule(
            Rule::new(
                Domain::SnakeToCamel,
                Condition::always_true(),
                vec![Action::add_prefix("get")],
            )
            .unwrap(),
        );
        store.set_enabled(id, false).unwrap();
        store
    }

    #[test]
    fn test_encode_format() {
        let encoded = encode_rules(sample_rules().get_rules());
        assert_eq!(encoded, "[1,members,1,2,1,m,2,m,3,_][2,,0,1,3,,1,get]");
    }

    #[test]
    fn test_decode_restores_rule_list() {
        let original = sample_rules();
        let decoded = decode_rules(&encode_rules(original.get_rules()));
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_escaped_values_survive() {
        let mut store = RuleStore::new();
        store.add_rule(
            Rule::new(
                Domain::CamelToSnake,
                Condition::has_suffix("a,b]").unwrap(),
                vec![Action::add_prefix("[x\\y]")],
            )
            .unwrap()
            .with_label("odd, label"),
        );
        let encoded = encode_rules(store.get_rules());
        assert_eq!(decode_rules(&encoded), store);
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let text = "[1,ok,1,1,3,,1,get]\
                    [2,short,1,1,3,]\
                    [x,bad id,1,1,3,,1,get]\
                    [3,bad domain,1,9,3,,1,get]\
                    [4,odd,1,1,3,,1,get,2]\
                    [5,empty cond,1,1,1,,1,get]\
                    [6,ok too,0,2,2,Impl,4,Impl]";
        let store = decode_rules(text);
        let ids: Vec<_> = store.get_rules().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 6]);
    }

    #[test]
    fn test_field_count_errors() {
        let fields: Vec<String> = ["1", "", "1", "1", "3", ""].iter().map(|s| s.to_string()).collect();
        assert_eq!(decode_record(&fields), Err(CodecError::FieldCount(6)));
    }

    #[test]
    fn test_unterminated_record() {
        let records = split_records("[1,a,1,1,3,,1,get][2,b");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], Err(CodecError::Unterminated(18)));
        assert_eq!(decode_rules("[1,a,1,1,3,,1,get][2,b").len(), 1);
    }

    #[test]
    fn test_whitespace_between_records() {
        let store = decode_rules("[1,,1,1,3,,1,get]\n  [2,,1,2,3,,3,_]\n");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_decoded_max_id_leaves_room_for_new_rules() {
        let mut store = decode_rules("[4294967295,,1,1,3,,1,get]");
        let id = store.add_rule(
            Rule::new(Domain::SnakeToCamel, Condition::always_true(), vec![Action::add_prefix("set")])
                .unwrap(),
        );
        assert_eq!(id, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode_rules("").is_empty());
    }
}
