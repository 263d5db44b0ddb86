//! Extraction of criterion verdicts from free-form judge output.

use crate::errors::JudgeParseError;
use crate::model::{JudgeCriterionVerdict, Verdict};
use serde_json::Value;

/// Parses a judge reply into criterion verdicts.
///
/// Accepts a JSON array of criterion objects anywhere in the text (prose and
/// code fences around it are ignored), or a single criterion object.
pub fn parse_judge_response(raw: &str) -> Result<Vec<JudgeCriterionVerdict>, JudgeParseError> {
    let entries = match array_of_objects(raw) {
        Some(items) => items,
        None => match criterion_object(raw) {
            Some(obj) => vec![obj],
            None if any_value(raw, '[') || any_value(raw, '{') => {
                return Err(JudgeParseError::NoCriteria)
            }
            None => return Err(JudgeParseError::NotJson),
        },
    };

    let verdicts: Vec<_> = entries.iter().filter_map(criterion_verdict).collect();
    if verdicts.is_empty() {
        return Err(JudgeParseError::NoCriteria);
    }
    Ok(verdicts)
}

fn criterion_verdict(v: &Value) -> Option<JudgeCriterionVerdict> {
    let obj = v.as_object()?;
    let text = |key: &str| obj.get(key).and_then(Value::as_str);
    Some(JudgeCriterionVerdict {
        criterion: text("criterion").unwrap_or("unknown").to_string(),
        verdict: Verdict::from_literal(text("verdict").unwrap_or_default()),
        evidence: text("evidence").unwrap_or_default().to_string(),
        reasoning: text("reasoning").unwrap_or_default().to_string(),
    })
}

/// Every JSON value that starts at an occurrence of `open` in `text`.
fn values_starting_with(text: &str, open: char) -> impl Iterator<Item = Value> + '_ {
    text.match_indices(open).filter_map(|(i, _)| {
        serde_json::Deserializer::from_str(&text[i..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
    })
}

/// The first array holding at least one object.
fn array_of_objects(text: &str) -> Option<Vec<Value>> {
    values_starting_with(text, '[').find_map(|v| match v {
        Value::Array(items) if items.iter().any(Value::is_object) => Some(items),
        _ => None,
    })
}

/// The first object carrying a `criterion` field.
fn criterion_object(text: &str) -> Option<Value> {
    values_starting_with(text, '{').find(|v| v.get("criterion").is_some())
}

fn any_value(text: &str, open: char) -> bool {
    values_starting_with(text, open).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY: &str = r#"[
        {"criterion": "uses_async_params", "verdict": "PASS", "evidence": "await params", "reasoning": "ok"},
        {"criterion": "no_legacy_router", "verdict": "FAIL", "evidence": "next/router", "reasoning": "pages API"}
    ]"#;

    #[test]
    fn array_in_prose_equals_bare_array() {
        let wrapped = format!("Here is my assessment:\n```json\n{}\n```\nHope this helps [1].", ARRAY);
        assert_eq!(
            parse_judge_response(&wrapped).unwrap(),
            parse_judge_response(ARRAY).unwrap()
        );
        assert_eq!(parse_judge_response(ARRAY).unwrap().len(), 2);
    }

    #[test]
    fn prose_bracket_before_array_is_skipped() {
        let text = format!("Checked [2] criteria: {}", ARRAY);
        let v = parse_judge_response(&text).unwrap();
        assert_eq!(v[0].criterion, "uses_async_params");
    }

    #[test]
    fn object_free_bracket_does_not_hide_a_single_object() {
        let v = parse_judge_response(r#"Scored [1] item: {"criterion": "a", "verdict": "PASS"}"#)
            .unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].criterion, "a");
        assert_eq!(v[0].verdict, Verdict::Pass);
    }

    #[test]
    fn single_object_becomes_one_element() {
        let v = parse_judge_response(r#"{"criterion": "a", "verdict": "PASS"}"#).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].verdict, Verdict::Pass);
        assert_eq!(v[0].evidence, "");
    }

    #[test]
    fn unknown_verdicts_and_missing_fields_default() {
        let v = parse_judge_response(r#"[{"verdict": "MAYBE"}, {"criterion": "b", "verdict": "pass"}, 3]"#)
            .unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].criterion, "unknown");
        assert_eq!(v[0].verdict, Verdict::Fail);
        assert_eq!(v[0].reasoning, "");
        assert_eq!(v[1].verdict, Verdict::Fail);
    }

    #[test]
    fn distinguishes_not_json_from_no_criteria() {
        assert_eq!(
            parse_judge_response("I cannot evaluate this."),
            Err(JudgeParseError::NotJson)
        );
        assert_eq!(parse_judge_response("[]"), Err(JudgeParseError::NoCriteria));
        assert_eq!(
            parse_judge_response(r#"{"score": 3}"#),
            Err(JudgeParseError::NoCriteria)
        );
        assert_eq!(parse_judge_response("[1, 2]"), Err(JudgeParseError::NoCriteria));
    }
}
