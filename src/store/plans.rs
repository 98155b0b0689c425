use serde_json::Value;

use crate::core::sanitize::sanitize;
use crate::core::{Plan, Weekday};

/// Why a stored plan list was rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanListError {
    Syntax(String),
    NotAList,
}

/// Parse a JSON plan list, recovering per element.
pub fn parse_plan_list(json: &str, day: Weekday) -> Result<Vec<Plan>, PlanListError> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(json).map_err(|e| PlanListError::Syntax(e.to_string()))?;
    plans_from_value(&value, day)
}

/// Validate an already-parsed plan list. Non-object elements and plans whose
/// name sanitizes to nothing are dropped with a warning.
pub fn plans_from_value(value: &Value, day: Weekday) -> Result<Vec<Plan>, PlanListError> {
    let items = value.as_array().ok_or(PlanListError::NotAList)?;
    let mut plans = Vec::with_capacity(items.len());
    for item in items {
        let Some(obj) = item.as_object() else {
            log::warn!("Skipping non-object plan item for {}: {}", day, item);
            continue;
        };
        let name = sanitize(&field_as_string(obj.get("name")));
        let details = sanitize(&field_as_string(obj.get("details")));
        if name.is_empty() {
            log::warn!("Skipping plan item with empty name for {}: {}", day, item);
            continue;
        }
        plans.push(Plan { name, details });
    }
    Ok(plans)
}

/// Like `parse_plan_list`, but a rejected list becomes empty for this day only.
pub fn plan_list_or_empty(json: &str, day: Weekday) -> Vec<Plan> {
    match parse_plan_list(json, day) {
        Ok(plans) => plans,
        Err(e) => {
            log_rejected(&e, json, day);
            Vec::new()
        }
    }
}

pub(crate) fn log_rejected(err: &PlanListError, content: &str, day: Weekday) {
    let head: String = content.chars().take(200).collect();
    match err {
        PlanListError::Syntax(msg) => log::error!(
            "Error decoding plans JSON for {}: {}. Problematic JSON part (start): '{}'. Ignoring plans.",
            day,
            msg,
            head
        ),
        PlanListError::NotAList => log::warn!(
            "Invalid plans format (not a list) for {}. Content: '{}'. Ignoring plans.",
            day,
            head
        ),
    }
}

/// Stored values may be any JSON type; strings are taken as-is, null/missing as empty.
fn field_as_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_segment_is_empty_list() {
        assert_eq!(parse_plan_list("  ", Weekday::Monday), Ok(Vec::new()));
    }

    #[test]
    fn keeps_order_and_sanitizes() {
        let json = r#"[{"name": "Work", "details": "9-5 & overtime"}, {"name": "Gym", "details": ""}]"#;
        let plans = parse_plan_list(json, Weekday::Tues).unwrap();
        assert_eq!(
            plans,
            vec![Plan::new("Work", "9-5  overtime"), Plan::new("Gym", "")]
        );
    }

    #[test]
    fn drops_bad_elements_only() {
        let json = r#"[1, {"name": ";;", "details": "x"}, {"details": "no name"}, {"name": "Read"}]"#;
        let plans = parse_plan_list(json, Weekday::Wed).unwrap();
        assert_eq!(plans, vec![Plan::new("Read", "")]);
    }

    #[test]
    fn non_string_fields_are_stringified() {
        let plans = parse_plan_list(r#"[{"name": 42, "details": true}]"#, Weekday::Fri).unwrap();
        assert_eq!(plans, vec![Plan::new("42", "true")]);
    }

    #[test]
    fn rejects_non_list_and_bad_syntax() {
        assert_eq!(
            parse_plan_list(r#"{"name": "x"}"#, Weekday::Sat),
            Err(PlanListError::NotAList)
        );
        assert!(matches!(
            parse_plan_list("[{", Weekday::Sat),
            Err(PlanListError::Syntax(_))
        ));
        assert!(plan_list_or_empty("[{", Weekday::Sat).is_empty());
    }
}
