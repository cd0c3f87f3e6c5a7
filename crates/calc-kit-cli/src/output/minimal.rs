use serde_json::Value;

/// Headline field per calculator, in priority order.
const PRIORITY_KEYS: [&str; 10] = [
    "total_monthly_payment",
    "balloon_payment",
    "interest_saved",
    "fixed_payment",
    "full_kelly",
    "beta",
    "correlation",
    "prob_in_the_money",
    "bmi",
    "regular_payment",
];

/// Print just the headline value, followed by its interpretation label
/// when the result carries one.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", headline(result_obj));
}

fn headline(result: &Value) -> String {
    let Value::Object(map) = result else {
        return format_minimal(result);
    };

    let label = map.values().find_map(interpretation_label);

    for key in &PRIORITY_KEYS {
        if let Some(val) = map.get(*key).filter(|v| !v.is_null()) {
            return match label {
                Some(label) => format!("{} ({})", format_minimal(val), label),
                None => format_minimal(val),
            };
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => String::new(),
    }
}

/// An interpretation object is the only nested value with label and severity.
fn interpretation_label(value: &Value) -> Option<&str> {
    let obj = value.as_object()?;
    obj.get("severity")?;
    obj.get("label")?.as_str()
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
