use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// A result carrying a payment schedule is written as one row per period;
/// anything else becomes two-column `field,value` rows with nested objects
/// flattened to dotted field names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.as_object().and_then(|m| m.get("result")).unwrap_or(value);

    match result {
        Value::Object(map) => match map.get("schedule") {
            Some(Value::Array(rows)) if !rows.is_empty() => write_rows(&mut wtr, rows),
            _ => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in field_rows(map) {
                    let _ = wtr.write_record([key, val]);
                }
            }
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([format_csv_value(result)]);
        }
    }

    let _ = wtr.flush();
}

fn field_rows(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    collect_fields("", map, &mut rows);
    rows
}

fn collect_fields(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => collect_fields(&name, inner, out),
            // Schedules only print in row form
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {}
            _ => out.push((name, format_csv_value(val))),
        }
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([format_csv_value(item)]);
        }
        return;
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_fields_flattened_and_schedule_skipped() {
        let result = json!({
            "fixed_payment": "1798.65",
            "baseline": {"interest_saved": "0"},
            "schedule": [{"period": 1}]
        });
        let rows = field_rows(result.as_object().unwrap());
        assert_eq!(
            rows,
            vec![
                ("baseline.interest_saved".to_string(), "0".to_string()),
                ("fixed_payment".to_string(), "1798.65".to_string()),
            ]
        );
    }
}
