use colored::{Color, Colorize};
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table, nested objects are
/// flattened with dotted keys, and schedules print as their own table.
/// Interpretations are listed below with their severity colour.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(res_map) = result else {
        print_flat_object(envelope);
        return;
    };

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut interpretations: Vec<(&str, &Map<String, Value>)> = Vec::new();
    let mut tables: Vec<(&str, &[Value])> = Vec::new();

    for (key, val) in res_map {
        match val {
            Value::Object(obj) if is_interpretation(obj) => {
                interpretations.push((key.as_str(), obj))
            }
            Value::Object(obj) => flatten(key, obj, &mut fields),
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                tables.push((key.as_str(), arr.as_slice()))
            }
            _ => fields.push((key.clone(), format_value(val))),
        }
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.as_str(), val.as_str()]);
    }
    println!("{}", Table::from(builder));

    for (key, obj) in interpretations {
        let label = obj.get("label").and_then(Value::as_str).unwrap_or_default();
        let color = obj.get("color").and_then(Value::as_str).unwrap_or_default();
        let guidance = obj.get("guidance").and_then(Value::as_str).unwrap_or_default();
        println!("\n{}: {}", key, label.color(severity_color(color)).bold());
        if !guidance.is_empty() {
            println!("  {}", guidance);
        }
    }

    for (key, rows) in tables {
        println!("\n{}:", key);
        print_array_table(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_interpretation(obj: &Map<String, Value>) -> bool {
    obj.contains_key("label") && obj.contains_key("severity")
}

fn flatten(prefix: &str, obj: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in obj {
        let name = format!("{prefix}.{key}");
        match val {
            Value::Object(inner) => flatten(&name, inner, out),
            _ => out.push((name, format_value(val))),
        }
    }
}

fn severity_color(name: &str) -> Color {
    match name {
        "green" => Color::Green,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "orange" => Color::TrueColor { r: 255, g: 165, b: 0 },
        "red" => Color::Red,
        _ => Color::White,
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
