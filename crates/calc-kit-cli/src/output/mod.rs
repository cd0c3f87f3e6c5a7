pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
///
/// The table view prints warnings inline; the other formats keep stdout
/// machine-readable, so warnings go to the log on stderr instead.
pub fn format_output(format: &OutputFormat, value: &Value) {
    if !matches!(format, OutputFormat::Table) {
        log_warnings(value);
    }
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn log_warnings(value: &Value) {
    let Some(Value::Array(warnings)) = value.get("warnings") else {
        return;
    };
    for warning in warnings.iter().filter_map(Value::as_str) {
        log::warn!("{warning}");
    }
}
