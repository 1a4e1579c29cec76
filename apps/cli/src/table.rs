use serde::Serialize;
use serde_json::Value;

const MAX_CELL_CHARS: usize = 48;

/// Tab-separated rows: the record id, then each display column by server field name.
pub fn render_rows<R: Serialize>(columns: &[&str], rows: &[R]) -> serde_json::Result<String> {
    let mut out = String::from("ID");
    for column in columns {
        out.push('\t');
        out.push_str(column);
    }
    for row in rows {
        let value = serde_json::to_value(row)?;
        out.push('\n');
        out.push_str(&cell(value.get("ID")));
        for column in columns {
            out.push('\t');
            out.push_str(&cell(value.get(*column)));
        }
    }
    Ok(out)
}

fn cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "yes".into(),
        Some(Value::Bool(false)) => "no".into(),
        Some(Value::String(s)) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        Some(other) => other.to_string(),
    };
    if text.chars().count() > MAX_CELL_CHARS {
        let mut short: String = text.chars().take(MAX_CELL_CHARS - 3).collect();
        short.push_str("...");
        short
    } else {
        text
    }
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
