//! Output formatting utilities

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// One reported node
#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub name: String,
    pub kind: &'static str,
    pub category: String,
    pub active: bool,
    #[serde(skip)]
    pub depth: usize,
}

/// Format data as pretty JSON
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Render rows as aligned columns, indenting names by depth
pub fn format_table(rows: &[NodeRow]) -> String {
    let labels: Vec<String> = rows
        .iter()
        .map(|row| format!("{}{}", "  ".repeat(row.depth), row.name))
        .collect();
    let name_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
    let category_width = rows.iter().map(|r| r.category.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (row, label) in rows.iter().zip(&labels) {
        let line = format!(
            "{:<name_width$}  {:<category_width$}  {}{}",
            label,
            row.category,
            row.kind,
            if row.active { "" } else { " (inactive)" },
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Print rows in the requested format
pub fn print_rows(rows: &[NodeRow], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_json(&rows)),
        OutputFormat::Table => print!("{}", format_table(rows)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, depth: usize, active: bool) -> NodeRow {
        NodeRow {
            name: name.to_string(),
            kind: "component",
            category: "Var".to_string(),
            active,
            depth,
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("table"), OutputFormat::Table);
        assert_eq!(OutputFormat::from("other"), OutputFormat::Table);
    }

    #[test]
    fn test_format_table() {
        let table = format_table(&[row("b", 0, true), row("x", 1, false)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "b    Var  component");
        assert_eq!(lines[1], "  x  Var  component (inactive)");
    }

    #[test]
    fn test_format_json_skips_depth() {
        let json = format_json(&vec![row("x", 3, true)]);
        assert!(json.contains("\"name\": \"x\""));
        assert!(!json.contains("depth"));
    }
}
