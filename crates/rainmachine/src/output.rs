//! Output formatting: table, JSON, YAML, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one
//! identifier per line.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Whether to emit ANSI color for this run.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// `yes`/`no` cell, green when set.
pub fn flag(value: bool, color: bool) -> String {
    match (value, color) {
        (true, true) => "yes".green().to_string(),
        (true, false) => "yes".into(),
        (false, true) => "no".dimmed().to_string(),
        (false, false) => "no".into(),
    }
}

/// Highlight a "currently watering" cell.
pub fn running(value: bool, color: bool) -> String {
    match (value, color) {
        (true, true) => "running".cyan().bold().to_string(),
        (true, false) => "running".into(),
        (false, _) => String::new(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list in the chosen format. Tables go through `to_row`, plain
/// output through `id_fn`.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render one item. Table mode uses `detail_fn` for a key/value view.
pub fn render_single<T: Serialize>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Render an untyped payload. Table and plain fall back to pretty JSON.
pub fn render_value(format: &OutputFormat, data: &serde_json::Value) -> Result<String, CliError> {
    match format {
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Table | OutputFormat::Json | OutputFormat::Plain => render_json(data, false),
    }
}

/// Aligned `key: value` lines for detail views.
pub fn detail(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in pairs {
        let _ = writeln!(out, "{key:>width$}  {value}");
    }
    out.trim_end().to_owned()
}

/// Print to stdout unless quiet or empty.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line for mutating commands, on stderr.
pub fn print_done(message: &str, quiet: bool, color: bool) {
    if quiet {
        return;
    }
    if color {
        eprintln!("{} {message}", "✓".green());
    } else {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        uid: u32,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "ID")]
        uid: u32,
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let items = [Item { uid: 1, name: "a" }, Item { uid: 2, name: "b" }];
        let out = render_list(
            &OutputFormat::Plain,
            &items,
            |i| Row { uid: i.uid },
            |i| i.uid.to_string(),
        )
        .unwrap();
        assert_eq!(out, "1\n2");

        let json = render_list(&OutputFormat::JsonCompact, &items, |i| Row { uid: i.uid }, |_| String::new())
            .unwrap();
        assert_eq!(json, r#"[{"uid":1,"name":"a"},{"uid":2,"name":"b"}]"#);
    }

    #[test]
    fn detail_aligns_keys() {
        let out = detail(&[("MAC", "aa".into()), ("Software", "4.0".into())]);
        assert_eq!(out, "     MAC  aa\nSoftware  4.0");
    }

    #[test]
    fn untyped_payload_in_table_mode_is_json() {
        let out = render_value(&OutputFormat::Table, &json!({ "a": 1 })).unwrap();
        assert!(out.contains("\"a\": 1"));
    }

    #[test]
    fn flags_without_color_are_plain_words() {
        assert_eq!(flag(true, false), "yes");
        assert_eq!(running(false, true), "");
    }
}
