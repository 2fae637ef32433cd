use anyhow::Result;
use std::io::IsTerminal;
use std::path::Path;
use wptree::dates::format_date;
use wptree::record::NormalizedRecord;
use wptree::table::{Table, flatten_tree};

use super::{TableOptions, load_table, print_failure_banner};

pub fn run(dir: &Path, options: &TableOptions, json: bool, color: bool) -> Result<()> {
    let loaded = load_table(dir, options)?;
    print_failure_banner(&loaded.failures);
    let table = &loaded.table;

    if json {
        println!("{}", serde_json::to_string_pretty(table.rows())?);
        return Ok(());
    }

    if table.rows().is_empty() {
        println!("No activities found");
        return Ok(());
    }

    let use_color = color && std::io::stdout().is_terminal();
    print!("{}", render(table, use_color));

    let summary: Vec<String> = table
        .category_counts(&loaded.classifier)
        .into_iter()
        .map(|(category, count)| format!("{} {}", count, category.as_str()))
        .collect();
    println!("\n{} root activities ({})", table.rows().len(), summary.join(", "));

    Ok(())
}

/// Text rendering of a table: one block per area, children indented
fn render(table: &Table, use_color: bool) -> String {
    let mut out = String::new();
    for (project, roots) in table.groups() {
        out.push_str(&format!("== {} ==\n", display_project(project)));
        for root in roots {
            for flat in flatten_tree(root) {
                out.push_str(&render_row(flat.record, flat.depth, table.date_format(), use_color));
                out.push('\n');
            }
        }
    }
    out
}

fn display_project(project: &str) -> &str {
    if project.is_empty() { "(no area)" } else { project }
}

fn render_row(record: &NormalizedRecord, depth: usize, date_format: &str, use_color: bool) -> String {
    let marker = match &record.children {
        Some(children) if !children.is_empty() => "+",
        Some(_) => "o",
        None => "-",
    };
    let end = format_date(record.end_date, date_format);
    let line = format!(
        "{:>6}  {}{} {}  {}  [{}] {}",
        record.id,
        "  ".repeat(depth),
        marker,
        record.name,
        if end.is_empty() { "--/--/----" } else { end.as_str() },
        record.status,
        record.kind,
    );

    match record.row_color.as_deref().and_then(hex_to_rgb) {
        Some((r, g, b)) if use_color => {
            format!("\x1b[48;2;{};{};{}m\x1b[30m{}\x1b[0m", r, g, b, line)
        }
        _ => line,
    }
}

/// `#RRGGBB` to its components
fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: u64, project: &str) -> NormalizedRecord {
        NormalizedRecord {
            id,
            name: format!("Activity {}", id),
            project: project.to_string(),
            status: "Open".to_string(),
            kind: "Activity".to_string(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 5),
            ..NormalizedRecord::default()
        }
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#9DC184"), Some((0x9D, 0xC1, 0x84)));
        assert_eq!(hex_to_rgb("#D26e69"), Some((0xD2, 0x6E, 0x69)));
        assert_eq!(hex_to_rgb("9DC184"), None);
        assert_eq!(hex_to_rgb("#12345"), None);
        assert_eq!(hex_to_rgb("#GG0000"), None);
    }

    #[test]
    fn test_render_row_plain() {
        let line = render_row(&record(7, "Tracker"), 1, "%m/%d/%Y", false);
        assert_eq!(line, "     7    - Activity 7  03/05/2024  [Open] Activity");
    }

    #[test]
    fn test_render_row_markers() {
        let mut parent = record(1, "Tracker");
        parent.children = Some(vec![record(2, "Tracker")]);
        assert!(render_row(&parent, 0, "%m/%d/%Y", false).contains("+ Activity 1"));
        parent.children = Some(vec![]);
        assert!(render_row(&parent, 0, "%m/%d/%Y", false).contains("o Activity 1"));
    }

    #[test]
    fn test_render_row_colored() {
        let mut row = record(1, "Tracker");
        row.row_color = Some("#FADA76".to_string());
        let line = render_row(&row, 0, "%m/%d/%Y", true);
        assert!(line.starts_with("\x1b[48;2;250;218;118m"));
        assert!(line.ends_with("\x1b[0m"));

        let plain = render_row(&row, 0, "%m/%d/%Y", false);
        assert!(!plain.contains('\x1b'));
    }

    #[test]
    fn test_render_groups_by_area() {
        let mut parent = record(1, "Tracker");
        parent.children = Some(vec![record(2, "Tracker")]);
        let mut later = record(3, "");
        later.end_date = NaiveDate::from_ymd_opt(2024, 4, 1);
        let table = Table::new(vec![later, parent]);
        let text = render(&table, false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== Tracker ==");
        assert!(lines[1].contains("Activity 1"));
        assert!(lines[2].contains("  - Activity 2"));
        assert_eq!(lines[3], "== (no area) ==");
        assert!(lines[4].contains("Activity 3"));
    }
}
