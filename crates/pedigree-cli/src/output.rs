//! Output formatting utilities

use clap::ValueEnum;
use pedigree_core::{AncestorNode, Horse, HorseDetail, Owner};
use serde::{Deserialize, Serialize};

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: {} (expected table or json)", other)),
        }
    }
}

/// A record that renders as one table row
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for Horse {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "BORN", "SEX", "OWNER", "DESCRIPTION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.date_of_birth.to_string(),
            self.sex.to_string(),
            self.owner_id.map(|o| o.to_string()).unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}

impl TableRow for Owner {
    fn headers() -> &'static [&'static str] {
        &["ID", "FIRST NAME", "LAST NAME", "EMAIL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.email.clone().unwrap_or_default(),
        ]
    }
}

/// Render rows as a left-aligned, space-padded table
pub fn render_table<T: TableRow>(rows: &[T]) -> String {
    let headers = T::headers();
    let cells: Vec<Vec<String>> = rows.iter().map(T::cells).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers.iter().map(|h| h.to_string()), &widths);
    for row in cells {
        push_row(&mut out, row.into_iter(), &widths);
    }
    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Format a list in the requested format; the result ends with a newline
pub fn format_list<T: Serialize + TableRow>(
    rows: &[T],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)? + "\n"),
        OutputFormat::Table => Ok(render_table(rows)),
    }
}

/// Format a single value; `table` renders the human form
pub fn format_value<T: Serialize>(
    value: &T,
    format: OutputFormat,
    table: impl FnOnce(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)? + "\n"),
        OutputFormat::Table => Ok(table(value)),
    }
}

fn horse_label(
    id: impl std::fmt::Display,
    name: &str,
    born: impl std::fmt::Display,
    sex: impl std::fmt::Display,
) -> String {
    format!("{} (#{}, {}, born {})", name, id, sex, born)
}

pub fn render_detail(detail: &HorseDetail) -> String {
    let horse = &detail.horse;
    let mut out = horse_label(horse.id, &horse.name, horse.date_of_birth, horse.sex);
    out.push('\n');

    if let Some(description) = &horse.description {
        out.push_str(&format!("  Description: {}\n", description));
    }
    if let Some(owner) = &detail.owner {
        out.push_str(&format!("  Owner: {} (#{})\n", owner.full_name(), owner.id));
    }
    if detail.parents.is_empty() {
        out.push_str("  Parents: none\n");
    }
    for parent in &detail.parents {
        out.push_str(&format!(
            "  {}: {}\n",
            capitalize(&parent.role.to_string()),
            horse_label(
                parent.horse.id,
                &parent.horse.name,
                parent.horse.date_of_birth,
                parent.horse.sex
            )
        ));
    }
    out
}

/// Render an ancestor tree with box-drawing branches, mother first
pub fn render_tree(root: &AncestorNode) -> String {
    let mut out = horse_label(root.id, &root.name, root.date_of_birth, root.sex);
    out.push('\n');
    push_branches(&mut out, root, "");
    out
}

fn push_branches(out: &mut String, node: &AncestorNode, prefix: &str) {
    let branches: Vec<(&str, &AncestorNode)> = [("mother", &node.mother), ("father", &node.father)]
        .into_iter()
        .filter_map(|(role, slot)| slot.as_deref().map(|n| (role, n)))
        .collect();

    for (i, (role, child)) in branches.iter().enumerate() {
        let last = i + 1 == branches.len();
        let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
        out.push_str(&format!(
            "{}{}{}: {}\n",
            prefix,
            branch,
            role,
            horse_label(child.id, &child.name, child.date_of_birth, child.sex)
        ));
        push_branches(out, child, &format!("{}{}", prefix, indent));
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pedigree_core::{HorseId, Sex};

    fn node(id: i64, name: &str, sex: Sex) -> AncestorNode {
        AncestorNode {
            id: HorseId(id),
            name: name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            sex,
            mother: None,
            father: None,
            expanded: true,
        }
    }

    #[test]
    fn test_table_columns_align() {
        let horses = vec![
            Horse::new(
                HorseId(1),
                "Wendy",
                NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
                Sex::Female,
            ),
            Horse::new(
                HorseId(12),
                "Al",
                NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                Sex::Male,
            ),
        ];
        let table = render_table(&horses);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID  NAME "));
        assert!(lines[1].starts_with("1   Wendy  2019-04-01  FEMALE"));
        assert!(lines[2].starts_with("12  Al     2018-01-01  MALE"));
    }

    #[test]
    fn test_render_tree() {
        let mut root = node(3, "Foal", Sex::Male);
        let mut dam = node(1, "Dam", Sex::Female);
        dam.father = Some(Box::new(node(4, "Grandsire", Sex::Male)));
        root.mother = Some(Box::new(dam));
        root.father = Some(Box::new(node(2, "Sire", Sex::Male)));

        let rendered = render_tree(&root);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("├── mother: Dam (#1"));
        assert!(lines[2].starts_with("│   └── father: Grandsire (#4"));
        assert!(lines[3].starts_with("└── father: Sire (#2"));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
