//! Tree table over root records: columns, ordering, grouping, highlighting
//! and export.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::classify::{Classifier, RowCategory};
use crate::dates::{DISPLAY_FORMAT, format_date};
use crate::filter::RowFilter;
use crate::record::NormalizedRecord;

pub const ROW_COLOR_FIELD: &str = "rowColor";
pub const START_DATE_FIELD: &str = "startDate";
pub const DEPTH_FIELD: &str = "depth";
pub const PARENT_FIELD: &str = "parent";

/// Columns hidden on screen but written to exports
pub const EXPORT_ONLY_FIELDS: [&str; 2] = [ROW_COLOR_FIELD, START_DATE_FIELD];

/// A table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub field: &'static str,
    pub visible: bool,
}

impl Column {
    const fn new(title: &'static str, field: &'static str, visible: bool) -> Self {
        Self {
            title,
            field,
            visible,
        }
    }

    /// Cell value of this column for a row
    pub fn value(&self, record: &NormalizedRecord, date_format: &str) -> Value {
        match self.field {
            "id" => Value::from(record.id),
            "project" => Value::from(record.project.as_str()),
            "name" => Value::from(record.name.as_str()),
            "startDate" => Value::from(format_date(record.start_date, date_format)),
            "endDate" => Value::from(format_date(record.end_date, date_format)),
            "status" => Value::from(record.status.as_str()),
            "type" => Value::from(record.kind.as_str()),
            "progress" => record.progress.map(Value::from).unwrap_or(Value::Null),
            "rowColor" => Value::from(record.row_color.clone().unwrap_or_default()),
            _ => Value::Null,
        }
    }
}

pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("ID", "id", true),
        Column::new("Area", "project", true),
        Column::new("Description", "name", true),
        Column::new("Start Date", START_DATE_FIELD, false),
        Column::new("Finish Date", "endDate", true),
        Column::new("Status", "status", true),
        Column::new("Type", "type", true),
        Column::new("Progress", "progress", false),
        Column::new("Row Color", ROW_COLOR_FIELD, false),
    ]
}

/// A row flattened out of the tree, with its nesting depth
#[derive(Debug, Clone, Copy)]
pub struct FlatRow<'a> {
    pub depth: usize,
    pub record: &'a NormalizedRecord,
}

#[derive(Debug, Clone)]
pub struct Table {
    rows: Vec<NormalizedRecord>,
    columns: Vec<Column>,
    date_format: String,
}

impl Table {
    /// Build a table from root rows, ordered by finish date then area.
    /// Rows without a finish date go last. Children keep their source order.
    pub fn new(mut roots: Vec<NormalizedRecord>) -> Self {
        roots.sort_by(initial_order);
        Self {
            rows: roots,
            columns: default_columns(),
            date_format: DISPLAY_FORMAT.to_string(),
        }
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn rows(&self) -> &[NormalizedRecord] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn is_visible(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c.field == field && c.visible)
    }

    /// Returns false if there is no such column
    pub fn show_column(&mut self, field: &str) -> bool {
        self.set_visible(field, true)
    }

    pub fn hide_column(&mut self, field: &str) -> bool {
        self.set_visible(field, false)
    }

    fn set_visible(&mut self, field: &str, visible: bool) -> bool {
        match self.columns.iter_mut().find(|c| c.field == field) {
            Some(column) => {
                column.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Remove rows rejected by `filter`, at every depth
    pub fn apply_filter(&mut self, filter: &RowFilter) {
        let rows = std::mem::take(&mut self.rows);
        self.rows = filter.apply(rows);
    }

    /// Classify every row and store its color in `row_color`
    pub fn annotate(&mut self, classifier: &Classifier) {
        for row in &mut self.rows {
            annotate_tree(row, classifier);
        }
    }

    /// Depth-first rows, parents before their children
    pub fn flatten(&self) -> Vec<FlatRow<'_>> {
        let mut out = Vec::new();
        for row in &self.rows {
            flatten_into(row, 0, &mut out);
        }
        out
    }

    /// Root rows grouped by area, groups in order of first appearance
    pub fn groups(&self) -> Vec<(&str, Vec<&NormalizedRecord>)> {
        let mut groups: Vec<(&str, Vec<&NormalizedRecord>)> = Vec::new();
        for row in &self.rows {
            match groups.iter_mut().find(|(project, _)| *project == row.project) {
                Some((_, members)) => members.push(row),
                None => groups.push((row.project.as_str(), vec![row])),
            }
        }
        groups
    }

    /// Visible columns of every row as JSON objects keyed by field, in
    /// depth-first order. Each object also carries the row's `depth` and
    /// `parent` id so the tree can be rebuilt.
    pub fn export_rows(&self) -> Vec<Map<String, Value>> {
        self.flatten()
            .into_iter()
            .map(|flat| {
                let mut row: Map<String, Value> = self
                    .visible_columns()
                    .map(|c| (c.field.to_string(), c.value(flat.record, &self.date_format)))
                    .collect();
                row.insert(DEPTH_FIELD.to_string(), Value::from(flat.depth));
                row.insert(PARENT_FIELD.to_string(), Value::from(flat.record.parent));
                row
            })
            .collect()
    }

    /// Run an export with `fields` temporarily shown.
    ///
    /// The columns are hidden again afterwards, whether or not `export`
    /// succeeded. Columns that were already visible stay visible.
    pub fn export_with<T, E>(
        &mut self,
        fields: &[&str],
        export: impl FnOnce(&Table) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut shown = Vec::new();
        for field in fields {
            if !self.is_visible(field) && self.show_column(field) {
                shown.push(field.to_string());
            }
        }

        let result = export(&*self);

        for field in &shown {
            self.hide_column(field);
        }
        result
    }

    /// Count of rows per highlight category across the whole tree
    pub fn category_counts(&self, classifier: &Classifier) -> Vec<(RowCategory, usize)> {
        let mut counts = vec![
            (RowCategory::Closed, 0),
            (RowCategory::Overdue, 0),
            (RowCategory::Upcoming, 0),
            (RowCategory::Normal, 0),
        ];
        for flat in self.flatten() {
            let (category, _) = classifier.resolve(flat.record);
            if let Some(entry) = counts.iter_mut().find(|(c, _)| *c == category) {
                entry.1 += 1;
            }
        }
        counts
    }
}

fn initial_order(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    let by_end = match (a.end_date, b.end_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_end.then_with(|| a.project.cmp(&b.project))
}

fn annotate_tree(record: &mut NormalizedRecord, classifier: &Classifier) {
    let (_, color) = classifier.resolve(record);
    record.row_color = color;
    if let Some(children) = record.children.as_mut() {
        for child in children {
            annotate_tree(child, classifier);
        }
    }
}

/// Depth-first rows of a single subtree, `record` at depth 0
pub fn flatten_tree(record: &NormalizedRecord) -> Vec<FlatRow<'_>> {
    let mut out = Vec::new();
    flatten_into(record, 0, &mut out);
    out
}

fn flatten_into<'a>(record: &'a NormalizedRecord, depth: usize, out: &mut Vec<FlatRow<'a>>) {
    out.push(FlatRow { depth, record });
    for child in record.child_rows() {
        flatten_into(child, depth + 1, out);
    }
}
