//! Normalized work-package records and the mapper that builds them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_iso_date;
use crate::graph::WorkIndex;
use crate::links::extract_id;
use crate::payload::{CLOSED_STATUS, ItemId, RawItem};

/// One table row, possibly carrying nested child rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub id: ItemId,
    pub name: String,
    pub project: String,
    /// Parent id, 0 when the record has none
    pub parent: ItemId,
    /// `None` marks a leaf; `Some(vec![])` is a container that happens to be empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NormalizedRecord>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_color: Option<String>,
}

impl NormalizedRecord {
    /// Immediate children, empty for leaves
    pub fn child_rows(&self) -> &[NormalizedRecord] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn is_closed(&self) -> bool {
        self.status == CLOSED_STATUS
    }

    pub fn has_closed_child(&self) -> bool {
        self.child_rows().iter().any(NormalizedRecord::is_closed)
    }

    /// True if `pred` holds for any record strictly below this one
    pub fn any_descendant(&self, pred: &dyn Fn(&NormalizedRecord) -> bool) -> bool {
        self.child_rows()
            .iter()
            .any(|child| pred(child) || child.any_descendant(pred))
    }

    /// Number of records in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self
            .child_rows()
            .iter()
            .map(NormalizedRecord::subtree_len)
            .sum::<usize>()
    }
}

/// Map a raw work package into a record, resolving its declared children
/// through `index` recursively.
///
/// Dangling child references become placeholder records
/// (`NormalizedRecord::default()`). A child that refers back to one of its own
/// ancestors is cut off the same way.
pub fn map_item(raw: &RawItem, index: &WorkIndex) -> NormalizedRecord {
    let mut ancestors = Vec::new();
    map_nested(raw, index, &mut ancestors)
}

fn map_nested(raw: &RawItem, index: &WorkIndex, ancestors: &mut Vec<ItemId>) -> NormalizedRecord {
    ancestors.push(raw.id);
    let children = raw.links.children.as_ref().map(|links| {
        links
            .iter()
            .map(|link| {
                let child_id = extract_id(Some(link));
                resolve_child(child_id, index, ancestors)
            })
            .collect()
    });
    ancestors.pop();

    NormalizedRecord {
        id: raw.id,
        name: raw.subject.clone(),
        project: raw.links.project.label(),
        parent: parent_id(raw, index),
        children,
        start_date: mapped_date(raw.id, "start", raw.start_text()),
        end_date: mapped_date(raw.id, "end", raw.end_text()),
        progress: raw.percentage_done,
        status: raw.links.status.label(),
        kind: raw.links.kind.label(),
        row_color: None,
    }
}

fn resolve_child(child_id: ItemId, index: &WorkIndex, ancestors: &mut Vec<ItemId>) -> NormalizedRecord {
    if ancestors.contains(&child_id) {
        tracing::warn!(
            id = child_id,
            "work package is its own ancestor; substituting an empty record"
        );
        return NormalizedRecord::default();
    }
    match index.get(child_id) {
        Some(child) => map_nested(child, index, ancestors),
        None => {
            tracing::debug!(id = child_id, "unresolved child reference");
            NormalizedRecord::default()
        }
    }
}

fn parent_id(raw: &RawItem, index: &WorkIndex) -> ItemId {
    let id = extract_id(raw.links.parent.as_ref());
    if id != 0 && !index.contains(id) {
        tracing::debug!(
            id = raw.id,
            parent = id,
            "parent is not part of this batch; treating item as parentless"
        );
        return 0;
    }
    id
}

fn mapped_date(id: ItemId, which: &str, text: Option<&str>) -> Option<NaiveDate> {
    let text = text?;
    let parsed = parse_iso_date(text);
    if parsed.is_none() {
        tracing::debug!(id, which, value = text, "unparseable date");
    }
    parsed
}
