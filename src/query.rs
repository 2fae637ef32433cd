use crate::graph::WorkIndex;
use crate::payload::{ACTIVITY_TYPE, Payload, RawItem};
use crate::record::{NormalizedRecord, map_item};

/// Whether a mapped activity should become a root row.
///
/// An activity with another activity among its immediate children is skipped:
/// the child activity surfaces as a root of its own, and nesting it here would
/// show it twice. Leaves and empty containers always qualify.
pub fn is_root_candidate(record: &NormalizedRecord) -> bool {
    match &record.children {
        None => true,
        Some(children) => children.iter().all(|child| child.kind != ACTIVITY_TYPE),
    }
}

/// Build the root rows for a batch of work packages, in batch order.
pub fn select_roots(items: &[RawItem]) -> Vec<NormalizedRecord> {
    let index = WorkIndex::from_items(items);
    let roots: Vec<NormalizedRecord> = items
        .iter()
        .filter(|item| item.is_activity())
        .map(|item| map_item(item, &index))
        .filter(is_root_candidate)
        .collect();
    tracing::debug!(
        items = items.len(),
        distinct = index.len(),
        roots = roots.len(),
        "selected root activities"
    );
    roots
}

/// Run the whole reshape over one fetched document
pub fn process_payload(payload: &Payload) -> Vec<NormalizedRecord> {
    select_roots(&payload.embedded.elements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ItemId, ItemLinks, Link};

    fn item(id: ItemId, kind: &str, children: Option<&[ItemId]>) -> RawItem {
        RawItem {
            id,
            subject: format!("wp {}", id),
            links: ItemLinks {
                project: Link::titled("/api/v3/projects/1", "Tracker"),
                status: Link::titled("/api/v3/statuses/1", "Open"),
                kind: Link::titled("/api/v3/types/1", kind),
                parent: None,
                children: children.map(|ids| {
                    ids.iter()
                        .map(|id| Link::to(format!("/api/v3/work_packages/{}", id)))
                        .collect()
                }),
            },
            date: Some("2024-04-01".to_string()),
            ..RawItem::default()
        }
    }

    fn ids(records: &[NormalizedRecord]) -> Vec<ItemId> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_only_activities_become_roots() {
        let batch = vec![
            item(1, "Activity", None),
            item(2, "Task", None),
            item(3, "Milestone", None),
            item(4, "Activity", None),
        ];
        assert_eq!(ids(&select_roots(&batch)), vec![1, 4]);
    }

    #[test]
    fn test_activity_with_activity_children_is_skipped() {
        let batch = vec![
            item(1, "Activity", Some(&[2, 3])),
            item(2, "Activity", None),
            item(3, "Activity", None),
        ];
        assert_eq!(ids(&select_roots(&batch)), vec![2, 3]);
    }

    #[test]
    fn test_any_activity_child_drops_parent() {
        let batch = vec![
            item(1, "Activity", Some(&[2, 3])),
            item(2, "Task", None),
            item(3, "Activity", None),
        ];
        assert_eq!(ids(&select_roots(&batch)), vec![3]);

        let batch = vec![
            item(1, "Activity", Some(&[2, 3])),
            item(2, "Task", None),
            item(3, "Task", None),
        ];
        let roots = select_roots(&batch);
        assert_eq!(ids(&roots), vec![1]);
        assert_eq!(roots[0].child_rows().len(), 2);
    }

    #[test]
    fn test_empty_children_still_root() {
        let batch = vec![item(1, "Activity", Some(&[]))];
        let roots = select_roots(&batch);
        assert_eq!(ids(&roots), vec![1]);
        assert_eq!(roots[0].children, Some(vec![]));
    }

    #[test]
    fn test_placeholder_child_does_not_block_root() {
        let batch = vec![item(1, "Activity", Some(&[42]))];
        let roots = select_roots(&batch);
        assert_eq!(ids(&roots), vec![1]);
        assert_eq!(roots[0].child_rows()[0], NormalizedRecord::default());
    }

    #[test]
    fn test_empty_batch() {
        assert!(select_roots(&[]).is_empty());
    }

    #[test]
    fn test_no_root_has_only_activity_children() {
        let batch = vec![
            item(1, "Activity", Some(&[2])),
            item(2, "Activity", Some(&[3, 4])),
            item(3, "Task", None),
            item(4, "Activity", None),
            item(5, "Activity", Some(&[3])),
        ];
        for root in select_roots(&batch) {
            let children = root.child_rows();
            if !children.is_empty() {
                assert!(children.iter().any(|c| c.kind != "Activity"));
            }
        }
    }
}
