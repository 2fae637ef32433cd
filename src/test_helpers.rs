use crate::payload::{Embedded, ItemId, ItemLinks, Link, Payload, RawItem};

/// Create a work package with the given id, type and status, dated `due`.
pub fn make_item(id: ItemId, kind: &str, status: &str, due: &str) -> RawItem {
    RawItem {
        id,
        subject: format!("Work package {}", id),
        links: ItemLinks {
            project: Link::titled("/api/v3/projects/1", "Tracker"),
            status: Link::titled("/api/v3/statuses/1", status),
            kind: Link::titled("/api/v3/types/1", kind),
            parent: Some(Link::default()),
            children: None,
        },
        start_date: Some(due.to_string()),
        due_date: Some(due.to_string()),
        ..RawItem::default()
    }
}

/// Declare `children` on `item`, linking each child back to it.
pub fn link_children(item: &mut RawItem, children: &mut [&mut RawItem]) {
    item.links.children = Some(
        children
            .iter()
            .map(|c| Link::to(work_package_href(c.id)))
            .collect(),
    );
    for child in children.iter_mut() {
        child.links.parent = Some(Link::to(work_package_href(item.id)));
    }
}

pub fn work_package_href(id: ItemId) -> String {
    format!("/api/v3/work_packages/{}", id)
}

pub fn make_payload(items: Vec<RawItem>) -> Payload {
    Payload {
        embedded: Embedded { elements: items },
    }
}

/// Serialize items into a document shaped like the API response.
pub fn payload_json(items: Vec<RawItem>) -> String {
    serde_json::to_string(&make_payload(items)).unwrap()
}
