//! Raw work-package payload as served by the project API.
//!
//! The API speaks a HAL-flavoured JSON dialect: the collection lives under
//! `_embedded.elements` and every relation is a `{href, title}` object under
//! `_links`. These types mirror that shape closely; reshaping happens in
//! [`crate::record`].

use serde::{Deserialize, Serialize};

/// Numeric work-package identifier. `0` is reserved for "none".
pub type ItemId = u64;

/// Type label that marks a work package as a root-level activity
pub const ACTIVITY_TYPE: &str = "Activity";

/// Status label of a finished work package
pub const CLOSED_STATUS: &str = "Closed";

/// A fetched document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "_embedded")]
    pub embedded: Embedded,
}

/// The embedded collection container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Embedded {
    pub elements: Vec<RawItem>,
}

/// A relational link (`{"href": "/api/v3/projects/7", "title": "Tracker"}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Link {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn to(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            title: None,
        }
    }

    pub fn titled(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            title: Some(title.into()),
        }
    }

    /// Title text, or an empty label if the server sent none
    pub fn label(&self) -> String {
        self.title.clone().unwrap_or_default()
    }
}

/// Relations of a work package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ItemLinks {
    pub project: Link,
    pub status: Link,
    #[serde(rename = "type")]
    pub kind: Link,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Link>,
    /// `None` when the item declares no children relation at all, which is
    /// different from declaring an empty one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Link>>,
}

/// A work package as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(rename = "_links")]
    pub links: ItemLinks,
    /// Single-day items (milestones) carry only this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(rename = "percentageDone", default, skip_serializing_if = "Option::is_none")]
    pub percentage_done: Option<f64>,
}

/// Treat an explicit `null` like a missing string
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawItem {
    pub fn type_label(&self) -> Option<&str> {
        self.links.kind.title.as_deref()
    }

    pub fn is_activity(&self) -> bool {
        self.type_label() == Some(ACTIVITY_TYPE)
    }

    /// Start of the scheduled span: `startDate`, else the single `date`
    pub fn start_text(&self) -> Option<&str> {
        self.start_date.as_deref().or(self.date.as_deref())
    }

    /// End of the scheduled span: `dueDate`, else the single `date`
    pub fn end_text(&self) -> Option<&str> {
        self.due_date.as_deref().or(self.date.as_deref())
    }
}
