use std::collections::HashMap;

use crate::payload::{ItemId, RawItem};

/// Flat lookup of every work package in a fetch batch, keyed by id.
///
/// Children are resolved through this index rather than nested storage, so an
/// item can be both a root and somebody's child.
#[derive(Debug, Clone, Default)]
pub struct WorkIndex {
    items: HashMap<ItemId, RawItem>,
}

impl WorkIndex {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Index a whole batch. A repeated id replaces the earlier item.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a RawItem>) -> Self {
        let mut index = Self::new();
        for item in items {
            if index.insert(item.clone()).is_some() {
                tracing::warn!(
                    id = item.id,
                    "duplicate work package id in batch (overwriting previous definition)"
                );
            }
        }
        index
    }

    /// Insert an item, returning the one it replaced
    pub fn insert(&mut self, item: RawItem) -> Option<RawItem> {
        self.items.insert(item.id, item)
    }

    pub fn get(&self, id: ItemId) -> Option<&RawItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
