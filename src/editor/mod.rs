//! Ordered-collection editing shared by every sortable admin list.
//!
//! - `OrderedList<T>`: immutable snapshot; every edit returns a new list
//! - `collection.rs`: `CollectionEditor`, which applies edits optimistically
//!   and persists them through a `ContentSink`

pub mod collection;

use serde::{Deserialize, Serialize};

pub use collection::{CollectionEditor, Confirmation, ContentSink, Outcome};

/// An item with a stable id, a display position and a visibility flag.
pub trait Orderable {
    fn id(&self) -> i64;
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
}

/// One `(id, order)` pair of a persisted reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: i64,
    pub order: i64,
}

/// What the editor does with its local snapshot when persisting fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Restore the snapshot held before the failed operation.
    #[default]
    Revert,
    /// Keep the optimistic snapshot; only the error is reported.
    KeepOptimistic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedList<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Orderable + Clone> OrderedList<T> {
    /// Keep `items` in the given sequence; `order` fields are left untouched.
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Sequence `items` by `order`, ties broken by id, as the store lists them.
    pub fn from_unsorted(mut items: Vec<T>) -> Self {
        items.sort_by_key(|item| (item.order(), item.id()));
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.items.iter().map(Orderable::id).collect()
    }

    pub fn can_move_up(&self, id: i64) -> bool {
        matches!(self.position(id), Some(i) if i > 0)
    }

    pub fn can_move_down(&self, id: i64) -> bool {
        matches!(self.position(id), Some(i) if i + 1 < self.items.len())
    }

    /// Swap with the previous item. `None` at the top or for an unknown id.
    pub fn move_up(&self, id: i64) -> Option<Self> {
        let i = self.position(id)?;
        if i == 0 {
            return None;
        }
        let mut items = self.items.clone();
        items.swap(i, i - 1);
        Some(Self::renumbered(items))
    }

    /// Swap with the next item. `None` at the bottom or for an unknown id.
    pub fn move_down(&self, id: i64) -> Option<Self> {
        let i = self.position(id)?;
        if i + 1 >= self.items.len() {
            return None;
        }
        let mut items = self.items.clone();
        items.swap(i, i + 1);
        Some(Self::renumbered(items))
    }

    /// Take `from_id` out and reinsert it at the index `to_id` occupies.
    /// `None` when either id is unknown or both are the same item.
    pub fn drag_reorder(&self, from_id: i64, to_id: i64) -> Option<Self> {
        if from_id == to_id {
            return None;
        }
        let from = self.position(from_id)?;
        let to = self.position(to_id)?;
        let mut items = self.items.clone();
        let moved = items.remove(from);
        items.insert(to, moved);
        Some(Self::renumbered(items))
    }

    /// Flip the visibility of one item; nothing else changes.
    pub fn toggle_active(&self, id: i64) -> Option<Self> {
        let i = self.position(id)?;
        let mut items = self.items.clone();
        let active = items[i].is_active();
        items[i].set_active(!active);
        Some(Self { items })
    }

    /// Append a newly created item.
    pub fn insert(&self, item: T) -> Self {
        let mut items = self.items.clone();
        items.push(item);
        Self { items }
    }

    /// Swap in an edited item at its current position.
    pub fn replace(&self, item: T) -> Option<Self> {
        let i = self.position(item.id())?;
        let mut items = self.items.clone();
        items[i] = item;
        Some(Self { items })
    }

    /// Drop exactly the item with `id`. Remaining orders are not renumbered.
    pub fn remove(&self, id: i64) -> Option<Self> {
        let i = self.position(id)?;
        let mut items = self.items.clone();
        items.remove(i);
        Some(Self { items })
    }

    pub fn order_entries(&self) -> Vec<OrderEntry> {
        self.items
            .iter()
            .map(|item| OrderEntry {
                id: item.id(),
                order: item.order(),
            })
            .collect()
    }

    /// True when orders are exactly `0..len` in list position.
    pub fn is_dense(&self) -> bool {
        self.items
            .iter()
            .enumerate()
            .all(|(i, item)| item.order() == i as i64)
    }

    fn renumbered(mut items: Vec<T>) -> Self {
        for (i, item) in items.iter_mut().enumerate() {
            item.set_order(i as i64);
        }
        Self { items }
    }
}
