use std::future::Future;
use tracing::{debug, info, warn};
use validator::Validate;

use super::{OrderEntry, OrderedList, Orderable, RollbackPolicy};
use crate::error::CmsError;
use crate::types::Content;

/// Where an editor persists its changes: the admin HTTP API through
/// `AdminClient`, or the database directly through `ContentStorage`.
pub trait ContentSink<T: Content>: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<T>, CmsError>> + Send;

    /// Store the full `(id, order)` set of the list in one request.
    fn persist_order(
        &self,
        entries: &[OrderEntry],
    ) -> impl Future<Output = Result<(), CmsError>> + Send;

    fn create(&self, new: &T::New) -> impl Future<Output = Result<T, CmsError>> + Send;

    fn update(
        &self,
        id: i64,
        patch: &T::Patch,
    ) -> impl Future<Output = Result<T, CmsError>> + Send;

    fn delete(&self, id: i64) -> impl Future<Output = Result<(), CmsError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Nothing to do: boundary move, unknown id, or a declined delete.
    Unchanged,
}

/// Answer to the "really delete?" prompt; deletes require `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// State container for one sortable admin list.
///
/// Reorders and visibility toggles are applied to the local snapshot first
/// and then persisted; on failure the `RollbackPolicy` decides whether the
/// previous snapshot comes back. Creates, edits and deletes wait for the
/// sink and only then touch the snapshot.
pub struct CollectionEditor<T, S> {
    sink: S,
    list: OrderedList<T>,
    rollback: RollbackPolicy,
}

impl<T, S> CollectionEditor<T, S>
where
    T: Content,
    S: ContentSink<T>,
{
    pub fn new(sink: S, items: Vec<T>, rollback: RollbackPolicy) -> Self {
        Self {
            sink,
            list: OrderedList::from_unsorted(items),
            rollback,
        }
    }

    pub async fn load(sink: S, rollback: RollbackPolicy) -> Result<Self, CmsError> {
        let items = sink.fetch_all().await?;
        debug!(entity = T::ENTITY, count = items.len(), "editor loaded");
        Ok(Self::new(sink, items, rollback))
    }

    pub fn snapshot(&self) -> &OrderedList<T> {
        &self.list
    }

    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    pub fn rollback_policy(&self) -> RollbackPolicy {
        self.rollback
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn can_move_up(&self, id: i64) -> bool {
        self.list.can_move_up(id)
    }

    pub fn can_move_down(&self, id: i64) -> bool {
        self.list.can_move_down(id)
    }

    /// Replace the snapshot with what the sink currently holds.
    pub async fn refresh(&mut self) -> Result<(), CmsError> {
        let items = self.sink.fetch_all().await?;
        self.list = OrderedList::from_unsorted(items);
        Ok(())
    }

    pub async fn move_up(&mut self, id: i64) -> Result<Outcome, CmsError> {
        let next = self.list.move_up(id);
        self.commit_order(next).await
    }

    pub async fn move_down(&mut self, id: i64) -> Result<Outcome, CmsError> {
        let next = self.list.move_down(id);
        self.commit_order(next).await
    }

    pub async fn drag_reorder(&mut self, from_id: i64, to_id: i64) -> Result<Outcome, CmsError> {
        let next = self.list.drag_reorder(from_id, to_id);
        self.commit_order(next).await
    }

    pub async fn toggle_active(&mut self, id: i64) -> Result<Outcome, CmsError> {
        let Some(next) = self.list.toggle_active(id) else {
            return Ok(Outcome::Unchanged);
        };
        let active = next.get(id).is_some_and(Orderable::is_active);
        let previous = std::mem::replace(&mut self.list, next);

        match self.sink.update(id, &T::activation_patch(active)).await {
            Ok(_) => {
                info!(entity = T::ENTITY, id, active, "visibility updated");
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.recover(previous, "toggle", &e);
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, new: T::New) -> Result<T, CmsError> {
        new.validate()?;
        let created = self.sink.create(&new).await?;
        self.list = self.list.insert(created.clone());
        info!(entity = T::ENTITY, id = created.id(), "created");
        Ok(created)
    }

    pub async fn update(&mut self, id: i64, patch: T::Patch) -> Result<T, CmsError> {
        patch.validate()?;
        if self.list.get(id).is_none() {
            return Err(CmsError::not_found(T::ENTITY, id));
        }
        let updated = self.sink.update(id, &patch).await?;
        if let Some(next) = self.list.replace(updated.clone()) {
            self.list = next;
        }
        info!(entity = T::ENTITY, id, "updated");
        Ok(updated)
    }

    pub async fn delete(&mut self, id: i64, confirm: Confirmation) -> Result<Outcome, CmsError> {
        if confirm == Confirmation::Declined || self.list.get(id).is_none() {
            return Ok(Outcome::Unchanged);
        }
        self.sink.delete(id).await?;
        if let Some(next) = self.list.remove(id) {
            self.list = next;
        }
        info!(entity = T::ENTITY, id, "deleted");
        Ok(Outcome::Applied)
    }

    async fn commit_order(&mut self, next: Option<OrderedList<T>>) -> Result<Outcome, CmsError> {
        let Some(next) = next else {
            return Ok(Outcome::Unchanged);
        };
        let entries = next.order_entries();
        let previous = std::mem::replace(&mut self.list, next);

        match self.sink.persist_order(&entries).await {
            Ok(()) => {
                info!(entity = T::ENTITY, count = entries.len(), "order saved");
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.recover(previous, "reorder", &e);
                Err(e)
            }
        }
    }

    fn recover(&mut self, previous: OrderedList<T>, op: &str, err: &CmsError) {
        match self.rollback {
            RollbackPolicy::Revert => {
                self.list = previous;
                warn!(entity = T::ENTITY, op, error = %err, "persist failed; reverted local list");
            }
            RollbackPolicy::KeepOptimistic => {
                warn!(entity = T::ENTITY, op, error = %err, "persist failed; keeping local list");
            }
        }
    }
}
