//! # Sync Listener
//!
//! Incremental cache maintenance for change-event consumers.
//!
//! ## Why Not Re-query?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Without sync listeners:                                            │
//! │    every committed write → every dependent view re-runs its query   │
//! │                                                                     │
//! │  With sync listeners:                                               │
//! │    committed write → event → project changed rows → merge into      │
//! │    the view's already-loaded state (replace by id, append, drop)    │
//! │                                                                     │
//! │  e.g. patching a denormalized customer name embedded in already     │
//! │  loaded order rows when that customer is renamed elsewhere.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The merge functions are pure; [`SyncListener`] wires them to a
//! [`ModelChangedListener`] through a consumer-supplied [`SyncProjection`]
//! strategy.

use ledger_core::Model;

use crate::event::{ModelChangedListener, ModelEvent};

// =============================================================================
// Merge Functions
// =============================================================================

/// Appends the added models to the held list.
pub fn add_models<M: Clone>(current: &[M], added: &[M]) -> Vec<M> {
    let mut synced = current.to_vec();
    synced.extend_from_slice(added);
    synced
}

/// Replaces held models that share an id with an updated one. Models the
/// consumer never held are ignored; ids of `None` never match.
pub fn update_models<M: Model + Clone>(current: &[M], updated: &[M]) -> Vec<M> {
    let mut synced = current.to_vec();
    for new_model in updated {
        if let Some(slot) = synced.iter_mut().find(|old_model| {
            old_model.model_id().is_some() && old_model.model_id() == new_model.model_id()
        }) {
            *slot = new_model.clone();
        }
    }
    synced
}

/// Removes held models that share an id with a deleted one.
pub fn delete_models<M: Model + Clone>(current: &[M], deleted: &[M]) -> Vec<M> {
    let mut synced = current.to_vec();
    for dead_model in deleted {
        if dead_model.model_id().is_none() {
            continue;
        }
        synced.retain(|old_model| old_model.model_id() != dead_model.model_id());
    }
    synced
}

/// Replaces held models by id, appending those the consumer didn't hold yet.
pub fn upsert_models<M: Model + Clone>(current: &[M], upserted: &[M]) -> Vec<M> {
    let mut synced = current.to_vec();
    for new_model in upserted {
        let slot = synced.iter_mut().find(|old_model| {
            old_model.model_id().is_some() && old_model.model_id() == new_model.model_id()
        });
        match slot {
            Some(slot) => *slot = new_model.clone(),
            None => synced.push(new_model.clone()),
        }
    }
    synced
}

// =============================================================================
// Sync Projection Strategy
// =============================================================================

/// Consumer-supplied strategy for keeping a locally cached view in sync.
///
/// `View` is the consumer's own representation of a changed entity — often
/// the entity itself, sometimes a trimmed or denormalized row. Projection
/// must preserve the entity id so the merge functions can match rows.
pub trait SyncProjection<M: Model>: Send + Sync {
    type View: Model + Clone;

    /// Snapshot of the rows the consumer currently holds.
    fn current(&self) -> Vec<Self::View>;

    /// Projects one changed entity into the consumer's representation.
    fn project(&self, model: &M) -> Self::View;

    /// Merges the synced rows back into the consumer's state.
    ///
    /// `originals` are the raw changed entities from the event, available for
    /// consumers that need more than the projected rows (e.g. to decide
    /// whether a row falls within an active filter window).
    fn apply(&self, originals: &[M], synced: Vec<Self::View>);
}

/// Adapter turning a [`SyncProjection`] into a [`ModelChangedListener`].
///
/// Dispatches on the event kind, projects the changed entities, merges them
/// against the consumer's current rows, and hands the result back through
/// [`SyncProjection::apply`].
pub struct SyncListener<P> {
    projection: P,
}

impl<P> SyncListener<P> {
    pub fn new(projection: P) -> Self {
        SyncListener { projection }
    }
}

impl<M, P> ModelChangedListener<M> for SyncListener<P>
where
    M: Model + Send + Sync,
    P: SyncProjection<M>,
{
    fn on_model_changed(&self, event: &ModelEvent<M>) {
        let current = self.projection.current();
        let projected: Vec<P::View> = event
            .models()
            .iter()
            .map(|model| self.projection.project(model))
            .collect();

        let synced = match event {
            ModelEvent::Added(_) => add_models(&current, &projected),
            ModelEvent::Updated(_) => update_models(&current, &projected),
            ModelEvent::Deleted(_) => delete_models(&current, &projected),
            ModelEvent::Upserted(_) => upsert_models(&current, &projected),
        };
        self.projection.apply(event.models(), synced);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use ledger_core::{Customer, Model, Money};
    use rust_decimal::Decimal;

    use super::*;

    fn customer(id: i64, name: &str) -> Customer {
        Customer {
            id: Some(id),
            name: name.to_string(),
            balance: Money::zero(),
            debt: Decimal::ZERO,
        }
    }

    #[test]
    fn add_appends() {
        let held = vec![customer(1, "Amy")];
        let synced = add_models(&held, &[customer(2, "Ben")]);
        assert_eq!(synced.len(), 2);
        assert_eq!(synced[1].name, "Ben");
    }

    #[test]
    fn update_replaces_by_id_and_ignores_unknown() {
        let held = vec![customer(1, "Amy"), customer(2, "Ben")];
        let synced = update_models(&held, &[customer(2, "Benjamin"), customer(9, "Nobody")]);
        assert_eq!(synced.len(), 2);
        assert_eq!(synced[1].name, "Benjamin");
    }

    #[test]
    fn update_never_matches_unsaved_rows() {
        let mut unsaved = customer(1, "Draft");
        unsaved.id = None;
        let mut incoming = customer(2, "AlsoDraft");
        incoming.id = None;
        let synced = update_models(&[unsaved.clone()], &[incoming]);
        assert_eq!(synced[0].name, "Draft");
    }

    #[test]
    fn delete_removes_by_id() {
        let held = vec![customer(1, "Amy"), customer(2, "Ben")];
        let synced = delete_models(&held, &[customer(1, "Amy")]);
        assert_eq!(synced.len(), 1);
        assert_eq!(synced[0].name, "Ben");
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let held = vec![customer(1, "Amy")];
        let synced = upsert_models(&held, &[customer(1, "Amelia"), customer(2, "Ben")]);
        assert_eq!(synced.len(), 2);
        assert_eq!(synced[0].name, "Amelia");
        assert_eq!(synced[1].name, "Ben");
    }

    // A denormalized view row: just id + name, e.g. a picker list.
    #[derive(Debug, Clone, PartialEq)]
    struct NameRow {
        id: Option<i64>,
        name: String,
    }

    impl Model for NameRow {
        fn model_id(&self) -> Option<i64> {
            self.id
        }
    }

    struct NameList {
        rows: Arc<Mutex<Vec<NameRow>>>,
    }

    impl SyncProjection<Customer> for NameList {
        type View = NameRow;

        fn current(&self) -> Vec<NameRow> {
            self.rows.lock().unwrap().clone()
        }

        fn project(&self, model: &Customer) -> NameRow {
            NameRow {
                id: model.id,
                name: model.name.clone(),
            }
        }

        fn apply(&self, _originals: &[Customer], synced: Vec<NameRow>) {
            *self.rows.lock().unwrap() = synced;
        }
    }

    #[test]
    fn sync_listener_patches_projected_cache() {
        let rows = Arc::new(Mutex::new(vec![NameRow {
            id: Some(1),
            name: "Amy".to_string(),
        }]));
        let listener = SyncListener::new(NameList { rows: rows.clone() });

        listener.on_model_changed(&ModelEvent::Updated(vec![customer(1, "Amelia")]));
        listener.on_model_changed(&ModelEvent::Added(vec![customer(2, "Ben")]));
        listener.on_model_changed(&ModelEvent::Deleted(vec![customer(1, "Amelia")]));

        let held = rows.lock().unwrap().clone();
        assert_eq!(
            held,
            vec![NameRow {
                id: Some(2),
                name: "Ben".to_string()
            }]
        );
    }
}
