use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use super::{Action, Change, ViewModel};

pub type SubscriptionId = u64;
type ChangeHandler = Arc<dyn Fn(&Change) + Send + Sync>;
type ChangeHandlers = Arc<std::sync::Mutex<HashMap<SubscriptionId, ChangeHandler>>>;

/// Shared handle to the view-model. Every mutation goes through `dispatch`;
/// subscribers run after the write lock is released.
#[derive(Clone, Default)]
pub struct ViewModelStore {
    state: Arc<RwLock<ViewModel>>,
    handlers: ChangeHandlers,
    next_subscription_id: Arc<AtomicU64>,
}

impl ViewModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: Action) -> Change {
        let change = {
            let mut state = self.state.write().expect("view model lock poisoned");
            state.apply(action)
        };

        match &change {
            Change::Stale => tracing::debug!("dropped stale view model write"),
            change if change.is_change() => self.publish(change),
            _ => {}
        }
        change
    }

    pub fn read<R>(&self, f: impl FnOnce(&ViewModel) -> R) -> R {
        let state = self.state.read().expect("view model lock poisoned");
        f(&state)
    }

    pub fn snapshot(&self) -> ViewModel {
        self.read(ViewModel::clone)
    }

    pub fn epoch(&self) -> u64 {
        self.read(ViewModel::epoch)
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .expect("change handler mutex poisoned")
            .insert(id, Arc::new(handler));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.handlers
            .lock()
            .expect("change handler mutex poisoned")
            .remove(&id)
            .is_some()
    }

    fn publish(&self, change: &Change) {
        let handlers: Vec<ChangeHandler> = self
            .handlers
            .lock()
            .expect("change handler mutex poisoned")
            .values()
            .cloned()
            .collect();
        for handler in handlers {
            handler(change);
        }
    }
}
