//! Namespaced publish/subscribe for physics signals
//!
//! Every simulation instance owns its own bus; there is no shared registry.
//! Listeners are additionally keyed by a namespace token so several scenes
//! (or a scene and its host) can share one bus without cross-talk.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kinds of signal a scene emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Body/body or body/container contact
    Collision,
    /// Body left an Arc through its gap
    Escape,
}

/// Per-instance token scoping bus registrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(pub u64);

/// A fired signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub kind: EventKind,
    pub namespace: Namespace,
    /// Frame counter at the moment the signal fired
    pub frame: u64,
}

/// Handle returned by `on`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&SimEvent) + Send>;

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<(EventKind, Namespace), Vec<(ListenerId, Listener)>>,
    /// Signals fired since the last `take_fired`
    fired: Vec<SimEvent>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_keys", &self.listeners.len())
            .field("fired", &self.fired)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `kind` within `namespace`
    pub fn on<F>(&mut self, kind: EventKind, namespace: Namespace, listener: F) -> ListenerId
    where
        F: FnMut(&SimEvent) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry((kind, namespace))
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe; returns false if the listener was not registered there
    pub fn off(&mut self, kind: EventKind, namespace: Namespace, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&(kind, namespace)) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&(kind, namespace));
        }
        removed
    }

    /// Fire a signal to the listeners of (kind, namespace) and record it
    pub fn emit(&mut self, kind: EventKind, namespace: Namespace, frame: u64) {
        let event = SimEvent {
            kind,
            namespace,
            frame,
        };
        if let Some(list) = self.listeners.get_mut(&(kind, namespace)) {
            for (_, listener) in list.iter_mut() {
                listener(&event);
            }
        }
        self.fired.push(event);
    }

    /// Remove every listener registered under `namespace`
    pub fn clear(&mut self, namespace: Namespace) {
        self.listeners.retain(|(_, ns), _| *ns != namespace);
        self.fired.retain(|e| e.namespace != namespace);
    }

    /// Number of listeners for (kind, namespace)
    pub fn listener_count(&self, kind: EventKind, namespace: Namespace) -> usize {
        self.listeners
            .get(&(kind, namespace))
            .map_or(0, |list| list.len())
    }

    /// Drain the signals fired since the previous call
    pub fn take_fired(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.fired)
    }
}
