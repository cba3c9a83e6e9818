//! Ordered publish/subscribe.
//!
//! Components that announce lifecycle changes (the clock, the keyboard) own an
//! `Emitter`. Handlers are grouped by event kind and run synchronously, in the
//! order they were subscribed, at the point the component emits.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// a notification that can be routed by kind
pub trait Event {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

type Handler<E> = Box<dyn FnMut(&E)>;

/// returned by `subscribe`; pass to `unsubscribe` to detach the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Emitter<E: Event> {
    handlers: HashMap<E::Kind, Vec<(SubscriptionId, Handler<E>)>>,
    next_id: u64,
}

impl<E: Event> Emitter<E> {
    pub fn new() -> Self {
        Emitter {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn subscribe(
        &mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(i, _)| *i == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    pub fn emit(&mut self, event: &E) {
        if let Some(list) = self.handlers.get_mut(&event.kind()) {
            for (_, handler) in list.iter_mut() {
                handler(event);
            }
        }
    }
}

impl<E: Event> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<E::Kind, usize> =
            self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("Emitter").field("handlers", &counts).finish()
    }
}
