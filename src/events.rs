//! In-process Event Bus
//!
//! Synchronous pub/sub channel replacing the source app's DOM custom
//! events. Handlers run on the publishing thread in registration order.
//! Publishing from inside a handler is allowed: each dispatch works on a
//! snapshot of the handler list.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::domain::Category;

/// Events exchanged between the category registry and its consumers.
#[derive(Debug, Clone)]
pub enum CategoryEvent {
    /// Broadcast by the registry after every mutation.
    Updated {
        categories: Vec<Category>,
        lookup: IndexMap<String, Category>,
    },
    /// Emitted by a consumer that needs the current category set,
    /// e.g. when it initializes before the registry has broadcast.
    Request,
}

type Handler = Rc<dyn Fn(&CategoryEvent)>;

/// Synchronous single-threaded event bus.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers are never unregistered; they live as
    /// long as the bus.
    pub fn subscribe(&self, handler: impl Fn(&CategoryEvent) + 'static) {
        self.handlers.borrow_mut().push(Rc::new(handler));
    }

    /// Run every handler against `event`, in registration order.
    pub fn publish(&self, event: &CategoryEvent) {
        // Snapshot so a handler may publish again without re-borrowing
        let snapshot: Vec<Handler> = self.handlers.borrow().clone();
        for handler in snapshot {
            handler(event);
        }
    }

    #[cfg(test)]
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.borrow().len())
            .finish()
    }
}
