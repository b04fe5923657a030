//! Change notifications raised by the state stores.

use std::fmt;

use skein_core::QuestState;

/// A change to local game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// An item's count changed. Zero means the stack is gone.
    ItemCountChanged {
        /// Technical id.
        technical_id: String,
        /// New count.
        count: u32,
    },
    /// The inventory was emptied.
    InventoryCleared,
    /// A quest changed state, stage or objectives.
    QuestChanged {
        /// Quest name.
        name: String,
        /// State after the change.
        state: QuestState,
        /// Stage after the change.
        stage: u32,
    },
    /// A quest was removed from the log.
    QuestRemoved {
        /// Quest name.
        name: String,
    },
    /// A knowledge fact was learned or forgotten.
    KnowledgeChanged {
        /// Fact name.
        name: String,
        /// Whether the fact is now known.
        known: bool,
    },
    /// The game clock moved forward.
    ClockAdvanced {
        /// Total minutes elapsed.
        minutes: u64,
    },
    /// A flag was raised.
    FlagSet {
        /// Flag name.
        name: String,
    },
}

/// A callback invoked for every [`StateEvent`].
pub type Listener = Box<dyn FnMut(&StateEvent)>;

/// Subscribers to state changes, called in subscription order.
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    /// Add a subscriber.
    pub fn subscribe(&mut self, listener: impl FnMut(&StateEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Deliver an event to every subscriber.
    pub fn notify(&mut self, event: &StateEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn listeners_called_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();
        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            listeners.subscribe(move |_| seen.borrow_mut().push(tag));
        }
        listeners.notify(&StateEvent::InventoryCleared);
        assert_eq!(*seen.borrow(), vec!["a", "b"]);
        assert_eq!(listeners.len(), 2);
    }
}
