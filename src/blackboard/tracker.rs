//! The update tracker (§4.6): a per-subscriber, drained-on-read view of
//! which facts have changed since the subscriber last looked.

use ahash::AHashSet;

/// A single unit of change: either a zero-fact index or an (i,j) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKey {
    Zero(usize),
    Pair(usize, usize),
}

struct Subscriber {
    pending: AHashSet<UpdateKey>,
    bootstrapped: bool,
}

/// Broadcasts `UpdateKey`s to every registered subscriber. A subscriber's
/// first read bootstraps to the full set of keys ever broadcast, regardless
/// of when it subscribed; every read after that drains only what's arrived
/// since its previous read.
pub struct Tracker {
    all_keys: AHashSet<UpdateKey>,
    subscribers: Vec<Subscriber>,
}

impl Tracker {
    pub fn new() -> Self {
        Tracker { all_keys: AHashSet::default(), subscribers: Vec::new() }
    }

    /// Register a new subscriber, returning its handle.
    pub fn identify(&mut self) -> usize {
        self.subscribers.push(Subscriber { pending: AHashSet::default(), bootstrapped: false });
        self.subscribers.len() - 1
    }

    /// Whether `get_new_info(module)` would currently return anything.
    pub fn has_new_info(&self, module: usize) -> bool {
        let sub = &self.subscribers[module];
        if !sub.bootstrapped {
            !self.all_keys.is_empty()
        } else {
            !sub.pending.is_empty()
        }
    }

    /// Drain and return this subscriber's pending keys. The first call
    /// bootstraps to every key known so far instead of just what's arrived
    /// since `identify()`.
    pub fn get_new_info(&mut self, module: usize) -> AHashSet<UpdateKey> {
        let sub = &mut self.subscribers[module];
        if !sub.bootstrapped {
            sub.bootstrapped = true;
            sub.pending.clear();
            self.all_keys.clone()
        } else {
            std::mem::take(&mut sub.pending)
        }
    }

    /// Record that `key` changed, queuing it for every bootstrapped
    /// subscriber (a subscriber that hasn't bootstrapped yet will see it
    /// via the full-set bootstrap on its first read).
    pub fn update(&mut self, key: UpdateKey) {
        self.all_keys.insert(key);
        for sub in &mut self.subscribers {
            if sub.bootstrapped {
                sub.pending.insert(key);
            }
        }
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
