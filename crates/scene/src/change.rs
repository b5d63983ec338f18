//! Change notification.
//!
//! Every mutation of a node produces one [`ChangeEvent`] on that node and one
//! on each of its descendants. The mutated node reports what it changed; the
//! descendants only learn that their world pose went stale
//! ([`ChangeFlags::FROM_PARENT`]).

use bitflags::bitflags;

use crate::TransformId;

bitflags! {
    /// What changed on a transform.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        /// Local position was written.
        const POSITION = 1 << 0;
        /// Local rotation was written.
        const ROTATION = 1 << 1;
        /// Local scale was written.
        const SCALE = 1 << 2;
        /// The world matrix is stale. Set on every event.
        const WORLD = 1 << 3;
        /// An ancestor changed, this node did not.
        const FROM_PARENT = 1 << 4;
        /// The parent link of this node changed.
        const HIERARCHY = 1 << 5;
    }
}

/// Payload delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    /// The node the event is delivered on.
    pub transform: TransformId,
    /// What changed.
    pub flags: ChangeFlags,
}

/// Handle returned by [`TransformTree::subscribe`](crate::TransformTree::subscribe).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ChangeEvent)>;

/// Ordered observer list of a single node.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Listeners {
    pub(crate) fn push(&mut self, id: u64, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(id);
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke every callback in subscription order.
    pub(crate) fn dispatch(&mut self, event: &ChangeEvent) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
