//! Channel-based publish/subscribe bus.
//!
//! The [`EventBus`] is the only coupling point between the loosely related
//! parts of the engine: the resource store announces finished loads on it,
//! the scheduler listens for lifecycle actions on it, and components listen
//! for the assets they need.
//!
//! # Calling convention
//!
//! Every callback is invoked as `callback(data, owner)`. Both arguments are
//! optional: `data` is whatever the publisher passed, `owner` is the value
//! given to [`EventBus::subscribe`]. The signature never changes with the
//! presence of a payload.
//!
//! # Re-entrancy
//!
//! [`EventBus::publish`] snapshots the subscriber list of the channel before
//! invoking anything, so callbacks are free to subscribe, unsubscribe or
//! publish again. Changes made during a publish take effect for the next one.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::trace;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Optional value attached to a subscription and handed back on every call.
pub type Owner = Rc<dyn Any>;

/// Shared callback invoked as `callback(data, owner)`.
pub type Callback = Rc<dyn Fn(Option<&Value>, Option<&Owner>)>;

/// Opaque handle returned by [`EventBus::subscribe`], required for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    owner: Option<Owner>,
    callback: Callback,
}

/// Synchronous, in-process publish/subscribe registry.
///
/// Subscriptions on a channel are kept in registration order. All methods
/// take `&self`; the bus is meant to be shared through an `Rc`.
#[derive(Default)]
pub struct EventBus {
    channels: RefCell<FxHashMap<String, Vec<Subscription>>>,
    next_id: Cell<u64>,
    total_events: Cell<u64>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a subscription to `channel`.
    ///
    /// `owner` is passed back as the second callback argument on every
    /// publish; use `None` when the callback needs no context.
    pub fn subscribe<F>(
        &self,
        channel: impl Into<String>,
        callback: F,
        owner: Option<Owner>,
    ) -> SubscriptionId
    where
        F: Fn(Option<&Value>, Option<&Owner>) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let channel = channel.into();
        trace!("EventBus: {} subscribed to '{}'", id, channel);
        self.channels
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Subscription {
                id,
                owner,
                callback: Rc::new(callback),
            });
        id
    }

    /// Remove the subscription identified by `id` from `channel`.
    ///
    /// Returns `false` (and changes nothing) when no subscription on that
    /// channel carries the handle.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        let mut channels = self.channels.borrow_mut();
        let Some(subs) = channels.get_mut(channel) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|sub| sub.id != id);
        let removed = subs.len() != before;
        if subs.is_empty() {
            channels.remove(channel);
        }
        if removed {
            trace!("EventBus: {} unsubscribed from '{}'", id, channel);
        }
        removed
    }

    /// Publish `data` on `channel`.
    ///
    /// Increments the total event counter even when nobody listens, then
    /// calls every subscriber registered at the moment of the call, in
    /// registration order.
    pub fn publish(&self, channel: &str, data: Option<&Value>) {
        self.total_events.set(self.total_events.get() + 1);

        let snapshot: Vec<Subscription> = match self.channels.borrow().get(channel) {
            Some(subs) => subs.clone(),
            None => return,
        };

        trace!(
            "EventBus: publishing '{}' to {} subscriber(s)",
            channel,
            snapshot.len()
        );
        for sub in &snapshot {
            (sub.callback)(data, sub.owner.as_ref());
        }
    }

    /// Publish a bare string payload, the format used by action channels.
    pub fn publish_str(&self, channel: &str, data: &str) {
        self.publish(channel, Some(&Value::String(data.to_string())));
    }

    /// Total number of publishes over the lifetime of the bus.
    pub fn total_events(&self) -> u64 {
        self.total_events.get()
    }

    /// Number of subscriptions currently registered on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .borrow()
            .get(channel)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    /// Whether `id` is still registered on `channel`.
    pub fn is_subscribed(&self, channel: &str, id: SubscriptionId) -> bool {
        self.channels
            .borrow()
            .get(channel)
            .is_some_and(|subs| subs.iter().any(|sub| sub.id == id))
    }
}
