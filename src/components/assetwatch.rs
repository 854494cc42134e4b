//! Load tracking shared by components that depend on a resource.
//!
//! On creation the watch checks the resource store. A loaded resource makes
//! it ready at once. Otherwise it subscribes to `resource-<kind>-<name>` and
//! registers the resource if nobody has yet. The bus callback only flips a
//! flag; the subscription itself is dropped by [`AssetWatch::settle`] on the
//! component's next update, or when the watch is dropped.

use std::cell::Cell;
use std::path::Path;
use std::rc::{Rc, Weak};

use log::debug;

use crate::context::Context;
use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::channels;
use crate::resources::filetype::AssetKind;

#[derive(Debug)]
pub struct AssetWatch {
    resource: String,
    kind: AssetKind,
    ready: Rc<Cell<bool>>,
    subscription: Option<(String, SubscriptionId)>,
    bus: Weak<EventBus>,
}

impl AssetWatch {
    pub fn new(ctx: &Context, kind: AssetKind, resource: &str, path: impl AsRef<Path>) -> Self {
        let ready = Rc::new(Cell::new(false));
        let mut subscription = None;

        if ctx.resources.is_loaded(resource) {
            ready.set(true);
        } else {
            let channel = channels::resource(kind, resource);
            let flag = Rc::clone(&ready);
            let id = ctx.bus.subscribe(channel.clone(), move |_, _| flag.set(true), None);
            subscription = Some((channel, id));

            if !ctx.resources.contains(resource) {
                debug!("'{}' not preloaded, loading it now", resource);
                ctx.resources.add_resource(resource, path);
            }
        }

        Self {
            resource: resource.to_string(),
            kind,
            ready,
            subscription,
            bus: Rc::downgrade(&ctx.bus),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn is_ready(&self) -> bool {
        self.ready.get()
    }

    /// Drop the load subscription once the resource arrived.
    pub fn settle(&mut self, bus: &EventBus) {
        if self.ready.get() {
            self.release(bus);
        }
    }

    /// Drop the load subscription regardless of state.
    pub fn release(&mut self, bus: &EventBus) {
        if let Some((channel, id)) = self.subscription.take() {
            bus.unsubscribe(&channel, id);
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for AssetWatch {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            self.release(&bus);
        }
    }
}
