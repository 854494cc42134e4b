//! Named performance metrics.
//!
//! Metrics are declared up front and then fed through the `performance`
//! channel with `{ "name": .., "value": .. }` payloads. Updates for names
//! that were never declared are ignored.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use log::info;
use serde_json::Value;

use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::channels;

/// Metric published by the scheduler: milliseconds since the previous frame.
pub const FRAME_TIME: &str = "frame_time";
/// Metric published by the scheduler: simulation ticks run in the last frame.
pub const TICKS: &str = "ticks";

#[derive(Debug, Default)]
pub struct Performance {
    metrics: RefCell<BTreeMap<String, Option<Value>>>,
}

impl Performance {
    /// Create the registry and subscribe it to the `performance` channel.
    pub fn new(bus: &EventBus) -> (Rc<Self>, SubscriptionId) {
        let performance = Rc::new(Self::default());
        let weak: Weak<Performance> = Rc::downgrade(&performance);
        let id = bus.subscribe(
            channels::PERFORMANCE,
            move |data, _| {
                if let (Some(performance), Some(data)) = (weak.upgrade(), data) {
                    performance.update_metric(data);
                }
            },
            None,
        );
        (performance, id)
    }

    /// Declare a metric. It has no value until the first update.
    pub fn add_metric(&self, name: &str) {
        self.metrics.borrow_mut().entry(name.to_string()).or_insert(None);
    }

    /// Apply a `{ name, value }` payload if `name` was declared.
    pub fn update_metric(&self, data: &Value) {
        let Some(name) = data.get("name").and_then(Value::as_str) else {
            return;
        };
        if let Some(slot) = self.metrics.borrow_mut().get_mut(name) {
            *slot = data.get("value").cloned();
        }
    }

    pub fn metric(&self, name: &str) -> Option<Value> {
        self.metrics.borrow().get(name).cloned().flatten()
    }

    /// Log every metric, one per line, sorted by name.
    pub fn display_metrics(&self) {
        for (name, value) in self.metrics.borrow().iter() {
            match value {
                Some(value) => info!("{:<16} {}", name, value),
                None => info!("{:<16} -", name),
            }
        }
    }
}
