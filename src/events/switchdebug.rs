//! Bus observer that switches debug diagnostics on and off.
//!
//! A boolean payload on the `debug` channel sets the flag; anything else
//! (including no payload) toggles it.

use std::rc::Rc;

use serde_json::Value;

use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::channels;
use crate::resources::debugmode::DebugMode;

/// Subscribe `debug` to the `debug` channel.
pub fn observe_debug_switch(bus: &EventBus, debug: Rc<DebugMode>) -> SubscriptionId {
    bus.subscribe(
        channels::DEBUG,
        move |data, _| match data {
            Some(Value::Bool(enabled)) => debug.set(*enabled),
            _ => {
                debug.toggle();
            }
        },
        None,
    )
}
