//! Well-known channel names used on the [`EventBus`](super::bus::EventBus).

use crate::resources::filetype::AssetKind;

/// Lifecycle actions for the scheduler (`"start"`, `"stop"`, `"pause"`, `"resume"`).
pub const STATE: &str = "State";
/// Published by the scheduler on stop; the resource store clears itself.
pub const PURGE: &str = "purge";
/// Published once every registered resource is loaded.
pub const PRELOAD: &str = "preload";
/// Published by the display after a resize with `{ "width", "height" }`.
pub const DISPLAY: &str = "Display";
/// Metric updates as `{ "name", "value" }`.
pub const PERFORMANCE: &str = "performance";
/// Debug switch; a boolean payload sets the flag, no payload toggles it.
pub const DEBUG: &str = "debug";

/// Channel announcing that resource `name` of the given kind finished loading,
/// e.g. `resource-image-player`.
pub fn resource(kind: AssetKind, name: &str) -> String {
    format!("resource-{}-{}", kind.as_str(), name)
}
