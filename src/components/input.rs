//! Keybinding-driven input component.
//!
//! The keybinding file is a JSON object mapping action names to key codes:
//!
//! ```json
//! { "move_left": "KeyA", "move_right": "KeyD", "jump": "Space" }
//! ```
//!
//! The owner binds a handler per action name. Once the file is loaded, every
//! binding is matched to its handler; bindings without one are reported and
//! skipped. From then on each tick fires every matched action with the
//! pressed state of its key, and the entity runs the handlers against itself.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::assetwatch::AssetWatch;
use crate::context::Context;
use crate::entity::Entity;
use crate::error::MissingCallbackTarget;
use crate::resources::filetype::AssetKind;

/// Handler run for a bound action with the pressed state of its key.
pub type ActionHandler = Rc<dyn Fn(&mut Entity, bool)>;

/// Parsed keybinding file: action name to key code.
pub type Keybindings = BTreeMap<String, String>;

struct Binding {
    action: String,
    key: String,
    handler: ActionHandler,
}

pub struct InputComponent {
    watch: AssetWatch,
    handlers: FxHashMap<String, ActionHandler>,
    bindings: Vec<Binding>,
    matched: bool,
    fired: Vec<(ActionHandler, bool)>,
}

impl fmt::Debug for InputComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputComponent")
            .field("resource", &self.watch.resource())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("matched", &self.matched)
            .finish()
    }
}

impl InputComponent {
    /// Watch the keybinding resource `resource`, loading it from `path` if
    /// nobody registered it yet.
    pub fn new(ctx: &Context, resource: &str, path: impl AsRef<Path>) -> Self {
        Self {
            watch: AssetWatch::new(ctx, AssetKind::Json, resource, path),
            handlers: FxHashMap::default(),
            bindings: Vec::new(),
            matched: false,
            fired: Vec::new(),
        }
    }

    /// Bind `handler` to `action`. Must happen before the bindings are matched.
    pub fn bind<F>(mut self, action: &str, handler: F) -> Self
    where
        F: Fn(&mut Entity, bool) + 'static,
    {
        self.handlers.insert(action.to_string(), Rc::new(handler));
        self
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// Actions that were matched to a handler, with their key codes.
    pub fn bindings(&self) -> Vec<(&str, &str)> {
        self.bindings
            .iter()
            .map(|b| (b.action.as_str(), b.key.as_str()))
            .collect()
    }

    pub fn watch(&self) -> &AssetWatch {
        &self.watch
    }

    pub fn watch_mut(&mut self) -> &mut AssetWatch {
        &mut self.watch
    }

    pub fn update(&mut self, ctx: &Context) {
        self.watch.settle(&ctx.bus);
        if !self.watch.is_ready() {
            return;
        }
        if !self.matched {
            self.match_bindings(ctx);
        }
        for binding in &self.bindings {
            let pressed = ctx.input.is_pressed(&binding.key);
            self.fired.push((Rc::clone(&binding.handler), pressed));
        }
    }

    /// Actions fired since the last call, drained.
    pub fn take_fired(&mut self) -> Vec<(ActionHandler, bool)> {
        std::mem::take(&mut self.fired)
    }

    fn match_bindings(&mut self, ctx: &Context) {
        self.matched = true;
        let Ok(asset) = ctx.resources.request(self.watch.resource()) else {
            return;
        };
        let Some(json) = asset.as_json() else {
            warn!("'{}' is not a keybinding file", self.watch.resource());
            return;
        };
        let keybindings: Keybindings = match serde_json::from_value(json.clone()) {
            Ok(keybindings) => keybindings,
            Err(e) => {
                warn!("Invalid keybindings in '{}': {}", self.watch.resource(), e);
                return;
            }
        };

        for (action, key) in keybindings {
            match self.handlers.get(&action) {
                Some(handler) => {
                    debug!("Bound '{}' to {}", action, key);
                    self.bindings.push(Binding {
                        action,
                        key,
                        handler: Rc::clone(handler),
                    });
                }
                None => warn!("{}", MissingCallbackTarget { action }),
            }
        }
    }
}
