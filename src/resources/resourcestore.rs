//! Asynchronous asset registry and load-completion barrier.
//!
//! [`ResourceStore::add_resource`] registers a named asset and hands the
//! actual I/O to the loader thread. Finished loads come back over a channel
//! and are applied by [`ResourceStore::poll`], which the scheduler calls at
//! the start of every frame. Applying a load publishes
//! `resource-<kind>-<name>` on the bus so interested components can flip
//! their ready flags.
//!
//! The store also listens on the `purge` channel and empties itself when the
//! scheduler stops.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde_json::json;

use crate::error::{LoadError, ResourceError};
use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::channels;
use crate::resources::filetype::{AssetKind, file_type};
use crate::resources::loader::{Asset, LoaderBridge, LoaderMessage};

/// One registered asset.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub path: PathBuf,
    /// `None` when the file type has no loader; such entries never load.
    pub kind: Option<AssetKind>,
    pub payload: Option<Rc<Asset>>,
    pub is_loaded: bool,
    ticket: u64,
}

#[derive(Default)]
struct StoreInner {
    entries: FxHashMap<String, ResourceEntry>,
    total: u64,
    next_ticket: u64,
    preload_waiters: Vec<SubscriptionId>,
}

/// Registry of named assets loaded in the background.
pub struct ResourceStore {
    bus: Rc<EventBus>,
    inner: RefCell<StoreInner>,
    loader: LoaderBridge,
    purge_subscription: Cell<Option<SubscriptionId>>,
}

impl ResourceStore {
    /// Create the store, spawn its loader thread and subscribe to `purge`.
    pub fn new(bus: Rc<EventBus>) -> Rc<Self> {
        let store = Rc::new(Self {
            bus: Rc::clone(&bus),
            inner: RefCell::new(StoreInner::default()),
            loader: LoaderBridge::spawn(),
            purge_subscription: Cell::new(None),
        });

        let weak: Weak<ResourceStore> = Rc::downgrade(&store);
        let id = bus.subscribe(
            channels::PURGE,
            move |_, _| {
                if let Some(store) = weak.upgrade() {
                    store.purge();
                }
            },
            None,
        );
        store.purge_subscription.set(Some(id));
        store
    }

    /// Register `name` and start loading `path` in the background.
    ///
    /// Re-adding an existing name replaces its entry; a load still in flight
    /// for the old entry is discarded when it arrives.
    pub fn add_resource(&self, name: &str, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let kind = AssetKind::from_path(path);

        let ticket = {
            let mut inner = self.inner.borrow_mut();
            inner.total += 1;
            inner.next_ticket += 1;
            let ticket = inner.next_ticket;
            inner.entries.insert(
                name.to_string(),
                ResourceEntry {
                    path: path.to_path_buf(),
                    kind,
                    payload: None,
                    is_loaded: false,
                    ticket,
                },
            );
            ticket
        };

        match kind {
            Some(kind) => {
                debug!("Resource: loading {} '{}' from {}", kind.as_str(), name, path.display());
                if !self.loader.load(ticket, name, path, kind) {
                    warn!("Resource: loader thread unavailable, '{}' will never load", name);
                }
            }
            None => {
                let err = LoadError::UnsupportedAssetType {
                    path: path.to_path_buf(),
                    extension: file_type(path),
                };
                warn!("Resource: {}", err);
            }
        }
    }

    /// Payload of `name` if it has finished loading.
    ///
    /// Unregistered names return [`ResourceError::UnknownResource`] without
    /// logging; pending ones log a warning and return
    /// [`ResourceError::NotYetLoaded`].
    pub fn request(&self, name: &str) -> Result<Rc<Asset>, ResourceError> {
        let inner = self.inner.borrow();
        let Some(entry) = inner.entries.get(name) else {
            return Err(ResourceError::UnknownResource(name.to_string()));
        };
        match &entry.payload {
            Some(payload) if entry.is_loaded => Ok(Rc::clone(payload)),
            _ => {
                let err = ResourceError::NotYetLoaded(name.to_string());
                warn!("Resource: {}", err);
                Err(err)
            }
        }
    }

    /// Delete the entry for `name`. Returns `false` if it was not registered.
    pub fn remove_resource(&self, name: &str) -> bool {
        let removed = self.inner.borrow_mut().entries.remove(name).is_some();
        if removed {
            debug!("Resource: removed '{}'", name);
        }
        removed
    }

    /// Clear every entry. The lifetime registration counter is kept.
    ///
    /// Pending preload waiters then see an empty table and complete on the
    /// next [`poll`](Self::poll).
    pub fn purge(&self) {
        let mut inner = self.inner.borrow_mut();
        info!("Resource: purging {} entries", inner.entries.len());
        inner.entries.clear();
    }

    /// Register `on_complete` to run once every registered resource is loaded.
    ///
    /// The callback is subscribed to the `preload` channel and removed again
    /// after it fired. Resources added before completion count as well. A
    /// resource that never loads stalls the preload.
    pub fn preload<F>(&self, on_complete: F) -> SubscriptionId
    where
        F: Fn() + 'static,
    {
        let id = self
            .bus
            .subscribe(channels::PRELOAD, move |_, _| on_complete(), None);
        self.inner.borrow_mut().preload_waiters.push(id);
        id
    }

    /// Apply every finished load and evaluate pending preloads.
    ///
    /// Returns the number of resources that became loaded during this call.
    /// No internal borrow is held while bus events are published.
    pub fn poll(&self) -> usize {
        let mut announcements = Vec::new();

        for msg in self.loader.try_iter() {
            match msg {
                LoaderMessage::Loaded {
                    ticket,
                    name,
                    asset,
                } => {
                    let mut inner = self.inner.borrow_mut();
                    let Some(entry) = inner.entries.get_mut(&name) else {
                        debug!("Resource: dropping load of '{}', entry is gone", name);
                        continue;
                    };
                    if entry.ticket != ticket {
                        debug!("Resource: dropping stale load of '{}'", name);
                        continue;
                    }
                    let kind = asset.kind();
                    entry.payload = Some(Rc::new(asset));
                    entry.is_loaded = true;
                    info!("Resource: loaded {} '{}'", kind.as_str(), name);
                    announcements.push((kind, name));
                }
                LoaderMessage::Failed {
                    ticket,
                    name,
                    error,
                } => {
                    let current = self
                        .inner
                        .borrow()
                        .entries
                        .get(&name)
                        .is_some_and(|entry| entry.ticket == ticket);
                    if current {
                        warn!("Resource: '{}' will never load: {}", name, error);
                    }
                }
            }
        }

        for (kind, name) in &announcements {
            let payload = json!({ "name": name, "kind": kind.as_str() });
            self.bus.publish(&channels::resource(*kind, name), Some(&payload));
        }

        self.check_preload();
        announcements.len()
    }

    fn check_preload(&self) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            if inner.preload_waiters.is_empty()
                || !inner.entries.values().all(|entry| entry.is_loaded)
            {
                return;
            }
            std::mem::take(&mut inner.preload_waiters)
        };

        debug!("Resource: preload complete for {} waiter(s)", waiters.len());
        self.bus.publish(channels::PRELOAD, None);
        for id in waiters {
            self.bus.unsubscribe(channels::PRELOAD, id);
        }
    }

    /// Poll until no preload waiter remains or `timeout` elapses.
    ///
    /// Blocking; meant for startup, never for the frame path. Returns `true`
    /// when every waiter completed.
    pub fn wait_for_preload(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll();
            if self.inner.borrow().preload_waiters.is_empty() {
                return true;
            }
            if Instant::now() >= deadline {
                warn!(
                    "Resource: preload still waiting on {} of {} resources",
                    self.len() - self.loaded_count(),
                    self.len()
                );
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Number of `add_resource` calls over the lifetime of the store.
    pub fn total(&self) -> u64 {
        self.inner.borrow().total
    }

    /// Number of entries currently registered.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.borrow().entries.contains_key(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .entries
            .get(name)
            .is_some_and(|entry| entry.is_loaded)
    }

    pub fn loaded_count(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .values()
            .filter(|entry| entry.is_loaded)
            .count()
    }

    /// Snapshot of one entry.
    pub fn entry(&self, name: &str) -> Option<ResourceEntry> {
        self.inner.borrow().entries.get(name).cloned()
    }
}

impl Drop for ResourceStore {
    fn drop(&mut self) {
        if let Some(id) = self.purge_subscription.take() {
            self.bus.unsubscribe(channels::PURGE, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("frosting_store_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn poll_until(store: &ResourceStore, mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done() {
            assert!(Instant::now() < deadline, "timed out waiting for the loader");
            store.poll();
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_request_unknown_is_silent_error() {
        let store = ResourceStore::new(Rc::new(EventBus::new()));
        assert_eq!(
            store.request("ghost").unwrap_err(),
            ResourceError::UnknownResource("ghost".into())
        );
    }

    #[test]
    fn test_request_before_and_after_load() {
        let dir = scratch_dir("request");
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"speed": 3}"#).unwrap();

        let bus = Rc::new(EventBus::new());
        let store = ResourceStore::new(Rc::clone(&bus));
        let fired = Rc::new(Cell::new(0));
        {
            let fired = Rc::clone(&fired);
            bus.subscribe("resource-json-config", move |_, _| fired.set(fired.get() + 1), None);
        }

        store.add_resource("config", &path);
        assert_eq!(
            store.request("config").unwrap_err(),
            ResourceError::NotYetLoaded("config".into())
        );

        poll_until(&store, || fired.get() > 0);
        let asset = store.request("config").unwrap();
        assert_eq!(asset.as_json().unwrap()["speed"], 3);
        assert_eq!(fired.get(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unsupported_type_never_loads() {
        let store = ResourceStore::new(Rc::new(EventBus::new()));
        store.add_resource("level", "maps/level.tmx");
        assert_eq!(store.total(), 1);
        assert!(store.contains("level"));
        assert_eq!(store.entry("level").unwrap().kind, None);
        store.poll();
        assert!(!store.is_loaded("level"));
    }

    #[test]
    fn test_purge_clears_entries_but_keeps_total() {
        let bus = Rc::new(EventBus::new());
        let store = ResourceStore::new(Rc::clone(&bus));
        store.add_resource("a", "a.tmx");
        store.add_resource("b", "b.tmx");
        assert_eq!(store.len(), 2);

        bus.publish(channels::PURGE, None);
        assert!(store.is_empty());
        assert_eq!(store.total(), 2);
    }

    #[test]
    fn test_remove_resource() {
        let store = ResourceStore::new(Rc::new(EventBus::new()));
        store.add_resource("a", "a.tmx");
        assert!(store.remove_resource("a"));
        assert!(!store.remove_resource("a"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_preload_fires_once_after_everything_loaded() {
        let dir = scratch_dir("preload");
        let a = dir.join("a.json");
        let b = dir.join("b.json");
        std::fs::write(&a, "1").unwrap();
        std::fs::write(&b, "2").unwrap();

        let bus = Rc::new(EventBus::new());
        let store = ResourceStore::new(Rc::clone(&bus));
        store.add_resource("a", &a);
        store.add_resource("b", &b);

        let calls = Rc::new(Cell::new(0));
        let loaded_at_call = Rc::new(Cell::new(0usize));
        {
            let calls = Rc::clone(&calls);
            let loaded_at_call = Rc::clone(&loaded_at_call);
            let store_ref = Rc::downgrade(&store);
            store.preload(move || {
                calls.set(calls.get() + 1);
                if let Some(store) = store_ref.upgrade() {
                    loaded_at_call.set(store.loaded_count());
                }
            });
        }

        assert!(store.wait_for_preload(Duration::from_secs(5)));
        assert_eq!(calls.get(), 1);
        assert_eq!(loaded_at_call.get(), 2);
        assert_eq!(bus.subscriber_count(channels::PRELOAD), 0);

        // Further polls never re-fire.
        store.poll();
        store.poll();
        assert_eq!(calls.get(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_preload_stalls_on_resource_that_never_loads() {
        let store = ResourceStore::new(Rc::new(EventBus::new()));
        store.add_resource("level", "level.tmx");
        let fired = Rc::new(Cell::new(false));
        {
            let fired = Rc::clone(&fired);
            store.preload(move || fired.set(true));
        }
        assert!(!store.wait_for_preload(Duration::from_millis(20)));
        assert!(!fired.get());
    }

    #[test]
    fn test_readding_discards_stale_load() {
        let dir = scratch_dir("readd");
        let first = dir.join("first.json");
        let second = dir.join("second.json");
        std::fs::write(&first, r#""first""#).unwrap();
        std::fs::write(&second, r#""second""#).unwrap();

        let store = ResourceStore::new(Rc::new(EventBus::new()));
        store.add_resource("value", &first);
        store.add_resource("value", &second);
        assert_eq!(store.total(), 2);

        poll_until(&store, || store.is_loaded("value"));
        let asset = store.request("value").unwrap();
        assert_eq!(asset.as_json().unwrap(), "second");

        std::fs::remove_dir_all(&dir).ok();
    }
}
