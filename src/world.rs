//! Registry of live entities, grouped by type tag.
//!
//! Ids are handed out from a single counter shared by every tag, starting at
//! 0 and never reused. A tag's bucket exists only while it holds entities.
//!
//! While a tick runs the world is borrowed, so code reached from inside it
//! (bus callbacks, input handlers) queues structural changes on
//! [`WorldCommands`] instead. The scheduler applies them between ticks.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::debug;
use rustc_hash::FxHashMap;

use crate::context::Context;
use crate::entity::{Entity, EntityId};
use crate::events::bus::EventBus;

/// Spawns and removals waiting for the world to be free.
#[derive(Debug, Default)]
pub struct WorldCommands {
    spawns: RefCell<Vec<(Entity, String)>>,
    removals: RefCell<Vec<EntityId>>,
}

impl WorldCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity` under `tag` on the next apply.
    pub fn spawn(&self, entity: Entity, tag: &str) {
        self.spawns.borrow_mut().push((entity, tag.to_string()));
    }

    /// Remove entity `id` on the next apply. Unknown ids are ignored then.
    pub fn remove(&self, id: EntityId) {
        self.removals.borrow_mut().push(id);
    }

    pub fn pending(&self) -> usize {
        self.spawns.borrow().len() + self.removals.borrow().len()
    }
}

#[derive(Debug, Default)]
pub struct World {
    next_id: u64,
    buckets: BTreeMap<String, BTreeMap<EntityId, Entity>>,
    index: FxHashMap<EntityId, String>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under `tag` and return its freshly assigned id.
    pub fn add(&mut self, mut entity: Entity, tag: &str) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.assign_id(id);

        self.buckets
            .entry(tag.to_string())
            .or_default()
            .insert(id, entity);
        self.index.insert(id, tag.to_string());
        debug!("World: added entity {} as '{}'", id, tag);
        id
    }

    /// Take entity `id` out of the world. Unknown ids return `None`.
    ///
    /// The caller is expected to [`release`](Entity::release) the entity's
    /// subscriptions.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let tag = self.index.remove(&id)?;
        let bucket = self.buckets.get_mut(&tag)?;
        let entity = bucket.remove(&id);
        if bucket.is_empty() {
            self.buckets.remove(&tag);
        }
        debug!("World: removed entity {} from '{}'", id, tag);
        entity
    }

    /// Apply queued removals, then queued spawns. Removed entities have
    /// their subscriptions released. Returns the number of changes made.
    pub fn apply(&mut self, commands: &WorldCommands, bus: &EventBus) -> usize {
        let removals = std::mem::take(&mut *commands.removals.borrow_mut());
        let spawns = std::mem::take(&mut *commands.spawns.borrow_mut());

        let mut applied = 0;
        for id in removals {
            if let Some(mut entity) = self.remove(id) {
                entity.release(bus);
                applied += 1;
            }
        }
        for (entity, tag) in spawns {
            self.add(entity, &tag);
            applied += 1;
        }
        applied
    }

    /// Run one simulation tick on every entity.
    pub fn update(&mut self, tick: f64, ctx: &Context) {
        for entity in self.buckets.values_mut().flat_map(BTreeMap::values_mut) {
            entity.update(tick, ctx);
        }
    }

    /// Draw every renderable entity.
    pub fn draw(&self, alpha: f64, ctx: &Context) {
        for entity in self.entities().filter(|e| e.is_renderable()) {
            entity.draw(alpha, ctx);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let tag = self.index.get(&id)?;
        self.buckets.get(tag)?.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let tag = self.index.get(&id)?;
        self.buckets.get_mut(tag)?.get_mut(&id)
    }

    pub fn tag_of(&self, id: EntityId) -> Option<&str> {
        self.index.get(&id).map(String::as_str)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.buckets.values().flat_map(BTreeMap::values)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn bucket_len(&self, tag: &str) -> usize {
        self.buckets.get(tag).map(BTreeMap::len).unwrap_or(0)
    }

    /// Tags that currently hold entities, sorted.
    pub fn tags(&self) -> Vec<&str> {
        self.buckets.keys().map(String::as_str).collect()
    }

    /// Ids in `tag`, ascending.
    pub fn ids(&self, tag: &str) -> Vec<EntityId> {
        self.buckets
            .get(tag)
            .map(|bucket| bucket.keys().copied().collect())
            .unwrap_or_default()
    }
}
