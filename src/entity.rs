//! Entities: a position plus a list of components.
//!
//! An entity owns at most one component per [`ComponentKind`]. Adding a
//! render-capable component (Sprite, Animation) makes the entity renderable
//! and that kind authoritative for drawing; the most recently added render
//! kind wins. Removing the authoritative kind leaves the entity without one.

use std::fmt;

use glam::Vec2;
use smallvec::SmallVec;

use crate::components::{Component, ComponentKind, ComponentType, InputComponent};
use crate::context::Context;
use crate::events::bus::EventBus;
use crate::math::lerp;

/// Identifier assigned by the [`World`](crate::world::World). Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// World-space position of an entity and where it was one tick ago.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: Vec2,
    pub previous: Vec2,
}

impl Body {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            previous: position,
        }
    }

    /// Position blended between the last two ticks, `alpha` in `[0, 1)`.
    pub fn interpolated(&self, alpha: f64) -> Vec2 {
        let alpha = alpha as f32;
        Vec2::new(
            lerp(self.previous.x, self.position.x, alpha),
            lerp(self.previous.y, self.position.y, alpha),
        )
    }
}

#[derive(Debug, Default)]
pub struct Entity {
    id: Option<EntityId>,
    body: Body,
    components: SmallVec<[Component; 4]>,
    render_kind: Option<ComponentKind>,
    last_tick: f64,
}

impl Entity {
    pub fn new(x: f32, y: f32) -> Self {
        Self::at(Vec2::new(x, y))
    }

    pub fn at(position: Vec2) -> Self {
        Self {
            body: Body::at(position),
            ..Self::default()
        }
    }

    /// `None` until the entity is added to a world.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    /// Move the entity. The interpolation origin moves along with it.
    pub fn set_position(&mut self, position: Vec2) {
        self.body = Body::at(position);
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Tick value passed to the most recent update.
    pub fn last_tick(&self) -> f64 {
        self.last_tick
    }

    /// Attach `component`, replacing one of the same kind in place.
    ///
    /// Returns the replaced component so the caller can release it.
    pub fn add_component(&mut self, component: impl Into<Component>) -> Option<Component> {
        let component = component.into();
        let kind = component.kind();
        if kind.is_renderable() {
            self.render_kind = Some(kind);
        }
        match self.components.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => Some(std::mem::replace(slot, component)),
            None => {
                self.components.push(component);
                None
            }
        }
    }

    /// Builder form of [`add_component`](Self::add_component). A replaced
    /// component is dropped, which releases its pending subscription.
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.add_component(component);
        self
    }

    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Component> {
        let index = self.components.iter().position(|c| c.kind() == kind)?;
        if self.render_kind == Some(kind) {
            self.render_kind = None;
        }
        Some(self.components.remove(index))
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.components
            .iter()
            .find(|c| c.kind() == T::KIND)
            .and_then(T::from_component)
    }

    pub fn get_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find(|c| c.kind() == T::KIND)
            .and_then(T::from_component_mut)
    }

    /// Kinds in insertion order.
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        self.components.iter().map(Component::kind).collect()
    }

    pub fn is_renderable(&self) -> bool {
        self.render_kind.is_some()
    }

    /// Render kind that draws this entity.
    pub fn render_kind(&self) -> Option<ComponentKind> {
        self.render_kind
    }

    /// Run one simulation tick.
    pub fn update(&mut self, tick: f64, ctx: &Context) {
        self.last_tick = tick;
        self.body.previous = self.body.position;

        for component in self.components.iter_mut() {
            component.update(&mut self.body, ctx);
        }

        let fired = self
            .get_mut::<InputComponent>()
            .map(InputComponent::take_fired)
            .unwrap_or_default();
        for (handler, pressed) in fired {
            handler(self, pressed);
        }
    }

    /// Draw through the authoritative render component only.
    pub fn draw(&self, alpha: f64, ctx: &Context) {
        let Some(kind) = self.render_kind else {
            return;
        };
        if let Some(component) = self.components.iter().find(|c| c.kind() == kind) {
            component.draw(&self.body, alpha, ctx);
        }
    }

    /// Drop every component's outstanding bus subscription.
    pub fn release(&mut self, bus: &EventBus) {
        for component in self.components.iter_mut() {
            component.release(bus);
        }
    }
}
