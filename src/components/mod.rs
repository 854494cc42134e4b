//! Components entities are assembled from.
//!
//! The set is closed: [`Component`] has one variant per capability and the
//! entity dispatches on it directly. Sprite and Animation can draw; every
//! kind updates once per tick.
//!
//! Submodules overview:
//! - [`animation`] – sprite-sheet animation stepped by simulation ticks
//! - [`assetwatch`] – resource load tracking shared by the components below
//! - [`input`] – keybinding file matched to per-entity action handlers
//! - [`physics`] – velocity with friction and a per-axis terminal velocity
//! - [`sprite`] – a single image or atlas region

pub mod animation;
pub mod assetwatch;
pub mod input;
pub mod physics;
pub mod sprite;

use std::fmt;

use crate::context::Context;
use crate::entity::Body;
use crate::events::bus::EventBus;

pub use animation::Animation;
pub use input::InputComponent;
pub use physics::Physics;
pub use sprite::Sprite;

/// Discriminant of [`Component`], one per capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Physics,
    Sprite,
    Animation,
    Input,
}

impl ComponentKind {
    /// Whether components of this kind can draw.
    pub fn is_renderable(self) -> bool {
        matches!(self, ComponentKind::Sprite | ComponentKind::Animation)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub enum Component {
    Physics(Physics),
    Sprite(Sprite),
    Animation(Animation),
    Input(InputComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Physics(_) => ComponentKind::Physics,
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::Animation(_) => ComponentKind::Animation,
            Component::Input(_) => ComponentKind::Input,
        }
    }

    pub fn update(&mut self, body: &mut Body, ctx: &Context) {
        match self {
            Component::Physics(physics) => physics.update(body),
            Component::Sprite(sprite) => sprite.update(ctx),
            Component::Animation(animation) => animation.update(ctx),
            Component::Input(input) => input.update(ctx),
        }
    }

    /// Draw if this kind can; a no-op otherwise.
    pub fn draw(&self, body: &Body, alpha: f64, ctx: &Context) {
        match self {
            Component::Sprite(sprite) => sprite.draw(body, alpha, ctx),
            Component::Animation(animation) => animation.draw(body, alpha, ctx),
            Component::Physics(_) | Component::Input(_) => {}
        }
    }

    /// Drop any outstanding bus subscription.
    pub fn release(&mut self, bus: &EventBus) {
        match self {
            Component::Sprite(sprite) => sprite.watch_mut().release(bus),
            Component::Animation(animation) => animation.watch_mut().release(bus),
            Component::Input(input) => input.watch_mut().release(bus),
            Component::Physics(_) => {}
        }
    }
}

/// Typed view into a [`Component`] variant, used by
/// [`Entity::get`](crate::entity::Entity::get).
pub trait ComponentType: Sized {
    const KIND: ComponentKind;
    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
}

macro_rules! component_type {
    ($ty:ty, $variant:ident) => {
        impl ComponentType for $ty {
            const KIND: ComponentKind = ComponentKind::$variant;

            fn from_component(component: &Component) -> Option<&Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                match component {
                    Component::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Component {
            fn from(inner: $ty) -> Self {
                Component::$variant(inner)
            }
        }
    };
}

component_type!(Physics, Physics);
component_type!(Sprite, Sprite);
component_type!(Animation, Animation);
component_type!(InputComponent, Input);
