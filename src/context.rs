//! Shared engine state.
//!
//! [`Context`] bundles the long-lived services every component and system
//! may need: the event bus, the resource store, keyboard state, display,
//! camera and renderer. It is cheap to clone (every field is an `Rc`) and is
//! passed explicitly; there are no global singletons.
//!
//! [`Engine`] wires a context together with a world, a scheduler and the
//! performance registry from an [`EngineConfig`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::bus::{EventBus, SubscriptionId};
use crate::events::switchdebug::observe_debug_switch;
use crate::resources::camera::Camera;
use crate::resources::debugmode::DebugMode;
use crate::resources::display::Display;
use crate::resources::engineconfig::EngineConfig;
use crate::resources::input::InputManager;
use crate::resources::performance::{FRAME_TIME, Performance, TICKS};
use crate::resources::renderer::{DrawBackend, NullBackend, Renderer};
use crate::resources::resourcestore::ResourceStore;
use crate::systems::frame::FrameSource;
use crate::systems::scheduler::Scheduler;
use crate::systems::timestep::FixedTimestep;
use crate::world::{World, WorldCommands};

#[derive(Clone)]
pub struct Context {
    pub bus: Rc<EventBus>,
    pub resources: Rc<ResourceStore>,
    pub input: Rc<InputManager>,
    pub display: Rc<Display>,
    pub camera: Rc<Camera>,
    pub renderer: Rc<Renderer>,
    pub debug: Rc<DebugMode>,
    /// Deferred world changes, applied by the scheduler between ticks.
    pub commands: Rc<WorldCommands>,
}

impl Context {
    /// Build every service around a fresh bus. The camera follows display
    /// resizes and the debug flag follows the `debug` channel.
    pub fn new(display: Display, backend: Box<dyn DrawBackend>, debug: bool) -> Self {
        let bus = Rc::new(EventBus::new());
        let resources = ResourceStore::new(Rc::clone(&bus));
        let camera = Rc::new(Camera::new(display.width(), display.height()));
        camera.observe_display(&bus);
        let debug = Rc::new(DebugMode::new(debug));
        observe_debug_switch(&bus, Rc::clone(&debug));

        Self {
            bus,
            resources,
            input: Rc::new(InputManager::new()),
            display: Rc::new(display),
            camera,
            renderer: Rc::new(Renderer::new(backend)),
            debug,
            commands: Rc::new(WorldCommands::new()),
        }
    }

    /// Default display, no drawing, diagnostics off.
    pub fn headless() -> Self {
        Self::new(Display::default(), Box::new(NullBackend), false)
    }
}

pub struct Engine {
    pub ctx: Context,
    pub world: Rc<RefCell<World>>,
    pub scheduler: Rc<Scheduler>,
    pub performance: Rc<Performance>,
    performance_subscription: SubscriptionId,
}

impl Engine {
    pub fn new(
        config: &EngineConfig,
        frames: Rc<dyn FrameSource>,
        backend: Box<dyn DrawBackend>,
    ) -> Self {
        let display = Display::new(config.display_width, config.display_height, config.fullscreen);
        let ctx = Context::new(display, backend, config.debug);
        ctx.debug.apply_log_level();

        let (performance, performance_subscription) = Performance::new(&ctx.bus);
        performance.add_metric(FRAME_TIME);
        performance.add_metric(TICKS);

        let world = Rc::new(RefCell::new(World::new()));
        let scheduler = Scheduler::new(
            ctx.clone(),
            Rc::clone(&world),
            frames,
            FixedTimestep::new(config.tick_rate_ms, config.max_ticks_per_frame),
        );

        Self {
            ctx,
            world,
            scheduler,
            performance,
            performance_subscription,
        }
    }

    /// Engine with default settings and no drawing.
    pub fn headless(frames: Rc<dyn FrameSource>) -> Self {
        Self::new(&EngineConfig::new(), frames, Box::new(NullBackend))
    }

    pub fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.ctx.resources
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.ctx
            .bus
            .unsubscribe(crate::events::channels::PERFORMANCE, self.performance_subscription);
    }
}
