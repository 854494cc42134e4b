//! Run lifecycle and frame driver.
//!
//! The [`Scheduler`] owns the lifecycle state machine and the fixed-timestep
//! accumulator. It is driven by a [`FrameSource`]: every frame callback
//! polls finished resource loads, runs the owed simulation ticks on the
//! world, draws once with the interpolation factor, flushes the renderer
//! and, while still running, asks for the next frame. Deferred world changes
//! queued on the context are applied after the poll and after every tick.
//!
//! Lifecycle actions arrive as direct calls or as strings on the `State`
//! channel (`"start"`, `"stop"`, `"pause"`, `"resume"`).
//!
//! ```text
//! NotStarted --start--> Started --frame--> Running
//! Started | Running | Resumed --pause--> Paused --resume--> Resumed --frame--> Running
//! any but Stopped --stop--> Stopped
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use log::{debug, info, trace, warn};
use serde_json::{Value, json};

use crate::context::Context;
use crate::error::ActionError;
use crate::events::bus::SubscriptionId;
use crate::events::channels;
use crate::resources::performance::{FRAME_TIME, TICKS};
use crate::systems::frame::{FrameHandle, FrameSource};
use crate::systems::timestep::FixedTimestep;
use crate::world::World;

/// Lifecycle phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Started,
    Running,
    Paused,
    Resumed,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::NotStarted => "notStarted",
            Phase::Started => "started",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Resumed => "resumed",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Action accepted on the `State` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateAction {
    Start,
    Stop,
    Pause,
    Resume,
}

impl StateAction {
    pub fn as_str(self) -> &'static str {
        match self {
            StateAction::Start => "start",
            StateAction::Stop => "stop",
            StateAction::Pause => "pause",
            StateAction::Resume => "resume",
        }
    }
}

impl FromStr for StateAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(StateAction::Start),
            "stop" => Ok(StateAction::Stop),
            "pause" => Ok(StateAction::Pause),
            "resume" => Ok(StateAction::Resume),
            other => Err(ActionError::InvalidAction(other.to_string())),
        }
    }
}

pub struct Scheduler {
    this: Weak<Scheduler>,
    ctx: Context,
    world: Rc<RefCell<World>>,
    frames: Rc<dyn FrameSource>,
    phase: Cell<Phase>,
    pending: Cell<Option<FrameHandle>>,
    timestep: RefCell<FixedTimestep>,
    subscription: Cell<Option<SubscriptionId>>,
    frame_count: Cell<u64>,
    tick_count: Cell<u64>,
}

impl Scheduler {
    /// Create a scheduler in [`Phase::NotStarted`] listening on `State`.
    pub fn new(
        ctx: Context,
        world: Rc<RefCell<World>>,
        frames: Rc<dyn FrameSource>,
        timestep: FixedTimestep,
    ) -> Rc<Self> {
        let scheduler = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            ctx,
            world,
            frames,
            phase: Cell::new(Phase::NotStarted),
            pending: Cell::new(None),
            timestep: RefCell::new(timestep),
            subscription: Cell::new(None),
            frame_count: Cell::new(0),
            tick_count: Cell::new(0),
        });

        let weak = Rc::downgrade(&scheduler);
        let id = scheduler.ctx.bus.subscribe(
            channels::STATE,
            move |data, _| {
                if let Some(scheduler) = weak.upgrade() {
                    scheduler.on_state_event(data);
                }
            },
            None,
        );
        scheduler.subscription.set(Some(id));
        debug!("State: initialised");
        scheduler
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Frames that did simulation work.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.get()
    }

    /// Simulation ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count.get()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn tick_rate(&self) -> f64 {
        self.timestep.borrow().tick_rate()
    }

    pub fn world(&self) -> &Rc<RefCell<World>> {
        &self.world
    }

    /// Apply `action` from the current phase.
    pub fn handle_action(&self, action: StateAction) -> Result<(), ActionError> {
        match action {
            StateAction::Start => self.start(),
            StateAction::Stop => self.stop(),
            StateAction::Pause => self.pause(),
            StateAction::Resume => self.resume(),
        }
    }

    /// Begin running. Only valid before the first start.
    pub fn start(&self) -> Result<(), ActionError> {
        self.expect_phase(StateAction::Start, &[Phase::NotStarted])?;
        self.set_phase(Phase::Started);
        self.timestep.borrow_mut().reset_clock(self.frames.now());
        self.request_frame();
        Ok(())
    }

    pub fn pause(&self) -> Result<(), ActionError> {
        self.expect_phase(
            StateAction::Pause,
            &[Phase::Started, Phase::Running, Phase::Resumed],
        )?;
        self.set_phase(Phase::Paused);
        self.cancel_frame();
        Ok(())
    }

    /// Continue after a pause. Time spent paused is not simulated.
    pub fn resume(&self) -> Result<(), ActionError> {
        self.expect_phase(StateAction::Resume, &[Phase::Paused])?;
        self.set_phase(Phase::Resumed);
        self.timestep.borrow_mut().reset_clock(self.frames.now());
        self.request_frame();
        Ok(())
    }

    /// Stop for good and publish `purge`.
    pub fn stop(&self) -> Result<(), ActionError> {
        if self.phase.get() == Phase::Stopped {
            return Err(ActionError::InvalidTransition {
                from: Phase::Stopped,
                action: StateAction::Stop,
            });
        }
        self.set_phase(Phase::Stopped);
        self.cancel_frame();
        self.ctx.bus.publish(channels::PURGE, None);
        Ok(())
    }

    /// One host frame at timestamp `now`.
    pub fn on_frame(&self, now: f64) {
        self.pending.set(None);
        trace!("State: frame at {:.3}ms", now);

        self.ctx.resources.poll();
        self.apply_commands();

        match self.phase.get() {
            Phase::Started | Phase::Running | Phase::Resumed => {}
            Phase::NotStarted | Phase::Paused | Phase::Stopped => return,
        }
        self.set_phase(Phase::Running);

        let plan = self.timestep.borrow_mut().advance(now);
        if plan.dropped > 0 {
            debug!("State: dropped {} ticks of backlog", plan.dropped);
        }

        for tick in &plan.ticks {
            self.world.borrow_mut().update(*tick, &self.ctx);
            self.apply_commands();
        }
        self.world.borrow().draw(plan.alpha, &self.ctx);
        self.ctx.renderer.flush(&self.ctx.resources, &self.ctx.display);

        self.frame_count.set(self.frame_count.get() + 1);
        self.tick_count
            .set(self.tick_count.get() + plan.ticks.len() as u64);
        self.ctx.bus.publish(
            channels::PERFORMANCE,
            Some(&json!({ "name": FRAME_TIME, "value": plan.frame_time })),
        );
        self.ctx.bus.publish(
            channels::PERFORMANCE,
            Some(&json!({ "name": TICKS, "value": plan.ticks.len() })),
        );

        if self.phase.get() == Phase::Running {
            self.request_frame();
        }
    }

    fn apply_commands(&self) {
        if self.ctx.commands.pending() == 0 {
            return;
        }
        let applied = self
            .world
            .borrow_mut()
            .apply(&self.ctx.commands, &self.ctx.bus);
        debug!("State: applied {} deferred world change(s)", applied);
    }

    fn on_state_event(&self, data: Option<&Value>) {
        let Some(Value::String(action)) = data else {
            warn!("State: invalid value: {:?}", data);
            return;
        };
        let result = action
            .parse::<StateAction>()
            .and_then(|action| self.handle_action(action));
        if let Err(e) = result {
            warn!("State: {}", e);
        }
    }

    fn expect_phase(&self, action: StateAction, allowed: &[Phase]) -> Result<(), ActionError> {
        let from = self.phase.get();
        if allowed.contains(&from) {
            Ok(())
        } else {
            Err(ActionError::InvalidTransition { from, action })
        }
    }

    fn set_phase(&self, phase: Phase) {
        let old = self.phase.replace(phase);
        if old != phase {
            if phase == Phase::Running {
                debug!("State: transitioning from {} to {}", old, phase);
            } else {
                info!("State: transitioning from {} to {}", old, phase);
            }
        }
    }

    fn request_frame(&self) {
        if self.pending.get().is_some() {
            return;
        }
        let this = self.this.clone();
        let handle = self.frames.request(Box::new(move |now| {
            if let Some(scheduler) = this.upgrade() {
                scheduler.on_frame(now);
            }
        }));
        self.pending.set(Some(handle));
    }

    fn cancel_frame(&self) {
        if let Some(handle) = self.pending.take() {
            self.frames.cancel(handle);
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.ctx.bus.unsubscribe(channels::STATE, id);
        }
        if let Some(handle) = self.pending.take() {
            self.frames.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::frame::ManualFrameSource;

    fn scheduler() -> (Context, Rc<ManualFrameSource>, Rc<Scheduler>) {
        let ctx = Context::headless();
        let frames = Rc::new(ManualFrameSource::new());
        let scheduler = Scheduler::new(
            ctx.clone(),
            Rc::new(RefCell::new(World::new())),
            frames.clone(),
            FixedTimestep::default(),
        );
        (ctx, frames, scheduler)
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("pause".parse::<StateAction>(), Ok(StateAction::Pause));
        assert_eq!(
            "jump".parse::<StateAction>(),
            Err(ActionError::InvalidAction("jump".into()))
        );
    }

    #[test]
    fn test_lifecycle_through_direct_calls() {
        let (_ctx, frames, scheduler) = scheduler();
        assert_eq!(scheduler.phase(), Phase::NotStarted);

        scheduler.start().unwrap();
        assert_eq!(scheduler.phase(), Phase::Started);
        assert_eq!(frames.pending(), 1);

        frames.advance(16.0);
        assert_eq!(scheduler.phase(), Phase::Running);
        assert_eq!(frames.pending(), 1);

        scheduler.pause().unwrap();
        assert_eq!(scheduler.phase(), Phase::Paused);
        assert_eq!(frames.pending(), 0);

        scheduler.resume().unwrap();
        assert_eq!(scheduler.phase(), Phase::Resumed);
        assert_eq!(frames.pending(), 1);

        scheduler.stop().unwrap();
        assert_eq!(scheduler.phase(), Phase::Stopped);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let (_ctx, _frames, scheduler) = scheduler();
        assert_eq!(
            scheduler.resume(),
            Err(ActionError::InvalidTransition {
                from: Phase::NotStarted,
                action: StateAction::Resume
            })
        );
        scheduler.start().unwrap();
        assert!(scheduler.start().is_err());
        scheduler.stop().unwrap();
        assert!(scheduler.start().is_err());
        assert!(scheduler.stop().is_err());
        assert_eq!(scheduler.phase(), Phase::Stopped);
    }

    #[test]
    fn test_pause_and_resume_outside_their_phases_change_nothing() {
        let (_ctx, frames, scheduler) = scheduler();
        assert!(scheduler.pause().is_err());
        assert_eq!(scheduler.phase(), Phase::NotStarted);

        scheduler.start().unwrap();
        assert!(scheduler.resume().is_err());
        assert_eq!(scheduler.phase(), Phase::Started);

        scheduler.pause().unwrap();
        assert_eq!(
            scheduler.pause(),
            Err(ActionError::InvalidTransition {
                from: Phase::Paused,
                action: StateAction::Pause
            })
        );
        assert_eq!(frames.pending(), 0);

        scheduler.stop().unwrap();
        assert!(scheduler.resume().is_err());
        assert!(scheduler.pause().is_err());
        assert_eq!(scheduler.phase(), Phase::Stopped);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_state_channel_drives_scheduler() {
        let (ctx, frames, scheduler) = scheduler();
        ctx.bus.publish_str(channels::STATE, "start");
        assert_eq!(scheduler.phase(), Phase::Started);

        ctx.bus.publish_str(channels::STATE, "bogus");
        assert_eq!(scheduler.phase(), Phase::Started);

        ctx.bus.publish_str(channels::STATE, "pause");
        assert_eq!(scheduler.phase(), Phase::Paused);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_stop_publishes_purge() {
        let (ctx, _frames, scheduler) = scheduler();
        let purged = Rc::new(Cell::new(0));
        {
            let purged = Rc::clone(&purged);
            ctx.bus
                .subscribe(channels::PURGE, move |_, _| purged.set(purged.get() + 1), None);
        }
        scheduler.start().unwrap();
        ctx.bus.publish_str(channels::STATE, "stop");
        assert_eq!(purged.get(), 1);
    }

    #[test]
    fn test_pause_during_resume_gap_simulates_nothing() {
        let (_ctx, frames, scheduler) = scheduler();
        scheduler.start().unwrap();
        frames.advance(10.0);
        scheduler.pause().unwrap();
        frames.set_time(10_000.0);
        scheduler.resume().unwrap();
        frames.advance(20.0);
        assert_eq!(scheduler.tick_count(), 0);
        assert_eq!(scheduler.phase(), Phase::Running);
    }
}
