//! Headless demo scene.
//!
//! Writes a handful of generated assets, preloads them, spawns a
//! keyboard-driven player and some animated coins, then runs the scheduler
//! in real time while a script plays the keyboard.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use glam::Vec2;
use log::{info, warn};
use serde_json::json;

use crate::components::{Animation, InputComponent, Physics, Sprite};
use crate::context::{Context, Engine};
use crate::entity::{Entity, EntityId};
use crate::events::channels;
use crate::math::in_range;
use crate::resources::camera::{CAMERA_HEIGHT, CAMERA_WIDTH};
use crate::resources::engineconfig::EngineConfig;
use crate::resources::renderer::NullBackend;
use crate::systems::frame::{FrameLoop, FrameSource};
use crate::world::World;

const PLAYER_IMAGE: &str = "player";
const COIN_IMAGE: &str = "coin";
const THEME_AUDIO: &str = "theme";
const KEYBINDS: &str = "keybinds";

const COIN_FRAMES: u32 = 4;
const COIN_FRAME_SIZE: u32 = 8;
const PLAYER_SIZE: u32 = 16;
const PLAYER_ACCELERATION: f32 = 0.5;

/// Paths of the generated demo assets.
#[derive(Debug, Clone)]
pub struct DemoAssets {
    pub player: PathBuf,
    pub coin: PathBuf,
    pub theme: PathBuf,
    pub keybinds: PathBuf,
}

/// Summary of a demo run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub frames: u64,
    pub ticks: u64,
    pub player_position: Vec2,
    pub coins_in_view: usize,
    pub bus_events: u64,
    pub resources_registered: u64,
}

/// Generate the demo's images, keybindings and a stand-in audio file under
/// `config.asset_root`. Existing files are overwritten.
pub fn write_demo_assets(config: &EngineConfig) -> Result<DemoAssets, String> {
    let root = &config.asset_root;
    std::fs::create_dir_all(root)
        .map_err(|e| format!("Failed to create asset dir {:?}: {}", root, e))?;

    let player = root.join("player.png");
    image::RgbaImage::from_pixel(PLAYER_SIZE, PLAYER_SIZE, image::Rgba([240, 200, 40, 255]))
        .save(&player)
        .map_err(|e| format!("Failed to write {:?}: {}", player, e))?;

    let coin = root.join("coin.png");
    let sheet = image::RgbaImage::from_fn(COIN_FRAMES * COIN_FRAME_SIZE, COIN_FRAME_SIZE, |x, _| {
        let shade = 120 + (x / COIN_FRAME_SIZE) as u8 * 40;
        image::Rgba([shade, shade, 0, 255])
    });
    sheet
        .save(&coin)
        .map_err(|e| format!("Failed to write {:?}: {}", coin, e))?;

    let keybinds = config.keybinds_path();
    let bindings = json!({
        "move_left": "KeyA",
        "move_right": "KeyD",
        "move_up": "KeyW",
        "move_down": "KeyS",
    });
    write_file(&keybinds, bindings.to_string().as_bytes())?;

    let theme = root.join("theme.mp3");
    write_file(&theme, &[0xFF, 0xFB, 0x90, 0x00])?;

    Ok(DemoAssets {
        player,
        coin,
        theme,
        keybinds,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    std::fs::write(path, bytes).map_err(|e| format!("Failed to write {:?}: {}", path, e))
}

/// Register every demo asset with the resource store.
pub fn register_assets(ctx: &Context, assets: &DemoAssets) {
    ctx.resources.add_resource(PLAYER_IMAGE, &assets.player);
    ctx.resources.add_resource(COIN_IMAGE, &assets.coin);
    ctx.resources.add_resource(THEME_AUDIO, &assets.theme);
    ctx.resources.add_resource(KEYBINDS, &assets.keybinds);
}

fn push(entity: &mut Entity, delta: Vec2) {
    if let Some(physics) = entity.get_mut::<Physics>() {
        physics.add_velocity(delta);
    }
}

/// Player in the middle of the view, steered by the keybinding file.
pub fn spawn_player(ctx: &Context, world: &mut World, assets: &DemoAssets) -> EntityId {
    let input = InputComponent::new(ctx, KEYBINDS, &assets.keybinds)
        .bind("move_left", |e, pressed| {
            if pressed {
                push(e, Vec2::new(-PLAYER_ACCELERATION, 0.0));
            }
        })
        .bind("move_right", |e, pressed| {
            if pressed {
                push(e, Vec2::new(PLAYER_ACCELERATION, 0.0));
            }
        })
        .bind("move_up", |e, pressed| {
            if pressed {
                push(e, Vec2::new(0.0, -PLAYER_ACCELERATION));
            }
        })
        .bind("move_down", |e, pressed| {
            if pressed {
                push(e, Vec2::new(0.0, PLAYER_ACCELERATION));
            }
        });

    let player = Entity::new(CAMERA_WIDTH / 2.0, CAMERA_HEIGHT / 2.0)
        .with(Physics::new(2.0, 0.8))
        .with(Sprite::new(ctx, PLAYER_IMAGE, &assets.player))
        .with(input);
    world.add(player, "player")
}

/// `count` spinning coins at random places in view.
pub fn spawn_coins(ctx: &Context, world: &mut World, assets: &DemoAssets, count: usize) -> Vec<EntityId> {
    (0..count)
        .map(|_| {
            let position = Vec2::new(
                fastrand::f32() * CAMERA_WIDTH,
                fastrand::f32() * CAMERA_HEIGHT,
            );
            let animation = Animation::new(
                ctx,
                COIN_IMAGE,
                &assets.coin,
                Vec2::splat(COIN_FRAME_SIZE as f32),
                COIN_FRAMES,
            )
            .with_ticks_per_frame(3);
            world.add(Entity::at(position).with(animation), "coin")
        })
        .collect()
}

/// Keyboard script: right for the first second, down for the next, then idle.
pub fn scripted_input(ctx: &Context, elapsed_ms: f64) {
    let second = (elapsed_ms / 1000.0) as u64;
    let (right, down) = match second {
        0 => (true, false),
        1 => (false, true),
        _ => (false, false),
    };
    for (key, pressed) in [("KeyD", right), ("KeyS", down)] {
        if pressed {
            ctx.input.key_down(key);
        } else {
            ctx.input.key_up(key);
        }
    }
}

/// Run the whole demo for `seconds` of wall-clock time.
pub fn run_demo(config: &EngineConfig, seconds: f64) -> Result<DemoReport, String> {
    let assets = write_demo_assets(config)?;

    let frames = Rc::new(FrameLoop::new(config.target_fps));
    let engine = Engine::new(config, frames.clone(), Box::new(NullBackend));

    register_assets(&engine.ctx, &assets);
    engine
        .ctx
        .resources
        .preload(|| info!("All demo assets loaded"));
    if !engine.ctx.resources.wait_for_preload(Duration::from_secs(5)) {
        warn!("Starting before every asset finished loading");
    }

    let player = {
        let mut world = engine.world.borrow_mut();
        let player = spawn_player(&engine.ctx, &mut world, &assets);
        spawn_coins(&engine.ctx, &mut world, &assets, 8);
        player
    };

    engine.bus().publish_str(channels::STATE, "start");
    let start = frames.now();
    frames.run_for(Duration::from_secs_f64(seconds.max(0.0)), |now| {
        scripted_input(&engine.ctx, now - start)
    });

    let (player_position, coins_in_view) = {
        let world = engine.world.borrow();
        let player_position = world
            .get(player)
            .map(Entity::position)
            .unwrap_or_default();
        let coins_in_view = world
            .ids("coin")
            .into_iter()
            .filter_map(|id| world.get(id))
            .filter(|coin| {
                let p = coin.position();
                in_range(p.x, 0.0, CAMERA_WIDTH) && in_range(p.y, 0.0, CAMERA_HEIGHT)
            })
            .count();
        (player_position, coins_in_view)
    };

    engine.bus().publish_str(channels::STATE, "stop");
    engine.performance.display_metrics();

    let report = DemoReport {
        frames: engine.scheduler.frame_count(),
        ticks: engine.scheduler.tick_count(),
        player_position,
        coins_in_view,
        bus_events: engine.bus().total_events(),
        resources_registered: engine.resources().total(),
    };

    let mut world = engine.world.borrow_mut();
    for id in world.ids("player").into_iter().chain(world.ids("coin")) {
        if let Some(mut entity) = world.remove(id) {
            entity.release(&engine.ctx.bus);
        }
    }

    Ok(report)
}
