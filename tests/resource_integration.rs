//! Resource store integration tests: asynchronous loads observed through the
//! bus, preload barrier, and the components that wait on their assets.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use frostingengine::components::{Animation, ComponentKind, InputComponent, Sprite};
use frostingengine::context::{Context, Engine};
use frostingengine::entity::Entity;
use frostingengine::error::ResourceError;
use frostingengine::events::channels;
use frostingengine::resources::filetype::AssetKind;
use frostingengine::systems::frame::ManualFrameSource;
use glam::Vec2;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("frosting_res_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &PathBuf, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

fn poll_until(ctx: &Context, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for the loader");
        ctx.resources.poll();
        std::thread::sleep(Duration::from_millis(1));
    }
}

// =============================================================================
// Requests and load events
// =============================================================================

#[test]
fn image_request_before_and_after_load() {
    let dir = scratch_dir("image");
    let png = dir.join("a.png");
    write_png(&png, 4, 3);

    let ctx = Context::headless();
    let announced = Rc::new(RefCell::new(Vec::new()));
    {
        let announced = Rc::clone(&announced);
        ctx.bus.subscribe(
            "resource-image-img",
            move |data, _| announced.borrow_mut().push(data.cloned()),
            None,
        );
    }

    ctx.resources.add_resource("img", &png);
    assert_eq!(
        ctx.resources.request("img").unwrap_err(),
        ResourceError::NotYetLoaded("img".into())
    );

    poll_until(&ctx, || !announced.borrow().is_empty());
    let asset = ctx.resources.request("img").unwrap();
    let image = asset.as_image().unwrap();
    assert_eq!((image.width, image.height), (4, 3));
    assert_eq!(
        announced.borrow()[0],
        Some(serde_json::json!({"name": "img", "kind": "image"}))
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn broken_file_never_loads() {
    let dir = scratch_dir("broken");
    let png = dir.join("broken.png");
    std::fs::write(&png, b"definitely not a png").unwrap();

    let ctx = Context::headless();
    ctx.resources.add_resource("broken", &png);
    std::thread::sleep(Duration::from_millis(50));
    ctx.resources.poll();

    assert!(!ctx.resources.is_loaded("broken"));
    assert!(ctx.resources.contains("broken"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn preload_waits_for_resources_added_late() {
    let dir = scratch_dir("preload_late");
    let first = dir.join("first.json");
    let second = dir.join("second.json");
    std::fs::write(&first, "1").unwrap();
    std::fs::write(&second, "2").unwrap();

    let ctx = Context::headless();
    ctx.resources.add_resource("first", &first);

    let calls = Rc::new(Cell::new(0));
    {
        let calls = Rc::clone(&calls);
        ctx.resources.preload(move || calls.set(calls.get() + 1));
    }
    ctx.resources.add_resource("second", &second);

    assert!(ctx.resources.wait_for_preload(Duration::from_secs(5)));
    assert_eq!(calls.get(), 1);
    assert!(ctx.resources.is_loaded("first"));
    assert!(ctx.resources.is_loaded("second"));
    assert_eq!(ctx.bus.subscriber_count(channels::PRELOAD), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn preload_completes_for_every_waiter_with_one_publish() {
    let dir = scratch_dir("preload_many");
    let path = dir.join("v.json");
    std::fs::write(&path, "true").unwrap();

    let ctx = Context::headless();
    ctx.resources.add_resource("v", &path);
    let calls = Rc::new(Cell::new(0));
    for _ in 0..3 {
        let calls = Rc::clone(&calls);
        ctx.resources.preload(move || calls.set(calls.get() + 1));
    }
    let events_before = ctx.bus.total_events();

    assert!(ctx.resources.wait_for_preload(Duration::from_secs(5)));
    assert_eq!(calls.get(), 3);
    // One resource announcement plus one preload publish.
    assert_eq!(ctx.bus.total_events() - events_before, 2);
    std::fs::remove_dir_all(&dir).ok();
}

// =============================================================================
// Components waiting on assets
// =============================================================================

#[test]
fn sprite_registers_missing_asset_and_drops_subscription_after_load() {
    let dir = scratch_dir("sprite");
    let png = dir.join("hero.png");
    write_png(&png, 2, 2);

    let ctx = Context::headless();
    let channel = channels::resource(AssetKind::Image, "hero");
    let mut entity = Entity::new(0.0, 0.0).with(Sprite::new(&ctx, "hero", &png));

    assert!(ctx.resources.contains("hero"));
    assert_eq!(ctx.bus.subscriber_count(&channel), 1);
    assert!(!entity.get::<Sprite>().unwrap().is_loaded());

    poll_until(&ctx, || ctx.resources.is_loaded("hero"));
    assert!(entity.get::<Sprite>().unwrap().is_loaded());
    // Still subscribed until the next tick.
    assert_eq!(ctx.bus.subscriber_count(&channel), 1);

    entity.update(1.0, &ctx);
    assert_eq!(ctx.bus.subscriber_count(&channel), 0);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn sprite_for_loaded_asset_is_ready_at_once() {
    let dir = scratch_dir("sprite_ready");
    let png = dir.join("hero.png");
    write_png(&png, 2, 2);

    let ctx = Context::headless();
    ctx.resources.add_resource("hero", &png);
    poll_until(&ctx, || ctx.resources.is_loaded("hero"));

    let sprite = Sprite::new(&ctx, "hero", &png);
    assert!(sprite.is_loaded());
    assert!(!sprite.watch().is_subscribed());
    assert_eq!(ctx.resources.total(), 1);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn releasing_an_entity_drops_pending_subscriptions() {
    let ctx = Context::headless();
    let mut entity = Entity::new(0.0, 0.0)
        .with(Sprite::new(&ctx, "a", "missing/a.png"))
        .with(Animation::new(&ctx, "b", "missing/b.png", Vec2::splat(4.0), 2));
    assert_eq!(entity.render_kind(), Some(ComponentKind::Animation));

    entity.release(&ctx.bus);
    assert_eq!(ctx.bus.subscriber_count("resource-image-a"), 0);
    assert_eq!(ctx.bus.subscriber_count("resource-image-b"), 0);
}

#[test]
fn input_component_fires_matched_actions_against_its_entity() {
    let dir = scratch_dir("input");
    let keybinds = dir.join("keybinds.json");
    std::fs::write(&keybinds, r#"{"jump": "Space", "fire": "KeyF"}"#).unwrap();

    let frames = Rc::new(ManualFrameSource::new());
    let engine = Engine::headless(frames.clone());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let input = {
        let seen = Rc::clone(&seen);
        InputComponent::new(&engine.ctx, "keybinds", &keybinds).bind("jump", move |entity, pressed| {
            seen.borrow_mut().push(pressed);
            if pressed {
                let p = entity.position();
                entity.set_position(p + Vec2::new(0.0, -1.0));
            }
        })
    };
    let id = engine.world.borrow_mut().add(Entity::new(5.0, 5.0).with(input), "player");

    poll_until(&engine.ctx, || engine.resources().is_loaded("keybinds"));
    engine.scheduler.start().unwrap();

    frames.advance(50.0);
    engine.ctx.input.key_down("Space");
    frames.advance(50.0);
    engine.ctx.input.key_up("Space");
    frames.advance(50.0);

    assert_eq!(*seen.borrow(), vec![false, true, false]);
    let world = engine.world.borrow();
    let player = world.get(id).unwrap();
    assert_eq!(player.position(), Vec2::new(5.0, 4.0));
    let component = player.get::<InputComponent>().unwrap();
    assert!(component.is_matched());
    assert_eq!(component.bindings(), vec![("jump", "Space")]);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn bus_callback_during_a_tick_removes_an_entity_through_commands() {
    let dir = scratch_dir("collect");
    let keybinds = dir.join("keybinds.json");
    std::fs::write(&keybinds, r#"{"collect": "KeyE"}"#).unwrap();

    let frames = Rc::new(ManualFrameSource::new());
    let engine = Engine::headless(frames.clone());
    let ctx = engine.ctx.clone();

    let coin = engine.world.borrow_mut().add(
        Entity::new(1.0, 1.0).with(Sprite::new(&ctx, "coin", "missing/coin.png")),
        "coin",
    );
    {
        let commands = Rc::clone(&ctx.commands);
        ctx.bus.subscribe(
            "collected",
            move |_, _| commands.remove(coin),
            None,
        );
    }
    let input = {
        let bus = Rc::clone(&ctx.bus);
        InputComponent::new(&ctx, "keybinds", &keybinds).bind("collect", move |_, pressed| {
            if pressed {
                bus.publish("collected", None);
            }
        })
    };
    engine.world.borrow_mut().add(Entity::new(0.0, 0.0).with(input), "player");

    poll_until(&ctx, || ctx.resources.is_loaded("keybinds"));
    engine.scheduler.start().unwrap();

    frames.advance(50.0);
    assert!(engine.world.borrow().get(coin).is_some());

    ctx.input.key_down("KeyE");
    frames.advance(50.0);

    assert!(engine.world.borrow().get(coin).is_none());
    assert_eq!(engine.world.borrow().bucket_len("coin"), 0);
    assert_eq!(ctx.bus.subscriber_count("resource-image-coin"), 0);
    assert_eq!(ctx.commands.pending(), 0);
    assert_eq!(engine.scheduler.tick_count(), 2);
    std::fs::remove_dir_all(&dir).ok();
}
