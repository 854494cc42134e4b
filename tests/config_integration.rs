//! Engine configuration file integration tests.

use frostingengine::resources::engineconfig::EngineConfig;

fn scratch_file(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("frosting_cfg_{}_{}.ini", name, std::process::id()))
}

#[test]
fn saved_config_loads_back() {
    let path = scratch_file("roundtrip");
    let mut config = EngineConfig::with_path(&path);
    config.tick_rate_ms = 20.0;
    config.max_ticks_per_frame = 5;
    config.display_width = 800;
    config.display_height = 450;
    config.fullscreen = true;
    config.debug = true;
    config.keybinds = "controls.json".into();
    config.save_to_file().unwrap();

    let mut loaded = EngineConfig::with_path(&path);
    loaded.load_from_file().unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_file(&path).ok();
}

#[test]
fn partial_file_keeps_defaults_and_ignores_bad_tick_rate() {
    let path = scratch_file("partial");
    std::fs::write(&path, "[simulation]\ntick_rate_ms = -3\n\n[display]\nwidth = 320\n").unwrap();

    let mut config = EngineConfig::with_path(&path);
    config.load_from_file().unwrap();
    assert_eq!(config.tick_rate_ms, 50.0);
    assert_eq!(config.display_width, 320);
    assert_eq!(config.display_height, 720);
    assert!(!config.debug);

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_is_an_error() {
    let mut config = EngineConfig::with_path(scratch_file("does_not_exist"));
    assert!(config.load_from_file().is_err());
    assert_eq!(config, EngineConfig::with_path(scratch_file("does_not_exist")));
}

#[test]
fn out_of_range_integers_keep_their_defaults() {
    let path = scratch_file("overflow");
    std::fs::write(
        &path,
        "[simulation]\nmax_ticks_per_frame = 4294967296\n\n[display]\nwidth = 99999999999\nheight = 600\n",
    )
    .unwrap();

    let mut config = EngineConfig::with_path(&path);
    config.max_ticks_per_frame = 4;
    config.load_from_file().unwrap();
    assert_eq!(config.max_ticks_per_frame, 4);
    assert_eq!(config.display_width, 1280);
    assert_eq!(config.display_height, 600);

    std::fs::remove_file(&path).ok();
}
