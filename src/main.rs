use std::path::PathBuf;

use clap::Parser;
use frostingengine::game;
use frostingengine::resources::engineconfig::EngineConfig;

#[derive(Parser)]
#[command(version, about = "Frosting engine headless demo")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./frosting.ini")]
    config: PathBuf,

    /// Wall-clock seconds to run the simulation.
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Enable engine diagnostics regardless of the config file.
    #[arg(long)]
    debug: bool,

    /// Write the effective configuration back to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}, using defaults", e);
    }
    if cli.debug {
        config.debug = true;
    }

    if cli.write_config {
        match config.save_to_file() {
            Ok(()) => println!("Config written to {}", config.config_path.display()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let seconds = if cli.seconds.is_finite() {
        cli.seconds.max(0.0)
    } else {
        0.0
    };

    match game::run_demo(&config, seconds) {
        Ok(report) => println!(
            "{} frames, {} ticks, player at ({:.1}, {:.1}), {} coins in view, {} bus events, {} resources registered",
            report.frames,
            report.ticks,
            report.player_position.x,
            report.player_position.y,
            report.coins_in_view,
            report.bus_events,
            report.resources_registered
        ),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
