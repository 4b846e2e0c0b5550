//! leap_dino: interactive entry point.

use std::io::{self, Write};

use tracing_subscriber::EnvFilter;

use leap_dino::app::run;
use leap_dino::config::{AppConfig, AppError, CliArgs, Sensitivity};

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = start() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn start() -> Result<(), AppError> {
    let cli = CliArgs::parse(std::env::args().skip(1))?;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Leap Dino — jump the cacti with your hand           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Pointer simulation  (use --features leap for hardware)");
    println!();

    let mut cfg = if let Some(path) = &cli.config {
        println!("  Config: {}\n", path.display());
        AppConfig::load(path)?
    } else if cli.quick || cli.keyboard {
        println!("  Quick-start: default tuning, gestures {}\n", if cli.keyboard { "off" } else { "on" });
        AppConfig::default()
    } else {
        configure_interactively()
    };
    cli.apply(&mut cfg);

    println!();
    println!("  Opening game window…");
    println!();

    run(cfg)
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    cfg.gesture_enabled = !matches!(
        read_line("  Hand gesture control? (Y/n): ").trim(),
        "n" | "N" | "no"
    );

    if cfg.gesture_enabled {
        println!("  Sensitivity: 1=Relaxed  2=Normal  3=Twitchy");
        let preset = match read_line("  Choice (default 2): ").trim() {
            "1" => Sensitivity::Relaxed,
            "3" => Sensitivity::Twitchy,
            _   => Sensitivity::Normal,
        };
        preset.apply(&mut cfg.gesture);

        cfg.gesture.cooldown_ms = read_line("  Jump cooldown ms (default 400): ")
            .trim().parse::<u64>().unwrap_or(400).clamp(100, 2000);
    }

    cfg
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
