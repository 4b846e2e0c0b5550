//! Application configuration, command-line flags and the top-level error.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! wants to change:
//!
//! ```json
//! { "gesture": { "cooldown_ms": 300 }, "seed": 42 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use dino_game::GameConfig;
use dino_gesture::GestureConfig;

// ════════════════════════════════════════════════════════════════════════════
// AppError
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not open window: {0}")]
    Window(#[from] minifb::Error),

    #[error("could not read config {path}: {source}")]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("invalid config {path}: {source}")]
    ConfigParse { path: PathBuf, source: serde_json::Error },

    #[error("{0}")]
    Usage(String),
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorPolicy
// ════════════════════════════════════════════════════════════════════════════

/// How hard to try bringing up the hand detector before settling for the
/// keyboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorPolicy {
    pub max_attempts:     u32,
    /// How long one attempt may take to report ready.
    pub ready_timeout_ms: u64,
    /// Wait after the first failed attempt; doubles on each further failure.
    pub backoff_ms:       u64,
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        DetectorPolicy {
            max_attempts:     3,
            ready_timeout_ms: 10_000,
            backoff_ms:       500,
        }
    }
}

impl DetectorPolicy {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(1u64 << shift))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sensitivity presets
// ════════════════════════════════════════════════════════════════════════════

/// Named gesture tunings offered by the interactive setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sensitivity {
    /// Needs a big, quick flick.
    Relaxed,
    Normal,
    /// Fires on small movements.
    Twitchy,
}

impl Sensitivity {
    pub fn apply(self, gesture: &mut GestureConfig) {
        let (threshold, velocity) = match self {
            Sensitivity::Relaxed => (0.050, 0.025),
            Sensitivity::Normal  => (0.035, 0.015),
            Sensitivity::Twitchy => (0.025, 0.010),
        };
        gesture.movement_threshold = threshold;
        gesture.min_velocity       = velocity;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game:            GameConfig,
    pub gesture:         GestureConfig,
    pub detector:        DetectorPolicy,
    /// JSON file holding the best score between sessions.
    pub high_score_path: PathBuf,
    /// Fixes the obstacle sequence; `None` seeds from the OS.
    pub seed:            Option<u64>,
    /// Whether gesture control is on at startup. It can be toggled later.
    pub gesture_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            game:            GameConfig::default(),
            gesture:         GestureConfig::default(),
            detector:        DetectorPolicy::default(),
            high_score_path: PathBuf::from("dino_high_score.json"),
            seed:            None,
            gesture_enabled: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|source| AppError::ConfigRead { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
            .map_err(|source| AppError::ConfigParse { path: path.to_path_buf(), source })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Command line
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Skip the interactive prompts.
    pub quick:    bool,
    /// Start with gesture control off.
    pub keyboard: bool,
    pub config:   Option<PathBuf>,
    pub seed:     Option<u64>,
}

impl CliArgs {
    /// Parse everything after the program name.
    pub fn parse<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut out  = CliArgs::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quick"    => out.quick = true,
                "--keyboard" => out.keyboard = true,
                "--config"   => {
                    let path = args.next()
                        .ok_or_else(|| AppError::Usage("--config needs a file path".into()))?;
                    out.config = Some(PathBuf::from(path));
                }
                "--seed" => {
                    let raw = args.next()
                        .ok_or_else(|| AppError::Usage("--seed needs a number".into()))?;
                    let seed = raw.parse::<u64>()
                        .map_err(|_| AppError::Usage(format!("--seed: not a number: {}", raw)))?;
                    out.seed = Some(seed);
                }
                other => return Err(AppError::Usage(format!("unknown argument: {}", other))),
            }
        }
        Ok(out)
    }

    /// Overlay the flags onto a loaded or prompted config.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if self.keyboard {
            cfg.gesture_enabled = false;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn backoff_doubles() {
        let p = DetectorPolicy { backoff_ms: 250, ..DetectorPolicy::default() };
        assert_eq!(p.backoff(1), Duration::from_millis(250));
        assert_eq!(p.backoff(2), Duration::from_millis(500));
        assert_eq!(p.backoff(3), Duration::from_millis(1000));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AppConfig::from_json(r#"{ "gesture": { "cooldown_ms": 300 }, "seed": 42 }"#).unwrap();
        assert_eq!(cfg.gesture.cooldown_ms, 300);
        assert_eq!(cfg.gesture.smoothing_window, 3);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.game, GameConfig::default());
        assert!(cfg.gesture_enabled);
    }

    #[test]
    fn missing_config_file_is_read_error() {
        let path = std::env::temp_dir().join(format!("leap_dino_no_such_{}.json", std::process::id()));
        assert!(matches!(AppConfig::load(&path), Err(AppError::ConfigRead { .. })));
    }

    #[test]
    fn bad_config_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("leap_dino_bad_{}.json", std::process::id()));
        fs::write(&path, "{ seed: ").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(AppError::ConfigParse { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn parses_all_flags() {
        let cli = CliArgs::parse(args(&["--quick", "--keyboard", "--seed", "9", "--config", "a.json"])).unwrap();
        assert!(cli.quick);
        assert!(cli.keyboard);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.config, Some(PathBuf::from("a.json")));
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(matches!(CliArgs::parse(args(&["--fast"])), Err(AppError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["--seed"])), Err(AppError::Usage(_))));
        assert!(matches!(CliArgs::parse(args(&["--seed", "x"])), Err(AppError::Usage(_))));
    }

    #[test]
    fn flags_override_config() {
        let cli = CliArgs::parse(args(&["--keyboard", "--seed", "3"])).unwrap();
        let mut cfg = AppConfig::default();
        cli.apply(&mut cfg);
        assert!(!cfg.gesture_enabled);
        assert_eq!(cfg.seed, Some(3));
    }

    #[test]
    fn sensitivity_presets_order() {
        let mut relaxed = GestureConfig::default();
        let mut twitchy = GestureConfig::default();
        Sensitivity::Relaxed.apply(&mut relaxed);
        Sensitivity::Twitchy.apply(&mut twitchy);
        assert!(relaxed.movement_threshold > twitchy.movement_threshold);
        assert!(relaxed.min_velocity > twitchy.min_velocity);
    }
}
