//! # leap_dino
//!
//! The endless-runner dinosaur game in a window, jumped by keyboard or by
//! flicking a hand upward in front of a tracker.
//!
//! ## Input → Action mapping
//!
//! | Input | Action |
//! |---|---|
//! | `Space` / `Up` | Jump (the first jump starts the run) |
//! | Upward hand flick | Jump, same as the key |
//! | `R` | Restart |
//! | `C` | Toggle gesture control |
//! | `P` | Pause / resume |
//! | `Escape` / `Q` | Quit |
//!
//! Losing window focus pauses the game; it resumes on the next frame after
//! focus returns, without replaying the time away.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the mouse pointer over the play field
//!   stands in for a tracked hand.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ## Layers
//!
//! * [`detector`]: landmark sources and the retrying start-up thread.
//! * [`frame_loop`]: pausable frame scheduling and FPS sampling.
//! * [`app`]: the orchestrator that feeds input to the game.
//! * [`visualizer`]: the `minifb` window and its `Surface` implementation.
//! * [`config`]: `AppConfig`, command-line flags and `AppError`.

pub mod config;
pub mod detector;
pub mod frame_loop;
pub mod app;
pub mod visualizer;
