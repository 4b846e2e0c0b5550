//! # dino_game
//!
//! Fixed-step state for an endless-runner "jump over the obstacles" game.
//!
//! * [`actors`]: the avatar, obstacles and clouds, each able to move and
//!   draw itself.
//! * [`collision`]: rectangles, hit-box insets and the AABB overlap test.
//! * [`game`]: the `Idle → Running → GameOver` state machine that owns
//!   everything above plus score, speed ramp and high score.
//! * [`surface`]: the four drawing primitives a backend must provide.
//! * [`store`]: where the high score lives between sessions.
//!
//! ## Quick start
//!
//! ```rust
//! use dino_game::{Game, GameConfig, JumpOutcome, MemoryStore, Phase};
//!
//! let mut game = Game::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 7);
//! assert_eq!(game.request_jump(), JumpOutcome::Started);
//! for _ in 0..60 { game.tick(); }
//! assert_eq!(game.phase(), Phase::Running);
//! ```
//!
//! Nothing here reads a clock or spawns a thread; the host decides how often
//! [`Game::tick`] runs.

pub mod actors;
pub mod collision;
pub mod game;
pub mod render;
pub mod store;
pub mod surface;

pub use actors::{Avatar, Cloud, Obstacle, ObstacleKind};
pub use collision::{overlaps, Inset, Rect};
pub use game::{Game, GameConfig, JumpOutcome, Phase};
pub use store::{JsonFileStore, MemoryStore, ScoreStore, StoreError};
pub use surface::{Surface, TextAlign, SURFACE_H, SURFACE_W};
