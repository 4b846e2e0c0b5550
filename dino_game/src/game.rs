//! The game state machine: `Idle → Running → GameOver`, and back to `Idle`
//! on reset.
//!
//! `Game` owns the avatar, the obstacle list, spawn timing, score, the speed
//! ramp, and the high-score store.  It is advanced one fixed step at a time
//! by [`Game::tick`] and never looks at the wall clock.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actors::{Avatar, Cloud, Obstacle, ObstacleKind};
use crate::collision::overlaps;
use crate::render;
use crate::store::ScoreStore;
use crate::surface::{Surface, SURFACE_W};

// ════════════════════════════════════════════════════════════════════════════
// GameConfig
// ════════════════════════════════════════════════════════════════════════════

/// Tunables for physics, pacing and scoring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Added to the avatar's vertical velocity every airborne tick.
    pub gravity:            f32,
    /// Launch velocity; negative is up.
    pub jump_strength:      f32,
    pub base_speed:         f32,
    pub speed_step:         f32,
    pub max_speed:          f32,
    /// Score interval at which the speed steps up.
    pub speed_milestone:    u32,
    pub score_per_obstacle: u32,
    /// Ticks between obstacle spawns, before jitter.
    pub spawn_delay:        f32,
    /// Spawn delay varies uniformly in `[-jitter, +jitter)`.
    pub spawn_jitter:       f32,
    pub tall_chance:        f64,
    /// Per-tick chance of a new background cloud.
    pub cloud_chance:       f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            gravity:            1.0,
            jump_strength:      -18.0,
            base_speed:         5.0,
            speed_step:         0.1,
            max_speed:          12.0,
            speed_milestone:    100,
            score_per_obstacle: 10,
            spawn_delay:        120.0,
            spawn_jitter:       30.0,
            tall_chance:        0.3,
            cloud_chance:       0.01,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Phase / JumpOutcome
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

/// What a jump request did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The request started a run from `Idle`; the avatar did not jump.
    Started,
    /// The avatar left the ground.
    Jumped,
    /// Airborne, or the game is over.
    Refused,
}

// ════════════════════════════════════════════════════════════════════════════
// Game
// ════════════════════════════════════════════════════════════════════════════

pub struct Game {
    config:      GameConfig,
    avatar:      Avatar,
    obstacles:   Vec<Obstacle>,
    clouds:      Vec<Cloud>,
    phase:       Phase,
    score:       u32,
    high_score:  u32,
    speed:       f32,
    spawn_timer: f32,
    /// Speed milestones already paid out this run.
    milestones:  u32,
    jump_count:  u32,
    rng:         StdRng,
    store:       Box<dyn ScoreStore>,
}

impl Game {
    /// A game seeded from the operating system.
    pub fn new(config: GameConfig, store: Box<dyn ScoreStore>) -> Self {
        Self::with_rng(config, store, StdRng::from_os_rng())
    }

    /// A game whose obstacle and cloud sequence is fixed by `seed`.
    pub fn with_seed(config: GameConfig, store: Box<dyn ScoreStore>, seed: u64) -> Self {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: Box<dyn ScoreStore>, mut rng: StdRng) -> Self {
        let high_score = match store.load() {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "store", "could not read high score ({}); starting from 0", e);
                0
            }
        };
        let clouds = Cloud::initial_bank(&mut rng);

        Game {
            avatar:      Avatar::new(config.gravity, config.jump_strength),
            obstacles:   Vec::new(),
            clouds,
            phase:       Phase::Idle,
            score:       0,
            high_score,
            speed:       config.base_speed,
            spawn_timer: 0.0,
            milestones:  0,
            jump_count:  0,
            rng,
            store,
            config,
        }
    }

    // ── input ────────────────────────────────────────────────────────────

    pub fn request_jump(&mut self) -> JumpOutcome {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Running;
                info!(target: "game", "run started");
                JumpOutcome::Started
            }
            Phase::Running => {
                if self.avatar.jump() {
                    self.jump_count += 1;
                    JumpOutcome::Jumped
                } else {
                    JumpOutcome::Refused
                }
            }
            Phase::GameOver => JumpOutcome::Refused,
        }
    }

    /// Back to `Idle` with a fresh avatar, no obstacles, zero score and
    /// base speed. The high score is kept.
    pub fn reset(&mut self) {
        self.avatar      = Avatar::new(self.config.gravity, self.config.jump_strength);
        self.obstacles.clear();
        self.clouds      = Cloud::initial_bank(&mut self.rng);
        self.phase       = Phase::Idle;
        self.score       = 0;
        self.speed       = self.config.base_speed;
        self.spawn_timer = 0.0;
        self.milestones  = 0;
        self.jump_count  = 0;
        debug!(target: "game", "reset");
    }

    // ── per-tick update ──────────────────────────────────────────────────

    /// Advance one fixed step. Does nothing unless `Running`.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }

        self.avatar.update();
        self.spawn_obstacle();
        self.advance_obstacles();
        self.advance_clouds();

        if self.collided() {
            self.end_run();
            return;
        }
        self.ramp_speed();
    }

    fn spawn_obstacle(&mut self) {
        if self.spawn_timer > 0.0 {
            self.spawn_timer -= 1.0;
            return;
        }

        let kind = if self.rng.random_bool(self.config.tall_chance.clamp(0.0, 1.0)) {
            ObstacleKind::Tall
        } else {
            ObstacleKind::Normal
        };
        self.obstacles.push(Obstacle::new(SURFACE_W, kind));

        let jitter = self.config.spawn_jitter.abs();
        let offset = if jitter > 0.0 { self.rng.random_range(-jitter..jitter) } else { 0.0 };
        self.spawn_timer = self.config.spawn_delay + offset;
    }

    fn advance_obstacles(&mut self) {
        let speed = self.speed;
        for o in &mut self.obstacles {
            o.update(speed);
        }

        let before = self.obstacles.len();
        self.obstacles.retain(|o| !o.is_off_screen());
        let passed = (before - self.obstacles.len()) as u32;
        self.score += passed * self.config.score_per_obstacle;
    }

    fn advance_clouds(&mut self) {
        for c in &mut self.clouds {
            c.update();
        }
        self.clouds.retain(|c| !c.is_off_screen());

        if self.rng.random_bool(self.config.cloud_chance.clamp(0.0, 1.0)) {
            self.clouds.push(Cloud::spawn(SURFACE_W + 50.0, &mut self.rng));
        }
    }

    fn collided(&self) -> bool {
        let hb = self.avatar.hit_box();
        self.obstacles.iter().any(|o| overlaps(&hb, &o.hit_box()))
    }

    /// One speed step per milestone reached, never past the cap.
    fn ramp_speed(&mut self) {
        if self.config.speed_milestone == 0 {
            return;
        }
        let reached = self.score / self.config.speed_milestone;
        while self.milestones < reached {
            self.milestones += 1;
            self.speed = (self.speed + self.config.speed_step).min(self.config.max_speed);
            debug!(target: "game", "score {} → speed {:.1}", self.score, self.speed);
        }
    }

    fn end_run(&mut self) {
        self.phase = Phase::GameOver;
        info!(target: "game", "game over at score {}", self.score);

        if self.score > self.high_score {
            self.high_score = self.score;
            if let Err(e) = self.store.save(self.score) {
                warn!(target: "store", "could not save high score: {}", e);
            }
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn phase(&self)      -> Phase        { self.phase }
    pub fn score(&self)      -> u32          { self.score }
    pub fn high_score(&self) -> u32          { self.high_score }
    pub fn speed(&self)      -> f32          { self.speed }
    pub fn jump_count(&self) -> u32          { self.jump_count }
    pub fn avatar(&self)     -> &Avatar      { &self.avatar }
    pub fn obstacles(&self)  -> &[Obstacle]  { &self.obstacles }
    pub fn clouds(&self)     -> &[Cloud]     { &self.clouds }
    pub fn config(&self)     -> &GameConfig  { &self.config }

    #[cfg(test)]
    pub(crate) fn push_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Draw the whole scene, HUD and phase overlay included.
    pub fn draw(&self, surface: &mut dyn Surface) {
        render::draw_scene(self, surface);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use std::sync::{Arc, Mutex};

    /// Store handle the test keeps a second reference to.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<Mutex<MemoryStore>>);

    impl ScoreStore for SharedStore {
        fn load(&self) -> Result<u32, StoreError> { self.0.lock().unwrap().load() }
        fn save(&mut self, score: u32) -> Result<(), StoreError> { self.0.lock().unwrap().save(score) }
    }

    struct BrokenStore;

    impl ScoreStore for BrokenStore {
        fn load(&self) -> Result<u32, StoreError> {
            Err(StoreError::Io {
                path:   "nowhere".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
        fn save(&mut self, _score: u32) -> Result<(), StoreError> { self.load().map(|_| ()) }
    }

    fn game() -> Game {
        Game::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 42)
    }

    fn single_obstacle_game() -> Game {
        let config = GameConfig { spawn_delay: 10_000.0, ..GameConfig::default() };
        Game::with_seed(config, Box::new(MemoryStore::default()), 42)
    }

    fn ticks(g: &mut Game, n: usize) {
        for _ in 0..n { g.tick(); }
    }

    #[test]
    fn starts_idle_and_tick_is_noop() {
        let mut g = game();
        assert_eq!(g.phase(), Phase::Idle);
        ticks(&mut g, 50);
        assert!(g.obstacles().is_empty());
        assert_eq!(g.score(), 0);
        assert_eq!(g.avatar().y, g.avatar().ground_y);
    }

    #[test]
    fn first_jump_only_starts_the_run() {
        let mut g = game();
        assert_eq!(g.request_jump(), JumpOutcome::Started);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.score(), 0);
        assert_eq!(g.speed(), 5.0);
        assert!(g.avatar().is_grounded());
        assert_eq!(g.jump_count(), 0);
    }

    #[test]
    fn grounded_jump_sets_strength_airborne_jump_refused() {
        let mut g = game();
        g.request_jump();
        assert_eq!(g.request_jump(), JumpOutcome::Jumped);
        assert_eq!(g.avatar().velocity_y, -18.0);
        assert_eq!(g.jump_count(), 1);

        g.tick();
        let v = g.avatar().velocity_y;
        assert_eq!(g.request_jump(), JumpOutcome::Refused);
        assert_eq!(g.avatar().velocity_y, v);
        assert_eq!(g.jump_count(), 1);
    }

    #[test]
    fn first_running_tick_spawns_at_right_edge() {
        let mut g = game();
        g.request_jump();
        g.tick();
        assert_eq!(g.obstacles().len(), 1);
        assert_eq!(g.obstacles()[0].x, 795.0);
    }

    #[test]
    fn spawn_interval_stays_within_jitter() {
        let mut g = game();
        g.request_jump();
        g.tick();
        assert!(g.spawn_timer >= 90.0 && g.spawn_timer <= 150.0);
    }

    #[test]
    fn cleared_obstacle_scores_once() {
        let mut g = single_obstacle_game();
        g.request_jump();
        ticks(&mut g, 120);
        assert_eq!(g.request_jump(), JumpOutcome::Jumped);

        ticks(&mut g, 46);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.obstacles().len(), 1);
        assert_eq!(g.score(), 0);

        g.tick();
        assert!(g.obstacles().is_empty());
        assert_eq!(g.score(), 10);

        ticks(&mut g, 20);
        assert_eq!(g.score(), 10);
    }

    #[test]
    fn standing_still_ends_the_run() {
        let mut g = single_obstacle_game();
        g.request_jump();
        ticks(&mut g, 200);
        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn game_over_freezes_state_and_refuses_jumps() {
        let mut g = game();
        g.request_jump();
        g.obstacles.push(Obstacle::new(110.0, ObstacleKind::Normal));
        g.tick();
        assert_eq!(g.phase(), Phase::GameOver);

        let xs: Vec<f32> = g.obstacles().iter().map(|o| o.x).collect();
        ticks(&mut g, 10);
        let after: Vec<f32> = g.obstacles().iter().map(|o| o.x).collect();
        assert_eq!(xs, after);
        assert_eq!(g.request_jump(), JumpOutcome::Refused);
    }

    #[test]
    fn beating_high_score_persists_it() {
        let shared = SharedStore::default();
        let mut g = Game::with_seed(GameConfig::default(), Box::new(shared.clone()), 1);
        g.request_jump();
        g.score = 70;
        g.obstacles.push(Obstacle::new(110.0, ObstacleKind::Tall));
        g.tick();

        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.high_score(), 70);
        let stored = shared.0.lock().unwrap();
        assert_eq!(stored.value, Some(70));
        assert_eq!(stored.writes, 1);
    }

    #[test]
    fn lower_score_does_not_touch_store() {
        let shared = SharedStore(Arc::new(Mutex::new(MemoryStore::with_value(500))));
        let mut g = Game::with_seed(GameConfig::default(), Box::new(shared.clone()), 1);
        assert_eq!(g.high_score(), 500);
        g.request_jump();
        g.score = 30;
        g.obstacles.push(Obstacle::new(110.0, ObstacleKind::Normal));
        g.tick();
        assert_eq!(g.high_score(), 500);
        assert_eq!(shared.0.lock().unwrap().writes, 0);
    }

    #[test]
    fn broken_store_is_not_fatal() {
        let mut g = Game::with_seed(GameConfig::default(), Box::new(BrokenStore), 3);
        assert_eq!(g.high_score(), 0);
        g.request_jump();
        g.score = 40;
        g.obstacles.push(Obstacle::new(110.0, ObstacleKind::Normal));
        g.tick();
        assert_eq!(g.phase(), Phase::GameOver);
        assert_eq!(g.high_score(), 40);
    }

    #[test]
    fn milestone_steps_speed_once() {
        let mut g = game();
        g.request_jump();
        g.score = 100;
        g.ramp_speed();
        assert!((g.speed() - 5.1).abs() < 1e-5);
        g.ramp_speed();
        assert!((g.speed() - 5.1).abs() < 1e-5);

        g.score = 190;
        g.ramp_speed();
        assert!((g.speed() - 5.1).abs() < 1e-5);
        g.score = 200;
        g.ramp_speed();
        assert!((g.speed() - 5.2).abs() < 1e-5);
    }

    #[test]
    fn speed_never_exceeds_cap() {
        let mut g = game();
        g.request_jump();
        for m in 1..=200 {
            g.score = m * 100;
            g.ramp_speed();
            assert!(g.speed() <= 12.0);
        }
        assert_eq!(g.speed(), 12.0);
    }

    #[test]
    fn tick_applies_milestone() {
        let mut g = game();
        g.request_jump();
        g.score = 100;
        g.tick();
        assert_eq!(g.phase(), Phase::Running);
        assert!((g.speed() - 5.1).abs() < 1e-5);
    }

    #[test]
    fn reset_returns_to_idle_with_fresh_state() {
        let mut g = game();
        g.request_jump();
        g.request_jump();
        g.score = 250;
        g.ramp_speed();
        g.obstacles.push(Obstacle::new(110.0, ObstacleKind::Normal));
        g.tick();
        assert_eq!(g.phase(), Phase::GameOver);

        g.reset();
        assert_eq!(g.phase(), Phase::Idle);
        assert_eq!(g.score(), 0);
        assert_eq!(g.speed(), 5.0);
        assert_eq!(g.jump_count(), 0);
        assert!(g.obstacles().is_empty());
        assert_eq!(g.clouds().len(), 3);
        assert!(g.avatar().is_grounded());
        assert_eq!(g.high_score(), 250);

        assert_eq!(g.request_jump(), JumpOutcome::Started);
        g.tick();
        assert_eq!(g.obstacles().len(), 1);
    }

    #[test]
    fn same_seed_same_obstacles() {
        let config = GameConfig { spawn_delay: 10.0, spawn_jitter: 5.0, ..GameConfig::default() };
        let mut a = Game::with_seed(config.clone(), Box::new(MemoryStore::default()), 99);
        let mut b = Game::with_seed(config, Box::new(MemoryStore::default()), 99);
        a.request_jump();
        b.request_jump();
        ticks(&mut a, 100);
        ticks(&mut b, 100);

        let ka: Vec<ObstacleKind> = a.obstacles().iter().map(|o| o.kind).collect();
        let kb: Vec<ObstacleKind> = b.obstacles().iter().map(|o| o.kind).collect();
        assert!(ka.len() > 3);
        assert_eq!(ka, kb);
        assert_eq!(a.spawn_timer, b.spawn_timer);
    }

    #[test]
    fn clouds_drift_while_running() {
        let mut g = game();
        let x0 = g.clouds()[0].x;
        g.tick();
        assert_eq!(g.clouds()[0].x, x0);
        g.request_jump();
        g.tick();
        assert!(g.clouds()[0].x < x0);
    }
}
