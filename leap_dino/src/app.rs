//! Top-level orchestration.
//!
//! `Orchestrator` owns the `Game`, the `GestureProcessor` and the frame
//! scheduler.  Keyboard commands and gesture jumps both land in one pending
//! action slot, consumed once per frame, so the game cannot tell where a
//! jump came from.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use dino_game::{Game, JsonFileStore, JumpOutcome, Phase};
use dino_gesture::{gesture_channel, GestureConfig, GestureEvent, GestureProcessor, Observation};

use crate::config::{AppConfig, AppError};
use crate::detector::{spawn_detector, DetectorError, DetectorStatus, LandmarkSource, SimInput};
use crate::frame_loop::{FpsMeter, FrameHandle, FrameScheduler};
use crate::visualizer::Visualizer;

/// How long the "JUMP!" marker stays up after a gesture jump.
pub const JUMP_FLASH: Duration = Duration::from_millis(300);
/// How often the frame rate is checked for the low-performance warning.
pub const LOW_FPS_INTERVAL: Duration = Duration::from_secs(5);
/// Below this the player is warned, once.
pub const LOW_FPS: u32 = 30;

// ════════════════════════════════════════════════════════════════════════════
// Inputs
// ════════════════════════════════════════════════════════════════════════════

/// A request for the game, from any input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Jump,
    Restart,
}

/// Everything the window can ask of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Action(InputAction),
    ToggleGestures,
    TogglePause,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Host-facing state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Ready,
    Waiting,
    Error,
}

/// The one-line message shown under the play field.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandStatus {
    /// Gesture control is off or no detector is running.
    Off,
    NoHand,
    Detected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandIndicator {
    pub hand:       HandStatus,
    /// A gesture jump fired within the last [`JUMP_FLASH`].
    pub jump_flash: bool,
}

/// Read-only snapshot for the host UI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Diagnostics {
    pub score:      u32,
    pub jump_count: u32,
    /// Rounded to one decimal.
    pub speed:      f32,
    pub fps:        u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DetectorState {
    Starting,
    Active,
    Unavailable,
}

// ════════════════════════════════════════════════════════════════════════════
// LowFpsMonitor
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct LowFpsMonitor {
    next_check: Option<Instant>,
    reported:   bool,
}

impl LowFpsMonitor {
    /// True exactly once: the first periodic check that sees a frame rate
    /// in `(0, LOW_FPS)`.
    fn check(&mut self, fps: u32, now: Instant) -> bool {
        if self.reported {
            return false;
        }
        let due = *self.next_check.get_or_insert(now + LOW_FPS_INTERVAL);
        if now < due {
            return false;
        }
        self.next_check = Some(now + LOW_FPS_INTERVAL);
        if fps > 0 && fps < LOW_FPS {
            self.reported = true;
            return true;
        }
        false
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Orchestrator
// ════════════════════════════════════════════════════════════════════════════

pub struct Orchestrator {
    // ── game and gesture ─────────────────────────────────────────────────
    game:             Game,
    processor:        GestureProcessor,
    gestures:         Receiver<GestureEvent>,
    gestures_enabled: bool,
    detector:         DetectorState,

    // ── scheduling ───────────────────────────────────────────────────────
    scheduler:        FrameScheduler,
    handle:           FrameHandle,
    fps:              FpsMeter,
    low_fps:          LowFpsMonitor,

    // ── input ────────────────────────────────────────────────────────────
    pending:          Option<InputAction>,

    // ── host display ─────────────────────────────────────────────────────
    status:           StatusLine,
    jump_flash_until: Option<Instant>,
}

impl Orchestrator {
    pub fn new(game: Game, gesture: GestureConfig, gestures_enabled: bool) -> Self {
        let (processor, gestures) = gesture_channel(gesture);
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.start();
        Orchestrator {
            game,
            processor,
            gestures,
            gestures_enabled,
            detector:         DetectorState::Starting,
            scheduler,
            handle,
            fps:              FpsMeter::new(),
            low_fps:          LowFpsMonitor::default(),
            pending:          None,
            status: StatusLine {
                kind: StatusKind::Waiting,
                text: "Press SPACE to jump and start!".to_string(),
            },
            jump_flash_until: None,
        }
    }

    // ── input ────────────────────────────────────────────────────────────

    /// Queue an action for the next frame.  A pending restart wins over a
    /// jump; anything else replaces what was pending.
    pub fn request(&mut self, action: InputAction) {
        match (self.pending, action) {
            (Some(InputAction::Restart), InputAction::Jump) => {}
            _ => self.pending = Some(action),
        }
    }

    /// Feed one detector frame to the gesture processor.
    pub fn observe(&mut self, observation: Observation, now: Instant) {
        if !self.gestures_enabled || !self.scheduler.is_running() {
            return;
        }
        self.processor.observe(observation, now);
    }

    // ── frame ────────────────────────────────────────────────────────────

    /// Run one frame: gesture events → pending slot → game → tick → FPS.
    /// Returns false, having done nothing, while paused.
    pub fn frame(&mut self, now: Instant) -> bool {
        if !self.scheduler.is_current(self.handle) {
            return false;
        }

        while let Ok(GestureEvent::Jump { at, .. }) = self.gestures.try_recv() {
            self.jump_flash_until = Some(at + JUMP_FLASH);
            self.request(InputAction::Jump);
        }

        let before = self.game.phase();
        if let Some(action) = self.pending.take() {
            self.apply(action);
        }
        self.game.tick();
        self.note_phase_change(before);

        self.fps.frame(now);
        if self.low_fps.check(self.fps.fps(), now) {
            warn!(target: "loop", "low frame rate: {} fps", self.fps.fps());
            self.set_status(
                StatusKind::Error,
                "Low performance detected. Consider closing other applications.",
            );
        }
        true
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::Jump => {
                if self.game.request_jump() == JumpOutcome::Refused {
                    debug!(target: "loop", "jump refused in {:?}", self.game.phase());
                }
            }
            InputAction::Restart => self.restart(),
        }
    }

    fn note_phase_change(&mut self, before: Phase) {
        match (before, self.game.phase()) {
            (Phase::Idle, Phase::Running) => {
                self.set_status(StatusKind::Ready, "Game started! Jump over the obstacles!");
            }
            (Phase::Running, Phase::GameOver) => {
                let text = format!("Game over! Score {}. Press R to restart", self.game.score());
                self.set_status(StatusKind::Error, text);
            }
            _ => {}
        }
    }

    // ── lifecycle ────────────────────────────────────────────────────────

    /// Stop scheduling frames.  Game state is left exactly as it was.
    pub fn pause(&mut self) {
        if self.scheduler.is_running() {
            self.scheduler.stop();
            self.processor.reset();
            info!(target: "loop", "paused");
        }
    }

    /// Schedule frames again from now on; skipped time is not replayed.
    pub fn resume(&mut self) {
        if !self.scheduler.is_running() {
            self.handle = self.scheduler.start();
            self.fps.restart();
            info!(target: "loop", "resumed");
        }
    }

    pub fn is_running(&self) -> bool { self.scheduler.is_running() }

    /// Reset the game and the gesture state, dropping any queued input.
    pub fn restart(&mut self) {
        self.game.reset();
        self.processor.reset();
        while self.gestures.try_recv().is_ok() {}
        self.pending = None;
        self.jump_flash_until = None;
        self.set_status(
            StatusKind::Waiting,
            "Game reset! Raise your hand or press SPACE to jump and start!",
        );
    }

    /// Switch gesture control on or off.  Returns the new setting.
    pub fn toggle_gestures(&mut self) -> bool {
        self.gestures_enabled = !self.gestures_enabled;
        self.processor.reset();
        while self.gestures.try_recv().is_ok() {}

        if self.gestures_enabled {
            info!(target: "gesture", "gesture control on");
            match self.detector {
                DetectorState::Active => self.set_status(StatusKind::Ready, "Gesture control enabled"),
                _ => self.set_status(StatusKind::Waiting, "Gesture control enabled; no hand detector running"),
            }
        } else {
            info!(target: "gesture", "gesture control off");
            self.set_status(StatusKind::Waiting, "Gesture control disabled - using keyboard controls only");
        }
        self.gestures_enabled
    }

    // ── detector ─────────────────────────────────────────────────────────

    pub fn apply_detector_status(&mut self, status: DetectorStatus) {
        match status {
            DetectorStatus::Connecting { attempt, max_attempts } => {
                self.detector = DetectorState::Starting;
                self.set_status(
                    StatusKind::Waiting,
                    format!("Starting hand detection (attempt {}/{})", attempt, max_attempts),
                );
            }
            DetectorStatus::Ready { source } => {
                self.detector = DetectorState::Active;
                if self.gestures_enabled {
                    self.set_status(
                        StatusKind::Ready,
                        format!("Hand tracking ready ({}). Raise your hand to jump!", source),
                    );
                } else {
                    self.set_status(StatusKind::Waiting, "Hand tracking ready; gesture control is off (C)");
                }
            }
            DetectorStatus::Retrying { delay_ms, reason, .. } => {
                self.set_status(
                    StatusKind::Waiting,
                    format!("Hand detection failed ({}); retrying in {} ms", reason, delay_ms),
                );
            }
            DetectorStatus::CameraFailed(e) => {
                self.detector = DetectorState::Unavailable;
                self.set_status(
                    StatusKind::Error,
                    format!("Camera unavailable ({}). Keyboard controls only", e),
                );
            }
            DetectorStatus::KeyboardOnly { .. } => {
                self.detector = DetectorState::Unavailable;
                self.set_status(StatusKind::Waiting, "Keyboard-only mode. Press SPACE to jump!");
            }
        }
    }

    /// The observation stream closed.  Only matters once tracking was up.
    pub fn detector_disconnected(&mut self) {
        if self.detector == DetectorState::Active {
            warn!(target: "detector", "hand detector stopped");
            self.detector = DetectorState::Unavailable;
            self.processor.reset();
            self.set_status(StatusKind::Error, "Hand detection lost - using keyboard controls");
        }
    }

    // ── accessors ────────────────────────────────────────────────────────

    pub fn game(&self) -> &Game { &self.game }

    pub fn status(&self) -> &StatusLine { &self.status }

    pub fn gestures_enabled(&self) -> bool { self.gestures_enabled }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            score:      self.game.score(),
            jump_count: self.game.jump_count(),
            speed:      (self.game.speed() * 10.0).round() / 10.0,
            fps:        self.fps.fps(),
        }
    }

    pub fn hand_status(&self, now: Instant) -> HandIndicator {
        let hand = if !self.gestures_enabled || self.detector != DetectorState::Active {
            HandStatus::Off
        } else if self.processor.is_hand_visible() {
            HandStatus::Detected
        } else {
            HandStatus::NoHand
        };
        HandIndicator {
            hand,
            jump_flash: self.jump_flash_until.is_some_and(|until| now < until),
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        let text = text.into();
        debug!(target: "loop", "status [{:?}] {}", kind, text);
        self.status = StatusLine { kind, text };
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the window,
/// the landmark detector (pointer simulation by default, hardware with
/// `--features leap`), and drives the input/update/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let store = Box::new(JsonFileStore::new(&cfg.high_score_path));
    let game = match cfg.seed {
        Some(seed) => Game::with_seed(cfg.game.clone(), store, seed),
        None       => Game::new(cfg.game.clone(), store),
    };
    let mut orch = Orchestrator::new(game, cfg.gesture.clone(), cfg.gesture_enabled);

    // ── Detector ──────────────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let link = spawn_detector(source_factory(sim_rx), cfg.detector.clone());
    let detector_status  = link.status;
    let mut observations = Some(link.observations);

    // ── Window ────────────────────────────────────────────────────────────
    let mut vis = Visualizer::new()?;
    let mut user_paused = false;
    info!(target: "loop", "window open");

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        let now = Instant::now();

        // 1. Window input
        let input = vis.poll_input();
        for cmd in input.commands {
            match cmd {
                HostCommand::Quit           => return Ok(()),
                HostCommand::Action(action) => orch.request(action),
                HostCommand::ToggleGestures => { orch.toggle_gestures(); }
                HostCommand::TogglePause    => user_paused = !user_paused,
            }
        }

        let should_run = input.focused && !user_paused;
        if should_run && !orch.is_running() {
            orch.resume();
        } else if !should_run && orch.is_running() {
            orch.pause();
        }

        // 2. Pointer → simulated detector
        let sim = match input.pointer {
            Some((x, y)) => SimInput::Pointer { x, y },
            None         => SimInput::Leave,
        };
        let _ = sim_tx.send(sim);

        // 3. Detector status and observations
        while let Ok(status) = detector_status.try_recv() {
            orch.apply_detector_status(status);
        }
        let mut lost = false;
        if let Some(rx) = &observations {
            loop {
                match rx.try_recv() {
                    Ok(obs)                         => orch.observe(obs, now),
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => { lost = true; break; }
                }
            }
        }
        if lost {
            orch.detector_disconnected();
            observations = None;
        }

        // 4. Game frame
        orch.frame(now);

        // 5. Render
        vis.render(&orch, now);
    }

    Ok(())
}

#[cfg(not(feature = "leap"))]
fn source_factory(
    sim_rx: Receiver<SimInput>,
) -> impl FnMut() -> Result<Box<dyn LandmarkSource>, DetectorError> + Send + 'static {
    let mut feed = Some(sim_rx);
    move || {
        feed.take()
            .map(|rx| Box::new(crate::detector::SimLandmarkSource::new(rx)) as Box<dyn LandmarkSource>)
            .ok_or_else(|| DetectorError::Init("pointer feed already in use".to_string()))
    }
}

#[cfg(feature = "leap")]
fn source_factory(
    _sim_rx: Receiver<SimInput>,
) -> impl FnMut() -> Result<Box<dyn LandmarkSource>, DetectorError> + Send + 'static {
    || Ok(Box::new(crate::detector::LeapLandmarkSource) as Box<dyn LandmarkSource>)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
