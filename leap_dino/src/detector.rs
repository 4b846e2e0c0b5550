//! Hand-landmark detectors and the thread that brings one up.
//!
//! A [`LandmarkSource`] runs on its own thread, reports once whether it came
//! up, then streams one [`Observation`] per frame over a channel.  Consumers
//! don't need to know whether observations come from real hardware or the
//! pointer simulator.
//!
//! [`spawn_detector`] wraps source start-up in a retry policy and reports
//! progress as [`DetectorStatus`] messages, so the frame loop never blocks
//! waiting for a device.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;

use thiserror::Error;
use tracing::{debug, info, warn};

use dino_gesture::{HandLandmarks, Landmark, Observation, HAND_LANDMARKS};

use crate::config::DetectorPolicy;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Why the camera (or tracking device) could not be used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("no device found")]
    NoDevice,
    #[error("unsupported: {0}")]
    Unsupported(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The tracker could not start. Worth retrying.
    #[error("detector initialisation failed: {0}")]
    Init(String),
    /// The device itself is unusable. Not retried.
    #[error("camera unavailable: {0}")]
    Camera(#[from] CameraError),
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver per-frame hand observations over a channel.
pub trait LandmarkSource: Send + 'static {
    /// Short name for logs and the status line.
    fn name(&self) -> &'static str;

    /// Start up, report the outcome on `ready` exactly once, then stream
    /// observations until `tx` is closed.
    ///
    /// If the ready report cannot be delivered, nobody is waiting any more
    /// and the source must return without sending observations.
    fn run(self: Box<Self>, ready: Sender<Result<(), DetectorError>>, tx: Sender<Observation>);
}

// ════════════════════════════════════════════════════════════════════════════
// Detector supervision
// ════════════════════════════════════════════════════════════════════════════

/// Progress messages from the detector thread.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectorStatus {
    Connecting { attempt: u32, max_attempts: u32 },
    Ready { source: &'static str },
    Retrying { attempt: u32, delay_ms: u64, reason: String },
    /// The device is unusable; no retry.
    CameraFailed(CameraError),
    /// Attempts exhausted; play on with the keyboard.
    KeyboardOnly { reason: String },
}

/// The loop's end of a running detector.
pub struct DetectorLink {
    pub status:       Receiver<DetectorStatus>,
    pub observations: Receiver<Observation>,
}

/// Bring up a landmark source on a background thread.
///
/// `factory` is called once per attempt.  Each attempt waits at most
/// `policy.ready_timeout()` for the source's ready report.  Initialisation
/// failures and timeouts are retried up to `policy.max_attempts` times with
/// doubling backoff; camera failures are reported at once.
pub fn spawn_detector<F>(factory: F, policy: DetectorPolicy) -> DetectorLink
where
    F: FnMut() -> Result<Box<dyn LandmarkSource>, DetectorError> + Send + 'static,
{
    let (status_tx, status) = mpsc::channel();
    let (obs_tx, observations) = mpsc::channel();
    thread::spawn(move || supervise(factory, policy, status_tx, obs_tx));
    DetectorLink { status, observations }
}

fn supervise<F>(
    mut factory: F,
    policy:      DetectorPolicy,
    status_tx:   Sender<DetectorStatus>,
    obs_tx:      Sender<Observation>,
) where
    F: FnMut() -> Result<Box<dyn LandmarkSource>, DetectorError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut reason = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        let _ = status_tx.send(DetectorStatus::Connecting { attempt, max_attempts });

        let outcome = factory().and_then(|source| {
            let name = source.name();
            debug!(target: "detector", "starting {} (attempt {}/{})", name, attempt, max_attempts);
            let (ready_tx, ready_rx) = mpsc::channel();
            let tx = obs_tx.clone();
            thread::spawn(move || source.run(ready_tx, tx));
            match ready_rx.recv_timeout(policy.ready_timeout()) {
                Ok(Ok(()))  => Ok(name),
                Ok(Err(e))  => Err(e),
                Err(RecvTimeoutError::Timeout) => Err(DetectorError::Init(format!(
                    "{} not ready after {} ms", name, policy.ready_timeout_ms
                ))),
                Err(RecvTimeoutError::Disconnected) => Err(DetectorError::Init(format!(
                    "{} exited before reporting ready", name
                ))),
            }
        });

        match outcome {
            Ok(source) => {
                info!(target: "detector", "{} ready", source);
                let _ = status_tx.send(DetectorStatus::Ready { source });
                return;
            }
            Err(DetectorError::Camera(e)) => {
                warn!(target: "detector", "camera failure: {}", e);
                let _ = status_tx.send(DetectorStatus::CameraFailed(e));
                return;
            }
            Err(DetectorError::Init(msg)) => {
                warn!(target: "detector", "attempt {}/{} failed: {}", attempt, max_attempts, msg);
                reason = msg;
            }
        }

        if attempt < max_attempts {
            let delay = policy.backoff(attempt);
            let _ = status_tx.send(DetectorStatus::Retrying {
                attempt,
                delay_ms: delay.as_millis() as u64,
                reason:   reason.clone(),
            });
            thread::sleep(delay);
        }
    }

    warn!(target: "detector", "giving up on hand detection: {}", reason);
    let _ = status_tx.send(DetectorStatus::KeyboardOnly { reason });
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: pointer simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer input from the game window, in normalised game coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// The pointer is over the play field.
    Pointer { x: f32, y: f32 },
    /// The pointer left the play field.
    Leave,
}

/// Landmark source driven by the mouse pointer: wherever the pointer is, a
/// synthetic hand is "seen" there.  Flicking the mouse upward is a jump.
///
/// The window sends [`SimInput`] here; this translator turns it into
/// observations.  This decouples the window event loop from gesture logic.
pub struct SimLandmarkSource {
    rx: Receiver<SimInput>,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimLandmarkSource { rx }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn name(&self) -> &'static str { "pointer simulation" }

    fn run(self: Box<Self>, ready: Sender<Result<(), DetectorError>>, tx: Sender<Observation>) {
        if ready.send(Ok(())).is_err() {
            return;
        }
        for input in self.rx {
            let obs = match input {
                SimInput::Pointer { x, y } => Observation::Hand(synthetic_hand(x, y)),
                SimInput::Leave            => Observation::NoHand,
            };
            if tx.send(obs).is_err() { return; }
        }
    }
}

/// A flat, upright 21-point hand whose tracked height is exactly `y`.
pub fn synthetic_hand(x: f32, y: f32) -> HandLandmarks {
    // Wrist below the centre, fingertips above; the wrist and the two
    // tracked fingertips average back to `y`.
    const WRIST_DROP: f32 = 0.10;
    const TIP_RISE:   f32 = 0.05;
    const SPREAD:     f32 = 0.03;

    let mut points = Vec::with_capacity(HAND_LANDMARKS);
    points.push(Landmark::new(x, y + WRIST_DROP, 0.0));
    for finger in 0..5 {
        let fx = x + (finger as f32 - 2.0) * SPREAD;
        for joint in 1..=4 {
            let t = joint as f32 / 4.0;
            let fy = (y + WRIST_DROP) - t * (WRIST_DROP + TIP_RISE);
            points.push(Landmark::new(fx, fy, 0.0));
        }
    }
    HandLandmarks::from_points(points)
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Leap reports joints in millimetres above the device.  Each tracked frame
/// is mapped onto the 21-point hand model with a fixed interaction box so
/// that, as with a camera, `y` grows downward and lies in `[0, 1]`.
#[cfg(feature = "leap")]
#[derive(Default)]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn name(&self) -> &'static str { "LeapMotion" }

    fn run(self: Box<Self>, ready: Sender<Result<(), DetectorError>>, tx: Sender<Observation>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                let _ = ready.send(Err(DetectorError::Init(format!("LeapC connection: {:?}", e))));
                return;
            }
        };
        if let Err(e) = connection.open() {
            debug!(target: "detector", "LeapC open failed: {:?}", e);
            let _ = ready.send(Err(DetectorError::Camera(CameraError::NoDevice)));
            return;
        }
        if ready.send(Ok(())).is_err() {
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hand = frame.hands().next();
                let obs = match hand {
                    Some(h) => Observation::Hand(leap_hand(&h)),
                    None    => Observation::NoHand,
                };
                if tx.send(obs).is_err() { return; }
            }
        }
    }
}

/// Wrist first, then four joints per digit from thumb to little finger.
#[cfg(feature = "leap")]
fn leap_hand(hand: &leaprs::Hand) -> HandLandmarks {
    let digits: Vec<_> = hand.digits().collect();
    let mut points = Vec::with_capacity(HAND_LANDMARKS);

    let wrist = match digits.get(2) {
        Some(d) => d.metacarpal().prev_joint(),
        None    => hand.palm().position(),
    };
    points.push(leap_point(wrist.x, wrist.y, wrist.z));

    for digit in &digits {
        for joint in [
            digit.metacarpal().next_joint(),
            digit.proximal().next_joint(),
            digit.intermediate().next_joint(),
            digit.distal().next_joint(),
        ] {
            points.push(leap_point(joint.x, joint.y, joint.z));
        }
    }
    HandLandmarks::from_points(points)
}

/// Millimetres above the device → normalised image-style coordinates.
#[cfg(feature = "leap")]
fn leap_point(x: f32, y: f32, z: f32) -> Landmark {
    const HALF_WIDTH_MM: f32 = 200.0;
    const FLOOR_MM:      f32 = 100.0;
    const HEIGHT_MM:     f32 = 400.0;
    Landmark::new(
        ((x + HALF_WIDTH_MM) / (2.0 * HALF_WIDTH_MM)).clamp(0.0, 1.0),
        (1.0 - (y - FLOOR_MM) / HEIGHT_MM).clamp(0.0, 1.0),
        z / HEIGHT_MM,
    )
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
