//! Smoothing, velocity estimation and debounced jump detection.
//!
//! Each observed frame is reduced to one "hand height".  The last few
//! heights are averaged; the drop in that average from one frame to the
//! next is the frame's movement (positive = hand moving up).  A jump fires
//! when the movement, the short-window mean of recent movements, and the
//! time since the last jump all clear their thresholds together.
//!
//! Jumps leave the processor through an mpsc channel so that whoever owns
//! the game never has to know the processor exists.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::landmarks::Observation;

// ════════════════════════════════════════════════════════════════════════════
// GestureConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Heights averaged into the smoothed position.
    pub smoothing_window:   usize,
    /// Movements averaged into the velocity estimate.
    pub velocity_window:    usize,
    /// Minimum upward movement of the smoothed height in one frame.
    pub movement_threshold: f32,
    /// Minimum averaged upward velocity.
    pub min_velocity:       f32,
    /// Quiet time after an accepted jump, in milliseconds.
    pub cooldown_ms:        u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            smoothing_window:   3,
            velocity_window:    2,
            movement_threshold: 0.035,
            min_velocity:       0.015,
            cooldown_ms:        400,
        }
    }
}

impl GestureConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// An upward flick was recognised.
    Jump {
        at:       Instant,
        /// Frame movement that crossed the threshold.
        movement: f32,
        /// Averaged velocity at the time.
        velocity: f32,
    },
}

/// A processor wired to a fresh channel, plus the receiving end.
pub fn gesture_channel(config: GestureConfig) -> (GestureProcessor, Receiver<GestureEvent>) {
    let (tx, rx) = mpsc::channel();
    (GestureProcessor::new(config, tx), rx)
}

// ════════════════════════════════════════════════════════════════════════════
// GestureProcessor
// ════════════════════════════════════════════════════════════════════════════

pub struct GestureProcessor {
    config:       GestureConfig,
    smoothing:    VecDeque<f32>,
    velocity:     VecDeque<f32>,
    previous:     Option<f32>,
    last_trigger: Option<Instant>,
    hand_visible: bool,
    tx:           Sender<GestureEvent>,
}

impl GestureProcessor {
    pub fn new(mut config: GestureConfig, tx: Sender<GestureEvent>) -> Self {
        config.smoothing_window = config.smoothing_window.max(1);
        config.velocity_window  = config.velocity_window.max(1);
        GestureProcessor {
            smoothing:    VecDeque::with_capacity(config.smoothing_window),
            velocity:     VecDeque::with_capacity(config.velocity_window),
            previous:     None,
            last_trigger: None,
            hand_visible: false,
            tx,
            config,
        }
    }

    /// Feed one frame. Returns true if a jump event was emitted.
    pub fn observe(&mut self, observation: Observation, now: Instant) -> bool {
        let height = match observation {
            Observation::Hand(hand) => {
                let h = hand.hand_height();
                if h.is_none() {
                    debug!(target: "gesture", "malformed landmarks; treating as no hand");
                }
                h
            }
            Observation::NoHand => None,
        };

        let Some(height) = height else {
            self.hand_visible = false;
            self.clear_motion();
            return false;
        };
        self.hand_visible = true;

        if self.smoothing.len() == self.config.smoothing_window {
            self.smoothing.pop_front();
        }
        self.smoothing.push_back(height);
        let smoothed = mean(&self.smoothing);

        let mut fired = false;
        if let Some(previous) = self.previous {
            if self.is_primed() {
                let movement = previous - smoothed;

                if self.velocity.len() == self.config.velocity_window {
                    self.velocity.pop_front();
                }
                self.velocity.push_back(movement);
                let velocity = mean(&self.velocity);

                trace!(target: "gesture", "movement={:.4} velocity={:.4}", movement, velocity);

                if movement > self.config.movement_threshold
                    && velocity > self.config.min_velocity
                    && self.cooled_down(now)
                {
                    self.last_trigger = Some(now);
                    fired = true;
                    debug!(target: "gesture", "jump (movement={:.3}, velocity={:.3})", movement, velocity);
                    if self.tx.send(GestureEvent::Jump { at: now, movement, velocity }).is_err() {
                        debug!(target: "gesture", "no listener for jump events");
                    }
                }
            }
        }

        self.previous = Some(smoothed);
        fired
    }

    /// Forget all motion and the cooldown. Used when the game restarts so
    /// stale motion cannot fire straight into the new run.
    pub fn reset(&mut self) {
        self.clear_motion();
        self.last_trigger = None;
    }

    /// The smoothing window is full, so movement can be judged.
    pub fn is_primed(&self) -> bool {
        self.smoothing.len() == self.config.smoothing_window
    }

    /// Current smoothed hand height, if any frame is buffered.
    pub fn smoothed(&self) -> Option<f32> {
        if self.smoothing.is_empty() { None } else { Some(mean(&self.smoothing)) }
    }

    /// The last observed frame contained a usable hand.
    pub fn is_hand_visible(&self) -> bool { self.hand_visible }

    pub fn config(&self) -> &GestureConfig { &self.config }

    fn clear_motion(&mut self) {
        self.smoothing.clear();
        self.velocity.clear();
        self.previous = None;
    }

    fn cooled_down(&self, now: Instant) -> bool {
        match self.last_trigger {
            None       => true,
            Some(last) => now.saturating_duration_since(last) > self.config.cooldown(),
        }
    }
}

fn mean(values: &VecDeque<f32>) -> f32 {
    values.iter().sum::<f32>() / values.len().max(1) as f32
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{HandLandmarks, Landmark, HAND_LANDMARKS};

    const FRAME: Duration = Duration::from_millis(16);

    fn hand_at(y: f32) -> Observation {
        let pts = (0..HAND_LANDMARKS).map(|_| Landmark::new(0.5, y, 0.0)).collect();
        Observation::Hand(HandLandmarks::from_points(pts))
    }

    /// Feeds `heights` one frame apart starting at `start`; returns the time
    /// of the frame after the last one.
    fn feed(p: &mut GestureProcessor, heights: &[f32], start: Instant) -> Instant {
        let mut t = start;
        for &y in heights {
            p.observe(hand_at(y), t);
            t += FRAME;
        }
        t
    }

    #[test]
    fn flat_then_upward_step_fires_once() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        feed(&mut p, &[0.5, 0.5, 0.5, 0.2], Instant::now());
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            GestureEvent::Jump { movement, velocity, .. } => {
                assert!((movement - 0.1).abs() < 1e-5);
                assert!((velocity - 0.05).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn repeated_sequence_inside_cooldown_fires_once() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let seq = [0.5, 0.5, 0.5, 0.5, 0.2];
        let t = feed(&mut p, &seq, Instant::now());
        feed(&mut p, &seq, t);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn repeated_sequence_after_cooldown_fires_twice() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let seq = [0.5, 0.5, 0.5, 0.5, 0.2];
        let t = feed(&mut p, &seq, Instant::now());
        feed(&mut p, &seq, t + Duration::from_millis(500));
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn no_decision_until_window_full() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let t0 = Instant::now();
        assert!(!p.observe(hand_at(0.9), t0));
        assert!(!p.observe(hand_at(0.1), t0 + FRAME));
        assert!(!p.is_primed());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn no_hand_forces_a_fresh_window() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let t = feed(&mut p, &[0.5, 0.5, 0.5], Instant::now());
        assert!(p.is_primed());

        p.observe(Observation::NoHand, t);
        assert!(!p.is_primed());
        assert_eq!(p.smoothed(), None);
        assert!(!p.is_hand_visible());

        // The same upward step that would fire on a primed window now waits
        // for a full window.
        assert!(!p.observe(hand_at(0.5), t + FRAME));
        assert!(!p.observe(hand_at(0.5), t + FRAME * 2));
        assert!(p.observe(hand_at(0.2), t + FRAME * 3));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn no_hand_keeps_cooldown() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let t = feed(&mut p, &[0.5, 0.5, 0.5, 0.2], Instant::now());
        p.observe(Observation::NoHand, t);
        feed(&mut p, &[0.5, 0.5, 0.2], t + FRAME);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn reset_clears_cooldown() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        let t = feed(&mut p, &[0.5, 0.5, 0.5, 0.2], Instant::now());
        p.reset();
        assert!(!p.is_primed());
        feed(&mut p, &[0.5, 0.5, 0.2], t);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn small_motion_is_ignored() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        feed(&mut p, &[0.5, 0.5, 0.5, 0.48, 0.46, 0.44, 0.42], Instant::now());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn downward_motion_is_ignored() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        feed(&mut p, &[0.2, 0.2, 0.2, 0.9, 0.9], Instant::now());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn malformed_frame_acts_like_no_hand() {
        let (mut p, _rx) = gesture_channel(GestureConfig::default());
        let t = feed(&mut p, &[0.5, 0.5, 0.5], Instant::now());
        let broken = Observation::Hand(HandLandmarks::from_points(vec![Landmark::default(); 4]));
        assert!(!p.observe(broken, t));
        assert!(!p.is_primed());
        assert!(!p.is_hand_visible());
    }

    #[test]
    fn dropped_listener_is_harmless() {
        let (mut p, rx) = gesture_channel(GestureConfig::default());
        drop(rx);
        let t0 = Instant::now();
        for (i, y) in [0.5, 0.5, 0.5, 0.2].into_iter().enumerate() {
            p.observe(hand_at(y), t0 + FRAME * i as u32);
        }
        assert!(p.smoothed().is_some());
    }
}
