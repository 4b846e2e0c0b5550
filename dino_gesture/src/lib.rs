//! # dino_gesture
//!
//! A hand-landmark stream in, discrete jump events out.
//!
//! The detector itself lives elsewhere; this crate only sees one
//! [`Observation`] per frame.  [`GestureProcessor`] smooths the hand height,
//! estimates its upward velocity, and sends a [`GestureEvent::Jump`] down a
//! channel when a deliberate upward flick is seen, at most once per cooldown.
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use dino_gesture::{gesture_channel, GestureConfig, HandLandmarks, Landmark, Observation};
//!
//! let (mut processor, jumps) = gesture_channel(GestureConfig::default());
//! let hand = |y: f32| Observation::Hand(HandLandmarks::from_points(vec![Landmark::new(0.5, y, 0.0); 21]));
//!
//! let t0 = Instant::now();
//! for (i, y) in [0.6, 0.6, 0.6, 0.2].into_iter().enumerate() {
//!     processor.observe(hand(y), t0 + Duration::from_millis(33 * i as u64));
//! }
//! assert_eq!(jumps.try_iter().count(), 1);
//! ```

pub mod landmarks;
pub mod processor;

pub use landmarks::{HandLandmarks, Landmark, Observation, HAND_LANDMARKS, INDEX_TIP, MIDDLE_TIP, WRIST};
pub use processor::{gesture_channel, GestureConfig, GestureEvent, GestureProcessor};
