//! Hand landmark data as delivered by a detector.
//!
//! Coordinates are normalised to `[0, 1]` with the origin at the top-left of
//! the camera image, so a smaller `y` means the point is higher up.  Points
//! follow the common 21-point hand model: the wrist first, then four joints
//! per finger from thumb to little finger, fingertip last.

pub const WRIST:          usize = 0;
pub const INDEX_TIP:      usize = 8;
pub const MIDDLE_TIP:     usize = 12;
/// Points in a complete hand.
pub const HAND_LANDMARKS: usize = 21;

/// One normalised point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

/// The landmark set of the single tracked hand, in model order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn from_points(points: Vec<Landmark>) -> Self {
        HandLandmarks { points }
    }

    pub fn points(&self) -> &[Landmark] { &self.points }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Mean `y` of the wrist, index fingertip and middle fingertip.
    ///
    /// `None` when any of the three is missing or not a finite number; the
    /// processor treats that frame as if no hand were visible.
    pub fn hand_height(&self) -> Option<f32> {
        let wrist  = self.get(WRIST)?.y;
        let index  = self.get(INDEX_TIP)?.y;
        let middle = self.get(MIDDLE_TIP)?.y;
        if !(wrist.is_finite() && index.is_finite() && middle.is_finite()) {
            return None;
        }
        Some((middle + index + wrist) / 3.0)
    }
}

/// What the detector saw in one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    Hand(HandLandmarks),
    NoHand,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(wrist: f32, index: f32, middle: f32) -> HandLandmarks {
        let mut pts = vec![Landmark::default(); HAND_LANDMARKS];
        pts[WRIST].y      = wrist;
        pts[INDEX_TIP].y  = index;
        pts[MIDDLE_TIP].y = middle;
        HandLandmarks::from_points(pts)
    }

    #[test]
    fn height_is_mean_of_three_points() {
        let h = hand(0.9, 0.3, 0.3).hand_height().unwrap();
        assert!((h - 0.5).abs() < 1e-6);
    }

    #[test]
    fn short_landmark_list_has_no_height() {
        let pts = vec![Landmark::new(0.5, 0.5, 0.0); 10];
        assert_eq!(HandLandmarks::from_points(pts).hand_height(), None);
    }

    #[test]
    fn non_finite_coordinate_has_no_height() {
        assert_eq!(hand(f32::NAN, 0.2, 0.2).hand_height(), None);
        assert_eq!(hand(0.2, f32::INFINITY, 0.2).hand_height(), None);
    }
}
