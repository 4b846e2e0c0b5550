//! Axis-aligned bounding boxes and the overlap test.

/// An axis-aligned rectangle in surface units, origin at the top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Amount shaved off each side of a nominal bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Inset {
    pub left:   f32,
    pub right:  f32,
    pub top:    f32,
    pub bottom: f32,
}

impl Inset {
    /// Inset only the horizontal extent.
    pub const fn horizontal(amount: f32) -> Self {
        Inset { left: amount, right: amount, top: 0.0, bottom: 0.0 }
    }
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn right(&self)  -> f32 { self.x + self.w }
    pub fn bottom(&self) -> f32 { self.y + self.h }

    /// Shrink the box by `inset`. Width and height never go negative.
    pub fn inset(&self, inset: Inset) -> Rect {
        Rect {
            x: self.x + inset.left,
            y: self.y + inset.top,
            w: (self.w - inset.left - inset.right).max(0.0),
            h: (self.h - inset.top - inset.bottom).max(0.0),
        }
    }
}

/// Four-inequality AABB test. Boxes that only touch along an edge do not
/// overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right()
        && a.right() > b.x
        && a.y < b.bottom()
        && a.bottom() > b.y
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0,  0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn one_unit_overlap_collides() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(9.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn vertical_touch_does_not_overlap() {
        let a = Rect::new(0.0, 0.0,  10.0, 10.0);
        let b = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn containment_overlaps() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn inset_turns_overlap_into_miss() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(8.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &b));
        let b = b.inset(Inset::horizontal(3.0));
        assert_eq!(b, Rect::new(11.0, 0.0, 4.0, 10.0));
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn inset_clamps_to_zero_size() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0).inset(Inset {
            left: 3.0, right: 3.0, top: 3.0, bottom: 3.0,
        });
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 0.0);
    }
}
