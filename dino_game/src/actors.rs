//! Moving rectangles: the avatar, obstacles, and background clouds.
//!
//! Each actor knows how to advance itself and how to draw itself onto a
//! [`Surface`]; none of them know about score, speed ramps, or phases.

use rand::Rng;

use crate::collision::{Inset, Rect};
use crate::surface::{Surface, BLACK, CLOUD, DARK_GREEN, GREEN, SURFACE_W};

/// y of the ground line.
pub const GROUND_Y:       f32 = 350.0;
pub const AVATAR_X:       f32 = 100.0;
pub const AVATAR_SIZE:    f32 = 60.0;
pub const OBSTACLE_W:     f32 = 30.0;
pub const OBSTACLE_H:     f32 = 60.0;
/// Extra height of the tall obstacle variant.
pub const TALL_EXTRA_H:   f32 = 20.0;

const AVATAR_INSET: Inset = Inset { left: 5.0, right: 5.0, top: 5.0, bottom: 0.0 };
const OBSTACLE_INSET: Inset = Inset::horizontal(5.0);

// ════════════════════════════════════════════════════════════════════════════
// Avatar
// ════════════════════════════════════════════════════════════════════════════

/// The player-controlled jumping figure.
#[derive(Clone, Debug)]
pub struct Avatar {
    pub x:          f32,
    pub y:          f32,
    pub size:       f32,
    pub velocity_y: f32,
    pub ground_y:   f32,
    airborne:       bool,
    gravity:        f32,
    jump_strength:  f32,
    anim_frame:     u32,
}

impl Avatar {
    /// A grounded avatar. `jump_strength` is the (negative) launch velocity.
    pub fn new(gravity: f32, jump_strength: f32) -> Self {
        let ground_y = GROUND_Y - AVATAR_SIZE;
        Avatar {
            x:             AVATAR_X,
            y:             ground_y,
            size:          AVATAR_SIZE,
            velocity_y:    0.0,
            ground_y,
            airborne:      false,
            gravity,
            jump_strength,
            anim_frame:    0,
        }
    }

    pub fn is_grounded(&self) -> bool { !self.airborne }

    /// Launch if grounded. Returns false (and leaves velocity alone) when
    /// already in the air.
    pub fn jump(&mut self) -> bool {
        if self.airborne {
            return false;
        }
        self.velocity_y = self.jump_strength;
        self.airborne = true;
        true
    }

    /// One tick of vertical motion.
    pub fn update(&mut self) {
        if self.airborne {
            self.y += self.velocity_y;
            self.velocity_y += self.gravity;

            if self.y >= self.ground_y {
                self.y = self.ground_y;
                self.velocity_y = 0.0;
                self.airborne = false;
            }
        }
        self.anim_frame = self.anim_frame.wrapping_add(1);
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    /// Bounds shrunk on the left, right and top so near-misses stay misses.
    pub fn hit_box(&self) -> Rect {
        self.bounds().inset(AVATAR_INSET)
    }

    pub fn draw(&self, s: &mut dyn Surface) {
        let (x, y, w, h) = (self.x, self.y, self.size, self.size);

        // body, head, tail
        s.fill_rect(x + 15.0, y + 20.0, w - 25.0, h - 25.0, GREEN);
        s.fill_rect(x,        y,        35.0,     30.0,     GREEN);
        s.fill_rect(x + 45.0, y + 35.0, 15.0,     20.0,     GREEN);

        // legs alternate while running, freeze mid-air
        let leg = if self.airborne { 0.0 } else { ((self.anim_frame / 10) % 2) as f32 * 3.0 };
        s.fill_rect(x + 20.0, y + 45.0, 8.0, 15.0 + leg, GREEN);
        s.fill_rect(x + 35.0, y + 45.0, 8.0, 15.0 - leg, GREEN);

        s.fill_rect(x + 8.0, y + 8.0, 6.0, 6.0, BLACK);

        s.fill_rect(x + 2.0,  y + 2.0,  31.0,     4.0, DARK_GREEN);
        s.fill_rect(x + 17.0, y + 22.0, w - 27.0, 4.0, DARK_GREEN);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Obstacle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    Normal,
    Tall,
}

impl ObstacleKind {
    pub fn height(self) -> f32 {
        match self {
            ObstacleKind::Normal => OBSTACLE_H,
            ObstacleKind::Tall   => OBSTACLE_H + TALL_EXTRA_H,
        }
    }
}

/// A scrolling hazard standing on the ground line.
#[derive(Clone, Debug)]
pub struct Obstacle {
    pub x:     f32,
    pub y:     f32,
    pub w:     f32,
    pub h:     f32,
    pub kind:  ObstacleKind,
}

impl Obstacle {
    pub fn new(x: f32, kind: ObstacleKind) -> Self {
        let h = kind.height();
        Obstacle { x, y: GROUND_Y - h, w: OBSTACLE_W, h, kind }
    }

    pub fn update(&mut self, speed: f32) {
        self.x -= speed;
    }

    /// Fully past the left edge.
    pub fn is_off_screen(&self) -> bool {
        self.x + self.w < 0.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn hit_box(&self) -> Rect {
        self.bounds().inset(OBSTACLE_INSET)
    }

    pub fn draw(&self, s: &mut dyn Surface) {
        let (x, y, h) = (self.x, self.y, self.h);

        s.fill_rect(x + 12.0, y, 6.0, h, GREEN);
        match self.kind {
            ObstacleKind::Tall => {
                s.fill_rect(x + 5.0,  y + 15.0, 12.0, 6.0, GREEN);
                s.fill_rect(x + 18.0, y + 25.0, 12.0, 6.0, GREEN);
            }
            ObstacleKind::Normal => {
                s.fill_rect(x + 5.0,  y + 20.0, 10.0, 6.0, GREEN);
                s.fill_rect(x + 18.0, y + 30.0, 10.0, 6.0, GREEN);
            }
        }
        s.fill_rect(x + 13.0, y + 2.0, 2.0, h - 4.0, DARK_GREEN);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Cloud
// ════════════════════════════════════════════════════════════════════════════

/// Decorative background puff. Never collides.
#[derive(Clone, Debug)]
pub struct Cloud {
    pub x:     f32,
    pub y:     f32,
    pub speed: f32,
    pub size:  f32,
}

impl Cloud {
    pub fn spawn<R: Rng + ?Sized>(x: f32, rng: &mut R) -> Self {
        Cloud {
            x,
            y:     50.0 + rng.random::<f32>() * 100.0,
            speed: 1.0  + rng.random::<f32>() * 2.0,
            size:  20.0 + rng.random::<f32>() * 15.0,
        }
    }

    /// The three clouds a fresh run starts with, spaced off the right edge.
    pub fn initial_bank<R: Rng + ?Sized>(rng: &mut R) -> Vec<Cloud> {
        (0..3).map(|i| Cloud::spawn(SURFACE_W + i as f32 * 200.0, rng)).collect()
    }

    pub fn update(&mut self) {
        self.x -= self.speed;
    }

    pub fn is_off_screen(&self) -> bool {
        self.x + self.size * 2.0 < 0.0
    }

    pub fn draw(&self, s: &mut dyn Surface) {
        s.fill_circle(self.x,                    self.y, self.size,       CLOUD);
        s.fill_circle(self.x + self.size * 0.7,  self.y, self.size * 0.8, CLOUD);
        s.fill_circle(self.x + self.size * 1.2,  self.y, self.size * 0.9, CLOUD);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
