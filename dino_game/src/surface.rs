//! The drawing seam between game state and whatever backend shows it.
//!
//! The game only ever asks for four primitives: filled rectangles, filled
//! circles, text, and a vertical gradient.  Colours are packed `0xAARRGGBB`;
//! an alpha below `0xFF` asks the backend to blend over what is already
//! there.

/// Logical surface width in units.
pub const SURFACE_W: f32 = 800.0;
/// Logical surface height in units.
pub const SURFACE_H: f32 = 400.0;

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

pub const WHITE:          u32 = 0xFFFFFFFF;
pub const BLACK:          u32 = 0xFF000000;
pub const GREEN:          u32 = 0xFF4CAF50;
pub const DARK_GREEN:     u32 = 0xFF2E7D32;
pub const RED:            u32 = 0xFFF44336;
pub const GRAY:           u32 = 0xFF757575;
pub const GROUND:         u32 = 0xFF8D6E63;
pub const GROUND_PATTERN: u32 = 0xFF6D4C41;
pub const SKY:            u32 = 0xFF87CEEB;
pub const SKY_HORIZON:    u32 = 0xFFE1F5FE;
pub const CLOUD:          u32 = 0xFFE0E0E0;
pub const SHADE_HEAVY:    u32 = 0xCC000000;  // 80% black
pub const SHADE_LIGHT:    u32 = 0x99000000;  // 60% black

/// Horizontal anchoring for [`Surface::draw_text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A 2-D drawing target of logical size [`SURFACE_W`] × [`SURFACE_H`].
pub trait Surface {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32);

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32);

    /// `y` is the text baseline; `size` is the nominal glyph height.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: u32);

    /// Fill a rectangle blending from `top` at its top edge to `bottom` at
    /// its bottom edge.
    fn fill_vertical_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, top: u32, bottom: u32);
}

// ════════════════════════════════════════════════════════════════════════════
// Recording surface (tests)
// ════════════════════════════════════════════════════════════════════════════
