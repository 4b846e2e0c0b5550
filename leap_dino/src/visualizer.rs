//! Software-rendered window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │   play field: 800 × 400, drawn by the game through Surface   │
//! │                                                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  status line                          Hand: detected  JUMP!  │
//! │  Score 120  Jumps 14  Speed 5.1  FPS 60        key legend    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use dino_game::surface::{Surface, TextAlign};
use dino_game::{SURFACE_H, SURFACE_W};

use crate::app::{HandStatus, HostCommand, InputAction, Orchestrator, StatusKind};
use crate::config::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const GAME_W:     usize = SURFACE_W as usize;
pub const GAME_H:     usize = SURFACE_H as usize;
pub const STATUS_H:   usize = 40;
pub const WIN_W:      usize = GAME_W;
pub const WIN_H:      usize = GAME_H + STATUS_H;
const STATUS_BG:      u32   = 0xFF263238;
const TEXT_COLOR:     u32   = 0xFFEEEEEE;
const DIM_TEXT:       u32   = 0xFF888888;
const READY_COLOR:    u32   = 0xFF81C784;
const WAITING_COLOR:  u32   = 0xFFFFC107;
const ERROR_COLOR:    u32   = 0xFFEF5350;
const FLASH_COLOR:    u32   = 0xFFFFEB3B;
const STATUS_TEXT:    f32   = 14.0;

// ════════════════════════════════════════════════════════════════════════════
// Canvas: a Surface over a plain pixel buffer
// ════════════════════════════════════════════════════════════════════════════

/// ARGB framebuffer with one pixel per logical unit.
pub struct Canvas {
    buf: Vec<u32>,
    w:   usize,
    h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![0xFF000000; w * h], w, h }
    }

    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.w && y < self.h { Some(self.buf[y * self.w + x]) } else { None }
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Write one pixel, blending when `color` is translucent.
    fn put(&mut self, x: isize, y: isize, color: u32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let idx = y as usize * self.w + x as usize;
        let alpha = color >> 24;
        self.buf[idx] = match alpha {
            0xFF => color,
            0    => self.buf[idx],
            a    => blend(self.buf[idx], color, a as f32 / 255.0),
        };
    }

    /// Clip a float rectangle to integer pixel bounds.
    fn span(&self, x: f32, y: f32, w: f32, h: f32) -> (isize, isize, isize, isize) {
        let x0 = (x.round() as isize).max(0);
        let y0 = (y.round() as isize).max(0);
        let x1 = ((x + w).round() as isize).min(self.w as isize);
        let y1 = ((y + h).round() as isize).min(self.h as isize);
        (x0, y0, x1, y1)
    }

    /// Glyph scale for a nominal text size.
    fn text_scale(size: f32) -> isize {
        ((size * 0.7) / 5.0).round().max(1.0) as isize
    }

    /// Pixel width of `text` at `size`.
    pub fn text_width(text: &str, size: f32) -> f32 {
        let scale = Self::text_scale(size);
        let n = text.chars().count() as isize;
        if n == 0 { 0.0 } else { (n * 4 * scale - scale) as f32 }
    }
}

impl Surface for Canvas {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: u32) {
        let (x0, y0, x1, y1) = self.span(x, y, w, h);
        for row in y0..y1 {
            for col in x0..x1 {
                self.put(col, row, color);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        if r <= 0.0 { return; }
        let (x0, y0, x1, y1) = self.span(cx - r, cy - r, 2.0 * r, 2.0 * r);
        let r2 = r * r;
        for row in y0..y1 {
            for col in x0..x1 {
                let dx = col as f32 + 0.5 - cx;
                let dy = row as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.put(col, row, color);
                }
            }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, scaled up to roughly `size`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: u32) {
        let scale = Self::text_scale(size);
        let left = match align {
            TextAlign::Left   => x,
            TextAlign::Center => x - Self::text_width(text, size) / 2.0,
        };
        let mut cx = left.round() as isize;
        let top = y.round() as isize - 5 * scale;

        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3isize {
                    if bits & (1 << (2 - col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                self.put(cx + col * scale + sx, top + row as isize * scale + sy, color);
                            }
                        }
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx >= self.w as isize { break; }
        }
    }

    fn fill_vertical_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, top: u32, bottom: u32) {
        let (x0, y0, x1, y1) = self.span(x, y, w, h);
        let rows = (y1 - y0).max(1);
        for row in y0..y1 {
            let t = if rows > 1 { (row - y0) as f32 / (rows - 1) as f32 } else { 0.0 };
            let color = blend(top, bottom, t);
            for col in x0..x1 {
                self.put(col, row, color);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// What the window saw since the last frame.
#[derive(Debug, Default)]
pub struct FrameInput {
    pub commands: Vec<HostCommand>,
    /// Pointer position over the play field, normalised to `[0, 1]`.
    pub pointer:  Option<(f32, f32)>,
    /// The window has keyboard focus.
    pub focused:  bool,
}

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
}

impl Visualizer {
    pub fn new() -> Result<Self, AppError> {
        let mut window = Window::new(
            "Leap Dino",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and pointer and translate them to commands.
    pub fn poll_input(&mut self) -> FrameInput {
        let mut input = FrameInput {
            focused: self.window.is_active(),
            ..FrameInput::default()
        };

        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Escape) || one_shot(Key::Q) {
            input.commands.push(HostCommand::Quit);
        }
        if one_shot(Key::Space) || one_shot(Key::Up) {
            input.commands.push(HostCommand::Action(InputAction::Jump));
        }
        if one_shot(Key::R) {
            input.commands.push(HostCommand::Action(InputAction::Restart));
        }
        if one_shot(Key::C) {
            input.commands.push(HostCommand::ToggleGestures);
        }
        if one_shot(Key::P) {
            input.commands.push(HostCommand::TogglePause);
        }

        input.pointer = self.window.get_mouse_pos(MouseMode::Discard)
            .filter(|&(_, y)| y < GAME_H as f32)
            .map(|(x, y)| (x / GAME_W as f32, y / GAME_H as f32));

        input
    }

    /// Render one frame.
    pub fn render(&mut self, orch: &Orchestrator, now: Instant) {
        draw_frame(&mut self.canvas, orch, now);
        self.window.update_with_buffer(self.canvas.pixels(), WIN_W, WIN_H).ok();
    }
}

/// Play field plus status bar.
pub fn draw_frame(canvas: &mut Canvas, orch: &Orchestrator, now: Instant) {
    canvas.clear(0xFF000000);
    orch.game().draw(canvas);

    // ── Status bar ────────────────────────────────────────────────────────
    let top = GAME_H as f32;
    canvas.fill_rect(0.0, top, WIN_W as f32, STATUS_H as f32, STATUS_BG);

    let status = orch.status();
    let status_color = match status.kind {
        StatusKind::Ready   => READY_COLOR,
        StatusKind::Waiting => WAITING_COLOR,
        StatusKind::Error   => ERROR_COLOR,
    };
    canvas.draw_text(&status.text, 8.0, top + 16.0, STATUS_TEXT, TextAlign::Left, status_color);

    let d = orch.diagnostics();
    let mut line = format!(
        "Score {}  Jumps {}  Speed {:.1}  FPS {}",
        d.score, d.jump_count, d.speed, d.fps
    );
    if !orch.is_running() {
        line.push_str("  PAUSED");
    }
    canvas.draw_text(&line, 8.0, top + 34.0, STATUS_TEXT, TextAlign::Left, TEXT_COLOR);

    // ── Hand indicator ────────────────────────────────────────────────────
    let hand = orch.hand_status(now);
    let (label, color) = match hand.hand {
        HandStatus::Off      => ("Hand: off", DIM_TEXT),
        HandStatus::NoHand   => ("Hand: none", WAITING_COLOR),
        HandStatus::Detected => ("Hand: detected", READY_COLOR),
    };
    let right = WIN_W as f32 - 8.0;
    if hand.jump_flash {
        canvas.draw_text("JUMP!", right - Canvas::text_width("JUMP!", STATUS_TEXT), top + 16.0,
                         STATUS_TEXT, TextAlign::Left, FLASH_COLOR);
    }
    let label_x = right - Canvas::text_width("JUMP!", STATUS_TEXT) - 12.0 - Canvas::text_width(label, STATUS_TEXT);
    canvas.draw_text(label, label_x, top + 16.0, STATUS_TEXT, TextAlign::Left, color);

    let legend = "Space=jump R=restart C=hand P=pause Q=quit";
    canvas.draw_text(legend, right - Canvas::text_width(legend, STATUS_TEXT), top + 34.0,
                     STATUS_TEXT, TextAlign::Left, DIM_TEXT);
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        ';' => [0b000, 0b010, 0b000, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use dino_game::{Game, GameConfig, MemoryStore};
    use dino_gesture::GestureConfig;

    #[test]
    fn fill_rect_clips_to_canvas() {
        let mut c = Canvas::new(10, 10);
        c.fill_rect(-5.0, 8.0, 20.0, 20.0, 0xFFFF0000);
        assert_eq!(c.pixel(0, 9), Some(0xFFFF0000));
        assert_eq!(c.pixel(9, 8), Some(0xFFFF0000));
        assert_eq!(c.pixel(0, 7), Some(0xFF000000));
    }

    #[test]
    fn translucent_fill_blends() {
        let mut c = Canvas::new(4, 4);
        c.clear(0xFFFFFFFF);
        c.fill_rect(0.0, 0.0, 4.0, 4.0, 0x80000000);
        let px = c.pixel(1, 1).unwrap();
        let red = (px >> 16) & 0xFF;
        assert!((120..=135).contains(&red), "red channel {}", red);
        assert_eq!(px >> 24, 0xFF);
    }

    #[test]
    fn circle_covers_centre_not_corners() {
        let mut c = Canvas::new(20, 20);
        c.fill_circle(10.0, 10.0, 5.0, 0xFF00FF00);
        assert_eq!(c.pixel(10, 10), Some(0xFF00FF00));
        assert_eq!(c.pixel(5, 5), Some(0xFF000000));
        assert_eq!(c.pixel(0, 0), Some(0xFF000000));
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let mut c = Canvas::new(2, 11);
        c.fill_vertical_gradient(0.0, 0.0, 2.0, 11.0, 0xFF000000, 0xFF0000FF);
        assert_eq!(c.pixel(0, 0), Some(0xFF000000));
        assert_eq!(c.pixel(0, 10), Some(0xFF0000FF));
        let mid = c.pixel(1, 5).unwrap() & 0xFF;
        assert!((120..=135).contains(&mid));
    }

    #[test]
    fn centred_text_straddles_anchor() {
        let mut c = Canvas::new(100, 20);
        c.draw_text("HI", 50.0, 15.0, 10.0, TextAlign::Center, 0xFFFFFFFF);
        let lit: Vec<usize> = (0..100).filter(|&x| {
            (0..20).any(|y| c.pixel(x, y) == Some(0xFFFFFFFF))
        }).collect();
        let (first, last) = (lit[0], *lit.last().unwrap());
        assert!(first < 50 && last >= 50);
        assert!(((first + last) as f32 / 2.0 - 50.0).abs() <= 2.0);
    }

    #[test]
    fn text_sits_on_baseline() {
        let mut c = Canvas::new(40, 40);
        c.draw_text("1", 0.0, 30.0, 14.0, TextAlign::Left, 0xFFFFFFFF);
        let rows: Vec<usize> = (0..40).filter(|&y| {
            (0..40).any(|x| c.pixel(x, y) == Some(0xFFFFFFFF))
        }).collect();
        assert_eq!(*rows.last().unwrap(), 29);
    }

    #[test]
    fn full_frame_draws_status_bar() {
        let game = Game::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), 1);
        let orch = Orchestrator::new(game, GestureConfig::default(), true);
        let mut c = Canvas::new(WIN_W, WIN_H);
        draw_frame(&mut c, &orch, Instant::now());
        // Bar background in an empty corner of the bar.
        assert_eq!(c.pixel(WIN_W / 2, WIN_H - 1), Some(STATUS_BG));
        // Sky at the top of the play field.
        assert_ne!(c.pixel(WIN_W / 2, 0), Some(0xFF000000));
    }
}
