//! Scene composition: background, actors, HUD, and the phase overlay.

use crate::actors::GROUND_Y;
use crate::game::{Game, Phase};
use crate::surface::{
    Surface, TextAlign, BLACK, GROUND, GROUND_PATTERN, SHADE_HEAVY, SHADE_LIGHT, SKY,
    SKY_HORIZON, SURFACE_H, SURFACE_W, WHITE,
};

/// Draw one complete frame of `game` onto `s`.
pub fn draw_scene(game: &Game, s: &mut dyn Surface) {
    s.fill_vertical_gradient(0.0, 0.0, SURFACE_W, SURFACE_H, SKY, SKY_HORIZON);

    for cloud in game.clouds() {
        cloud.draw(s);
    }

    draw_ground(s);

    game.avatar().draw(s);
    for obstacle in game.obstacles() {
        obstacle.draw(s);
    }

    draw_hud(game, s);

    match game.phase() {
        Phase::Idle     => draw_title(s),
        Phase::GameOver => draw_game_over(game, s),
        Phase::Running  => {}
    }
}

fn draw_ground(s: &mut dyn Surface) {
    let depth = SURFACE_H - GROUND_Y;
    s.fill_rect(0.0, GROUND_Y, SURFACE_W, depth, GROUND);

    let mut x = 0.0;
    while x < SURFACE_W {
        s.fill_rect(x, GROUND_Y, 2.0, depth, GROUND_PATTERN);
        x += 20.0;
    }
}

fn draw_hud(game: &Game, s: &mut dyn Surface) {
    s.draw_text(&format!("Score: {}", game.score()), 20.0, 40.0, 24.0, TextAlign::Left, BLACK);
    s.draw_text(&format!("High Score: {}", game.high_score()), 20.0, 70.0, 24.0, TextAlign::Left, BLACK);
}

fn draw_title(s: &mut dyn Surface) {
    let cx = SURFACE_W / 2.0;
    let cy = SURFACE_H / 2.0;

    s.fill_rect(0.0, 0.0, SURFACE_W, SURFACE_H, SHADE_LIGHT);
    s.draw_text("Dinosaur Game",               cx, cy - 60.0, 36.0, TextAlign::Center, WHITE);
    s.draw_text("Raise your hand up to jump!", cx, cy - 20.0, 20.0, TextAlign::Center, WHITE);
    s.draw_text("Or press SPACEBAR",           cx, cy + 10.0, 20.0, TextAlign::Center, WHITE);
    s.draw_text("Jump to start!",              cx, cy + 50.0, 20.0, TextAlign::Center, WHITE);
}

fn draw_game_over(game: &Game, s: &mut dyn Surface) {
    let cx = SURFACE_W / 2.0;
    let cy = SURFACE_H / 2.0;

    s.fill_rect(0.0, 0.0, SURFACE_W, SURFACE_H, SHADE_HEAVY);
    s.draw_text("GAME OVER", cx, cy - 50.0, 48.0, TextAlign::Center, WHITE);
    s.draw_text(&format!("Final Score: {}", game.score()),     cx, cy,        24.0, TextAlign::Center, WHITE);
    s.draw_text(&format!("High Score: {}", game.high_score()), cx, cy + 30.0, 24.0, TextAlign::Center, WHITE);
    s.draw_text("Press R to restart",                          cx, cy + 70.0, 24.0, TextAlign::Center, WHITE);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
