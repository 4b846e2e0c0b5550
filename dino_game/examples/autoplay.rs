//! Headless run with a naive bot that jumps whenever an obstacle gets close.

use dino_game::{Game, GameConfig, MemoryStore, Phase};

fn main() {
    let seed = std::env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(2024);
    let mut game = Game::with_seed(GameConfig::default(), Box::new(MemoryStore::default()), seed);

    println!("\n=== dino_game autoplay (seed {}) ===\n", seed);

    game.request_jump();
    let mut ticks = 0u64;
    while game.phase() == Phase::Running && ticks < 20_000 {
        let ax = game.avatar().x;
        // Launch lead grows with speed so the arc is centred on the obstacle.
        let lead = game.speed() * 9.0;
        let near = game.obstacles().iter().any(|o| {
            let gap = o.x - ax;
            gap > 0.0 && gap < lead
        });
        if near {
            game.request_jump();
        }
        game.tick();
        ticks += 1;

        if ticks % 600 == 0 {
            println!("   t={:>5}  score={:>4}  speed={:.1}  jumps={}",
                ticks, game.score(), game.speed(), game.jump_count());
        }
    }

    println!();
    println!("   Finished after {} ticks: score {}, {} jumps, top speed {:.1}",
        ticks, game.score(), game.jump_count(), game.speed());
}
