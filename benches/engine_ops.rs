use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use grid2048::{Game, Grid, Move};
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Grid> {
    let mut game = Game::seeded(42);
    let mut grids = vec![Grid::EMPTY, *game.grid()];
    // Derive a variety of densities deterministically
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..20 {
        game.slide(seq[i % seq.len()]);
        if !game.add_tile() {
            game.reset();
        }
        grids.push(*game.grid());
    }
    grids
}

fn bench_slide(c: &mut Criterion) {
    let mut games: Vec<_> = corpus()
        .into_iter()
        .map(|g| {
            let game = Game::with_grid(g, StdRng::seed_from_u64(0));
            let start = game.save();
            (game, start)
        })
        .collect();
    for dir in [Move::Left, Move::Right, Move::Up, Move::Down] {
        c.bench_function(&format!("slide/{dir}"), |bch| {
            bch.iter(|| {
                let mut acc = 0u8;
                for (game, start) in games.iter_mut() {
                    game.restore(start);
                    game.slide(dir);
                    acc ^= game.max_value();
                }
                black_box(acc)
            })
        });
    }
}

fn bench_transforms(c: &mut Criterion) {
    let grids = corpus();
    c.bench_function("grid/flip_all", |bch| {
        bch.iter(|| {
            let mut acc = 0u8;
            for g in &grids {
                acc ^= g.flip(true, true, true).cells()[0];
            }
            black_box(acc)
        })
    });
    c.bench_function("grid/heavy_side_flip", |bch| {
        bch.iter(|| {
            let mut acc = 0u8;
            for g in &grids {
                acc ^= g.heavy_side_flip().cells()[0];
            }
            black_box(acc)
        })
    });
}

fn bench_spawn_and_lookahead(c: &mut Criterion) {
    c.bench_function("game/add_tile_until_full", |bch| {
        bch.iter_batched(
            || Game::with_grid(Grid::EMPTY, StdRng::seed_from_u64(7)),
            |mut game| {
                while game.add_tile() {}
                black_box(game.max_value())
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("game/save_slide_restore", |bch| {
        let mut game = Game::seeded(9);
        bch.iter(|| {
            let checkpoint = game.save();
            for dir in Move::ACTIONS {
                game.slide(dir);
                black_box(game.score());
                game.restore(&checkpoint);
            }
        })
    });
}

criterion_group!(engine_ops, bench_slide, bench_transforms, bench_spawn_and_lookahead);
criterion_main!(engine_ops);
