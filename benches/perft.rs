use criterion::{criterion_group, criterion_main, Criterion};
use stratagem::position::Position;
use stratagem::search::{Engine, EngineConfig};

// Move generation and apply/undo only, no node counting
fn perft(position: &mut Position, depth: u64) {
    if depth == 0 {
        return;
    }
    for m in &position.legal_moves() {
        position.apply(*m);
        perft(position, depth - 1);
        position.undo();
    }
}

fn perft_bench(c: &mut Criterion) {
    // https://www.chessprogramming.org/Perft_Results
    for (name, fen) in [
        ("initial", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("kiwipete", "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"),
        ("alternative", "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10"),
    ] {
        let mut position = Position::from_fen(fen).unwrap();
        c.bench_function(&format!("perft {} 3", name), |b| b.iter(|| perft(&mut position, 3)));
    }
}

fn search_bench(c: &mut Criterion) {
    let position = Position::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    )
    .unwrap();
    let mut config = EngineConfig::default();
    config.set_total_depth(4);
    c.bench_function("search depth 4", |b| {
        b.iter(|| Engine::new(config).get_move(&position))
    });
}

criterion_group!(benches, perft_bench, search_bench);
criterion_main!(benches);
