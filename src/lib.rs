//! Stratagem, a bitboard chess engine that picks a best move for a position.
//!
//! The crate is organised leaf first: bitboards and squares, pieces and
//! moves, the position with its incremental hashes, the move generator,
//! the caches, the evaluator and finally the searcher and protocol front end.
use std::time::Instant;

use crate::position::{FenError, Position, START_FEN};

pub mod bitboard;
pub mod castle_ray;
pub mod castling;
pub mod evaluation;
pub mod history;
pub mod r#move;
pub mod move_generator;
pub mod movelist;
pub mod notation;
pub mod pawn_king_cache;
pub mod piece;
pub mod position;
pub mod search;
pub mod square;
pub mod transposition_table;
pub mod uci;
pub mod zob_hash;

/// Prints node counts and speed for every depth up to `depth`
pub fn perft(depth: u32, fen: Option<&str>) -> Result<(), FenError> {
    let mut position = Position::from_fen(fen.unwrap_or(START_FEN))?;
    println!("{}\n", position);
    println!("depth nodes\n--------");
    for d in 0..=depth {
        let start = Instant::now();
        let nodes = perft_count(&mut position, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
    Ok(())
}

/// Number of legal move sequences of length `depth`
pub fn perft_count(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = position.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in &moves {
        position.apply(*mv);
        nodes += perft_count(position, depth - 1);
        position.undo();
    }
    nodes
}
