use std::fmt::Display;
use std::time::{Duration, Instant};

use log::debug;

use crate::evaluation::{Evaluator, Score, LARGE, MOVE};
use crate::pawn_king_cache::PawnKingCache;
use crate::piece::PieceType;
use crate::position::Position;
use crate::r#move::Move;
use crate::square::Square;
use crate::transposition_table::{NodeKind, TranspositionEntry, TranspositionTable};

/// Below this many pseudo-legal moves, a node double checks for mate or stalemate
const TERMINAL_CHECK_THRESHOLD: usize = 8;

/// Tunables of an `Engine`, grouped so they can be built up with chained setters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub total_depth: u8,
    pub transposition_capacity: usize,
    pub pawn_king_capacity: usize,
}
impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            total_depth: 6,
            transposition_capacity: TranspositionTable::DEFAULT_CAPACITY,
            pawn_king_capacity: PawnKingCache::DEFAULT_CAPACITY,
        }
    }
}
impl EngineConfig {
    pub fn set_total_depth(&mut self, value: u8) -> &mut Self {
        self.total_depth = value.max(1);
        self
    }
    pub fn set_transposition_capacity(&mut self, value: usize) -> &mut Self {
        self.transposition_capacity = value;
        self
    }
    pub fn set_pawn_king_capacity(&mut self, value: usize) -> &mut Self {
        self.pawn_king_capacity = value;
        self
    }
}

/// Outcome of a full iterative deepening search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub best_move: Move,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
    pub time: Duration,
    pub principal_variation: Vec<Move>,
}
impl SearchReport {
    pub fn is_mate_score(&self) -> bool {
        self.score.abs() > LARGE / 2
    }
}
impl Display for SearchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let millis = self.time.as_millis();
        let nps = if millis == 0 {
            self.nodes
        } else {
            (self.nodes as u128 * 1000 / millis) as u64
        };
        write!(f, "info depth {} score ", self.depth)?;
        if self.is_mate_score() {
            let moves = (self.principal_variation.len() as Score + 1) / 2;
            write!(f, "mate {}", if self.score < 0 { -moves } else { moves })?;
        } else {
            write!(f, "cp {}", self.score)?;
        }
        write!(f, " nodes {} nps {} time {} pv", self.nodes, nps, millis)?;
        for mv in &self.principal_variation {
            write!(f, " {}", mv)?;
        }
        Ok(())
    }
}

/// Single threaded negamax searcher.
///
/// The engine owns everything that persists between searches: the
/// transposition table, the evaluator and its pawn/king cache, and the
/// killer moves. Positions are only borrowed, the search works on a clone
/// through apply/undo.
pub struct Engine {
    config: EngineConfig,
    evaluator: Evaluator,
    transposition_table: TranspositionTable,
    /// Two slots per remaining depth
    killers: Vec<[Option<Move>; 2]>,
    nodes: u64,
}

impl Engine {
    pub fn new(mut config: EngineConfig) -> Engine {
        config.set_total_depth(config.total_depth);
        Engine {
            config,
            evaluator: Evaluator::new(config.pawn_king_capacity),
            transposition_table: TranspositionTable::new(config.transposition_capacity),
            killers: vec![[None; 2]; config.total_depth as usize + 1],
            nodes: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search depth can change between searches without dropping the tables
    pub fn set_total_depth(&mut self, depth: u8) {
        self.config.set_total_depth(depth);
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.transposition_table
    }

    /// Static evaluation from the point of view of the side to move
    pub fn evaluate(&mut self, pos: &Position) -> Score {
        self.evaluator.fitness(pos)
    }

    /// Forgets everything learned from previous games
    pub fn clear(&mut self) {
        self.transposition_table.clear();
        self.evaluator.clear();
        self.reset_killers(self.config.total_depth);
    }

    fn reset_killers(&mut self, depth: u8) {
        self.killers.clear();
        self.killers.resize(depth as usize + 1, [None; 2]);
    }

    fn insert_killer(&mut self, mv: Move, depth: u8) {
        if self.is_killer(mv, depth) {
            return;
        }
        if let Some(slots) = self.killers.get_mut(depth as usize) {
            slots[0] = slots[1];
            slots[1] = Some(mv);
        }
    }

    fn is_killer(&self, mv: Move, depth: u8) -> bool {
        self.killers
            .get(depth as usize)
            .map_or(false, |slots| slots.contains(&Some(mv)))
    }

    /// Moves landing on an occupied square, and en passant
    fn is_capture(pos: &Position, mv: Move) -> bool {
        if pos.piece_at(mv.destination()).is_some() {
            return true;
        }
        pos.en_passant_target() == Some(mv.destination())
            && pos
                .piece_at(mv.source())
                .map_or(false, |p| p.piece_type == PieceType::Pawn)
    }

    /// Captures past the horizon.
    ///
    /// Once a capture has been made, only recaptures on the same square are
    /// followed.
    pub fn quiescence(
        &mut self,
        pos: &mut Position,
        mut alpha: Score,
        beta: Score,
        target: Option<Square>,
    ) -> Score {
        self.nodes += 1;
        let stand_pat = self.evaluator.fitness(pos);
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);
        // losing the king first loses the game, the sooner the worse
        if pos.king_square(pos.side_to_move()).is_none() {
            return -LARGE + pos.full_move_counter() as Score * MOVE;
        }

        let captures = pos.pseudo_legal_moves(true);
        for mv in &captures {
            if target.map_or(false, |t| t != mv.destination()) {
                continue;
            }
            pos.apply(*mv);
            let score = -self.quiescence(pos, -beta, -alpha, Some(mv.destination()));
            pos.undo();
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }
        alpha
    }

    /// Fail-hard negamax with a transposition table and killer move ordering
    pub fn alphabeta(&mut self, pos: &mut Position, depth: u8, mut alpha: Score, mut beta: Score) -> Score {
        if depth == 0 {
            return self.quiescence(pos, alpha, beta, None);
        }
        self.nodes += 1;

        let mut table_move = None;
        if let Some(entry) = self.transposition_table.get(pos.hash()) {
            if entry.depth == depth {
                match entry.kind {
                    NodeKind::Pv => return entry.score,
                    NodeKind::Cut => beta = entry.score,
                    NodeKind::All => alpha = entry.score,
                }
                if alpha >= beta {
                    return entry.score;
                }
            }
            table_move = entry.best_move;
        }

        let moves = pos.pseudo_legal_moves(false);
        // no piece left that can move, treat like a lost king
        if moves.is_empty() {
            return -LARGE + pos.full_move_counter() as Score * MOVE;
        }
        let in_check = pos.in_check();
        if (moves.len() <= TERMINAL_CHECK_THRESHOLD || in_check) && pos.legal_moves().is_empty() {
            return if in_check {
                -LARGE + pos.full_move_counter() as Score * MOVE
            } else {
                0
            };
        }

        let ordered = {
            let position: &Position = pos;
            moves.best_first_iter(&|mv: &Move| {
                if Some(*mv) == table_move {
                    3
                } else if Self::is_capture(position, *mv) {
                    2
                } else if self.is_killer(*mv, depth) {
                    1
                } else {
                    0
                }
            })
        };

        let mut kind = NodeKind::All;
        let mut best_move = None;
        for mv in ordered {
            pos.apply(mv);
            let score = -self.alphabeta(pos, depth - 1, -beta, -alpha);
            pos.undo();
            if score >= beta {
                self.transposition_table.put(TranspositionEntry {
                    depth,
                    hash: pos.hash(),
                    score: beta,
                    best_move: Some(mv),
                    kind: NodeKind::Cut,
                });
                self.insert_killer(mv, depth);
                return beta;
            }
            if score > alpha {
                kind = NodeKind::Pv;
                best_move = Some(mv);
                alpha = score;
            }
        }
        self.transposition_table.put(TranspositionEntry {
            depth,
            hash: pos.hash(),
            score: alpha,
            best_move,
            kind,
        });
        alpha
    }

    fn search_root(&mut self, pos: &Position, depth: u8) -> Option<(Move, Score)> {
        let depth = depth.max(1);
        self.reset_killers(depth);
        let mut work = pos.clone();
        let (mut alpha, beta) = (-LARGE, LARGE);
        let mut best = None;
        for mv in &pos.legal_moves() {
            work.apply(*mv);
            let score = -self.alphabeta(&mut work, depth - 1, -beta, -alpha);
            work.undo();
            if score > alpha || best.is_none() {
                best = Some((*mv, score));
                alpha = score;
            }
        }
        best
    }

    /// Best legal move at a fixed depth, `None` only when there is no legal move
    pub fn get_move_to_depth(&mut self, pos: &Position, depth: u8) -> Option<Move> {
        self.search_root(pos, depth).map(|(mv, _)| mv)
    }

    /// Iterative deepening up to the configured depth
    pub fn get_move(&mut self, pos: &Position) -> Option<Move> {
        self.search(pos).map(|report| report.best_move)
    }

    /// Expected continuation after `mv`, as remembered by the transposition table
    pub fn principal_variation(&self, pos: &Position, mv: Move) -> Vec<Move> {
        let mut line = vec![mv];
        let mut work = pos.clone();
        for _ in 1..self.config.total_depth {
            let Some(&last) = line.last() else { break };
            if !work.legal_moves().contains(&last) {
                line.pop();
                break;
            }
            work.apply(last);
            match self.transposition_table.get(work.hash()).and_then(|e| e.best_move) {
                Some(next) => line.push(next),
                None => break,
            }
        }
        line
    }

    /// Runs the whole iterative deepening loop and reports on the last iteration
    pub fn search(&mut self, pos: &Position) -> Option<SearchReport> {
        let start = Instant::now();
        self.nodes = 0;
        let mut last = None;
        let total_depth = self.config.total_depth.max(1);
        for depth in 1..=total_depth {
            last = self.search_root(pos, depth);
            match last {
                Some((mv, score)) => debug!("depth {}: {} scored {}", depth, mv, score),
                None => break,
            }
        }
        let (best_move, score) = last?;
        let report = SearchReport {
            best_move,
            score,
            depth: total_depth,
            nodes: self.nodes,
            time: start.elapsed(),
            principal_variation: self.principal_variation(pos, best_move),
        };
        debug!(
            "pv {}",
            report
                .principal_variation
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
        self.evaluator.pawn_king_cache().log_stats();
        Some(report)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_long_algebraic;

    fn play(pos: &mut Position, moves: &[&str]) {
        for m in moves {
            let mv = from_long_algebraic(pos, m).unwrap();
            pos.apply(mv);
        }
    }

    fn small_engine(depth: u8) -> Engine {
        let mut config = EngineConfig::default();
        config
            .set_total_depth(depth)
            .set_transposition_capacity(1 << 16)
            .set_pawn_king_capacity(1 << 12);
        Engine::new(config)
    }

    #[test]
    fn config_setters_chain() {
        let mut config = EngineConfig::default();
        assert_eq!(config.total_depth, 6);
        config.set_total_depth(0).set_pawn_king_capacity(5);
        assert_eq!(config.total_depth, 1);
        assert_eq!(config.pawn_king_capacity, 5);
    }

    #[test]
    fn finds_mate_in_one() {
        let mut pos = Position::default();
        play(&mut pos, &["f2f3", "e7e5", "g2g4"]);
        let mut engine = small_engine(3);
        assert_eq!(engine.get_move_to_depth(&pos, 3).map(|m| m.to_string()), Some("d8h4".to_string()));
    }

    #[test]
    fn losing_side_still_moves() {
        let pos = Position::from_fen("8/8/8/8/8/7k/q7/7K w - - 0 1").unwrap();
        let mut engine = small_engine(3);
        let mv = engine.get_move(&pos);
        assert!(mv.is_some());
        assert!(pos.legal_moves().contains(&mv.unwrap()));
    }

    #[test]
    fn takes_the_fork() {
        let pos = Position::from_fen("rnb1kbnr/pp2pppp/2p5/1N1p4/7q/7P/PPPPPPP1/R1BQKBNR w KQkq - 0 4")
            .unwrap();
        let mut engine = small_engine(3);
        assert_eq!(engine.get_move_to_depth(&pos, 3).map(|m| m.to_string()), Some("b5c7".to_string()));
        let mut engine = small_engine(4);
        assert_eq!(engine.get_move(&pos).map(|m| m.to_string()), Some("b5c7".to_string()));
    }

    #[test]
    fn zero_depth_config_still_moves() {
        let config = EngineConfig {
            total_depth: 0,
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(config);
        assert_eq!(engine.config().total_depth, 1);
        let pos = Position::default();
        let mv = engine.get_move(&pos).unwrap();
        assert!(pos.legal_moves().contains(&mv));
    }

    #[test]
    fn kingless_mover_stands_pat_before_losing() {
        let mut pos = Position::from_fen("8/8/8/8/8/8/8/q6K b - - 0 1").unwrap();
        let mut engine = small_engine(1);
        assert_eq!(engine.quiescence(&mut pos, -LARGE, -LARGE + 1, None), -LARGE + 1);
        assert_eq!(engine.quiescence(&mut pos, -LARGE, LARGE, None), -LARGE + MOVE);
    }

    #[test]
    fn no_move_when_mated() {
        let mut pos = Position::default();
        play(&mut pos, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let mut engine = small_engine(2);
        assert_eq!(engine.get_move(&pos), None);
        assert!(engine.search(&pos).is_none());
    }

    #[test]
    fn search_leaves_the_position_alone() {
        let pos = Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
        let fen = pos.to_fen();
        let mut engine = small_engine(2);
        let report = engine.search(&pos).unwrap();
        assert_eq!(pos.to_fen(), fen);
        assert_eq!(report.depth, 2);
        assert!(report.nodes > 0);
        assert_eq!(report.principal_variation.first(), Some(&report.best_move));
        assert!(report.to_string().starts_with("info depth 2 score cp "));
    }

    #[test]
    fn mate_is_reported_as_such() {
        let mut pos = Position::default();
        play(&mut pos, &["f2f3", "e7e5", "g2g4"]);
        let mut engine = small_engine(3);
        let report = engine.search(&pos).unwrap();
        assert!(report.is_mate_score());
        assert!(report.score > 0);
        assert!(report.to_string().contains("score mate 1"));
    }

    #[test]
    fn principal_variation_starts_with_the_move() {
        let pos = Position::default();
        let mut engine = small_engine(3);
        let mv = engine.get_move_to_depth(&pos, 3).unwrap();
        let pv = engine.principal_variation(&pos, mv);
        assert!(!pv.is_empty() && pv.len() <= 3);
        assert_eq!(pv[0], mv);
        // an illegal first move is dropped
        assert!(engine.principal_variation(&pos, Move::new_quiet(0, 63)).is_empty());
    }
}
