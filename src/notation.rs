//! Conversions between moves and their textual forms: standard algebraic
//! notation (`Nbd2`, `exd6`, `b8=Q+`, `O-O`) and the long algebraic form
//! spoken by the protocol (`e2e4`, `b7b8q`).
//!
//! Text is always resolved against the legal moves of a position, so a
//! successful lookup is a move that can be applied as is.
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::piece::PieceType;
use crate::position::Position;
use crate::r#move::Move;
use crate::square::{self, file_char, file_of, rank_char, rank_of};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("could not parse move `{0}`")]
    Malformed(String),
    #[error("no legal move matches `{0}`")]
    NoMatchingMove(String),
    #[error("`{0}` matches several legal moves")]
    Ambiguous(String),
}

/// Piece, source file, source rank, destination, promotion
fn san_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([NBRQK])?([a-h])?([1-8])?x?([a-h][1-8])(?:=?([NBRQ]))?$").ok())
        .as_ref()
}

fn is_castle(pos: &Position, mv: Move) -> bool {
    pos.piece_at(mv.source())
        .map_or(false, |p| p.piece_type == PieceType::King)
        && file_of(mv.source()).abs_diff(file_of(mv.destination())) == 2
}

fn is_capture(pos: &Position, mv: Move) -> bool {
    match pos.piece_at(mv.source()) {
        Some(p) if p.piece_type == PieceType::Pawn => {
            file_of(mv.source()) != file_of(mv.destination())
        }
        Some(_) => pos.piece_at(mv.destination()).is_some(),
        None => false,
    }
}

/// Source square qualifier needed to tell `mv` apart from other legal moves
/// of the same kind of piece to the same square
fn disambiguation(pos: &Position, mv: Move, kind: PieceType) -> String {
    let rivals: Vec<Move> = pos
        .legal_moves()
        .into_iter()
        .filter(|m| {
            *m != mv
                && m.destination() == mv.destination()
                && m.promotion() == mv.promotion()
                && pos.piece_at(m.source()).map(|p| p.piece_type) == Some(kind)
        })
        .collect();
    if rivals.is_empty() {
        return String::new();
    }
    let source = mv.source();
    let file_shared = rivals.iter().any(|m| file_of(m.source()) == file_of(source));
    let rank_shared = rivals.iter().any(|m| rank_of(m.source()) == rank_of(source));
    match (file_shared, rank_shared) {
        (false, _) => file_char(source).to_string(),
        (true, false) => rank_char(source).to_string(),
        (true, true) => format!("{}{}", file_char(source), rank_char(source)),
    }
}

/// Standard algebraic notation of a legal move, check and mate suffixes included
pub fn to_san(pos: &Position, mv: Move) -> String {
    let Some(piece) = pos.piece_at(mv.source()) else {
        return mv.to_string();
    };
    let mut san = String::new();
    if is_castle(pos, mv) {
        san.push_str(if mv.destination() > mv.source() {
            "O-O"
        } else {
            "O-O-O"
        });
    } else {
        let capture = is_capture(pos, mv);
        if piece.piece_type == PieceType::Pawn {
            if capture {
                san.push(file_char(mv.source()));
            }
        } else {
            san.push(piece.piece_type.initial());
            san.push_str(&disambiguation(pos, mv, piece.piece_type));
        }
        if capture {
            san.push('x');
        }
        san.push_str(&square::square_representation(mv.destination()).unwrap_or_default());
        if let Some(promotion) = mv.promotion() {
            san.push('=');
            san.push(promotion.initial());
        }
    }

    let mut after = pos.clone();
    after.apply(mv);
    if after.in_check() {
        san.push(if after.legal_moves().is_empty() { '#' } else { '+' });
    }
    san
}

/// Looks up the legal move written in standard algebraic notation.
///
/// The check or mate suffix is optional, and `0-0` is accepted for `O-O`.
pub fn from_san(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let san = text.trim().trim_end_matches(|c: char| c == '+' || c == '#');
    let legal = pos.legal_moves();

    let castle = match san {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    };
    if let Some(kingside) = castle {
        return legal
            .iter()
            .copied()
            .find(|m| is_castle(pos, *m) && (m.destination() > m.source()) == kingside)
            .ok_or_else(|| NotationError::NoMatchingMove(text.to_string()));
    }

    let caps = san_pattern()
        .and_then(|re| re.captures(san))
        .ok_or_else(|| NotationError::Malformed(text.to_string()))?;
    let char_of = |i: usize| caps.get(i).and_then(|m| m.as_str().chars().next());

    let kind = match char_of(1) {
        Some(c) => PieceType::from_initial(c).ok_or_else(|| NotationError::Malformed(text.to_string()))?,
        None => PieceType::Pawn,
    };
    let destination = caps
        .get(4)
        .and_then(|m| square::parse_square(m.as_str()))
        .ok_or_else(|| NotationError::Malformed(text.to_string()))?;
    let promotion = char_of(5).and_then(PieceType::from_initial);
    let from_file = char_of(2);
    let from_rank = char_of(3);

    let mut candidates = legal.iter().copied().filter(|m| {
        m.destination() == destination
            && m.promotion() == promotion
            && pos.piece_at(m.source()).map(|p| p.piece_type) == Some(kind)
            && from_file.map_or(true, |f| file_char(m.source()) == f)
            // a pawn named without its file is pushed
            && (kind != PieceType::Pawn
                || from_file.is_some()
                || file_of(m.source()) == file_of(m.destination()))
            && from_rank.map_or(true, |r| rank_char(m.source()) == r)
            && !is_castle(pos, *m)
    });
    match (candidates.next(), candidates.next()) {
        (Some(mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(NotationError::Ambiguous(text.to_string())),
        (None, _) => Err(NotationError::NoMatchingMove(text.to_string())),
    }
}

/// Looks up a legal move given as `e2e4` or `e7e8q`
pub fn from_long_algebraic(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let mv = Move::parse(text.trim()).ok_or_else(|| NotationError::Malformed(text.to_string()))?;
    if pos.legal_moves().contains(&mv) {
        Ok(mv)
    } else {
        Err(NotationError::NoMatchingMove(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san(fen: &str, long: &str) -> String {
        let pos = Position::from_fen(fen).unwrap();
        to_san(&pos, from_long_algebraic(&pos, long).unwrap())
    }

    #[test]
    fn plain_moves() {
        let start = Position::default();
        assert_eq!(to_san(&start, Move::new_quiet(6, 21)), "Nf3");
        assert_eq!(to_san(&start, Move::new_quiet(12, 28)), "e4");
        assert_eq!(from_san(&start, "Nf3"), Ok(Move::new_quiet(6, 21)));
        assert_eq!(from_san(&start, "e4"), Ok(Move::new_quiet(12, 28)));
    }

    #[test]
    fn disambiguation() {
        let knights = "4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1";
        assert_eq!(san(knights, "b1d2"), "Nbd2");
        assert_eq!(san(knights, "f1d2"), "Nfd2");
        assert_eq!(san(knights, "b1c3"), "Nc3");
        let pos = Position::from_fen(knights).unwrap();
        assert_eq!(from_san(&pos, "Nd2"), Err(NotationError::Ambiguous("Nd2".to_string())));
        assert_eq!(from_san(&pos, "Nfd2"), Ok(Move::new_quiet(5, 11)));

        let rooks = "4k3/8/8/R7/8/8/8/R3K3 w - - 0 1";
        assert_eq!(san(rooks, "a1a3"), "R1a3");
        assert_eq!(san(rooks, "a5a3"), "R5a3");

        let queens = "4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1";
        assert_eq!(san(queens, "a1c3"), "Qa1c3");
        let pos = Position::from_fen(queens).unwrap();
        assert_eq!(from_san(&pos, "Qa1c3"), Ok(Move::new_quiet(0, 18)));
    }

    #[test]
    fn captures_and_en_passant() {
        let fen = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1";
        assert_eq!(san(fen, "e5d6"), "exd6");
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(from_san(&pos, "exd6"), Ok(Move::new_quiet(36, 43)));
        assert_eq!(san("4k3/8/3p4/8/4N3/8/8/4K3 w - - 0 1", "e4d6"), "Nxd6+");
    }

    #[test]
    fn promotions() {
        let fen = "4k3/1P6/8/8/8/8/8/4K3 w - - 0 1";
        assert_eq!(san(fen, "b7b8q"), "b8=Q+");
        assert_eq!(san(fen, "b7b8n"), "b8=N");
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(from_san(&pos, "b8=R"), Ok(Move::new(49, 57, Some(PieceType::Rook))));
        assert_eq!(from_san(&pos, "b8Q+"), Ok(Move::new(49, 57, Some(PieceType::Queen))));
        assert!(from_san(&pos, "b8").is_err());
    }

    #[test]
    fn castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        assert_eq!(san(fen, "e1g1"), "O-O");
        assert_eq!(san(fen, "e1c1"), "O-O-O");
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(from_san(&pos, "O-O-O"), Ok(Move::new_quiet(4, 2)));
        assert_eq!(from_san(&pos, "0-0"), Ok(Move::new_quiet(4, 6)));
    }

    #[test]
    fn mate_suffix() {
        let mut pos = Position::default();
        for m in ["f2f3", "e7e5", "g2g4"] {
            let mv = from_long_algebraic(&pos, m).unwrap();
            pos.apply(mv);
        }
        let mate = from_long_algebraic(&pos, "d8h4").unwrap();
        assert_eq!(to_san(&pos, mate), "Qh4#");
        assert_eq!(from_san(&pos, "Qh4"), Ok(mate));
        assert_eq!(from_san(&pos, "Qh4#"), Ok(mate));
    }

    #[test]
    fn every_legal_move_reads_back() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        for mv in &pos.legal_moves() {
            assert_eq!(from_san(&pos, &to_san(&pos, *mv)), Ok(*mv));
        }
    }

    #[test]
    fn bad_text() {
        let start = Position::default();
        assert_eq!(from_san(&start, "Zz9"), Err(NotationError::Malformed("Zz9".to_string())));
        assert_eq!(from_san(&start, "Nc6"), Err(NotationError::NoMatchingMove("Nc6".to_string())));
        assert_eq!(from_long_algebraic(&start, "e2"), Err(NotationError::Malformed("e2".to_string())));
        assert_eq!(from_long_algebraic(&start, "e2e5"), Err(NotationError::NoMatchingMove("e2e5".to_string())));
    }
}
