use crate::piece::PieceType;
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Moves are stored as a 2bytes word, with the following alignment:
/// - 6*2 bits for source and destination square
/// - 4 bits for the kind a pawn promotes to, 0 meaning no promotion
///
/// Castling is encoded as the two-file king step and en passant as a plain
/// diagonal pawn step, the position tells them apart.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    pub fn new(source: Square, destination: Square, promotion: Option<PieceType>) -> Move {
        let promotion_bits = match promotion {
            None => 0,
            Some(PieceType::Knight) => 1,
            Some(PieceType::Bishop) => 2,
            Some(PieceType::Rook) => 3,
            Some(_) => 4,
        };
        Move(((source as u16) << 10) | ((destination as u16) << 4) | promotion_bits)
    }
    pub fn new_quiet(source: Square, destination: Square) -> Move {
        Self::new(source, destination, None)
    }

    pub fn source(&self) -> Square {
        (self.0 >> 10) as Square
    }
    pub fn destination(&self) -> Square {
        ((self.0 >> 4) & 0b111111) as Square
    }
    pub fn promotion(&self) -> Option<PieceType> {
        match self.0 & 0b1111 {
            1 => Some(PieceType::Knight),
            2 => Some(PieceType::Bishop),
            3 => Some(PieceType::Rook),
            4 => Some(PieceType::Queen),
            _ => None,
        }
    }

    /// Parses a move formatted in long algebraic notation.
    /// ```
    /// use stratagem::r#move::Move;
    /// use stratagem::piece::PieceType;
    /// assert_eq!(Move::parse("e2e4"), Some(Move::new_quiet(12, 28)));
    /// assert_eq!(Move::parse("a7a8n"), Some(Move::new(48, 56, Some(PieceType::Knight))));
    /// assert_eq!(Move::parse("e2"), None);
    /// assert_eq!(Move::parse("e7e8x"), None);
    /// ```
    pub fn parse(mv: &str) -> Option<Move> {
        let source = square::parse_square(mv.get(0..2)?)?;
        let destination = square::parse_square(mv.get(2..4)?)?;
        let promotion = match mv.get(4..) {
            None | Some("") => None,
            Some(p) if p.len() == 1 => match PieceType::from_initial(p.chars().next()?)? {
                PieceType::Pawn | PieceType::King => return None,
                kind => Some(kind),
            },
            Some(_) => return None,
        };
        Some(Move::new(source, destination, promotion))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.source()).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.destination()).unwrap_or_else(|| String::from("**"));
        if let Some(p) = self.promotion() {
            write!(f, "{}{}{}", o, t, p)
        } else {
            write!(f, "{}{}", o, t)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_survive_packing() {
        let mv = Move::new(52, 60, Some(PieceType::Queen));
        assert_eq!(mv.source(), 52);
        assert_eq!(mv.destination(), 60);
        assert_eq!(mv.promotion(), Some(PieceType::Queen));
        assert_eq!(mv.to_string(), "e7e8q");
        assert_ne!(mv, Move::new(52, 60, Some(PieceType::Rook)));
        assert_ne!(mv, Move::new_quiet(52, 60));
    }
}
