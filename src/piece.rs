use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    /// Kinds a pawn may promote to, in generation order
    pub const PROMOTIONS: [PieceType; 4] = [Queen, Knight, Rook, Bishop];

    /// Uppercase letter used by algebraic notation
    pub fn initial(&self) -> char {
        match self {
            Pawn => 'P',
            Knight => 'N',
            Bishop => 'B',
            Rook => 'R',
            Queen => 'Q',
            King => 'K',
        }
    }
    /// ```
    /// use stratagem::piece::PieceType;
    /// assert_eq!(PieceType::from_initial('n'), Some(PieceType::Knight));
    /// assert_eq!(PieceType::from_initial('Q'), Some(PieceType::Queen));
    /// assert_eq!(PieceType::from_initial('x'), None);
    /// ```
    pub fn from_initial(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(Pawn),
            'N' => Some(Knight),
            'B' => Some(Bishop),
            'R' => Some(Rook),
            'Q' => Some(Queen),
            'K' => Some(King),
            _ => None,
        }
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.initial().to_ascii_lowercase())
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}
impl Color {
    pub const BOTH: [Color; 2] = [Color::Black, Color::White];

    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
    /// Rank index of this side's back rank
    pub fn home_rank(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
    /// Square offset of a single pawn step forward
    pub fn forward(&self) -> isize {
        match self {
            Color::White => 8,
            Color::Black => -8,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Color::Black { "b" } else { "w" })
    }
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }
    /// Reads a FEN piece letter, uppercase being white
    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = match c {
            'P' | 'N' | 'B' | 'R' | 'Q' | 'K' | 'p' | 'n' | 'b' | 'r' | 'q' | 'k' => {
                PieceType::from_initial(c)?
            }
            _ => return None,
        };
        let color = if c.is_ascii_lowercase() {
            Color::Black
        } else {
            Color::White
        };
        Some(Piece { piece_type, color })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let initial = self.piece_type.initial();
        write!(
            f,
            "{}",
            if self.color == Color::White {
                initial
            } else {
                initial.to_ascii_lowercase()
            }
        )
    }
}
