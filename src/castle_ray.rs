use crate::bitboard::Bitboard;
use crate::square::{vertical_symmetry, Square};

/// A line of squares along which an enemy slider would attack a square the
/// king stands on or crosses while castling. Squares are kept in walking order,
/// nearest to the king first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastleRay {
    squares: Vec<Square>,
    mask: Bitboard,
    diagonal: bool,
}

impl CastleRay {
    /// Walks from `start` to `end` (both included) by `step`
    pub fn new(start: Square, end: Square, step: isize, diagonal: bool) -> CastleRay {
        let mut squares = vec![start];
        let mut sq = start as isize;
        while sq != end as isize {
            sq += step;
            squares.push(sq as Square);
        }
        let mask = Bitboard::from_squares(&squares);
        CastleRay {
            squares,
            mask,
            diagonal,
        }
    }

    /// Same ray seen from the other side of the board
    pub fn vertical_flip(&self) -> CastleRay {
        let squares: Vec<Square> = self.squares.iter().map(|sq| vertical_symmetry(*sq)).collect();
        CastleRay {
            mask: self.mask.vertical_flip(),
            squares,
            diagonal: self.diagonal,
        }
    }

    pub fn is_diagonal(&self) -> bool {
        self.diagonal
    }
    pub fn mask(&self) -> Bitboard {
        self.mask
    }

    /// Whether `opponent` (the enemy sliders able to move along this ray) reaches
    /// the king's path before any piece of `other` blocks it.
    /// ```
    /// use stratagem::bitboard::Bitboard;
    /// use stratagem::castle_ray::CastleRay;
    /// // f2 to a7
    /// let ray = CastleRay::new(13, 48, 7, true);
    /// let bishop = Bitboard::from_square(34);
    /// assert!(ray.opponent_piece_precludes_castling(bishop, Bitboard::EMPTY));
    /// assert!(!ray.opponent_piece_precludes_castling(bishop, Bitboard::from_square(20)));
    /// assert!(ray.opponent_piece_precludes_castling(bishop, Bitboard::from_square(41)));
    /// assert!(!ray.opponent_piece_precludes_castling(Bitboard::EMPTY, Bitboard::from_square(20)));
    /// ```
    pub fn opponent_piece_precludes_castling(&self, opponent: Bitboard, other: Bitboard) -> bool {
        if !self.mask.intersects(opponent) {
            return false;
        }
        if !self.mask.intersects(other) {
            return true;
        }
        for sq in &self.squares {
            if opponent.is_set(*sq) {
                return true;
            }
            if other.is_set(*sq) {
                return false;
            }
        }
        false
    }
}

/// Rays guarding one castling move of one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastleRays {
    pub straight: Vec<CastleRay>,
    pub diagonal: Vec<CastleRay>,
}

impl CastleRays {
    pub fn white_kingside() -> CastleRays {
        CastleRays {
            straight: vec![
                CastleRay::new(3, 0, -1, false),
                CastleRay::new(12, 60, 8, false),
                CastleRay::new(13, 61, 8, false),
                CastleRay::new(14, 62, 8, false),
            ],
            diagonal: vec![
                CastleRay::new(11, 32, 7, true),
                CastleRay::new(12, 40, 7, true),
                CastleRay::new(13, 48, 7, true),
                CastleRay::new(13, 31, 9, true),
                CastleRay::new(14, 23, 9, true),
                CastleRay::new(15, 15, 9, true),
            ],
        }
    }

    pub fn white_queenside() -> CastleRays {
        CastleRays {
            straight: vec![
                CastleRay::new(5, 7, 1, false),
                CastleRay::new(12, 60, 8, false),
                CastleRay::new(11, 59, 8, false),
                CastleRay::new(10, 58, 8, false),
            ],
            diagonal: vec![
                CastleRay::new(11, 32, 7, true),
                CastleRay::new(10, 24, 7, true),
                CastleRay::new(9, 16, 7, true),
                CastleRay::new(13, 31, 9, true),
                CastleRay::new(12, 39, 9, true),
                CastleRay::new(11, 47, 9, true),
            ],
        }
    }

    pub fn vertical_flip(&self) -> CastleRays {
        CastleRays {
            straight: self.straight.iter().map(CastleRay::vertical_flip).collect(),
            diagonal: self.diagonal.iter().map(CastleRay::vertical_flip).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CastleRay> {
        self.straight.iter().chain(self.diagonal.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rays_end_where_expected() {
        let rays = CastleRays::white_kingside();
        assert_eq!(rays.straight[1].mask(), Bitboard::from_squares(&[12, 20, 28, 36, 44, 52, 60]));
        assert_eq!(rays.diagonal[3].mask(), Bitboard::from_squares(&[13, 22, 31]));
        assert_eq!(rays.diagonal[5].mask(), Bitboard::from_square(15));
        assert!(rays.straight.iter().all(|r| !r.is_diagonal()));
        assert!(rays.diagonal.iter().all(|r| r.is_diagonal()));
    }

    #[test]
    fn black_rays_are_flipped() {
        let black = CastleRays::white_queenside().vertical_flip();
        // f8 to h8
        assert_eq!(black.straight[0].mask(), Bitboard::from_squares(&[61, 62, 63]));
        // d7 to a4, nearest to the king first
        let ray = &black.diagonal[0];
        assert!(ray.opponent_piece_precludes_castling(Bitboard::from_square(24), Bitboard::from_square(60)));
        assert!(!ray.opponent_piece_precludes_castling(Bitboard::from_square(24), Bitboard::from_square(42)));
    }
}
