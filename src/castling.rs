use crate::piece::Color;
use crate::piece::Color::{Black, White};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Wing {
    Kingside,
    Queenside,
}
impl Wing {
    pub const BOTH: [Wing; 2] = [Wing::Kingside, Wing::Queenside];

    /// File the rook of this wing starts on
    pub fn rook_file(&self) -> usize {
        match self {
            Wing::Kingside => 7,
            Wing::Queenside => 0,
        }
    }
}

/// Castling rights packed as KQkq, highest bit being white kingside
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    fn mask(side: Color, wing: Wing) -> u8 {
        match (side, wing) {
            (White, Wing::Kingside) => 0b1000,
            (White, Wing::Queenside) => 0b0100,
            (Black, Wing::Kingside) => 0b0010,
            (Black, Wing::Queenside) => 0b0001,
        }
    }

    /// Reads the castling field of a FEN record, `-` meaning no rights at all
    /// ```
    /// use stratagem::castling::{CastlingRights, Wing};
    /// use stratagem::piece::Color;
    /// let rights = CastlingRights::parse("Kq").unwrap();
    /// assert!(rights.get(Color::White, Wing::Kingside));
    /// assert!(!rights.get(Color::White, Wing::Queenside));
    /// assert_eq!(CastlingRights::parse("-"), Some(CastlingRights::NONE));
    /// assert_eq!(CastlingRights::parse("Kx"), None);
    /// ```
    pub fn parse(s: &str) -> Option<CastlingRights> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut res = CastlingRights::NONE;
        for c in s.chars() {
            res.0 |= match c {
                'K' => Self::mask(White, Wing::Kingside),
                'Q' => Self::mask(White, Wing::Queenside),
                'k' => Self::mask(Black, Wing::Kingside),
                'q' => Self::mask(Black, Wing::Queenside),
                _ => return None,
            }
        }
        Some(res)
    }

    pub fn get(&self, side: Color, wing: Wing) -> bool {
        self.0 & Self::mask(side, wing) != 0
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn revoke(&mut self, side: Color, wing: Wing) {
        self.0 &= !Self::mask(side, wing)
    }
    /// Marks the given side as unable to castle on either wing
    pub fn revoke_all(&mut self, side: Color) {
        self.revoke(side, Wing::Kingside);
        self.revoke(side, Wing::Queenside);
    }

    /// Index of the key standing for this set of rights.
    /// White kingside lifts the index onto the last rank, so the result
    /// always lands on rank 1 or rank 8.
    /// ```
    /// use stratagem::castling::CastlingRights;
    /// assert_eq!(CastlingRights::ALL.key_index(), 63);
    /// assert_eq!(CastlingRights::NONE.key_index(), 0);
    /// assert_eq!(CastlingRights::parse("Qk").unwrap().key_index(), 6);
    /// ```
    pub fn key_index(&self) -> usize {
        let bit = |side, wing| self.get(side, wing) as usize;
        56 * bit(White, Wing::Kingside)
            + 4 * bit(White, Wing::Queenside)
            + 2 * bit(Black, Wing::Kingside)
            + bit(Black, Wing::Queenside)
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (side, wing, c) in [
            (White, Wing::Kingside, 'K'),
            (White, Wing::Queenside, 'Q'),
            (Black, Wing::Kingside, 'k'),
            (Black, Wing::Queenside, 'q'),
        ] {
            if self.get(side, wing) {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revoking_is_per_wing() {
        let mut rights = CastlingRights::ALL;
        rights.revoke(White, Wing::Queenside);
        assert_eq!(rights.to_string(), "Kkq");
        rights.revoke_all(Black);
        assert_eq!(rights.to_string(), "K");
        rights.revoke(White, Wing::Kingside);
        assert_eq!(rights.to_string(), "-");
        assert!(rights.is_empty());
    }

    #[test]
    fn key_indices_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for bits in 0..16u8 {
            let index = CastlingRights(bits).key_index();
            assert!(index < 8 || index >= 56);
            assert!(seen.insert(index));
        }
    }
}
