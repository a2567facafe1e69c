use crate::square::Square;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl};

/// A set of squares, one bit per square (bit 0 = a1, bit 63 = h8)
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    #[inline]
    pub fn from_square(square: Square) -> Bitboard {
        Bitboard(1u64 << square)
    }
    /// ```
    /// use stratagem::bitboard::Bitboard;
    /// let bb = Bitboard::from_squares(&[0, 9, 63]);
    /// assert_eq!(bb.pop_count(), 3);
    /// assert!(bb.is_set(9));
    /// ```
    #[inline]
    pub fn from_squares(squares: &[Square]) -> Bitboard {
        let mut bits: u64 = 0;
        for sq in squares {
            bits |= 1u64 << sq
        }
        Bitboard(bits)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    #[inline(always)]
    pub fn is_set(&self, sq: Square) -> bool {
        self.0 & (1 << sq) != 0
    }
    #[inline(always)]
    pub fn intersects(&self, other: Bitboard) -> bool {
        self.0 & other.0 != 0
    }
    #[inline(always)]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1 << sq
    }
    #[inline(always)]
    pub fn unset(&mut self, sq: Square) {
        self.0 &= !(1 << sq)
    }
    /// Removes every square of `other` from the set
    #[inline(always)]
    pub fn without(&self, other: Bitboard) -> Bitboard {
        Bitboard(self.0 & !other.0)
    }

    #[inline(always)]
    pub fn ls1b(&self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Some(self.0.trailing_zeros() as Square)
    }

    #[inline(always)]
    pub fn ms1b(&self) -> Option<Square> {
        if self.is_empty() {
            return None;
        }
        Some(63 - self.0.leading_zeros() as Square)
    }

    /// Mirrors the set across the horizontal middle line (a1 <-> a8)
    /// ```
    /// use stratagem::bitboard::Bitboard;
    /// assert_eq!(Bitboard::from_square(12).vertical_flip(), Bitboard::from_square(52));
    /// ```
    pub fn vertical_flip(&self) -> Bitboard {
        Bitboard(self.0.swap_bytes())
    }

    #[inline(always)]
    pub fn reset_ls1b(&mut self) {
        self.0 &= self.0.wrapping_sub(1)
    }

    #[inline(always)]
    pub fn pop_ls1b(&mut self) -> Option<Square> {
        let ls1b = self.ls1b();
        self.reset_ls1b();
        ls1b
    }

    #[inline(always)]
    pub fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Every square with an index strictly lower than `sq`
    #[inline]
    pub fn below(sq: Square) -> Bitboard {
        Bitboard((1u64 << sq) - 1)
    }
    /// Every square with an index strictly greater than `sq`
    #[inline]
    pub fn above(sq: Square) -> Bitboard {
        Bitboard(u64::MAX.checked_shl(sq as u32 + 1).unwrap_or(0))
    }

    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FILES: [Bitboard; 8] = [
        Bitboard(0x0101010101010101),
        Bitboard(0x0202020202020202),
        Bitboard(0x0404040404040404),
        Bitboard(0x0808080808080808),
        Bitboard(0x1010101010101010),
        Bitboard(0x2020202020202020),
        Bitboard(0x4040404040404040),
        Bitboard(0x8080808080808080),
    ];
    pub const RANKS: [Bitboard; 8] = [
        Bitboard(0x00000000000000ff),
        Bitboard(0x000000000000ff00),
        Bitboard(0x0000000000ff0000),
        Bitboard(0x00000000ff000000),
        Bitboard(0x000000ff00000000),
        Bitboard(0x0000ff0000000000),
        Bitboard(0x00ff000000000000),
        Bitboard(0xff00000000000000),
    ];

    /// Files adjacent to `file`, not including `file` itself
    pub fn adjacent_files(file: usize) -> Bitboard {
        let mut adjacent = Bitboard::EMPTY;
        if file > 0 {
            adjacent |= Self::FILES[file - 1];
        }
        if file < 7 {
            adjacent |= Self::FILES[file + 1];
        }
        adjacent
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                f.write_str(if self.is_set(rank * 8 + file) { "x " } else { ". " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// Iterates over set squares, lowest first
impl Iterator for Bitboard {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_ls1b()
    }
}

macro_rules! bitwise_op {
    ($op:ident, $method:ident, $assign_op:ident, $assign_method:ident, $symbol:tt) => {
        impl $op for Bitboard {
            type Output = Bitboard;
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $symbol rhs.0)
            }
        }
        impl $assign_op for Bitboard {
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = *self $symbol rhs
            }
        }
    };
}
bitwise_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bitwise_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bitwise_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;
    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}
impl Shl<usize> for Bitboard {
    type Output = Bitboard;
    fn shl(self, rhs: usize) -> Self::Output {
        Bitboard(self.0 << rhs)
    }
}
