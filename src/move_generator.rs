use crate::bitboard::Bitboard;
use crate::castle_ray::CastleRays;
use crate::castling::Wing;
use crate::movelist::MoveList;
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use crate::piece::{Color, Piece, PieceType};
use crate::position::{king_home, rook_home, Position};
use crate::r#move::Move;
use crate::square::{file_of, Square};

const KING_OFFSETS: [isize; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];
const KNIGHT_OFFSETS: [isize; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];

// Ray families, each one spanning both directions from the origin
const A1H8: usize = 0;
const A8H1: usize = 1;
const HORIZONTAL: usize = 2;
const VERTICAL: usize = 3;
const RAY_STEPS: [isize; 4] = [9, 7, 1, 8];

fn offset_target(sq: Square, offset: isize) -> Option<Square> {
    let target = sq as isize + offset;
    if !(0..64).contains(&target) {
        return None;
    }
    let target = target as Square;
    if file_of(target).abs_diff(file_of(sq)) > 2 {
        return None;
    }
    Some(target)
}

/// Everything that has to hold, besides the right itself, for one side to castle on one wing
#[derive(Debug, Clone)]
struct CastleGuard {
    /// Squares between king and rook
    space: Bitboard,
    /// Enemy pawns here would attack the king's path
    pawns: Bitboard,
    knights: Bitboard,
    /// Squares next to the ones the king starts on or crosses
    king_zone: Bitboard,
    rays: CastleRays,
    king_destination: Square,
}

impl CastleGuard {
    fn white(wing: Wing, king_attacks: &[Bitboard; 64]) -> CastleGuard {
        match wing {
            Wing::Kingside => CastleGuard {
                space: Bitboard::from_squares(&[5, 6]),
                pawns: Bitboard::from_squares(&[11, 12, 13, 14]),
                knights: Bitboard::from_squares(&[10, 11, 14, 19, 20, 21, 22, 15]),
                king_zone: king_attacks[4] | king_attacks[5],
                rays: CastleRays::white_kingside(),
                king_destination: 6,
            },
            Wing::Queenside => CastleGuard {
                space: Bitboard::from_squares(&[1, 2, 3]),
                pawns: Bitboard::from_squares(&[9, 10, 11, 12, 13]),
                knights: Bitboard::from_squares(&[9, 10, 13, 14, 18, 19, 20, 21]),
                king_zone: king_attacks[4] | king_attacks[3],
                rays: CastleRays::white_queenside(),
                king_destination: 2,
            },
        }
    }

    fn vertical_flip(&self) -> CastleGuard {
        CastleGuard {
            space: self.space.vertical_flip(),
            pawns: self.pawns.vertical_flip(),
            knights: self.knights.vertical_flip(),
            king_zone: self.king_zone.vertical_flip(),
            rays: self.rays.vertical_flip(),
            king_destination: self.king_destination + 56,
        }
    }
}

/// Pseudo-legal move generation and check detection over precomputed tables.
///
/// The tables never change once built, so a single generator is meant to be
/// shared (behind an `Arc`) by every position of a game.
#[derive(Debug, Clone)]
pub struct MoveGenerator {
    king_attacks: [Bitboard; 64],
    knight_attacks: [Bitboard; 64],
    rays: [[Bitboard; 64]; 4],
    pawn_pushes: [[Bitboard; 64]; 2],
    pawn_captures: [[Bitboard; 64]; 2],
    castle_guards: [[CastleGuard; 2]; 2],
}

impl MoveGenerator {
    pub fn new() -> MoveGenerator {
        let mut king_attacks = [Bitboard::EMPTY; 64];
        let mut knight_attacks = [Bitboard::EMPTY; 64];
        let mut rays = [[Bitboard::EMPTY; 64]; 4];
        let mut pawn_pushes = [[Bitboard::EMPTY; 64]; 2];
        let mut pawn_captures = [[Bitboard::EMPTY; 64]; 2];

        for sq in 0..64 {
            for offset in KING_OFFSETS {
                if let Some(target) = offset_target(sq, offset) {
                    king_attacks[sq].set(target)
                }
            }
            for offset in KNIGHT_OFFSETS {
                if let Some(target) = offset_target(sq, offset) {
                    knight_attacks[sq].set(target)
                }
            }

            for (family, step) in RAY_STEPS.iter().enumerate() {
                for direction in [*step, -*step] {
                    let mut current = sq;
                    // a single step never changes file by more than one
                    while let Some(next) = offset_target(current, direction)
                        .filter(|next| file_of(*next).abs_diff(file_of(current)) <= 1)
                    {
                        rays[family][sq].set(next);
                        current = next;
                    }
                }
            }

            for side in Color::BOTH {
                let forward = side.forward();
                if let Some(single) = offset_target(sq, forward) {
                    pawn_pushes[side as usize][sq].set(single);
                    let start_rank = if side == Color::White { 1 } else { 6 };
                    if sq / 8 == start_rank {
                        if let Some(double) = offset_target(single, forward) {
                            pawn_pushes[side as usize][sq].set(double);
                        }
                    }
                }
                for diagonal in [forward - 1, forward + 1] {
                    if let Some(target) = offset_target(sq, diagonal) {
                        pawn_captures[side as usize][sq].set(target)
                    }
                }
            }
        }

        let kingside = CastleGuard::white(Wing::Kingside, &king_attacks);
        let queenside = CastleGuard::white(Wing::Queenside, &king_attacks);
        let castle_guards = [
            [kingside.vertical_flip(), queenside.vertical_flip()],
            [kingside, queenside],
        ];

        MoveGenerator {
            king_attacks,
            knight_attacks,
            rays,
            pawn_pushes,
            pawn_captures,
            castle_guards,
        }
    }

    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king_attacks[sq]
    }
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight_attacks[sq]
    }
    /// Squares a pawn of `side` standing on `sq` could capture on
    pub fn pawn_captures(&self, side: Color, sq: Square) -> Bitboard {
        self.pawn_captures[side as usize][sq]
    }

    /// Ray of one family through `origin`, cut right after the nearest blocker
    /// on each side (the blocker itself stays in)
    fn slide(&self, family: usize, origin: Square, occupancy: Bitboard) -> Bitboard {
        let mut ray = self.rays[family][origin];
        let incident = ray & occupancy;
        if let Some(nearest) = (incident & Bitboard::below(origin)).ms1b() {
            ray &= Bitboard(u64::MAX << nearest);
        }
        if let Some(nearest) = (incident & Bitboard::above(origin)).ls1b() {
            ray &= Bitboard(u64::MAX >> (63 - nearest));
        }
        ray
    }
    pub fn bishop_attacks(&self, origin: Square, occupancy: Bitboard) -> Bitboard {
        self.slide(A1H8, origin, occupancy) | self.slide(A8H1, origin, occupancy)
    }
    pub fn rook_attacks(&self, origin: Square, occupancy: Bitboard) -> Bitboard {
        self.slide(HORIZONTAL, origin, occupancy) | self.slide(VERTICAL, origin, occupancy)
    }

    fn pawn_push_targets(&self, side: Color, origin: Square, occupancy: Bitboard) -> Bitboard {
        let pushes = self.pawn_pushes[side as usize][origin];
        let single = match side {
            Color::White => pushes.ls1b(),
            Color::Black => pushes.ms1b(),
        };
        match single {
            Some(sq) if !occupancy.is_set(sq) => pushes.without(occupancy),
            _ => Bitboard::EMPTY,
        }
    }

    /// Moves that follow piece movement rules for the side to move, without
    /// regard for leaving its own king in check
    pub fn pseudo_legal_moves(&self, pos: &Position, captures_only: bool) -> MoveList {
        let side = pos.side_to_move();
        let own = pos.occupancy(side);
        let opponents = pos.occupancy(side.opposite());
        let occupancy = own | opponents;
        let targets = if captures_only { opponents } else { !own };
        let mut move_list = MoveList::default();

        let en_passant = pos
            .en_passant_target()
            .map_or(Bitboard::EMPTY, Bitboard::from_square);
        let promotion_rank = Bitboard::RANKS[side.opposite().home_rank()];
        for source in pos.pieces(side, Pawn) {
            let mut destinations = self.pawn_captures[side as usize][source] & (opponents | en_passant);
            if !captures_only {
                destinations |= self.pawn_push_targets(side, source, occupancy);
            }
            for destination in destinations {
                if promotion_rank.is_set(destination) {
                    for kind in PieceType::PROMOTIONS {
                        move_list.push(Move::new(source, destination, Some(kind)));
                    }
                } else {
                    move_list.push(Move::new_quiet(source, destination));
                }
            }
        }

        for kind in [Knight, Bishop, Rook, Queen, King] {
            for source in pos.pieces(side, kind) {
                let attacks = match kind {
                    Knight => self.knight_attacks[source],
                    Bishop => self.bishop_attacks(source, occupancy),
                    Rook => self.rook_attacks(source, occupancy),
                    Queen => self.bishop_attacks(source, occupancy) | self.rook_attacks(source, occupancy),
                    _ => self.king_attacks[source],
                };
                for destination in attacks & targets {
                    move_list.push(Move::new_quiet(source, destination));
                }
            }
        }

        if !captures_only {
            for wing in Wing::BOTH {
                if self.can_castle(pos, side, wing) {
                    let guard = &self.castle_guards[side as usize][wing as usize];
                    move_list.push(Move::new_quiet(king_home(side), guard.king_destination));
                }
            }
        }
        move_list
    }

    fn can_castle(&self, pos: &Position, side: Color, wing: Wing) -> bool {
        if !pos.castling_rights().get(side, wing)
            || pos.piece_at(king_home(side)) != Some(Piece::new(King, side))
            || pos.piece_at(rook_home(side, wing)) != Some(Piece::new(Rook, side))
        {
            return false;
        }
        let guard = &self.castle_guards[side as usize][wing as usize];
        let occupancy = pos.all_occupancy();
        let enemy = side.opposite();
        if guard.space.intersects(occupancy)
            || guard.pawns.intersects(pos.pieces(enemy, Pawn))
            || guard.knights.intersects(pos.pieces(enemy, Knight))
            || guard.king_zone.intersects(pos.pieces(enemy, King))
        {
            return false;
        }

        let straight = pos.rook_sliders(enemy);
        let diagonal = pos.bishop_sliders(enemy);
        !guard.rays.iter().any(|ray| {
            let sliders = if ray.is_diagonal() { diagonal } else { straight };
            ray.opponent_piece_precludes_castling(sliders, occupancy.without(sliders))
        })
    }

    /// Whether any piece of `attacker` could capture on `sq`
    pub fn is_attacked(&self, pos: &Position, sq: Square, attacker: Color) -> bool {
        let occupancy = pos.all_occupancy();
        self.pawn_captures[attacker.opposite() as usize][sq].intersects(pos.pieces(attacker, Pawn))
            || self.knight_attacks[sq].intersects(pos.pieces(attacker, Knight))
            || self.king_attacks[sq].intersects(pos.pieces(attacker, King))
            || self.bishop_attacks(sq, occupancy).intersects(pos.bishop_sliders(attacker))
            || self.rook_attacks(sq, occupancy).intersects(pos.rook_sliders(attacker))
    }

    /// Whether `side`'s king could be captured by the other side. A side
    /// without a king is never in check.
    pub fn in_check(&self, pos: &Position, side: Color) -> bool {
        match pos.king_square(side) {
            Some(king) => self.is_attacked(pos, king, side.opposite()),
            None => false,
        }
    }

    /// Pseudo-legal moves that do not leave the mover in check
    pub fn legal_moves(&self, pos: &Position) -> MoveList {
        let mover = pos.side_to_move();
        let mut scratch = pos.clone();
        let mut legal = MoveList::default();
        for mv in self.pseudo_legal_moves(pos, false) {
            scratch.apply(mv);
            if !self.in_check(&scratch, mover) {
                legal.push(mv);
            }
            scratch.undo();
        }
        legal
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_long_algebraic;

    #[test]
    fn sliders_stop_on_blockers() {
        let generator = MoveGenerator::new();
        // rook on d4 with blockers on d6, b4 and d1
        let occupancy = Bitboard::from_squares(&[43, 25, 3, 27]);
        let attacks = generator.rook_attacks(27, occupancy);
        assert_eq!(attacks, Bitboard::from_squares(&[35, 43, 26, 25, 28, 29, 30, 31, 19, 11, 3]));
        // bishop on a1, blocker on e5
        let attacks = generator.bishop_attacks(0, Bitboard::from_square(36));
        assert_eq!(attacks, Bitboard::from_squares(&[9, 18, 27, 36]));
        assert_eq!(generator.knight_attacks(0), Bitboard::from_squares(&[10, 17]));
        assert_eq!(generator.king_attacks(7), Bitboard::from_squares(&[6, 14, 15]));
    }

    #[test]
    fn check_detection() {
        let pos = Position::from_fen("rnbqrbnk/pppppppp/8/8/8/8/PPPPPPPP/RNBQRBqK w - - 0 1").unwrap();
        assert!(pos.in_check());
        let pos = Position::from_fen("rnbqrbnk/pppppppp/8/8/8/8/PPPPPPPP/RNBQRBNK w - - 0 1").unwrap();
        assert!(!pos.in_check());
        let kingless = Position::from_fen("8/8/8/8/8/8/8/q6K b - - 0 1").unwrap();
        assert!(!kingless.in_check());
        assert!(kingless.is_side_in_check(Color::White));
    }

    #[test]
    fn double_push_needs_a_free_path() {
        let pos = Position::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").unwrap();
        let pawn_moves: Vec<Move> = pos
            .pseudo_legal_moves(false)
            .into_iter()
            .filter(|m| m.source() == 12)
            .collect();
        assert!(pawn_moves.is_empty());
        let pos = Position::from_fen("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(from_long_algebraic(&pos, "e2e3").is_ok());
        assert!(from_long_algebraic(&pos, "e2e4").is_err());
    }

    #[test]
    fn captures_only() {
        let pos = Position::from_fen("4k3/1P6/8/3pP3/8/2n5/3P4/4K3 w - d6 0 1").unwrap();
        let captures = pos.pseudo_legal_moves(true);
        assert_eq!(captures.to_string(), "d2c3 e5d6");
    }

    #[test]
    fn castling_eligibility() {
        let can_castle = |fen: &str, mv: &str| {
            let pos = Position::from_fen(fen).unwrap();
            pos.legal_moves().contains(&Move::parse(mv).unwrap())
        };
        let open = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert!(can_castle(open, "e1g1"));
        assert!(can_castle(open, "e1c1"));
        // no right
        assert!(!can_castle("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w Qkq - 0 1", "e1g1"));
        // path blocked
        assert!(!can_castle("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3KB1R w KQkq - 0 1", "e1g1"));
        assert!(!can_castle("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K2R w KQkq - 0 1", "e1c1"));
        // knight eyeing f1
        assert!(!can_castle("r3k2r/pppppppp/8/8/8/6n1/PPPPPPPP/R3K2R w KQkq - 0 1", "e1g1"));
        // bishop on a6 eyeing f1 through an open diagonal
        assert!(!can_castle("r3k2r/pppppppp/b7/8/8/8/PPPP1PPP/R3K2R w KQkq - 0 1", "e1g1"));
        // same bishop, blocked by a pawn on d3
        assert!(can_castle("r3k2r/pppppppp/b7/8/8/3P4/PPP2PPP/R3K2R w KQkq - 0 1", "e1g1"));
        // rook on the open d file cuts the queenside path
        assert!(!can_castle("3rk2r/ppp1pppp/8/8/8/8/PPP1PPPP/R3K2R w KQk - 0 1", "e1c1"));
        assert!(can_castle("3rk2r/ppp1pppp/8/8/8/8/PPP1PPPP/R3K2R w KQk - 0 1", "e1g1"));
        // black sides are mirrored
        assert!(can_castle("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1", "e8c8"));
        assert!(!can_castle("r3k2r/ppp1pppp/8/1B6/8/8/PPPPPPPP/R3K2R b KQkq - 0 1", "e8g8"));
        // rights without the rook at home
        assert!(!can_castle("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1", "e1g1"));
    }
}
