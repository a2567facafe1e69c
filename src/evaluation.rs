use crate::bitboard::Bitboard;
use crate::castling::Wing;
use crate::pawn_king_cache::{PawnKingCache, PawnStructure};
use crate::piece::Color;
use crate::piece::PieceType::{Bishop, Knight, Pawn, Queen, Rook};
use crate::position::Position;
use crate::square::{file_of, rank_of};

pub type Score = i32;

/// Magnitude of a checkmate, far beyond any material balance
pub const LARGE: Score = 1_000_000_000;
/// Per full move adjustment of mate scores, so that faster mates score higher
pub const MOVE: Score = 10_000;

const KNIGHT_VALUE: f32 = 320.;
const BISHOP_VALUE: f32 = 333.;
const ROOK_VALUE: f32 = 510.;
const QUEEN_VALUE: f32 = 880.;
const PAWN_VALUE: f32 = 100.;
const MISSING_KING: f32 = 1_000_000.;
const BISHOP_PAIR_BONUS: f32 = 50.;
/// Non-king material each side starts with
const START_MATERIAL: f32 =
    2. * ROOK_VALUE + 2. * KNIGHT_VALUE + 2. * BISHOP_VALUE + QUEEN_VALUE + 8. * PAWN_VALUE;

const ROOK_OPEN_FILE: f32 = 50.;
const ROOK_SEMI_OPEN_FILE: f32 = 25.;
const CASTLE_RIGHT_QUEENSIDE: f32 = 15.;
const CASTLE_RIGHT_KINGSIDE: f32 = 30.;

const DOUBLED_PAWN: f32 = 15.;
const ISOLATED_PAWN: f32 = 15.;
const PASSED_PAWN: f32 = 30.;

const KING_RANK_FACTOR: f32 = 75.;
const KING_FILE: [f32; 8] = [0., 0., -90., -180., -180., -90., 0., 0.];

// [relative rank][centrality], centrality going from 0 (files a and h) to 3 (files d and e)
const PAWN_TABLE_OPENING: [[f32; 4]; 8] = [
    [0., 0., 0., 0.],
    [90., 95., 105., 110.],
    [90., 95., 105., 115.],
    [90., 95., 110., 120.],
    [97., 103., 117., 127.],
    [106., 112., 125., 140.],
    [117., 122., 134., 159.],
    [0., 0., 0., 0.],
];
const PAWN_TABLE_ENDGAME: [[f32; 4]; 8] = [
    [0., 0., 0., 0.],
    [120., 105., 95., 90.],
    [120., 105., 95., 90.],
    [125., 110., 100., 95.],
    [133., 117., 107., 100.],
    [145., 129., 116., 105.],
    [161., 146., 127., 110.],
    [0., 0., 0., 0.],
];

/// Static evaluation of positions, in centipawns from the point of view of the side to move.
///
/// Every term is computed for both sides and taken as a difference. Terms are
/// weighted by the endgame fraction, so that king safety and castling matter
/// early while king activity and pawn advancement matter late.
pub struct Evaluator {
    pawn_king_cache: PawnKingCache,
    /// Indexed by `[Color][Wing]`
    shield_home: [[Bitboard; 2]; 2],
    shield_forward: [[Bitboard; 2]; 2],
}

impl Evaluator {
    pub fn new(pawn_king_capacity: usize) -> Evaluator {
        let kingside_home = Bitboard::from_squares(&[13, 14, 15]);
        let queenside_home = Bitboard::from_squares(&[8, 9, 10]);
        let white_home = [kingside_home, queenside_home];
        let white_forward = [kingside_home << 8, queenside_home << 8];
        Evaluator {
            pawn_king_cache: PawnKingCache::new(pawn_king_capacity),
            shield_home: [white_home.map(|bb| bb.vertical_flip()), white_home],
            shield_forward: [white_forward.map(|bb| bb.vertical_flip()), white_forward],
        }
    }

    pub fn pawn_king_cache(&self) -> &PawnKingCache {
        &self.pawn_king_cache
    }
    pub fn clear(&mut self) {
        self.pawn_king_cache.clear()
    }

    pub fn fitness(&mut self, pos: &Position) -> Score {
        let me = pos.side_to_move();
        let opp = me.opposite();
        let endgame_fraction = Self::endgame_fraction(pos);

        let mut fitness = Self::material(pos, me) - Self::material(pos, opp);

        let entry = self.pawn_king_cache.get(pos);
        fitness += Self::pawn_structure(entry.of(me)) - Self::pawn_structure(entry.of(opp));
        fitness += Self::pawn_table(pos, me, endgame_fraction) - Self::pawn_table(pos, opp, endgame_fraction);

        fitness += self.king_safety(pos, me, endgame_fraction) - self.king_safety(pos, opp, endgame_fraction);
        fitness += Self::rook_files(pos, me) - Self::rook_files(pos, opp);
        fitness += self.castle_rights(pos, me, endgame_fraction) - self.castle_rights(pos, opp, endgame_fraction);

        // Losing the king later is better than losing it sooner
        let move_adjustment = (pos.full_move_counter() as f32) * MOVE as f32;
        if pos.king_square(me).is_none() {
            fitness += move_adjustment;
        }
        if pos.king_square(opp).is_none() {
            fitness -= move_adjustment;
        }

        fitness.round() as Score
    }

    /// Non-pawn material of one side, pawns being valued by the pawn tables
    fn material(pos: &Position, side: Color) -> f32 {
        let count = |kind| pos.pieces(side, kind).pop_count() as f32;
        let bishops = count(Bishop);
        let mut material = count(Knight) * KNIGHT_VALUE
            + bishops * BISHOP_VALUE
            + count(Rook) * ROOK_VALUE
            + count(Queen) * QUEEN_VALUE;
        if bishops >= 2. {
            material += BISHOP_PAIR_BONUS;
        }
        if pos.king_square(side).is_none() {
            material -= MISSING_KING;
        }
        material
    }

    /// How far the game is into the endgame, judged by the opponent's remaining material:
    /// 0 while the opponent has everything, 1 when only its king is left
    pub fn endgame_fraction(pos: &Position) -> f32 {
        let opp = pos.side_to_move().opposite();
        let count = |kind| pos.pieces(opp, kind).pop_count() as f32;
        let material = count(Pawn) * PAWN_VALUE
            + count(Knight) * KNIGHT_VALUE
            + count(Bishop) * BISHOP_VALUE
            + count(Rook) * ROOK_VALUE
            + count(Queen) * QUEEN_VALUE;
        (1. - material / START_MATERIAL).clamp(0., 1.)
    }

    fn pawn_structure(structure: PawnStructure) -> f32 {
        PASSED_PAWN * structure.passed as f32
            - DOUBLED_PAWN * structure.doubled as f32
            - ISOLATED_PAWN * structure.isolated as f32
    }

    fn pawn_table(pos: &Position, side: Color, endgame_fraction: f32) -> f32 {
        let mut pawns = pos.pieces(side, Pawn);
        if side == Color::Black {
            pawns = pawns.vertical_flip();
        }
        let mut result = 0.;
        for sq in pawns {
            let (rank, file) = (rank_of(sq), file_of(sq));
            let centrality = file.min(7 - file);
            result += (1. - endgame_fraction) * PAWN_TABLE_OPENING[rank][centrality]
                + endgame_fraction * PAWN_TABLE_ENDGAME[rank][centrality];
        }
        result
    }

    /// Home corners are safe early and passive late, the center is the opposite.
    /// Early on, a castled king also wants an intact pawn shield and a closed file.
    pub fn king_safety(&self, pos: &Position, side: Color, endgame_fraction: f32) -> f32 {
        let king = match pos.king_square(side) {
            Some(sq) => sq,
            None => return 0.,
        };
        let distance_from_home_rank = rank_of(king).abs_diff(side.home_rank()) as f32;
        let file = file_of(king);
        let rank_fitness = -KING_RANK_FACTOR * distance_from_home_rank * (0.6 - endgame_fraction);
        let file_fitness = KING_FILE[file] * (0.6 - endgame_fraction);

        let mut pawn_shield_penalty = 0.;
        let mut open_file_penalty = 0.;
        let wing = match file {
            0..=2 => Some(Wing::Queenside),
            5..=7 => Some(Wing::Kingside),
            _ => None,
        };
        if let (Some(wing), true) = (wing, endgame_fraction < 0.7) {
            let pawns = pos.pieces(side, Pawn);
            let home = (pawns & self.shield_home[side as usize][wing as usize]).pop_count();
            let forward = (pawns & self.shield_forward[side as usize][wing as usize]).pop_count();
            pawn_shield_penalty = match home + forward {
                0 => 150.,
                1 => 50. * home as f32 + 75. * forward as f32,
                2 => 25. * home as f32 + 50. * forward as f32,
                _ => 0.,
            } * (1. - endgame_fraction);

            if !pawns.intersects(Bitboard::FILES[file]) {
                open_file_penalty = 150. * (1. - endgame_fraction);
            }
        }

        rank_fitness + file_fitness - pawn_shield_penalty - open_file_penalty
    }

    /// Bonus for rooks on files free of own pawns
    pub fn rook_files(pos: &Position, side: Color) -> f32 {
        let own_pawns = pos.pieces(side, Pawn);
        let enemy_pawns = pos.pieces(side.opposite(), Pawn);
        let mut result = 0.;
        for sq in pos.pieces(side, Rook) {
            let file = Bitboard::FILES[file_of(sq)];
            if !file.intersects(own_pawns) {
                result += if file.intersects(enemy_pawns) {
                    ROOK_SEMI_OPEN_FILE
                } else {
                    ROOK_OPEN_FILE
                };
            }
        }
        result
    }

    /// Value of still being able to castle, lowered when the shield on that wing is broken
    pub fn castle_rights(&self, pos: &Position, side: Color, endgame_fraction: f32) -> f32 {
        if endgame_fraction > 0.5 {
            return 0.;
        }
        let rights = pos.castling_rights();
        let mut result = 0.;
        if rights.get(side, Wing::Queenside) {
            result += CASTLE_RIGHT_QUEENSIDE;
        }
        if rights.get(side, Wing::Kingside) {
            result += CASTLE_RIGHT_KINGSIDE;
        }
        let pawns = pos.pieces(side, Pawn);
        let shield = |wing: Wing| (pawns & self.shield_home[side as usize][wing as usize]).pop_count() as f32;
        result -= 10. * (3. - shield(Wing::Queenside));
        result -= 25. * (3. - shield(Wing::Kingside));
        result * (1. - 2. * endgame_fraction)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(PawnKingCache::DEFAULT_CAPACITY)
    }
}
