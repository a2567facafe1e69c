use crate::evaluation::Score;
use crate::r#move::Move;
use arrayvec::ArrayVec;

pub const MAX_MOVELIST_CAPACITY: usize = 255;

/// Fixed capacity move buffer, no position has more than 218 legal moves
#[derive(Clone, Debug, Default)]
pub struct MoveList(ArrayVec<Move, MAX_MOVELIST_CAPACITY>);

impl MoveList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn push(&mut self, m: Move) {
        self.0.push(m)
    }
    pub fn contains(&self, m: &Move) -> bool {
        self.0.contains(m)
    }

    /// Yields moves by decreasing score, selecting the best remaining one lazily
    /// so that a cutoff does not pay for sorting the whole list
    pub fn best_first_iter<F: Fn(&Move) -> Score>(
        &self,
        scoring_function: &F,
    ) -> ScoredMoveListIter {
        ScoredMoveListIter::new(self, scoring_function)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.0.iter()
    }
}
impl From<Vec<Move>> for MoveList {
    fn from(v: Vec<Move>) -> Self {
        let mut mv_list = MoveList::default();
        for m in v {
            mv_list.push(m)
        }
        mv_list
    }
}
impl std::fmt::Display for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let repr = self
            .0
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{}", repr)
    }
}
impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = arrayvec::IntoIter<Move, MAX_MOVELIST_CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub struct ScoredMoveListIter {
    moves: ArrayVec<Move, MAX_MOVELIST_CAPACITY>,
    scores: ArrayVec<Score, MAX_MOVELIST_CAPACITY>,
}
impl ScoredMoveListIter {
    pub fn new<F: Fn(&Move) -> Score>(move_list: &MoveList, scoring_function: &F) -> Self {
        let mut moves = ArrayVec::new();
        let mut scores = ArrayVec::new();
        for mv in move_list {
            scores.push(scoring_function(mv));
            moves.push(*mv);
        }
        ScoredMoveListIter { moves, scores }
    }
}
impl Iterator for ScoredMoveListIter {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        let first = *self.scores.first()?;
        let (mut best_index, mut best_score) = (0, first);
        for (i, s) in self.scores.iter().enumerate() {
            if *s > best_score {
                best_score = *s;
                best_index = i;
            }
        }
        // Shift rather than swap so equally scored moves keep generation order
        self.scores.remove(best_index);
        Some(self.moves.remove(best_index))
    }
}
