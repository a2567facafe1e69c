pub type Square = usize;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}
/// Mirrors a square across the middle of the board, keeping its file
/// ```
/// use stratagem::square::vertical_symmetry;
/// assert_eq!(vertical_symmetry(4), 60);
/// assert_eq!(vertical_symmetry(11), 51);
/// ```
pub fn vertical_symmetry(sq: Square) -> Square {
    8 * (7 - rank_of(sq)) + file_of(sq)
}

/// Parses a square from a given string slice,
/// only caring that the first two characters form a valid square representation
/// ```
/// use stratagem::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2someotherstuff"), Some(11));
/// assert_eq!(parse_square("randoma1stuff"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = match chars.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars.next()?.to_digit(10) {
        Some(r) if (1..=8).contains(&r) => r as usize - 1,
        _ => return None,
    };
    Some(rank * 8 + file)
}

/// Returns the string representation of a square
/// ```
/// use stratagem::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if sq >= 64 {
        return None;
    }
    let mut repr = file_char(sq).to_string();
    repr.push(rank_char(sq));
    Some(repr)
}

pub fn file_char(sq: Square) -> char {
    (b'a' + file_of(sq) as u8) as char
}
pub fn rank_char(sq: Square) -> char {
    (b'1' + rank_of(sq) as u8) as char
}
