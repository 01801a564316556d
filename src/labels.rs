use std::collections::HashMap;
use std::fmt;

/// Sentinel sent back when the predicted class has no symbol.
pub const UNKNOWN_SYMBOL: char = '?';

/// SIBI alphabet classes in training order: `A` is class 0, `Z` is class 25.
const SIBI_CLASSES: [(char, usize); 26] = [
    ('A', 0), ('B', 1), ('C', 2), ('D', 3), ('E', 4), ('F', 5), ('G', 6),
    ('H', 7), ('I', 8), ('J', 9), ('K', 10), ('L', 11), ('M', 12), ('N', 13),
    ('O', 14), ('P', 15), ('Q', 16), ('R', 17), ('S', 18), ('T', 19), ('U', 20),
    ('V', 21), ('W', 22), ('X', 23), ('Y', 24), ('Z', 25),
];

/// A predicted class as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Letter(char),
    Unknown,
}

impl Label {
    pub fn as_char(&self) -> char {
        match self {
            Label::Letter(c) => *c,
            Label::Unknown => UNKNOWN_SYMBOL,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Class index → label lookup, built once as the inverse of the
/// symbol → index table the model was trained with.
#[derive(Debug, Clone)]
pub struct LabelMap {
    by_index: HashMap<usize, char>,
}

impl LabelMap {
    pub fn from_training_table(table: &[(char, usize)]) -> Self {
        let by_index = table.iter().map(|&(symbol, idx)| (idx, symbol)).collect();
        Self { by_index }
    }

    pub fn sibi() -> Self {
        Self::from_training_table(&SIBI_CLASSES)
    }

    pub fn class_count(&self) -> usize {
        self.by_index.len()
    }

    pub fn label(&self, index: usize) -> Label {
        self.by_index
            .get(&index)
            .map_or(Label::Unknown, |c| Label::Letter(*c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibi_table_covers_the_alphabet_in_order() {
        let map = LabelMap::sibi();
        assert_eq!(map.class_count(), 26);
        for (i, c) in ('A'..='Z').enumerate() {
            assert_eq!(map.label(i), Label::Letter(c));
        }
    }

    #[test]
    fn unmapped_index_is_unknown() {
        let map = LabelMap::sibi();
        assert_eq!(map.label(26), Label::Unknown);
        assert_eq!(map.label(usize::MAX).to_string(), "?");
    }

    #[test]
    fn inverse_of_sparse_table() {
        let map = LabelMap::from_training_table(&[('B', 1), ('Q', 7)]);
        assert_eq!(map.label(0), Label::Unknown);
        assert_eq!(map.label(1).to_string(), "B");
        assert_eq!(map.label(7).as_char(), 'Q');
    }
}
