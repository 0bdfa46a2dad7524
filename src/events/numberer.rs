use std::collections::HashMap;

/// Index reserved for tokens outside the vocabulary.
pub const UNKNOWN_INDEX: usize = 0;

/// Name reported for the unknown index.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Bidirectional mapping between tokens and dense 1-based indices.
///
/// Indices are assigned in first-seen order and never reused or renumbered.
/// Index 0 is reserved for unknown tokens. Freezing stops vocabulary growth:
/// a frozen numberer answers 0 for unseen tokens instead of assigning a new
/// index.
///
/// Not safe for unsynchronized concurrent use: `number` must check and
/// assign atomically, and there is no internal locking.
#[derive(Debug, Clone)]
pub struct Numberer {
    known: HashMap<String, usize>,
    items: Vec<String>,
    add: bool,
}

impl Numberer {
    pub fn new() -> Self {
        Self {
            known: HashMap::new(),
            items: Vec::new(),
            add: true,
        }
    }

    /// Returns the index for `token`, assigning the next free index when the
    /// token is new and add-mode is on. With add-mode off, unseen tokens map
    /// to [`UNKNOWN_INDEX`] without mutating any state.
    pub fn number(&mut self, token: &str) -> usize {
        if let Some(&idx) = self.known.get(token) {
            return idx;
        }
        if !self.add {
            return UNKNOWN_INDEX;
        }
        self.items.push(token.to_string());
        let idx = self.items.len();
        self.known.insert(token.to_string(), idx);
        idx
    }

    /// Non-mutating lookup. Membership tests must not grow the vocabulary.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.known.get(token).copied()
    }

    /// Returns the token recorded at `index`, `"UNKNOWN"` for index 0, or
    /// `None` past the assigned range.
    pub fn name(&self, index: usize) -> Option<&str> {
        if index == UNKNOWN_INDEX {
            return Some(UNKNOWN_NAME);
        }
        self.items.get(index - 1).map(String::as_str)
    }

    /// Stop assigning new indices; unseen tokens answer 0.
    pub fn freeze(&mut self) {
        self.add = false;
    }

    /// Resume assigning new indices to unseen tokens.
    pub fn unfreeze(&mut self) {
        self.add = true;
    }

    pub fn is_frozen(&self) -> bool {
        !self.add
    }

    /// All known tokens in index order (`names()[i]` has index `i + 1`).
    pub fn names(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Numberer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_assigns_in_first_seen_order() {
        let mut numberer = Numberer::new();
        assert_eq!(numberer.number("a"), 1);
        assert_eq!(numberer.number("b"), 2);
        assert_eq!(numberer.number("c"), 3);
        assert_eq!(numberer.names(), &["a", "b", "c"]);
    }

    #[test]
    fn test_number_is_idempotent() {
        let mut numberer = Numberer::new();
        let first = numberer.number("token");
        let second = numberer.number("token");
        assert_eq!(first, second);
        assert_eq!(numberer.len(), 1);
    }

    #[test]
    fn test_name_round_trip() {
        let mut numberer = Numberer::new();
        for token in ["walk", "walked", "walking"] {
            let idx = numberer.number(token);
            assert_eq!(numberer.name(idx), Some(token));
        }
    }

    #[test]
    fn test_name_of_unknown_and_out_of_range() {
        let mut numberer = Numberer::new();
        numberer.number("only");
        assert_eq!(numberer.name(0), Some(UNKNOWN_NAME));
        assert_eq!(numberer.name(1), Some("only"));
        assert_eq!(numberer.name(2), None);
    }

    #[test]
    fn test_freeze_stops_growth() {
        let mut numberer = Numberer::new();
        numberer.number("seen");
        numberer.freeze();

        assert_eq!(numberer.number("unseen"), UNKNOWN_INDEX);
        assert_eq!(numberer.number("unseen"), UNKNOWN_INDEX);
        assert_eq!(numberer.len(), 1);
        // known tokens still resolve while frozen
        assert_eq!(numberer.number("seen"), 1);
    }

    #[test]
    fn test_unfreeze_resumes_assignment() {
        let mut numberer = Numberer::new();
        numberer.number("a");
        numberer.freeze();
        assert_eq!(numberer.number("b"), UNKNOWN_INDEX);
        numberer.unfreeze();
        assert_eq!(numberer.number("b"), 2);
    }

    #[test]
    fn test_index_of_does_not_mutate() {
        let mut numberer = Numberer::new();
        numberer.number("a");
        assert_eq!(numberer.index_of("missing"), None);
        assert_eq!(numberer.len(), 1);
        assert_eq!(numberer.index_of("a"), Some(1));
    }
}
