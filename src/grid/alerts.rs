//! Page-local alert acknowledgment.

/// Acknowledgment marks for the alerts page, keyed by position.
///
/// An index refers to a position within the *current* filtered alert list,
/// not to a reading. If the list changes between renders the marks silently
/// point at different alerts; the board only guards against this by
/// forgetting everything when the dataset generation changes.
#[derive(Debug, Clone, Default)]
pub struct AlertBoard {
    generation: u64,
    acknowledged: Vec<usize>,
}

impl AlertBoard {
    /// Creates an empty board for the given dataset generation.
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            acknowledged: Vec::new(),
        }
    }

    /// Generation the current marks belong to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops every mark if `generation` differs from the board's.
    ///
    /// Returns `true` if the board was reset.
    pub fn sync(&mut self, generation: u64) -> bool {
        if self.generation == generation {
            return false;
        }
        self.generation = generation;
        self.acknowledged.clear();
        true
    }

    /// Marks the alert at `index`. Returns `false` if it was already marked.
    pub fn acknowledge(&mut self, index: usize) -> bool {
        if self.acknowledged.contains(&index) {
            return false;
        }
        self.acknowledged.push(index);
        true
    }

    /// Returns `true` if the alert at `index` is marked.
    pub fn is_acknowledged(&self, index: usize) -> bool {
        self.acknowledged.contains(&index)
    }

    /// Number of marked positions.
    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.len()
    }

    /// Forgets every mark, keeping the generation.
    pub fn clear(&mut self) {
        self.acknowledged.clear();
    }
}
