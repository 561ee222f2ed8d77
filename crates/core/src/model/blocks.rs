//
// ─── WORD BLOCK STATE ──────────────────────────────────────────────────────────
//

/// Transient per-question state for word-block answer entry.
///
/// `available` is the pool of not-yet-chosen tokens; `selected` is the
/// player's reconstruction in click order. Every selected token was drawn
/// from the pool and removed from it, and deselecting puts it back: only the
/// selected order carries meaning, the pool order does not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordBlockState {
    available: Vec<String>,
    selected: Vec<String>,
}

impl WordBlockState {
    /// Builds state from an already-shuffled token sequence with nothing
    /// selected yet.
    #[must_use]
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        Self {
            available: tokens,
            selected: Vec::new(),
        }
    }

    /// Tokens still available for selection.
    #[must_use]
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// Tokens chosen so far, in click order.
    #[must_use]
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Moves one occurrence of `token` from the pool to the end of the
    /// selected sequence.
    ///
    /// Returns false (state unchanged) when the token is not currently
    /// available, whether already selected or never present.
    pub fn select(&mut self, token: &str) -> bool {
        let Some(position) = self.available.iter().position(|t| t == token) else {
            return false;
        };
        let token = self.available.remove(position);
        self.selected.push(token);
        true
    }

    /// Removes the token at `index` in the selected sequence and returns it
    /// to the pool, so misclicks stay correctable.
    ///
    /// Returns false (state unchanged) when `index` is out of range.
    pub fn deselect(&mut self, index: usize) -> bool {
        if index >= self.selected.len() {
            return false;
        }
        let token = self.selected.remove(index);
        self.available.push(token);
        true
    }

    /// Joins the selected sequence with single spaces into the candidate
    /// answer. Depends only on selection order.
    #[must_use]
    pub fn materialize(&self) -> String {
        self.selected.join(" ")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
