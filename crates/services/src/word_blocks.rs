//! Builds the shuffled word-block tray for block-mode answer entry.

use rand::rng;
use rand::seq::SliceRandom;

use honyaku_core::model::WordBlockState;

/// Split the expected answer on whitespace and shuffle the tokens into a
/// fresh tray with nothing selected.
///
/// The shuffle is a uniform permutation, so every ordering of the tray is
/// equally likely; the selected sequence always starts empty.
#[must_use]
pub fn assemble(expected_answer: &str) -> WordBlockState {
    let mut tokens: Vec<String> = expected_answer
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect();
    let mut rng = rng();
    tokens.as_mut_slice().shuffle(&mut rng);
    WordBlockState::from_tokens(tokens)
}
