//! Answer normalization and evaluation.
//!
//! Correctness is an exact match on the full normalized string. Partial and
//! prefix matches never count: one historical variant that accepted any text
//! containing the first expected word is deliberately not reproduced.

use crate::model::AnswerOutcome;

/// Punctuation removed during normalization.
const STRIPPED_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// Reduces an answer string to its canonical comparable form: lowercase,
/// strip `.` `,` `!` `?`, trim surrounding whitespace.
///
/// Pure and total; normalizing an already-normalized string is a no-op.
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    stripped.trim().to_string()
}

/// Classifies a submitted answer against the expected answer.
///
/// Empty or whitespace-only input is `Unanswered` (recorded distinctly,
/// scored as incorrect). Anything else is compared by normalized equality.
#[must_use]
pub fn evaluate(submitted: &str, expected: &str) -> AnswerOutcome {
    if submitted.trim().is_empty() {
        return AnswerOutcome::Unanswered;
    }
    if normalize(submitted) == normalize(expected) {
        AnswerOutcome::Correct
    } else {
        AnswerOutcome::Incorrect
    }
}
