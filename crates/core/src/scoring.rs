//! Scoring rules for assignment submission.

use std::fmt;

/// Converts a backend answer index into a zero-based choice index.
///
/// The backend is inconsistent about the base of `answer`: values inside
/// `1..=choice_count` are read as one-based, anything else is taken as
/// already zero-based.
///
/// ```
/// # use quiz_core::scoring::resolve_answer_index;
/// assert_eq!(resolve_answer_index(2, 4), 1);
/// assert_eq!(resolve_answer_index(0, 4), 0);
/// assert_eq!(resolve_answer_index(5, 4), 5);
/// ```
#[must_use]
pub fn resolve_answer_index(raw: i32, choice_count: usize) -> i32 {
    let max = i64::try_from(choice_count).unwrap_or(i64::MAX);
    if (1..=max).contains(&i64::from(raw)) {
        raw - 1
    } else {
        raw
    }
}

/// Percentage of correct answers rounded half-up to two decimals.
///
/// Computed in integer hundredths so the result does not depend on float
/// representation or locale. Returns `0.0` when `total` is zero.
#[must_use]
pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let correct = correct as u128;
    let total = total as u128;
    // round(correct * 10_000 / total), halves rounded up
    let hundredths = (correct * 20_000 + total) / (2 * total);
    hundredths as f64 / 100.0
}

/// Outcome of scoring a finished assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
    pub success: bool,
}

impl SubmissionResult {
    /// Scores `correct` out of `total`; `success` starts false until the
    /// backend acknowledges the submission.
    #[must_use]
    pub fn score(correct: usize, total: usize) -> Self {
        Self {
            correct,
            total,
            accuracy: accuracy_percent(correct, total),
            success: false,
        }
    }

    #[must_use]
    pub fn acknowledged(mut self, success: bool) -> Self {
        self.success = success;
        self
    }
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct, accuracy {:.2}%",
            self.correct, self.total, self.accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_values_in_range_are_shifted() {
        assert_eq!(resolve_answer_index(1, 4), 0);
        assert_eq!(resolve_answer_index(2, 4), 1);
        assert_eq!(resolve_answer_index(4, 4), 3);
    }

    #[test]
    fn out_of_range_values_are_kept() {
        assert_eq!(resolve_answer_index(0, 4), 0);
        assert_eq!(resolve_answer_index(-1, 4), -1);
        assert_eq!(resolve_answer_index(5, 4), 5);
        assert_eq!(resolve_answer_index(1, 0), 1);
    }

    #[test]
    fn accuracy_matches_reference_values() {
        assert_eq!(accuracy_percent(3, 10), 30.0);
        assert_eq!(accuracy_percent(1, 3), 33.33);
        assert_eq!(accuracy_percent(2, 3), 66.67);
        assert_eq!(accuracy_percent(1, 2), 50.0);
        assert_eq!(accuracy_percent(4, 4), 100.0);
    }

    #[test]
    fn accuracy_rounds_half_up() {
        // 1/32 = 3.125%
        assert_eq!(accuracy_percent(1, 32), 3.13);
        // 1/160 = 0.625%
        assert_eq!(accuracy_percent(1, 160), 0.63);
    }

    #[test]
    fn accuracy_of_empty_assignment_is_zero() {
        assert_eq!(accuracy_percent(0, 0), 0.0);
    }

    #[test]
    fn submission_result_formats_two_decimals() {
        let result = SubmissionResult::score(1, 3).acknowledged(true);
        assert!(result.success);
        assert_eq!(result.to_string(), "1/3 correct, accuracy 33.33%");
    }
}
