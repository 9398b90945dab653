//! Learner submissions and how they are judged.
//!
//! Input capture hands over raw field text. Anything that does not parse
//! as a non-negative decimal simply never matches.

use serde::{Deserialize, Serialize};

use crate::problem::{Phase, Problem};

/// A completed entry from the input capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Submission {
    /// Reconstruction of a study fact: two addends in either order, then the sum.
    Study {
        first: String,
        second: String,
        sum: String,
    },
    Recall { answer: String },
}

impl Submission {
    pub fn study(first: impl Into<String>, second: impl Into<String>, sum: impl Into<String>) -> Self {
        Submission::Study {
            first: first.into(),
            second: second.into(),
            sum: sum.into(),
        }
    }

    pub fn recall(answer: impl Into<String>) -> Self {
        Submission::Recall {
            answer: answer.into(),
        }
    }

    /// Phase whose input mode produces this shape of entry.
    pub fn phase(&self) -> Phase {
        match self {
            Submission::Study { .. } => Phase::Study,
            Submission::Recall { .. } => Phase::Recall,
        }
    }

    pub fn is_correct_for(&self, problem: &Problem) -> bool {
        match self {
            Submission::Study { first, second, sum } => is_study_correct(
                problem,
                parse_number(first),
                parse_number(second),
                parse_number(sum),
            ),
            Submission::Recall { answer } => is_recall_correct(problem, parse_number(answer)),
        }
    }
}

/// Parse one field. Surrounding whitespace is ignored.
pub fn parse_number(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// Addends must match as an unordered pair and the sum must be exact.
pub fn is_study_correct(
    problem: &Problem,
    entered_a: Option<u32>,
    entered_b: Option<u32>,
    entered_sum: Option<u32>,
) -> bool {
    let (Some(x), Some(y), Some(sum)) = (entered_a, entered_b, entered_sum) else {
        return false;
    };
    let addends_match = (x == problem.addend_a && y == problem.addend_b)
        || (x == problem.addend_b && y == problem.addend_a);
    addends_match && sum == problem.sum()
}

pub fn is_recall_correct(problem: &Problem, answer: Option<u32>) -> bool {
    answer == Some(problem.sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_accepts_either_addend_order() {
        let p = Problem::new(3, 4);
        assert!(is_study_correct(&p, Some(3), Some(4), Some(7)));
        assert!(is_study_correct(&p, Some(4), Some(3), Some(7)));
    }

    #[test]
    fn study_rejects_wrong_sum_or_addend() {
        let p = Problem::new(3, 4);
        assert!(!is_study_correct(&p, Some(3), Some(4), Some(8)));
        assert!(!is_study_correct(&p, Some(3), Some(3), Some(7)));
        assert!(!is_study_correct(&p, Some(2), Some(5), Some(7)));
        assert!(!is_study_correct(&p, None, Some(4), Some(7)));
    }

    #[test]
    fn doubles_need_both_addends() {
        let p = Problem::new(6, 6);
        assert!(is_study_correct(&p, Some(6), Some(6), Some(12)));
        assert!(!is_study_correct(&p, Some(6), Some(0), Some(12)));
    }

    #[test]
    fn non_numeric_input_never_matches() {
        let p = Problem::new(2, 2);
        assert!(!Submission::recall("four").is_correct_for(&p));
        assert!(!Submission::recall("").is_correct_for(&p));
        assert!(!Submission::recall("-4").is_correct_for(&p));
        assert!(!Submission::study("2", "2", "4.0").is_correct_for(&p));
    }

    #[test]
    fn whitespace_is_trimmed() {
        let p = Problem::new(5, 4);
        assert!(Submission::recall(" 9\n").is_correct_for(&p));
        assert!(Submission::study(" 4", "5 ", "9").is_correct_for(&p));
    }

    #[test]
    fn submission_shape_maps_to_phase() {
        assert_eq!(Submission::recall("1").phase(), Phase::Recall);
        assert_eq!(Submission::study("1", "1", "2").phase(), Phase::Study);
    }
}
