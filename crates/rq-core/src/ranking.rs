//! # Answer Ranking
//!
//! Display order for a question's answers: correct answers first, then by
//! descending net score. Equal answers keep their posting order, which
//! relies on `sort_by` being a stable sort.

use std::cmp::Ordering;

use crate::models::Answer;

/// Total order used for display. `Less` means `a` is shown before `b`.
pub fn display_order(a: &Answer, b: &Answer) -> Ordering {
    b.is_correct()
        .cmp(&a.is_correct())
        .then_with(|| b.score().cmp(&a.score()))
}

/// Sorts `answers` in place into display order.
pub fn rank_answers(answers: &mut [Answer]) {
    answers.sort_by(display_order);
}

/// Returns references to `answers` in display order without touching the slice.
pub fn ranked(answers: &[Answer]) -> Vec<&Answer> {
    let mut order: Vec<&Answer> = answers.iter().collect();
    order.sort_by(|a, b| display_order(a, b));
    order
}
