//! Summary statistics of the movements booked in a period.

use super::outcome::{Outcome, Unavailable};
use super::records::MovementRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementSummary {
    pub count: usize,
    pub total_amount: i128,
    pub mean_amount: f64,
}

pub fn summarize_movements(movements: &[MovementRecord]) -> Outcome<MovementSummary> {
    if movements.is_empty() {
        return Outcome::unavailable(Unavailable::NoData);
    }
    let total_amount: i128 = movements.iter().map(|m| i128::from(m.amount)).sum();
    Outcome::computed(MovementSummary {
        count: movements.len(),
        total_amount,
        mean_amount: total_amount as f64 / movements.len() as f64,
    })
}
