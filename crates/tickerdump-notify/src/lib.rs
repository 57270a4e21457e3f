//! Alert helpers for tickerdump: scoring how urgent a message reads.

pub mod urgency;

pub use urgency::{Urgency, UrgencyEvaluator};
