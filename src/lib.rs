//! Shift Guard: field-shift lifecycle and anti-fraud scoring
//!
//! This crate decides whether a clock-in, clock-out or live tracking ping from
//! a field employee's phone is accepted, keeps the state of each shift, and
//! records scored fraud alerts when something looks wrong.

#![warn(missing_docs)]

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod geo;
pub mod guard;
pub mod models;
pub mod store;
