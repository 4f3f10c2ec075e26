//! Core data models for the shift guard.
//!
//! This module contains all the domain models used throughout the engine.

mod coordinate;
mod employee;
mod fraud_alert;
mod location;
mod report;
mod shift;

pub use coordinate::{COORDINATE_SCALE, Coordinate, CoordinateInput, PositionReport};
pub use employee::{Actor, Employee};
pub use fraud_alert::{AlertFilter, FraudAlert, FraudType, ScoreKey, Severity};
pub use location::{LivePosition, LocationSample};
pub use report::{ReportRow, ReportTotals, ShiftMetrics, ShiftReport};
pub use shift::{Shift, ShiftAdjustment, ShiftFilter, ShiftStatus};
