//! The anti-fraud rules engine.
//!
//! [`GuardService`] runs every inbound action through the device check,
//! the shift state machine or the tracking guards, and raises scored fraud
//! alerts through the [`FraudScoringEngine`].

mod device_binding;
mod fraud_scoring;
mod locks;
mod service;
mod shift_lifecycle;
mod shift_metrics;
mod tracking;

pub use device_binding::{BindingStatus, DeviceBindingValidator};
pub use fraud_scoring::{FraudScoringEngine, FraudSignal};
pub use service::GuardService;
pub use shift_metrics::{build_report_row, calculate_shift_metrics, format_minutes, totalize_report};
