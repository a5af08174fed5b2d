//! Per-item processing lifecycle and bulk dispatch.

mod controller;

pub use controller::{Dispatch, ProcessOutcome, ProcessingController};
