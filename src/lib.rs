#![doc(test(attr(deny(warnings))))]

//! Forecast Core projects a starting balance forward over a date window by
//! expanding recurring transactions into daily rows with running totals.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod execution;
pub mod export;
pub mod ledger;
pub mod projection;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Forecast Core tracing initialized.");
    });
}
