//! SKYTECH-3: a small synthetic equal-weighted stock index.
//!
//! The crate normalizes heterogeneous per-ticker price series (mixed
//! timezones, provider-dependent response shapes, missing bars) into one
//! coherent index: a long-horizon daily level series anchored at a base
//! level, and an intraday percent-change-vs-open series with a bounded
//! look-back fallback for days without a session.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod output;
pub mod services;
