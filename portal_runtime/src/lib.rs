#![forbid(unsafe_code)]

//! Student portal runtime.
//!
//! Wraps the directory store with configuration, page summaries, search
//! and filters, the study tutor, per-session lifecycle, replay and drift
//! detection.
//!
//! No state transitions live here. Every change to directory data goes
//! through the store.

pub mod config;
pub mod drift;
pub mod logging;
pub mod pages;
pub mod query;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod tutor;
