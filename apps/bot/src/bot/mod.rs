//! Scheduled posting loop and its recovery policy.

pub mod runner;
