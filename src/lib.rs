//! Pocketfin
//!
//! Personal-finance and task-tracking operations over a single document per
//! user. Every operation authenticates a caller, loads that caller's document
//! from an external document store, mutates one embedded collection and writes
//! it back; paid transactions additionally adjust the owning account's cached
//! balance through a second, independent write.

pub mod config;
pub mod core;
pub mod service;
pub mod store;
