//! Public-transport departure monitor.
//!
//! Polls the OVapi departure feed, normalizes its records into a canonical
//! departure model, caches results (a long-lived stop directory and a
//! short-lived per-station departure cache), and evaluates trigger rules
//! against the normalized data.

pub mod domain;
pub mod ovapi;
pub mod rules;
pub mod transport;
pub mod trigger;
