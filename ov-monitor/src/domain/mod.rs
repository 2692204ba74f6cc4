//! Domain types for the departure monitor.
//!
//! This module contains the core domain model types that represent
//! validated transit data. All types enforce their invariants at
//! construction time, so code that receives these types can trust
//! their validity.

mod departure;
mod stop;
mod time;

pub use departure::{Departure, DepartureStatus, TransportType};
pub use stop::{InvalidStopCode, StopArea, StopCode};
pub use time::{format_local_hhmm, now_ms, parse_instant_ms};
