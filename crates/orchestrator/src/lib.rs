#![forbid(unsafe_code)]

pub mod clock;
pub mod domain;
pub mod engine;
pub mod engines;
pub mod error;
pub mod hooks;
pub mod notify;
pub mod persistence;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{ControlEvent, Orchestrator, Services};
pub use error::Error;
