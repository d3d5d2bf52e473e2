#![forbid(unsafe_code)]

mod client;
mod error;
pub mod extract;
mod snapshot;
mod source;

pub use client::{ProfileOracle, USER_AGENT, profile_url};
pub use error::FetchError;
pub use snapshot::ProfileSnapshot;
pub use source::{ProfileSource, ScriptedSource};
