#![forbid(unsafe_code)]

mod cursor;
mod daily;
mod edge;
mod session;

pub use cursor::VideoCursor;
pub use daily::{DailyDelta, reduce_day};
pub use edge::{Edge, EdgeState};
pub use session::SessionState;
