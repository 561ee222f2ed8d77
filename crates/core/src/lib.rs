pub mod error;
pub mod grading;
pub mod model;
pub mod time;

pub use error::Error;
pub use time::Clock;
