pub mod logger;

pub use logger::{PassLog, RunLog, RunLogger};
