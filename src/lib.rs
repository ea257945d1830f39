pub mod core;
pub mod error;
pub mod inference;
pub mod linalg;
pub mod logger;

pub use error::{ApexError, ApexResult};
pub use logger::{init_logger, init_logger_with_level};
