pub mod formatters;
pub mod logging;

pub use formatters::*;
pub use logging::init_tracing;
