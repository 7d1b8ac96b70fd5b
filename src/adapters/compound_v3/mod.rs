pub mod contracts;
pub mod reader;

pub use reader::CometReader;
