pub mod asset;
pub mod swap;

pub use asset::*;
pub use swap::*;
