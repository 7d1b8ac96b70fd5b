// Readers that gather risk engine inputs from chain
pub mod compound_v3;
pub mod traits;

pub use traits::*;
