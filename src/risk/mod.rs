// Position risk engine: fixed-point conversion, position aggregation and
// swap mode recommendation. Everything here is synchronous and pure.

pub mod errors;
pub mod fixed_point;
pub mod policy;
pub mod position;

pub use errors::*;
pub use fixed_point::{base_to_real, price_to_real, to_real};
pub use policy::*;
pub use position::*;
