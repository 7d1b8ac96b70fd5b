pub mod position_service;

pub use position_service::*;
