pub mod billing;
pub mod commands;
pub mod cyclist;
pub mod errors;
pub mod rental;
pub mod validation;
pub mod value_objects;

pub use errors::*;
pub use validation::*;
pub use value_objects::*;
