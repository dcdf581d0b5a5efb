pub mod errors;
pub mod logging;
pub mod types;
pub mod validations;

pub use errors::*;
pub use types::*;
pub use validations::*;
