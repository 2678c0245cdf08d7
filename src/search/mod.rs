//! Selecting dataset rows by name, id range, country and type.

mod filter;
mod types;
mod validate;

pub use self::filter::*;
pub use self::types::*;
pub use self::validate::*;
