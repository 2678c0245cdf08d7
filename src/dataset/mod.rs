//! The in-memory meteorite-fall dataset and the allow-lists derived from it.
//!
//! The dataset is loaded once, validated, and then only ever read.

mod allow_list;
pub mod remote;
mod types;

pub use self::allow_list::{AllowLists, COUNTRY_VALIDATION_FILE, TYPE_VALIDATION_FILE};
pub use self::types::*;
