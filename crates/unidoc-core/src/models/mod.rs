//! Domain models for the consultation notes system.

mod catalog;
mod consultation;
mod record;

pub use catalog::*;
pub use consultation::*;
pub use record::*;
