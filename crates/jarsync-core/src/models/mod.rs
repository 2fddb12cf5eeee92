//! Data models shared across the resolution pipeline.

mod descriptor;
mod lookup;
mod outcome;

pub use descriptor::*;
pub use lookup::*;
pub use outcome::*;

pub(crate) use descriptor::file_stem;
