//! Individual check layers, run in order by the validator.

pub mod datatype;
pub mod frequency;
pub mod gaps;
pub mod presence;
pub mod timestamps;

pub use timestamps::TimestampChecks;
