//! Table transformations for fitmerge.
//!
//! # Features
//!
//! - **Gap interpolation**: [`interpolate_time_gaps`] fills short runs of
//!   missing values and leaves long ones visible
//! - **Resampling**: [`resample_to_frequency`] buckets rows by
//!   `floor(time * hz)`; [`aggregate_by_key`] is the shared grouping core
//! - **Rate detection**: [`detect_sampling_rate`] from the median time step
//! - **Alignment**: [`align_time_series`] cuts tables to their common window
//!
//! # Example
//!
//! ```ignore
//! use fitmerge_model::InterpolationMethod;
//! use fitmerge_transform::{AggMethod, interpolate_time_gaps, resample_to_frequency};
//!
//! let one_hz = resample_to_frequency(&raw, "time", 1, None, AggMethod::Mean)?;
//! let (filled, count) = interpolate_time_gaps(&one_hz, InterpolationMethod::Linear, 5, None)?;
//! ```

mod align;
mod error;
mod interpolate;
mod resample;

pub use align::align_time_series;
pub use error::{Result, TransformError};
pub use interpolate::{fill_gaps, interpolate_time_gaps};
pub use resample::{
    AggMethod, aggregate_by_key, detect_sampling_rate, median, resample_to_frequency,
};
