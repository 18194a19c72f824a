//! Flow recommendation domain
//!
//! Descriptors the recommendation service reads, the scored outputs it
//! produces, and the pure scoring rules in between.

pub mod context;
pub mod scoring;
pub mod value_objects;
