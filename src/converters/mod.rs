//! Dataset converters.
//!
//! Each converter turns typed CSV rows into GeoJSON features carrying a
//! synthetic hourly curve. The combiner merges two finished collections.

pub mod bus;
pub mod combine;
pub mod rail;
pub mod road;
pub mod types;
