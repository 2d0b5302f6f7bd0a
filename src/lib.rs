pub mod config;
pub mod converters;
pub mod geometry;
pub mod hourly;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
