//! Configuration parsing for batch definition files

pub mod batch;
