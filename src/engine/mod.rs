//! Job pipelines, one per CLI subcommand.
//!
//! Each pipeline is a single fetch → compute → persist → notify pass,
//! generic over the data-source and notifier traits.

pub mod monitor;
pub mod volume;
pub mod weekly;
