//! Command-line front end for the `bttc` grid coder
//!
//! Loads a square grid from JSON or CSV, runs the triangular subdivision and
//! writes the accepted faces, an indexed mesh or a statistics report.

pub mod commands;
pub mod config;
pub mod input;
pub mod output;

pub use config::{Layout, OutputConfig, OutputFormat, ToolConfig};
pub use input::{load_grid, InputFormat, Window};
