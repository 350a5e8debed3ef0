//! Outer surfaces: the command line and its CSV output.

pub mod cli;
pub mod csv;
