//! Subcommand modules for the `nestedin` binary.

pub mod args;
pub mod bipart;
pub mod check;
pub mod rebuild;
pub mod scan;
