//! `nestedin` screens collections of gene trees for query sequences nested
//! inside a donor taxonomic group, a signature of horizontal gene transfer.

pub mod libs;

pub use crate::libs::io::*;
