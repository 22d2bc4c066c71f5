pub mod bipartition;
pub mod error;
pub mod graph;
pub mod parser;
pub mod verdict;

pub use bipartition::{Bipartition, Classification, Status, TaxonSpec};
pub use error::NestError;
pub use graph::Graph;
pub use parser::{parse, ParsedTree};
pub use verdict::{evaluate, Counters, Fate, Mode, Thresholds};
