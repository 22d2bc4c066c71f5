//! Aggregates the bipartitions of one tree into node counts and a verdict.

use super::bipartition::{outgroup_passes, Bipartition, Status, TaxonSpec};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Two strongly supported monophyletic nodes settle a tree.
pub const ENOUGH_STRONG: usize = 2;

/// At most this many adjustable nodes are rescued.
pub const MAX_ADJUSTED: usize = 2;

/// How contaminated (adjustable) bipartitions are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Only clean monophyletic bipartitions count
    #[default]
    Exclusive,
    /// Strong adjustable bipartitions may be rescued when every contaminant
    /// is itself nested within the donor
    Generalized,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exclusive" => Ok(Mode::Exclusive),
            "generalized" => Ok(Mode::Generalized),
            _ => Err(format!("unknown mode: {}", s)),
        }
    }
}

/// Categorical verdict of one tree, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fate {
    None,
    Weak,
    Ok,
    Strong,
}

impl Fate {
    /// Trees reported by the screen.
    pub fn is_hit(self) -> bool {
        matches!(self, Fate::Ok | Fate::Strong)
    }
}

impl fmt::Display for Fate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Fate::None => "NONE",
            Fate::Weak => "WEAK",
            Fate::Ok => "OK",
            Fate::Strong => "STRONG",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimal strongly supported nodes uniting query and donors
    pub min_strong: usize,
    /// Minimal number of all supporting nodes
    pub min_all: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_strong: 1,
            min_all: 2,
        }
    }
}

/// A credited monophyletic bipartition.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    pub support: f64,
    pub donors: Vec<String>,
    pub optionals: Vec<String>,
    pub outgroup_size: usize,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}\t{}\t{}",
            self.support,
            self.donors.join(","),
            self.optionals.join(",")
        )
    }
}

/// Node counts accumulated over one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counters {
    pub strong_nodes: usize,
    pub weak_nodes: usize,
    pub adjusted_strong_nodes: usize,
    pub evidence: Vec<Evidence>,
    /// Irrelevant leaves of adjustable bipartitions with support >= cutoff
    pub strong_adjustable: Vec<Vec<String>>,
    /// Irrelevant leaves of adjustable bipartitions with support < cutoff
    pub weak_adjustable: Vec<Vec<String>>,
}

impl Counters {
    pub fn total_strong(&self) -> usize {
        self.strong_nodes + self.adjusted_strong_nodes
    }

    pub fn total_all(&self) -> usize {
        self.strong_nodes + self.weak_nodes + self.adjusted_strong_nodes
    }

    pub fn fate(&self, thresholds: &Thresholds) -> Fate {
        let strong = self.total_strong();
        let all = self.total_all();

        if strong > thresholds.min_strong {
            Fate::Strong
        } else if strong == thresholds.min_strong && all >= thresholds.min_all {
            Fate::Ok
        } else if strong == 1 {
            Fate::Weak
        } else {
            Fate::None
        }
    }

    /// At least one credited bipartition has an outgroup of `min` leaves or
    /// more. Always passes when `min` is zero.
    pub fn outgroup_passes(&self, min: usize) -> bool {
        min == 0
            || self
                .evidence
                .iter()
                .any(|e| outgroup_passes(e.outgroup_size, min))
    }
}

/// Evaluates every bipartition of a tree against `taxa`.
///
/// Bipartitions are visited in emission order and the walk stops as soon as
/// [`ENOUGH_STRONG`] strong nodes are found.
pub fn evaluate(
    bipartitions: &[Bipartition],
    taxa: &TaxonSpec,
    support_cut: f64,
    mode: Mode,
) -> Counters {
    let mut counters = visit_all(bipartitions, taxa, support_cut);

    if mode == Mode::Generalized && counters.strong_nodes < ENOUGH_STRONG {
        counters.adjusted_strong_nodes = rescue(bipartitions, taxa, support_cut, &counters);
    }

    counters
}

fn visit_all(bipartitions: &[Bipartition], taxa: &TaxonSpec, support_cut: f64) -> Counters {
    let mut counters = Counters::default();

    // Donor sets already credited, weak ones with their evidence index
    let mut seen_strong: HashSet<String> = HashSet::new();
    let mut seen_weak: HashMap<String, usize> = HashMap::new();

    for bp in bipartitions {
        if counters.strong_nodes >= ENOUGH_STRONG {
            break;
        }

        let support = bp.support_value();
        let class = bp.classify(taxa);

        match class.status {
            Status::Monophyly => {
                let signature = class.donors.iter().sorted().join(",");
                let evidence = Evidence {
                    support,
                    donors: class.donors,
                    optionals: class.optionals,
                    outgroup_size: class.outgroup_size,
                };

                if support >= support_cut {
                    if !seen_strong.insert(signature.clone()) {
                        continue;
                    }
                    counters.strong_nodes += 1;

                    // A weak credit for the same donors is upgraded in place
                    if let Some(i) = seen_weak.remove(&signature) {
                        counters.weak_nodes -= 1;
                        counters.evidence[i] = evidence;
                        continue;
                    }
                } else {
                    if seen_strong.contains(&signature) || seen_weak.contains_key(&signature) {
                        continue;
                    }
                    seen_weak.insert(signature, counters.evidence.len());
                    counters.weak_nodes += 1;
                }

                counters.evidence.push(evidence);
            }
            Status::Adjustable => {
                if class.irrelevant.is_empty() {
                    continue;
                }
                if support >= support_cut {
                    counters.strong_adjustable.push(class.irrelevant);
                } else {
                    counters.weak_adjustable.push(class.irrelevant);
                }
            }
            Status::NonMonophyly | Status::NoDonor | Status::Inapplicable => {}
        }
    }

    counters
}

/// Counts strong adjustable bipartitions whose every contaminant forms a
/// strongly supported clade with the donor on its own.
fn rescue(
    bipartitions: &[Bipartition],
    taxa: &TaxonSpec,
    support_cut: f64,
    counters: &Counters,
) -> usize {
    let donor_only = TaxonSpec {
        donors: taxa.donors.clone(),
        ..TaxonSpec::default()
    };

    let mut adjusted = 0;
    for contaminants in &counters.strong_adjustable {
        let nested = contaminants.iter().all(|leaf| {
            let as_query = donor_only.with_query(leaf);
            visit_all(bipartitions, &as_query, support_cut).strong_nodes >= 1
        });
        if nested {
            adjusted += 1;
        }
        if adjusted >= MAX_ADJUSTED {
            break;
        }
    }

    adjusted
}
