use std::fmt;

/// More irrelevant leaves than this and the ingroup is plainly non-monophyletic.
pub const ADJUSTABLE_LIMIT: usize = 3;

/// The leaf split induced by removing one interior node.
#[derive(Debug, Clone, PartialEq)]
pub struct Bipartition {
    /// Id of the removed interior node
    pub node: String,
    /// Raw support label of that node,
    /// [`UNKNOWN_SUPPORT`](super::parser::UNKNOWN_SUPPORT) if absent
    pub support: String,
    /// Leaves still reachable from the seed leaf
    pub seed_side: Vec<String>,
    /// All other leaves
    pub other_side: Vec<String>,
}

impl Bipartition {
    /// Numeric support. Labels that are not numbers count as unknown (`-1`).
    pub fn support_value(&self) -> f64 {
        self.support.trim().parse().unwrap_or(-1.0)
    }

    /// Splits into `(ingroup, outgroup)`: the ingroup is the side holding a
    /// leaf whose label contains `query`.
    pub fn sides(&self, query: &str) -> Option<(&[String], &[String])> {
        let contains = |side: &[String]| side.iter().any(|l| l.contains(query));

        let seed = self.seed_side.as_slice();
        let other = self.other_side.as_slice();

        if contains(seed) {
            Some((seed, other))
        } else if contains(other) {
            Some((other, seed))
        } else {
            None
        }
    }

    /// Categorizes the ingroup leaves and decides the monophyly status.
    pub fn classify(&self, taxa: &TaxonSpec) -> Classification {
        let Some((ingroup, outgroup)) = self.sides(&taxa.query) else {
            return Classification::inapplicable();
        };

        let mut donors = vec![];
        let mut optionals = vec![];
        let mut irrelevant = vec![];

        for leaf in ingroup {
            if leaf == &taxa.query {
                continue;
            }
            match taxa.category(leaf) {
                Category::Donor => donors.push(leaf.clone()),
                Category::Optional => optionals.push(leaf.clone()),
                Category::Ignored => {}
                Category::Irrelevant => irrelevant.push(leaf.clone()),
            }
        }

        let status = if donors.is_empty() {
            Status::NoDonor
        } else if irrelevant.is_empty() {
            Status::Monophyly
        } else if irrelevant.len() < ADJUSTABLE_LIMIT {
            Status::Adjustable
        } else {
            Status::NonMonophyly
        };

        Classification {
            status,
            donors,
            optionals,
            irrelevant,
            outgroup_size: outgroup.len(),
        }
    }

    /// The outgroup of `query` has at least `min` leaves. An empty outgroup,
    /// or a query absent from both sides, never passes.
    pub fn outgroup_passes(&self, query: &str, min: usize) -> bool {
        match self.sides(query) {
            Some((_, outgroup)) => outgroup_passes(outgroup.len(), min),
            None => false,
        }
    }
}

pub(crate) fn outgroup_passes(size: usize, min: usize) -> bool {
    size > 0 && size >= min
}

impl fmt::Display for Bipartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.node,
            self.support,
            self.seed_side.join(","),
            self.other_side.join(",")
        )
    }
}

/// Per-bipartition verdict. The discriminants are the codes used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Monophyly = 1,
    NonMonophyly = 0,
    /// One or two irrelevant leaves, possibly a minor contamination
    Adjustable = -1,
    /// The query is on neither side
    Inapplicable = -2,
    NoDonor = -3,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: Status,
    pub donors: Vec<String>,
    pub optionals: Vec<String>,
    pub irrelevant: Vec<String>,
    pub outgroup_size: usize,
}

impl Classification {
    fn inapplicable() -> Self {
        Self {
            status: Status::Inapplicable,
            donors: vec![],
            optionals: vec![],
            irrelevant: vec![],
            outgroup_size: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Donor,
    Optional,
    Ignored,
    Irrelevant,
}

/// Query and taxon lists a tree is screened against.
///
/// A leaf belongs to a list when one of its entries is a substring of the
/// leaf label. Labels usually embed a lineage string, so `Bacteria` matches
/// `Bacteria.Firmicutes-Orenia_marismortui.WP_018249643.1`. Entries that are
/// substrings of each other cross-match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonSpec {
    pub query: String,
    pub donors: Vec<String>,
    pub optionals: Vec<String>,
    pub ignored: Vec<String>,
}

impl TaxonSpec {
    /// Builds the lists from comma-separated strings. Empty entries are dropped.
    pub fn new(query: &str, donor: &str, optionals: &str, ignored: &str) -> Self {
        Self {
            query: query.to_string(),
            donors: split_list(donor),
            optionals: split_list(optionals),
            ignored: split_list(ignored),
        }
    }

    /// Same lists with another query.
    pub fn with_query(&self, query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..self.clone()
        }
    }

    /// Tested in the order donor, optional, ignored.
    pub fn category(&self, leaf: &str) -> Category {
        let matches = |list: &[String]| list.iter().any(|t| leaf.contains(t.as_str()));

        if matches(self.donors.as_slice()) {
            Category::Donor
        } else if matches(self.optionals.as_slice()) {
            Category::Optional
        } else if matches(self.ignored.as_slice()) {
            Category::Ignored
        } else {
            Category::Irrelevant
        }
    }
}

pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
