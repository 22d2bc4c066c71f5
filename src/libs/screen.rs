//! Screening a directory of tree files.
//!
//! Every qualifying file is parsed, decomposed into bipartitions and judged
//! against the donor taxa. Trees meeting the thresholds are copied into
//! `<prefix>.trees/` and summarised in `<prefix>.candidates.txt`.

use crate::libs::batch;
use crate::libs::io::{read_first_line, writer};
use crate::libs::phylo::{
    evaluate, parse, Counters, Fate, Graph, Mode, NestError, TaxonSpec, Thresholds,
};
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref RE_TREE_FILE: Regex = Regex::new(r"(.+)tree(\.gz)?$|(.+)tre(\.gz)?$").unwrap();
}

/// Filename markers tried in order; the query id is the text before the first
/// one found.
pub const QUERY_MARKERS: [&str; 4] = ["_2refseq", ".contre", ".tre", "."];

#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub indir: PathBuf,
    pub donor: String,
    pub cutoff: f64,
    pub optional: String,
    pub ignore: String,
    pub thresholds: Thresholds,
    /// Minimal outgroup size of a credited bipartition, 0 to disable
    pub min_outgroup: usize,
    /// Write `<tree>.ingroup.txt` next to each accepted tree
    pub ingroup: bool,
    pub mode: Mode,
    pub parallel: usize,
    /// Output prefix, derived from the other fields when absent
    pub outfile: Option<String>,
}

impl ScreenConfig {
    pub fn new(indir: impl Into<PathBuf>, donor: &str) -> Self {
        Self {
            indir: indir.into(),
            donor: donor.to_string(),
            cutoff: 0.0,
            optional: String::new(),
            ignore: String::new(),
            thresholds: Thresholds::default(),
            min_outgroup: 0,
            ingroup: false,
            mode: Mode::Exclusive,
            parallel: 1,
            outfile: None,
        }
    }

    pub fn validate(&self) -> Result<(), NestError> {
        if TaxonSpec::new("", &self.donor, "", "").donors.is_empty() {
            return Err(NestError::EmptyDonor);
        }
        if !self.indir.is_dir() {
            return Err(NestError::MissingInputDir(self.indir.clone()));
        }
        Ok(())
    }

    pub fn taxa(&self, query: &str) -> TaxonSpec {
        TaxonSpec::new(query, &self.donor, &self.optional, &self.ignore)
    }

    /// Prefix of the output directory and summary file.
    ///
    /// ```
    /// let mut cfg = nestedin::libs::screen::ScreenConfig::new("trees/", "Bact,Arch");
    /// cfg.cutoff = 85.0;
    /// cfg.min_outgroup = 2;
    /// assert_eq!(cfg.prefix(), "trees.FromBactArch_Cut85.0_OutGrpSz2");
    /// ```
    pub fn prefix(&self) -> String {
        if let Some(outfile) = &self.outfile {
            return outfile.clone();
        }

        let indir = self.indir.to_string_lossy();
        let mut prefix = format!(
            "{}.From{}_Cut{:?}",
            indir.trim_end_matches('/'),
            self.donor,
            self.cutoff
        );
        if !self.optional.is_empty() {
            prefix += &format!("_With{}", self.optional);
        }
        if !self.ignore.is_empty() {
            prefix += &format!("_Ign{}", self.ignore);
        }

        let Thresholds {
            min_strong,
            min_all,
        } = self.thresholds;
        if min_strong > 1 {
            prefix += &format!("_Ssn{}", min_strong);
            if min_all > 2 {
                prefix += &format!("Asn{}", min_all);
            }
        } else if min_all > 2 {
            prefix += &format!("_Asn{}", min_all);
        }
        if self.min_outgroup > 0 {
            prefix += &format!("_OutGrpSz{}", self.min_outgroup);
        }

        prefix.replace(',', "")
    }

    pub fn trees_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.trees", self.prefix()))
    }

    pub fn candidates_file(&self) -> PathBuf {
        PathBuf::from(format!("{}.candidates.txt", self.prefix()))
    }

    pub fn header(&self) -> String {
        let mut header = format!(
            "Gene\tNum.Node(support>={cut:?})\tNum.Node(support<{cut:?})\tTotal",
            cut = self.cutoff
        );
        if self.mode == Mode::Generalized {
            header += "\tAdjusted";
        }
        header
    }
}

/// Outcome of screening one tree.
#[derive(Debug, Clone)]
pub struct TreeReport {
    pub query: String,
    pub counters: Counters,
    pub fate: Fate,
    pub outgroup_ok: bool,
    /// Parsing stopped early on a malformed string
    pub truncated: bool,
}

impl TreeReport {
    pub fn is_hit(&self) -> bool {
        self.fate.is_hit() && self.outgroup_ok
    }

    /// The summary line of this tree.
    pub fn format_line(&self, mode: Mode) -> String {
        let c = &self.counters;
        let mut line = format!(
            "{}\t{}\t{}\t{}",
            self.query,
            c.total_strong(),
            c.weak_nodes,
            c.total_all()
        );
        if mode == Mode::Generalized {
            line += &format!("\t{}", c.adjusted_strong_nodes);
        }
        line
    }
}

/// Parses and judges one Newick string.
pub fn evaluate_tree(newick: &str, query: &str, cfg: &ScreenConfig) -> TreeReport {
    let tree = parse(newick);
    let graph = Graph::new(&tree.edges);
    let bipartitions = graph.fission(&tree, Some(query));

    let counters = evaluate(&bipartitions, &cfg.taxa(query), cfg.cutoff, cfg.mode);
    let fate = counters.fate(&cfg.thresholds);
    let outgroup_ok = counters.outgroup_passes(cfg.min_outgroup);

    TreeReport {
        query: query.to_string(),
        counters,
        fate,
        outgroup_ok,
        truncated: tree.truncated,
    }
}

/// Extracts the query id from the file name of `path`.
///
/// ```
/// use nestedin::libs::screen::query_from_filename;
/// assert_eq!(query_from_filename("dir/Q1_2refseq.tre").as_deref(), Some("Q1"));
/// assert_eq!(query_from_filename("Q2.contree").as_deref(), Some("Q2"));
/// assert_eq!(query_from_filename("noext"), None);
/// ```
pub fn query_from_filename(path: impl AsRef<Path>) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;

    let end = QUERY_MARKERS.iter().find_map(|m| name.find(m))?;
    let query = &name[..end];
    if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}

/// Tree files directly inside `dir`, sorted by path. Names end in `tree` or
/// `tre`, optionally followed by `.gz`.
pub fn list_trees(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, NestError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir).map_err(|e| NestError::io(dir, e))?;

    let mut files = vec![];
    for entry in entries {
        let path = entry.map_err(|e| NestError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if RE_TREE_FILE.is_match(&path.to_string_lossy()) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Screens one tree file, writing its outputs into `outdir` when it is a hit.
///
/// Returns the summary line of a hit, `None` otherwise.
pub fn screen_file(
    path: &Path,
    cfg: &ScreenConfig,
    outdir: &Path,
) -> Result<Option<String>, NestError> {
    let Some(query) = query_from_filename(path) else {
        debug!("No query in file name: {}", path.display());
        return Ok(None);
    };
    let Some(filename) = path.file_name() else {
        return Ok(None);
    };

    let input = path.to_string_lossy();
    let newick = read_first_line(&input)
        .map_err(|e| NestError::io(path, e))?
        .ok_or_else(|| NestError::EmptyTree(path.to_path_buf()))?;

    let report = evaluate_tree(&newick, &query, cfg);
    if report.truncated {
        warn!("Tree decomposition stopped early: {}", path.display());
    }
    if !report.is_hit() {
        return Ok(None);
    }

    // Copies are written uncompressed
    let filename = filename.to_string_lossy();
    let filename = filename.trim_end_matches(".gz");

    let out_tree = outdir.join(filename);
    write_lines(&out_tree, std::iter::once(newick.as_str()))?;

    if cfg.ingroup {
        let name = format!("{}.ingroup.txt", filename);
        let evidence: Vec<String> = report
            .counters
            .evidence
            .iter()
            .map(|e| e.to_string())
            .collect();
        write_lines(&outdir.join(name), evidence.iter().map(String::as_str))?;
    }

    Ok(Some(report.format_line(cfg.mode)))
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> Result<(), NestError> {
    let mut out = writer(&path.to_string_lossy()).map_err(|e| NestError::io(path, e))?;
    for line in lines {
        writeln!(out, "{}", line).map_err(|e| NestError::io(path, e))?;
    }
    out.flush().map_err(|e| NestError::io(path, e))
}

/// Screens every tree file of `cfg.indir` and writes the candidates file.
///
/// `progress` receives the 1-based number of files started. Returns the
/// sorted summary lines.
pub fn run<P>(cfg: &ScreenConfig, files: &[PathBuf], progress: P) -> anyhow::Result<Vec<String>>
where
    P: Fn(usize) + Sync,
{
    cfg.validate()?;

    let outdir = cfg.trees_dir();
    std::fs::create_dir_all(&outdir).map_err(|e| NestError::io(&outdir, e))?;

    let mut lines = batch::run(
        files,
        cfg.parallel,
        |path| match screen_file(path, cfg, &outdir) {
            Ok(line) => line,
            Err(e) => {
                warn!("{}", e);
                None
            }
        },
        progress,
    )?;
    lines.sort();

    let candidates = cfg.candidates_file();
    let header = cfg.header();
    write_lines(
        &candidates,
        std::iter::once(header.as_str()).chain(lines.iter().map(String::as_str)),
    )?;

    Ok(lines)
}
