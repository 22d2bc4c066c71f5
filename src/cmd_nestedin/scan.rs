use clap::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use nestedin::libs::screen;

use super::args::{screen_args, screen_config};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("scan")
        .about("Screens a directory of gene trees for queries nested in donor taxa")
        .after_help(
            r###"
Screens every tree file of <indir> for a query sequence nested inside a clade of donor taxa.

Notes:
* Only files directly inside <indir> whose names end in `tree` or `tre` are read
    * Gzipped files (.tre.gz) are read too; their copies are written uncompressed
    * Only the first line of each file is used
* The query id comes from the file name, the text before the first of
  `_2refseq`, `.contre`, `.tre` or `.`
* A leaf belongs to a taxon when the taxon name is a substring of the leaf label
* A tree is reported when the number of strong nodes (support >= cutoff) and
  of all nodes uniting the query with donors reaches --ssn and --asn
* Accepted trees are copied to <prefix>.trees/
* The summary is written to <prefix>.candidates.txt, one sorted line per tree
* --ingroup writes the donors of each supporting node to <tree>.ingroup.txt
* --mode generalized credits strong nodes whose one or two contaminants are
  themselves nested in the donor, and adds an `Adjusted` column
* Set RUST_LOG=info to see the run parameters, debug for skipped files

Examples:
1. Trees nested in bacteria with support >= 85:
   nestedin scan tests/trees/scan -d Bacteria -c 85

2. Tolerate archaea, write ingroup details:
   nestedin scan tests/trees/scan -d Bacteria -c 85 --optional Archaea --ingroup

3. Four threads, custom output prefix:
   nestedin scan tests/trees/scan -d Bacteria -p 4 -o out/bact

"###,
        )
        .arg(
            Arg::new("indir")
                .required(true)
                .index(1)
                .help("Directory of tree files"),
        );

    screen_args(cmd)
        .arg(
            Arg::new("ingroup")
                .long("ingroup")
                .action(ArgAction::SetTrue)
                .help("Export the ingroup details of each accepted tree"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .num_args(1)
                .default_value("1")
                .help("Number of threads for parallel processing"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .help("Output prefix. Derived from <indir> and the options when omitted"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let indir = args.get_one::<String>("indir").unwrap();

    let mut cfg = screen_config(args, indir)?;
    cfg.ingroup = args.get_flag("ingroup");
    cfg.parallel = *args.get_one::<usize>("parallel").unwrap();
    cfg.outfile = args.get_one::<String>("outfile").cloned();

    cfg.validate()?;

    info!("Input directory: {}", indir);
    info!(
        "Donor: {}; optional: {}; ignored: {}",
        cfg.donor, cfg.optional, cfg.ignore
    );
    info!(
        "Cutoff: {:?}; ssn: {}; asn: {}; ogs: {}; mode: {:?}",
        cfg.cutoff, cfg.thresholds.min_strong, cfg.thresholds.min_all, cfg.min_outgroup, cfg.mode
    );
    info!("Output prefix: {}", cfg.prefix());

    //----------------------------
    // Operating
    //----------------------------
    let start = std::time::Instant::now();
    let files = screen::list_trees(&cfg.indir)?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let lines = screen::run(&cfg, &files, |n| {
        let n = n as u64;
        if n > progress.position() {
            progress.set_position(n);
        }
    })?;
    progress.finish_and_clear();

    //----------------------------
    // Output
    //----------------------------
    eprintln!(
        "==> {} of {} trees meet the criteria, written to {}",
        lines.len(),
        files.len(),
        cfg.candidates_file().display()
    );
    eprintln!("==> Time elapsed: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
