use clap::*;
use log::warn;
use nestedin::libs::phylo::NestError;
use nestedin::libs::screen::evaluate_tree;
use std::io::Write;

use super::args::{query_arg, query_of, screen_args, screen_config};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("check")
        .about("Judges a single tree against the donor taxa")
        .after_help(
            r###"
Runs the screen of `nestedin scan` on one tree and prints the node counts,
the verdict and the supporting nodes.

    strong    1
    weak      1
    adjusted  0
    fate      OK
    hit       true
    95.0      Bact_1

* fate is one of NONE, WEAK, OK and STRONG
* hit is true for OK or STRONG trees passing the --ogs check
* Each supporting node is listed as support, donors and optional leaves
* The query is --query, or the id in the file name

Examples:
1. nestedin check tests/trees/scan/Q1.tre -d Bact -c 90

2. nestedin check tests/trees/scan/Q4.tre -d Bact -c 90 --mode generalized

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(query_arg())
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        );

    screen_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = nestedin::writer(args.get_one::<String>("outfile").unwrap())?;

    let Some(query) = query_of(args, infile) else {
        anyhow::bail!("No query given and none found in the file name: {}", infile);
    };
    let cfg = screen_config(args, ".")?;
    if cfg.taxa(&query).donors.is_empty() {
        return Err(NestError::EmptyDonor.into());
    }

    //----------------------------
    // Operating
    //----------------------------
    let newick = nestedin::read_first_line(infile)
        .map_err(|e| NestError::io(infile, e))?
        .ok_or_else(|| NestError::EmptyTree(infile.into()))?;

    let report = evaluate_tree(&newick, &query, &cfg);
    if report.truncated {
        warn!("Tree decomposition stopped early: {}", infile);
    }

    //----------------------------
    // Output
    //----------------------------
    let c = &report.counters;
    writer.write_fmt(format_args!("strong\t{}\n", c.strong_nodes))?;
    writer.write_fmt(format_args!("weak\t{}\n", c.weak_nodes))?;
    writer.write_fmt(format_args!("adjusted\t{}\n", c.adjusted_strong_nodes))?;
    writer.write_fmt(format_args!("fate\t{}\n", report.fate))?;
    writer.write_fmt(format_args!("hit\t{}\n", report.is_hit()))?;
    for evidence in &c.evidence {
        writer.write_fmt(format_args!("{}\n", evidence))?;
    }
    writer.flush()?;

    Ok(())
}
