use clap::*;
use log::warn;
use nestedin::libs::phylo::{parse, Graph, NestError};
use std::io::Write;

use super::args::{query_arg, query_of};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("rebuild")
        .about("Writes a tree back from its adjacency graph")
        .after_help(
            r###"
Decomposes a tree into its adjacency graph and assembles a Newick string from it.

* Supports are kept, branch lengths are all set to 0.1
* Leaves containing the query are written first in each group
* The outermost level is written as a multifurcation

Examples:
1. nestedin rebuild tests/trees/simple.tre

2. echo "((A:1,B:1)90:1,C:1,D:1);" | nestedin rebuild stdin --query B

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
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = nestedin::writer(args.get_one::<String>("outfile").unwrap())?;

    let query = query_of(args, infile);

    let newick = nestedin::read_first_line(infile)
        .map_err(|e| NestError::io(infile, e))?
        .ok_or_else(|| NestError::EmptyTree(infile.into()))?;

    let tree = parse(&newick);
    if tree.truncated {
        warn!("Tree decomposition stopped early: {}", infile);
    }

    let (out, capped) = Graph::new(&tree.edges).to_newick(&tree.supports, query.as_deref());
    if capped {
        warn!("Tree reconstruction stopped early: {}", infile);
    }

    writer.write_fmt(format_args!("{}\n", out))?;
    writer.flush()?;

    Ok(())
}
