use clap::*;
use log::warn;
use nestedin::libs::phylo::{parse, Graph, NestError};
use std::io::Write;

use super::args::{query_arg, query_of};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("bipart")
        .about("Lists the bipartitions of a tree")
        .after_help(
            r###"
Prints one line per interior node: the node id, its support and the two leaf
sets left after removing it.

    node_0  90  A,B  C

* The first set holds the query leaf (--query, or the id in the file name)
* Without a query the first leaf of the tree is used
* Interior nodes without a support label get -1
* Only the first line of <infile> is read

Examples:
1. nestedin bipart tests/trees/simple.tre

2. echo "((A:1,B:1)90:1,C:1,D:1);" | nestedin bipart stdin --query C

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
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = nestedin::writer(args.get_one::<String>("outfile").unwrap())?;

    let query = query_of(args, infile);

    //----------------------------
    // Operating
    //----------------------------
    let newick = nestedin::read_first_line(infile)
        .map_err(|e| NestError::io(infile, e))?
        .ok_or_else(|| NestError::EmptyTree(infile.into()))?;

    let tree = parse(&newick);
    if tree.truncated {
        warn!("Tree decomposition stopped early: {}", infile);
    }
    let graph = Graph::new(&tree.edges);

    //----------------------------
    // Output
    //----------------------------
    for bp in graph.fission(&tree, query.as_deref()) {
        writer.write_fmt(format_args!("{}\n", bp))?;
    }
    writer.flush()?;

    Ok(())
}
