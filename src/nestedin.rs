extern crate clap;
use clap::*;

mod cmd_nestedin;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let app = Command::new("nestedin")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`nestedin` - Screen gene trees for queries nested in donor taxa")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_nestedin::scan::make_subcommand())
        .subcommand(cmd_nestedin::check::make_subcommand())
        .subcommand(cmd_nestedin::bipart::make_subcommand())
        .subcommand(cmd_nestedin::rebuild::make_subcommand())
        .after_help(
            r###"Subcommands:

* Screening:
    * scan    - Screen a directory of tree files
    * check   - Judge a single tree

* Inspection:
    * bipart  - List the bipartitions of a tree
    * rebuild - Write a tree back from its adjacency graph

Logging is controlled by RUST_LOG, e.g. RUST_LOG=info

"###,
        );

    // Check which subcommand the user ran...
    match app.get_matches().subcommand() {
        Some(("scan", sub_matches)) => cmd_nestedin::scan::execute(sub_matches),
        Some(("check", sub_matches)) => cmd_nestedin::check::execute(sub_matches),
        Some(("bipart", sub_matches)) => cmd_nestedin::bipart::execute(sub_matches),
        Some(("rebuild", sub_matches)) => cmd_nestedin::rebuild::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
