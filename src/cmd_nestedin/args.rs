use clap::*;
use nestedin::libs::phylo::{Mode, Thresholds};
use nestedin::libs::screen::{query_from_filename, ScreenConfig};

// Options describing what counts as a nested query, shared by `scan` and `check`
pub fn screen_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("donor")
            .long("donor")
            .short('d')
            .required(true)
            .num_args(1)
            .help("Donor taxa, comma separated"),
    )
    .arg(
        Arg::new("cutoff")
            .long("cutoff")
            .short('c')
            .value_parser(value_parser!(f64))
            .num_args(1)
            .default_value("0")
            .help("Support cutoff of strong nodes"),
    )
    .arg(
        Arg::new("optional")
            .long("optional")
            .num_args(1)
            .help("Optional taxa allowed in a monophyletic ingroup, comma separated"),
    )
    .arg(
        Arg::new("ignore")
            .long("ignore")
            .num_args(1)
            .help("Taxa to ignore in the ingroup, comma separated"),
    )
    .arg(
        Arg::new("ssn")
            .long("ssn")
            .value_parser(value_parser!(usize))
            .num_args(1)
            .default_value("1")
            .help("Minimal strongly supporting nodes"),
    )
    .arg(
        Arg::new("asn")
            .long("asn")
            .value_parser(value_parser!(usize))
            .num_args(1)
            .default_value("2")
            .help("Minimal number of all supporting nodes"),
    )
    .arg(
        Arg::new("ogs")
            .long("ogs")
            .value_parser(value_parser!(usize))
            .num_args(1)
            .default_value("0")
            .help("Minimal outgroup size of a supporting node. 0 disables the check"),
    )
    .arg(
        Arg::new("mode")
            .long("mode")
            .value_parser(["exclusive", "generalized"])
            .default_value("exclusive")
            .help("Whether strong nodes with a nested contaminant may be rescued"),
    )
}

pub fn screen_config(args: &ArgMatches, indir: &str) -> anyhow::Result<ScreenConfig> {
    let mut cfg = ScreenConfig::new(indir, args.get_one::<String>("donor").unwrap());
    cfg.cutoff = *args.get_one::<f64>("cutoff").unwrap();
    if let Some(optional) = args.get_one::<String>("optional") {
        cfg.optional = optional.to_string();
    }
    if let Some(ignore) = args.get_one::<String>("ignore") {
        cfg.ignore = ignore.to_string();
    }
    cfg.thresholds = Thresholds {
        min_strong: *args.get_one::<usize>("ssn").unwrap(),
        min_all: *args.get_one::<usize>("asn").unwrap(),
    };
    cfg.min_outgroup = *args.get_one::<usize>("ogs").unwrap();
    cfg.mode = args
        .get_one::<String>("mode")
        .unwrap()
        .parse::<Mode>()
        .map_err(anyhow::Error::msg)?;

    Ok(cfg)
}

pub fn query_arg() -> Arg {
    Arg::new("query")
        .long("query")
        .short('q')
        .num_args(1)
        .help("Query leaf. Taken from the file name when omitted")
}

// --query, or the id encoded in the file name
pub fn query_of(args: &ArgMatches, infile: &str) -> Option<String> {
    match args.get_one::<String>("query") {
        Some(q) => Some(q.to_string()),
        None if infile == "stdin" => None,
        None => query_from_filename(infile),
    }
}
