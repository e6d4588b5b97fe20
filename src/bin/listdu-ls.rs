//! Produce a listing of a local directory in the format `listdu` reads.

use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use listdu::listing::{ListerConfig, list_local, write_listing};
use listdu::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "listdu-ls")]
#[command(about = "Write a size<TAB>path listing of a local directory")]
#[command(version)]
struct Args {
    /// Directory to list
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Descend into subdirectories
    #[arg(short = 'R', long = "recursive")]
    recursive: bool,

    /// Include hidden and gitignored entries
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, io::stderr().is_terminal());

    if let Err(e) = run(&args) {
        eprintln!("listdu-ls: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> listdu::Result<()> {
    let config = ListerConfig {
        recursive: args.recursive,
        show_all: args.all,
    };
    let records = list_local(&args.path, &config)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_listing(&records, &mut out)
        .and_then(|()| out.flush())
        .map_err(|e| listdu::Error::io("<stdout>", e))
}
