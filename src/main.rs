//! CLI entry point for listdu

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use listdu::cache::{CacheConfig, CorruptPolicy, load_tree};
use listdu::config::{QueryConfig, with_cache_dir};
use listdu::logging::init_logging;
use listdu::{OutputConfig, UsageFormatter, disk_usage, list, print_json, print_stats};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "listdu")]
#[command(about = "Disk usage of any directory in a flat file listing")]
#[command(version)]
struct Args {
    /// Listing file: one `size<TAB>path` line per entry, empty size for directories
    index_file: PathBuf,

    /// Directory inside the listing to report on
    #[arg(default_value = "/")]
    path: String,

    /// Rebuild the tree even if a cached one exists
    #[arg(short, long)]
    force: bool,

    /// Neither read nor write the tree cache
    #[arg(long = "no-cache", conflicts_with = "force")]
    no_cache: bool,

    /// Directory for cache files (default: next to the listing, or $LISTDU_CACHE_DIR)
    #[arg(long = "cache-dir", value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Fail on an unreadable cache instead of rebuilding it
    #[arg(long = "strict-cache")]
    strict_cache: bool,

    /// List sizes of the entries under PATH instead of the usage table
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// With --list, include all descendants
    #[arg(short = 'R', long = "recursive", requires = "list")]
    recursive: bool,

    /// Show listing statistics (items, files, directories, total size)
    #[arg(long = "stats")]
    stats: bool,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Hide the exact byte column
    #[arg(long = "no-bytes")]
    no_bytes: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Number of parallel workers for size aggregation
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let use_color = should_use_color(args.color);
    init_logging(args.verbose, use_color && std::io::stderr().is_terminal());

    if let Err(e) = run(&args, use_color) {
        eprintln!("listdu: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args, use_color: bool) -> listdu::Result<()> {
    let cache_config = with_cache_dir(
        CacheConfig {
            enabled: !args.no_cache,
            force_rebuild: args.force,
            corrupt_policy: if args.strict_cache {
                CorruptPolicy::Abort
            } else {
                CorruptPolicy::Rebuild
            },
            ..Default::default()
        },
        args.cache_dir.clone(),
    );
    let query = QueryConfig {
        path: args.path.clone(),
        list: args.list,
        recursive: args.recursive,
        parallel_workers: args.jobs,
    };

    let mut loaded = load_tree(&args.index_file, cache_config, query.parallel_workers)?;
    let node = loaded.tree.find(&query.path)?;

    let output_config = OutputConfig {
        use_color,
        show_bytes: !args.no_bytes,
    };
    let formatter = UsageFormatter::new(output_config);
    let io_err = |e: std::io::Error| listdu::Error::io("<stdout>", e);

    if args.json {
        let report = if query.list {
            serde_json::to_value(list(&mut loaded.tree, node, query.recursive)?)
        } else {
            serde_json::to_value(disk_usage(&mut loaded.tree, node)?)
        }
        .map_err(|e| io_err(e.into()))?;
        let document = if args.stats {
            serde_json::json!({ "stats": loaded.stats, "report": report })
        } else {
            report
        };
        return print_json(&document).map_err(io_err);
    }

    if args.stats {
        print_stats(&loaded.stats, use_color).map_err(io_err)?;
    }
    if query.list {
        let entries = list(&mut loaded.tree, node, query.recursive)?;
        formatter.print_list(&entries).map_err(io_err)?;
    } else {
        let usage = disk_usage(&mut loaded.tree, node)?;
        formatter.print(&usage).map_err(io_err)?;
    }

    Ok(())
}
