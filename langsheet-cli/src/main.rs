use clap::{ArgAction, Parser, Subcommand};
use langsheet_cli::{RunOptions, run_convert_command, run_watch_command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `langsheet=debug`.
const LOG_ENV: &str = "LANGSHEET_LOG";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the source file to per-language JSON once.
    Convert {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Convert once, then again whenever the source file changes.
    Watch {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Project root; config discovery and relative paths start here
    #[arg(long)]
    root: Option<PathBuf>,

    /// Config file to use instead of the one found in the project root
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Spreadsheet or CSV file to read
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Directory for the generated JSON files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Language codes, comma-separated (e.g. en,ko,ja)
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Write flat `category/key` keys instead of nested objects
    #[arg(long)]
    flat: bool,

    /// Try the acceleration module first
    #[arg(long)]
    accelerate: bool,

    /// Path to the acceleration module executable (implies --accelerate)
    #[arg(long)]
    module: Option<PathBuf>,

    /// Worksheet to read (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// 0-based index of the header row
    #[arg(long)]
    header_row: Option<usize>,

    /// 0-based index of the first data row (default: header row + 1)
    #[arg(long)]
    data_start_row: Option<usize>,

    /// 0-based index of the category column (default: `category` header)
    #[arg(long)]
    category_column: Option<usize>,

    /// 0-based index of the key column (default: `key` header)
    #[arg(long)]
    key_column: Option<usize>,

    /// 0-based index of the first language column, for headers that don't name the language
    #[arg(long)]
    value_start_column: Option<usize>,

    /// Output file name template; `{lang}` becomes the language code
    #[arg(long)]
    file_name: Option<String>,

    /// Source format (csv, tsv, xlsx, xls, ods, ...); inferred from the extension by default
    #[arg(short, long)]
    format: Option<String>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            root: args.root,
            config: args.config,
            source: args.source,
            output_dir: args.output_dir,
            languages: args.languages,
            flat: args.flat,
            accelerate: args.accelerate || args.module.is_some(),
            module: args.module,
            sheet: args.sheet,
            header_row: args.header_row,
            data_start_row: args.data_start_row,
            category_column: args.category_column,
            key_column: args.key_column,
            value_start_column: args.value_start_column,
            file_name: args.file_name,
            format: args.format,
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    let result = match args.commands {
        Commands::Convert { run } => {
            run_convert_command(&RunOptions::from(run)).map(|report| {
                if !args.quiet {
                    for file in &report.files {
                        println!("✅ Wrote {}", file.display());
                    }
                }
            })
        }
        Commands::Watch { run } => run_watch_command(&RunOptions::from(run)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
