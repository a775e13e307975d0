#![forbid(unsafe_code)]

mod pak;
mod tex;
mod ui;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ripak",
    version,
    about = "RI_0 asset archive builder",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
    after_help = "An OUTPUT spelled like a subcommand (e.g. `list`) is read as that \
                  subcommand; put `--` before the paths to build: `ripak -- list dat`."
)]
struct Cli {
    #[command(flatten)]
    build: BuildArgs,

    #[command(subcommand)]
    cmd: Option<Command>,
}

/// `ripak <OUTPUT> <INPUT>`: pack the asset categories of INPUT into OUTPUT.
#[derive(Debug, Args)]
struct BuildArgs {
    /// Output archive file.
    #[arg(required = true)]
    output: Option<PathBuf>,
    /// Input root containing the asset category directories.
    #[arg(required = true)]
    input: Option<PathBuf>,
    /// Category directory to pack (repeatable). Replaces the built-in list.
    #[arg(long = "category", value_name = "DIR")]
    categories: Vec<String>,
    /// Extension of authoring files to skip [default: i].
    #[arg(long, value_name = "EXT")]
    exclude_ext: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard for building an archive (terminal).
    Wizard,

    /// List entries in an archive.
    List {
        #[arg(long)]
        pak: PathBuf,
        /// Print offsets, sizes and checksums too.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Extract an archive to an output directory.
    Extract {
        #[arg(long)]
        pak: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Only extract entries that contain this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
    },

    /// Verify archive integrity (layout, sizes, checksums).
    Verify {
        #[arg(long)]
        pak: PathBuf,
    },

    /// Convert an image to a TEX0 texture.
    Tex {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: Cli) -> pak::PakResult<()> {
    match cli.cmd {
        Some(Command::Wizard) => ui::run(),
        Some(Command::List { pak, verbose }) => pak::list(&pak, verbose),
        Some(Command::Extract { pak, output, filter }) => {
            pak::extract(&pak, &output, &filter).map(|_| ())
        }
        Some(Command::Verify { pak }) => pak::verify(&pak).map(|_| ()),
        Some(Command::Tex { input, output }) => tex::convert(&input, &output),
        None => {
            let BuildArgs {
                output,
                input,
                categories,
                exclude_ext,
            } = cli.build;
            // clap enforces both positionals when no subcommand is given.
            let (Some(output), Some(input)) = (output, input) else {
                return Err(pak::PakError::Config("usage: ripak <OUTPUT> <INPUT>".into()));
            };
            let config = pak::PackConfig::from_args(categories, exclude_ext);
            pak::build(&input, &output, &config).map(|_| ())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
