pub mod args;
pub mod commands;
pub mod image_command;

pub use args::{ChainArgs, CheckArgs, GraphvizArgs, ImageCommandArgs, ServeArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "spatial-backend")]
#[command(version = crate::VERSION)]
#[command(about = "Coordinate transforms between brain template spaces")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Settings are read from --config or $SPATIAL_BACKEND_SETTINGS, then overridden by SPATIAL_BACKEND_* variables."
)]
pub struct Args {
    /// TOML settings file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Serve the transform HTTP API",
        long_about = "Serve loads the transform graph once and answers point, mesh and image transform requests until interrupted.",
        after_help = "Example:\n    spatial-backend serve --bind 0.0.0.0:8080 --graph /instance/graph.yaml"
    )]
    Serve(ServeArgs),
    #[command(
        about = "Print the transform chain between two spaces",
        after_help = "Example:\n    spatial-backend chain 'MNI Colin 27' 'Big Brain (Histology)' --graph graph.yaml"
    )]
    Chain(ChainArgs),
    #[command(
        about = "Export the transform graph in Graphviz format",
        after_help = "Example:\n    spatial-backend graphviz --graph graph.yaml | dot -Tsvg > graph.svg"
    )]
    Graphviz(GraphvizArgs),
    #[command(
        about = "Report unreachable and ambiguous space pairs",
        long_about = "Check fails when some space cannot reach another one; pairs with several shortest chains are reported but do not fail."
    )]
    Check(CheckArgs),
    #[command(
        name = "image-command",
        about = "Fetch and run an image transform command from a server",
        after_help = "Example:\n    spatial-backend image-command -i in.nii.gz -o out.nii.gz -s 'MNI Colin 27' -t 'Big Brain (Histology)' -- --interp 1"
    )]
    ImageCommand(ImageCommandArgs),
}

/// Run the parsed command and return the process exit code.
pub async fn run(args: Args) -> crate::Result<i32> {
    let config = args.config.as_deref();
    match args.command {
        Command::Serve(serve_args) => commands::serve(serve_args, config).await,
        Command::Chain(chain_args) => commands::chain(chain_args, config),
        Command::Graphviz(graphviz_args) => commands::graphviz(graphviz_args, config),
        Command::Check(check_args) => commands::check(check_args, config),
        Command::ImageCommand(image_args) => image_command::run(image_args).await,
    }
}
