use crate::core::types::KNOWN_SPACES;
use clap::Args;
use std::path::PathBuf;

pub const DEFAULT_SERVER_ADDRESS: &str = "https://hbp-spatial-backend.apps.hbp.eu";
pub const DEFAULT_INSTANCE_PATH: &str = "/instance";
pub const DEFAULT_SOURCE_SPACE: &str = "MNI 152 ICBM 2009c Nonlinear Asymmetric";
pub const DEFAULT_TARGET_SPACE: &str = "Big Brain (Histology)";

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides server.bind)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Transform graph YAML file (overrides transform.graph_file)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,
}

#[derive(Args)]
pub struct ChainArgs {
    /// Source template space
    #[arg(value_name = "SOURCE")]
    pub source_space: String,

    /// Target template space
    #[arg(value_name = "TARGET")]
    pub target_space: String,

    /// Transform graph YAML file (default: from settings)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Print the chain as a JSON array (null when unreachable)
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct GraphvizArgs {
    /// Transform graph YAML file (default: from settings)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Write the digraph here instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Transform graph YAML file (default: from settings)
    #[arg(long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ImageCommandArgs {
    /// Server to ask for the transform command
    #[arg(
        long = "server_address",
        short = 'a',
        default_value = DEFAULT_SERVER_ADDRESS,
        value_name = "URL"
    )]
    pub server_address: String,

    /// Path to the input image
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: String,

    /// Path to the output image
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: String,

    /// Template space of the input image
    #[arg(
        long = "source_space",
        short = 's',
        default_value = DEFAULT_SOURCE_SPACE,
        value_parser = KNOWN_SPACES
    )]
    pub source_space: String,

    /// Template space to resample the image into
    #[arg(
        long = "target_space",
        short = 't',
        default_value = DEFAULT_TARGET_SPACE,
        value_parser = KNOWN_SPACES
    )]
    pub target_space: String,

    /// Local directory holding the transform files
    #[arg(long, default_value = DEFAULT_INSTANCE_PATH, value_name = "DIR")]
    pub instance_path: PathBuf,

    /// Print the command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Extra arguments passed to AimsApplyTransform
    #[arg(last = true, value_name = "EXTRA")]
    pub extra: Vec<String>,
}
