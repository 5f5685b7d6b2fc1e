//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Build hashed CDN resources, merge bundles and debug placeholders
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Webapp source directory
    #[arg(value_name = "SOURCE", value_hint = clap::ValueHint::DirPath)]
    pub source: Option<PathBuf>,

    /// Output directory (default: <SOURCE>)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Generated CDN map file (default: <OUTPUT>/cdn.properties)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub map_file: Option<PathBuf>,

    /// Generated child-link table (default: cdn-links.properties next to the map file)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub links_file: Option<PathBuf>,

    /// URL root of the hashed output files (default: /cdn/)
    #[arg(short = 'r', long)]
    pub cdn_root: Option<String>,

    /// Extra extensions copied verbatim, separated by `|`, `,` or spaces (e.g. ".png|.jpg")
    #[arg(short, long, value_name = "LIST")]
    pub extensions: Option<String>,

    /// Copy scripts and stylesheets without minifying them
    #[arg(long)]
    pub no_minify: bool,

    /// Config file path (TOML, `[build]` table)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
