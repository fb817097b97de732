use clap::{Args, Parser, Subcommand};

use crate::card::DEFAULT_FETCH_TIMEOUT;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a URL into a preview card and print it.
    Preview(PreviewArgs),
    /// Query the image-collection service directly.
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Page URL to preview.
    #[arg(long)]
    pub url: String,

    /// Metadata-lookup endpoint (default: LINKCARD_METADATA_ENDPOINT, then
    /// the production service).
    #[arg(long)]
    pub metadata_endpoint: Option<String>,

    /// Image-search endpoint (default: LINKCARD_IMAGE_ENDPOINT, then the
    /// production service).
    #[arg(long)]
    pub image_endpoint: Option<String>,

    /// Bound on each request, in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Print the card snapshot as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search term.
    #[arg(long)]
    pub query: String,

    /// Image-search endpoint (default: LINKCARD_IMAGE_ENDPOINT, then the
    /// production service).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bound on the request, in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,
}
