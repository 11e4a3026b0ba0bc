use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.yaml
    /// (defaults to $LINKTOOLS_BASE_PATH or ~/.local/share/linktools)
    #[clap(long, global = true)]
    pub base_path: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the preview for a link
    Preview {
        url: String,

        /// File with the already fetched page body
        #[clap(long)]
        content_file: Option<String>,

        /// Content type the page was served with
        #[clap(long)]
        content_type: Option<String>,
    },

    /// Show which helper would preview a link and whether
    /// the page has to be fetched first
    Resolve { url: String },

    /// List registered helpers
    Helpers {},

    /// Convert a start offset such as 1h2m3s to seconds
    Timecode { code: String },
}
