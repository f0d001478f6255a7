use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lightgrid")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(
    about = "Terminal photo gallery with search, resizable thumbnails, lightbox and slideshow"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Gallery manifest (gallery.toml) or image directory
    pub(crate) page: Option<PathBuf>,

    /// Include images in sub-directories
    #[arg(short, long)]
    pub(crate) recursive: bool,

    /// Initial thumbnail size in pixels
    #[arg(short, long, value_name = "PX")]
    pub(crate) size: Option<u32>,

    /// Slideshow interval in milliseconds
    #[arg(short, long, value_name = "MS")]
    pub(crate) interval: Option<u64>,

    /// Start the slideshow as soon as a photo is opened
    #[arg(short, long)]
    pub(crate) autoplay: bool,

    /// Enter fullscreen on start
    #[arg(short, long)]
    pub(crate) fullscreen: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Print the photos a query would show
    List {
        /// Gallery manifest or image directory
        page: Option<PathBuf>,

        /// Search query (caption or tags)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Include images in sub-directories
        #[arg(short, long)]
        recursive: bool,
    },
    /// Write a gallery.toml skeleton for an image directory
    Manifest {
        /// Image directory
        dir: PathBuf,

        /// Output file (default: DIR/gallery.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include images in sub-directories, tagged by folder
        #[arg(short, long)]
        recursive: bool,

        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },
}
