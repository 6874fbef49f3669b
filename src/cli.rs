//! CLI argument parsing with clap.

use clap::Parser;

/// Virtual stylist - three outfit ideas, flat-lay renders and edits from one clothing photo.
#[derive(Parser, Debug)]
#[command(name = "stylist", version, about)]
pub struct Cli {
    /// Photo of a clothing item to upload right away.
    pub image: Option<String>,

    /// Model name or alias for outfit ideas (default from config: gemini-2.5-pro).
    #[arg(long)]
    pub ideas_model: Option<String>,

    /// Model name or alias for renders and edits (default from config: gemini-2.5-flash-image).
    #[arg(short = 'm', long)]
    pub image_model: Option<String>,

    /// Aspect ratio for renders (e.g., 1:1, 3:4).
    #[arg(short, long)]
    pub aspect_ratio: Option<String>,

    /// Reveal policy: `all` waits for every render, `incremental` shows each as it lands.
    #[arg(short, long)]
    pub reveal: Option<String>,

    /// Directory for the item copy and outfit images.
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}
