use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "getsub")]
#[command(about = "Pick and extract the best-matching subtitle for your videos from subtitle archives")]
pub struct Cli {
    /// The video's name or full path, or a directory with videos
    pub name: String,

    /// Save subtitles to this directory instead of next to the video
    #[arg(short = 'p', long = "directory")]
    pub directory: Option<PathBuf>,

    /// Show the packages found and choose which to download
    #[arg(short = 'q', long)]
    pub query: bool,

    /// Show the subtitles inside a package and choose one
    #[arg(short = 's', long)]
    pub single: bool,

    /// Replace subtitles that already exist
    #[arg(short = 'o', long)]
    pub over: bool,

    /// Also save the original package
    #[arg(short = 'm', long)]
    pub more: bool,

    /// Max number of packages listed in query mode
    #[arg(short = 'n', long = "number")]
    pub number: Option<usize>,

    /// Save .srt and .ass at the same time if both exist in the package
    #[arg(short = 'b', long)]
    pub both: bool,

    /// Show more info about errors
    #[arg(long)]
    pub debug: bool,

    /// Add the language tag to subtitle names so media servers recognize them
    #[arg(long)]
    pub plex: bool,

    /// Subtitle archives, or directories holding them, to search
    #[arg(short = 'a', long = "archives")]
    pub archives: Vec<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
