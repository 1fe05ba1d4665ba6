use crate::codec::DEFAULT_CRF;
use clap::Parser;
use std::path::PathBuf;

/// Trim a video and convert it to webm for easy sharing.
///
/// Clips are re-encoded with the vp9 codec in constant quality mode. At the
/// default CRF of 50, a 10-30 second clip at 720p and 60 fps usually stays
/// under 8 MB.
///
/// Example, grab 0:23-0:49 of `example.mkv` into `example.webm`:
///
///     trimshare example.mkv -s 0:23 -e 0:49
#[derive(Debug, Parser)]
#[command(name = "trimshare", version)]
pub struct Args {
    /// Path to the video to trim
    pub in_video: PathBuf,

    /// Start the clip at this point in time, [[H:]MM:]SS[.fff]
    #[arg(short = 's', long = "starttime", value_name = "T")]
    pub start: String,

    /// End the clip at this point in time, [[H:]MM:]SS[.fff]
    #[arg(short = 'e', long = "endtime", value_name = "T")]
    pub end: String,

    /// Export the clip to this path as webm. If unspecified, pick a name
    /// similar to <IN_VIDEO> in the same directory
    #[arg(short = 'o', value_name = "OUT_VIDEO")]
    pub out_video: Option<PathBuf>,

    /// Output vp9 quality (CRF mode), 0-63. Lower is better
    #[arg(short, long, default_value_t = DEFAULT_CRF, value_parser = clap::value_parser!(u8).range(0..=63))]
    pub quality: u8,

    /// Scale the clip to this vertical resolution in pixels; the width
    /// follows the aspect ratio
    #[arg(short = 'v', long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub vresolution: Option<u32>,

    /// Encode in two passes (slower, better rate distribution)
    #[arg(long)]
    pub two_pass: bool,

    /// Replace <OUT_VIDEO> if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// ffmpeg executable to run
    #[arg(long, value_name = "PATH", env = "TRIMSHARE_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Show debugging info while this runs
    #[arg(long)]
    pub debug: bool,
}
