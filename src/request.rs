use crate::cli::Args;
use crate::error::{Result, TrimError};
use crate::timecode::Timecode;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

/// One validated run: what to cut, where to put it, how to encode it.
#[derive(Debug, Clone)]
pub struct ClipRequest {
    pub input: PathBuf,
    pub start: Timecode,
    pub end: Timecode,
    /// Always positive, `end - start`.
    pub duration: Timecode,
    pub output: PathBuf,
    pub quality: u8,
    pub height: Option<u32>,
    pub two_pass: bool,
    pub ffmpeg: PathBuf,
}

impl ClipRequest {
    /// Validate parsed arguments. `now` stamps the fallback output name.
    pub fn from_args(args: &Args, now: NaiveDateTime) -> Result<Self> {
        if !args.in_video.is_file() {
            return Err(TrimError::InputNotFound {
                path: args.in_video.display().to_string(),
            });
        }

        let start = parse_timecode("--starttime", &args.start)?;
        let end = parse_timecode("--endtime", &args.end)?;
        let duration = end.since(start).ok_or_else(|| TrimError::EndNotAfterStart {
            start: args.start.clone(),
            end: args.end.clone(),
        })?;

        let output = infer_output_path(args.out_video.as_deref(), &args.in_video, now)?;
        if args.out_video.is_some() && output.exists() && !args.overwrite {
            return Err(TrimError::OutputExists {
                path: output.display().to_string(),
            });
        }
        check_writable(&output)?;

        Ok(ClipRequest {
            input: args.in_video.clone(),
            start,
            end,
            duration,
            output,
            quality: args.quality,
            height: args.vresolution,
            two_pass: args.two_pass,
            ffmpeg: args.ffmpeg.clone(),
        })
    }
}

fn parse_timecode(arg: &'static str, value: &str) -> Result<Timecode> {
    value.parse::<Timecode>().map_err(|err| TrimError::BadTimecode {
        arg,
        value: value.to_string(),
        reason: err.to_string(),
    })
}

/// Pick the output path.
///
/// An explicit name is kept unless it names the input itself. Otherwise the
/// input's extension becomes `.webm`; if that is taken, a
/// `-trimshare-<timestamp>` suffix is added before giving up.
pub fn infer_output_path(
    explicit: Option<&Path>,
    input: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    if let Some(out) = explicit {
        if out == input || same_file(out, input) {
            return Err(TrimError::OutputIsInput);
        }
        return Ok(out.to_path_buf());
    }

    let converted = input.with_extension("webm");
    if !converted.exists() {
        return Ok(converted);
    }

    let no_safe_name = || TrimError::NoSafeName {
        path: input.display().to_string(),
    };
    let mut name = input.file_stem().ok_or_else(no_safe_name)?.to_os_string();
    name.push(format!("-trimshare-{}.webm", now.format("%Y-%m-%d-%H%M%S")));
    let safer = input.with_file_name(name);
    if safer.exists() {
        return Err(no_safe_name());
    }
    Ok(safer)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_writable(output: &Path) -> Result<()> {
    let not_writable = |reason: &str| TrimError::OutputNotWritable {
        path: output.display().to_string(),
        reason: reason.to_string(),
    };

    if output.is_dir() {
        return Err(not_writable("it is a directory"));
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let meta = fs::metadata(dir).map_err(|_| not_writable("its directory does not exist"))?;
    if !meta.is_dir() {
        return Err(not_writable("its parent is not a directory"));
    }
    // Permission bits say nothing about the current user; try a real file.
    tempfile::NamedTempFile::new_in(dir)
        .map(drop)
        .map_err(|err| not_writable(&format!("its directory is not writable ({})", err)))
}
