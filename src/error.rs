use failure::Fail;
use std::io;

pub type Result<T> = std::result::Result<T, TrimError>;

#[derive(Debug, Fail)]
pub enum TrimError {
    #[fail(display = "no file called {}", path)]
    InputNotFound { path: String },

    #[fail(display = "invalid value '{}' for {}: {}", value, arg, reason)]
    BadTimecode {
        arg: &'static str,
        value: String,
        reason: String,
    },

    #[fail(display = "end time {} must be after start time {}", end, start)]
    EndNotAfterStart { start: String, end: String },

    #[fail(display = "output video must be different from the input video")]
    OutputIsInput,

    #[fail(display = "could not automatically generate a safe file name for {}", path)]
    NoSafeName { path: String },

    #[fail(display = "{} already exists (pass --overwrite to replace it)", path)]
    OutputExists { path: String },

    #[fail(display = "cannot write {}: {}", path, reason)]
    OutputNotWritable { path: String, reason: String },

    #[fail(display = "could not find the encoder '{}', is ffmpeg installed?", program)]
    EncoderNotFound { program: String },

    #[fail(display = "{} failed: ffmpeg {}: {}", pass, status, diagnostic)]
    EncoderFailed {
        pass: String,
        status: String,
        diagnostic: String,
    },

    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl TrimError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrimError::EncoderNotFound { .. } => 127,
            TrimError::EncoderFailed { .. } | TrimError::Io(_) => 1,
            _ => 2,
        }
    }
}

impl From<io::Error> for TrimError {
    fn from(err: io::Error) -> Self {
        TrimError::Io(err)
    }
}
