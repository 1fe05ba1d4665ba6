use failure::Fail;
use std::fmt;
use std::str::FromStr;

/// A position in the source video, millisecond precision.
///
/// Accepts `S[.fff]`, `M:SS[.fff]` and `H:MM:SS[.fff]`; bare `.fff` means
/// zero seconds. Formats as `H:MM:SS.mmm`, which ffmpeg reads back for both
/// `-ss` and `-t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timecode {
    millis: u64,
}

#[derive(Debug, Fail, PartialEq, Eq)]
pub enum TimecodeError {
    #[fail(display = "time code is empty")]
    Empty,
    #[fail(display = "expected [[H:]MM:]SS[.fff]")]
    Malformed,
    #[fail(display = "'{}' is not a number", _0)]
    NotANumber(String),
    #[fail(display = "{} field must be below 60", _0)]
    OutOfRange(&'static str),
    #[fail(display = "at most millisecond precision is supported")]
    TooPrecise,
    #[fail(display = "time code is too large")]
    Overflow,
}

impl Timecode {
    pub fn from_millis(millis: u64) -> Self {
        Timecode { millis }
    }

    /// Span from `earlier` to `self`, or `None` if `earlier` is not before `self`.
    pub fn since(&self, earlier: Timecode) -> Option<Timecode> {
        match self.millis.checked_sub(earlier.millis) {
            Some(0) | None => None,
            Some(millis) => Some(Timecode { millis }),
        }
    }
}

fn digits(field: &str) -> Result<u64, TimecodeError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimecodeError::NotANumber(field.to_string()));
    }
    field.parse().map_err(|_| TimecodeError::Overflow)
}

fn sexagesimal(field: &str, name: &'static str) -> Result<u64, TimecodeError> {
    if field.len() > 2 {
        return Err(TimecodeError::Malformed);
    }
    let value = digits(field)?;
    if value >= 60 {
        return Err(TimecodeError::OutOfRange(name));
    }
    Ok(value)
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TimecodeError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, Some(frac)),
            None => (s, None),
        };

        let frac_millis = match frac {
            None => 0,
            Some("") => return Err(TimecodeError::Malformed),
            Some(f) if f.len() > 3 => return Err(TimecodeError::TooPrecise),
            Some(f) => {
                // "5" is 500ms, "05" is 50ms
                let padded = format!("{:0<3}", f);
                digits(&padded)?
            }
        };

        let fields: Vec<&str> = whole.split(':').collect();
        let secs = match fields.as_slice() {
            [""] if frac.is_some() => 0,
            [s] => digits(s)?,
            [m, s] => {
                let seconds = sexagesimal(s, "seconds")?;
                digits(m)?
                    .checked_mul(60)
                    .and_then(|m| m.checked_add(seconds))
                    .ok_or(TimecodeError::Overflow)?
            }
            [h, m, s] => {
                let minutes = sexagesimal(m, "minutes")?;
                let seconds = sexagesimal(s, "seconds")?;
                digits(h)?
                    .checked_mul(3600)
                    .and_then(|h| h.checked_add(minutes * 60 + seconds))
                    .ok_or(TimecodeError::Overflow)?
            }
            _ => return Err(TimecodeError::Malformed),
        };

        secs.checked_mul(1000)
            .and_then(|ms| ms.checked_add(frac_millis))
            .map(Timecode::from_millis)
            .ok_or(TimecodeError::Overflow)
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.millis % 1000;
        let total_secs = self.millis / 1000;
        write!(
            f,
            "{}:{:02}:{:02}.{:03}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60,
            millis
        )
    }
}
