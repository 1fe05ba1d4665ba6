use crate::codec::EncodeSettings;
use crate::request::ClipRequest;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

#[cfg(windows)]
const NULL_SINK: &str = "NUL";
#[cfg(not(windows))]
const NULL_SINK: &str = "/dev/null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Single,
    First,
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Single => "encoding",
            Pass::First => "first encoding pass",
            Pass::Second => "second encoding pass",
        })
    }
}

/// One ffmpeg invocation.
#[derive(Debug, Clone)]
pub struct EncoderCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub pass: Pass,
}

/// The ffmpeg invocations for one clip, in order.
#[derive(Debug)]
pub struct Plan {
    pub commands: Vec<EncoderCommand>,
    /// `-passlogfile` prefix when encoding in two passes.
    pub pass_log: Option<OsString>,
}

/// Build the ffmpeg argument lists for a validated request.
///
/// The start is an input option so ffmpeg seeks before decoding; the span
/// goes after the input as a duration, since output timestamps restart at
/// zero after an input seek.
pub fn build(request: &ClipRequest) -> Plan {
    let settings = EncodeSettings::vp9(request.quality, request.height);

    let mut common: Vec<OsString> = Vec::new();
    push(&mut common, ["-y", "-ss"]);
    common.push(request.start.to_string().into());
    push(&mut common, ["-i"]);
    common.push(request.input.clone().into());
    push(&mut common, ["-t"]);
    common.push(request.duration.to_string().into());
    common.extend(settings.args().into_iter().map(OsString::from));

    if !request.two_pass {
        let mut args = common;
        push(&mut args, ["-f", "webm"]);
        args.push(request.output.clone().into());
        return Plan {
            commands: vec![EncoderCommand {
                program: request.ffmpeg.clone(),
                args,
                pass: Pass::Single,
            }],
            pass_log: None,
        };
    }

    let mut prefix = request.output.clone().into_os_string();
    prefix.push(".2pass");

    let mut first = common.clone();
    push(&mut first, ["-pass", "1", "-passlogfile"]);
    first.push(prefix.clone());
    push(&mut first, ["-an", "-f", "null", NULL_SINK]);

    let mut second = common;
    push(&mut second, ["-pass", "2", "-passlogfile"]);
    second.push(prefix.clone());
    push(&mut second, ["-f", "webm"]);
    second.push(request.output.clone().into());

    Plan {
        commands: vec![
            EncoderCommand {
                program: request.ffmpeg.clone(),
                args: first,
                pass: Pass::First,
            },
            EncoderCommand {
                program: request.ffmpeg.clone(),
                args: second,
                pass: Pass::Second,
            },
        ],
        pass_log: Some(prefix),
    }
}

fn push<const N: usize>(args: &mut Vec<OsString>, items: [&str; N]) {
    args.extend(items.into_iter().map(OsString::from));
}

impl Plan {
    /// Files ffmpeg leaves behind for two-pass encoding. libvpx writes a
    /// single stream log, `<prefix>-0.log`.
    pub fn pass_log_files(&self) -> Vec<PathBuf> {
        self.pass_log
            .iter()
            .map(|prefix| {
                let mut name = prefix.clone();
                name.push("-0.log");
                PathBuf::from(name)
            })
            .collect()
    }

    pub fn cleanup(&self) {
        for file in self.pass_log_files() {
            match fs::remove_file(&file) {
                Ok(()) => debug!(file = %file.display(), "removed pass log"),
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => warn!(file = %file.display(), %err, "could not remove pass log"),
            }
        }
    }
}

fn quoted(f: &mut fmt::Formatter<'_>, arg: &OsStr) -> fmt::Result {
    let arg = arg.to_string_lossy();
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        write!(f, "'{}'", arg.replace('\'', r"'\''"))
    } else {
        f.write_str(&arg)
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        quoted(f, self.program.as_os_str())?;
        for arg in &self.args {
            f.write_str(" ")?;
            quoted(f, arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::Timecode;
    use std::path::Path;

    fn request(start: u64, end: u64) -> ClipRequest {
        ClipRequest {
            input: PathBuf::from("example.mkv"),
            start: Timecode::from_millis(start),
            end: Timecode::from_millis(end),
            duration: Timecode::from_millis(end - start),
            output: PathBuf::from("example.webm"),
            quality: 50,
            height: None,
            two_pass: false,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }

    fn strings(cmd: &EncoderCommand) -> Vec<String> {
        cmd.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        let at = args.iter().position(|a| a == flag)?;
        args.get(at + 1).cloned()
    }

    #[test]
    fn single_pass_example() {
        let plan = build(&request(23_000, 49_000));
        assert_eq!(plan.commands.len(), 1);
        assert!(plan.pass_log.is_none());

        let cmd = &plan.commands[0];
        assert_eq!(cmd.program, Path::new("ffmpeg"));
        assert_eq!(cmd.pass, Pass::Single);
        assert_eq!(
            strings(cmd),
            [
                "-y", "-ss", "0:00:23.000", "-i", "example.mkv", "-t", "0:00:26.000", "-c:v",
                "libvpx-vp9", "-b:v", "0", "-crf", "50", "-row-mt", "1", "-f", "webm",
                "example.webm",
            ]
        );
    }

    #[test]
    fn span_brackets_the_input() {
        let args = strings(&build(&request(61_500, 3_600_000)).commands[0]);
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "example.mkv").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert!(ss < input && input < t);
        assert_eq!(args[ss + 1], "0:01:01.500");
        assert_eq!(args[t + 1], "0:58:58.500");
        assert_eq!(args.last().map(String::as_str), Some("example.webm"));
    }

    #[test]
    fn quality_override_is_verbatim() {
        let mut req = request(0, 5_000);
        req.quality = 17;
        req.height = Some(480);
        let args = strings(&build(&req).commands[0]);
        assert_eq!(value_after(&args, "-crf").as_deref(), Some("17"));
        assert_eq!(value_after(&args, "-vf").as_deref(), Some("scale=-2:480"));
        assert_eq!(value_after(&args, "-c:v").as_deref(), Some("libvpx-vp9"));
    }

    #[test]
    fn two_pass_discards_first_output() {
        let mut req = request(0, 5_000);
        req.two_pass = true;
        let plan = build(&req);
        assert_eq!(plan.commands.len(), 2);
        assert_eq!(plan.pass_log.as_deref(), Some(OsStr::new("example.webm.2pass")));
        assert_eq!(plan.pass_log_files(), [PathBuf::from("example.webm.2pass-0.log")]);

        let first = strings(&plan.commands[0]);
        assert_eq!(plan.commands[0].pass, Pass::First);
        assert_eq!(value_after(&first, "-pass").as_deref(), Some("1"));
        assert_eq!(value_after(&first, "-passlogfile").as_deref(), Some("example.webm.2pass"));
        assert!(first.contains(&"-an".to_string()));
        assert_eq!(value_after(&first, "-f").as_deref(), Some("null"));
        assert_eq!(first.last().map(String::as_str), Some(NULL_SINK));
        assert!(!first.contains(&"example.webm".to_string()));

        let second = strings(&plan.commands[1]);
        assert_eq!(plan.commands[1].pass, Pass::Second);
        assert_eq!(value_after(&second, "-pass").as_deref(), Some("2"));
        assert_eq!(value_after(&second, "-f").as_deref(), Some("webm"));
        assert_eq!(second.last().map(String::as_str), Some("example.webm"));
        assert_eq!(first[..first.len() - 8], second[..second.len() - 7]);
    }

    #[test]
    fn cleanup_removes_pass_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(0, 5_000);
        req.output = dir.path().join("clip.webm");
        req.two_pass = true;
        let plan = build(&req);

        let log = dir.path().join("clip.webm.2pass-0.log");
        assert_eq!(plan.pass_log_files(), [log.clone()]);
        fs::write(&log, b"vp9 stats").unwrap();

        plan.cleanup();
        assert!(!log.exists());
        // already gone is fine
        plan.cleanup();
        assert!(dir.path().read_dir().unwrap().next().is_none());
    }

    #[test]
    fn single_pass_has_nothing_to_clean() {
        assert!(build(&request(0, 5_000)).pass_log_files().is_empty());
    }

    #[test]
    fn display_quotes_awkward_arguments() {
        let cmd = EncoderCommand {
            program: PathBuf::from("ffmpeg"),
            args: vec!["-i".into(), "my clip.mkv".into(), "it's".into()],
            pass: Pass::Single,
        };
        assert_eq!(cmd.to_string(), r"ffmpeg -i 'my clip.mkv' 'it'\''s'");
    }
}
