use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info, warn};

use super::{BinaryLocator, Engine, EngineConfig, EngineOutcome};
use crate::error::EngineError;
use crate::progress::ProgressEvent;

/// Prefix of the machine-readable lines requested with `--progress-template`.
const PROGRESS_MARKER: &str = "media-dl|";
/// Prefix of the final file path requested with `--print`.
const FILEPATH_MARKER: &str = "media-dl-file|";

const PROGRESS_TEMPLATE: &str =
    "download:media-dl|%(progress.status)s|%(progress._percent_str)s";
const FILEPATH_TEMPLATE: &str = "after_move:media-dl-file|%(filepath)s";

impl EngineConfig {
    /// Command-line flags for yt-dlp, without the URL.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--newline",
            "--progress",
            "--no-colors",
            "--progress-template",
            PROGRESS_TEMPLATE,
            "--print",
            FILEPATH_TEMPLATE,
            "-f",
            self.format.as_str(),
            "-o",
            self.output_template.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(audio) = &self.audio {
            args.extend([
                "-x".to_string(),
                "--audio-format".to_string(),
                audio.codec.to_string(),
                "--audio-quality".to_string(),
                audio.quality.to_string(),
            ]);
        }

        args
    }
}

#[derive(Debug, PartialEq, Eq)]
enum OutputLine {
    Progress(ProgressEvent),
    FilePath(PathBuf),
    Other,
}

fn parse_output_line(line: &str) -> OutputLine {
    if let Some(rest) = line.strip_prefix(PROGRESS_MARKER) {
        let mut parts = rest.splitn(2, '|');
        let status = parts.next().unwrap_or_default().trim().to_string();
        let percent_str = parts.next().map(|s| s.to_string());
        return OutputLine::Progress(ProgressEvent {
            status,
            percent_str,
        });
    }
    if let Some(path) = line.strip_prefix(FILEPATH_MARKER) {
        let path = path.trim();
        if !path.is_empty() {
            return OutputLine::FilePath(PathBuf::from(path));
        }
    }
    OutputLine::Other
}

/// Picks the most useful line out of yt-dlp's stderr for an error popup.
fn failure_message(stderr: &[String]) -> String {
    stderr
        .iter()
        .rev()
        .find_map(|line| line.strip_prefix("ERROR:").map(|msg| msg.trim().to_string()))
        .or_else(|| {
            stderr
                .iter()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(|line| line.trim().to_string())
        })
        .unwrap_or_else(|| "no error output".to_string())
}

/// Calls `f` for every line of `reader`, decoding lossily so a stray
/// non-UTF-8 byte does not end the stream.
fn for_each_line<R: Read>(reader: R, mut f: impl FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        f(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string());
    }
}

/// Runs the yt-dlp binary as a child process.
pub struct YtDlp {
    locator: BinaryLocator,
}

impl YtDlp {
    pub fn new(locator: BinaryLocator) -> Self {
        Self { locator }
    }
}

impl Engine for YtDlp {
    fn download(
        &self,
        url: &str,
        config: &EngineConfig,
        on_progress: &mut dyn FnMut(&ProgressEvent),
    ) -> Result<EngineOutcome, EngineError> {
        let binary = self.locator.locate().ok_or(EngineError::NotFound)?;

        let mut command = Command::new(&binary);
        command
            .args(config.to_args())
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Command: {:?}", command);

        let mut child = command.spawn().map_err(EngineError::Spawn)?;
        info!("Started yt-dlp (pid {}) for {}", child.id(), url);

        // Drain stderr on its own thread so a chatty engine cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut lines = Vec::new();
                let read = for_each_line(stderr, |line| {
                    debug!("yt-dlp stderr: {}", line);
                    lines.push(line);
                });
                if let Err(err) = read {
                    warn!("Failed reading yt-dlp stderr: {}", err);
                }
                lines
            })
        });

        let mut outcome = EngineOutcome::default();
        let read = match child.stdout.take() {
            Some(stdout) => for_each_line(stdout, |line| match parse_output_line(&line) {
                OutputLine::Progress(event) => on_progress(&event),
                OutputLine::FilePath(path) => outcome.output_path = Some(path),
                OutputLine::Other => debug!("yt-dlp: {}", line),
            }),
            None => Ok(()),
        };
        if let Err(err) = read {
            warn!("Lost yt-dlp stdout, stopping it: {}", err);
            let _ = child.kill();
            let _ = child.wait();
            if let Some(handle) = stderr_reader {
                let _ = handle.join();
            }
            return Err(EngineError::Io(err));
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            info!("yt-dlp finished: {:?}", outcome.output_path);
            Ok(outcome)
        } else {
            let message = failure_message(&stderr);
            warn!("yt-dlp exited with {}: {}", status, message);
            Err(EngineError::Failed { status, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AudioExtraction;

    fn audio_config() -> EngineConfig {
        EngineConfig {
            format: "bestaudio/best".into(),
            output_template: "/tmp/out/%(title)s.%(ext)s".into(),
            audio: Some(AudioExtraction {
                codec: "mp3",
                quality: "0",
            }),
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn audio_args_request_extraction() {
        let args = audio_config().to_args();
        assert_eq!(value_after(&args, "-f"), Some("bestaudio/best"));
        assert_eq!(value_after(&args, "-o"), Some("/tmp/out/%(title)s.%(ext)s"));
        assert!(args.iter().any(|a| a == "-x"));
        assert_eq!(value_after(&args, "--audio-format"), Some("mp3"));
        assert_eq!(value_after(&args, "--audio-quality"), Some("0"));
    }

    #[test]
    fn video_args_skip_extraction() {
        let config = EngineConfig {
            format: "bestvideo[height=720]+bestaudio/best".into(),
            audio: None,
            ..audio_config()
        };
        let args = config.to_args();
        assert_eq!(
            value_after(&args, "-f"),
            Some("bestvideo[height=720]+bestaudio/best")
        );
        assert!(!args.iter().any(|a| a == "-x"));
    }

    #[test]
    fn progress_template_matches_parser() {
        let args = audio_config().to_args();
        let template = value_after(&args, "--progress-template").unwrap();
        let emitted = template.strip_prefix("download:").unwrap();
        assert!(emitted.starts_with(PROGRESS_MARKER));
    }

    #[test]
    fn parses_progress_lines() {
        assert_eq!(
            parse_output_line("media-dl|downloading|  42.0%"),
            OutputLine::Progress(ProgressEvent {
                status: "downloading".into(),
                percent_str: Some("  42.0%".into()),
            })
        );
        assert_eq!(
            parse_output_line("media-dl|finished|100%"),
            OutputLine::Progress(ProgressEvent {
                status: "finished".into(),
                percent_str: Some("100%".into()),
            })
        );
    }

    #[test]
    fn parses_final_file_path() {
        assert_eq!(
            parse_output_line("media-dl-file|/tmp/out/Song.mp3"),
            OutputLine::FilePath(PathBuf::from("/tmp/out/Song.mp3"))
        );
        assert_eq!(parse_output_line("media-dl-file|  "), OutputLine::Other);
    }

    #[test]
    fn ignores_regular_output() {
        assert_eq!(
            parse_output_line("[download] Destination: /tmp/out/x.webm"),
            OutputLine::Other
        );
    }

    #[test]
    fn failure_message_prefers_error_lines() {
        let stderr = vec![
            "WARNING: something odd".to_string(),
            "ERROR: [generic] Unsupported URL: https://example.com/x".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            failure_message(&stderr),
            "[generic] Unsupported URL: https://example.com/x"
        );
    }

    #[test]
    fn failure_message_falls_back_to_last_line() {
        let stderr = vec!["first".to_string(), "last".to_string(), " ".to_string()];
        assert_eq!(failure_message(&stderr), "last");
        assert_eq!(failure_message(&[]), "no error output");
    }
    #[test]
    fn lines_survive_invalid_utf8() {
        let mut lines = Vec::new();
        for_each_line(&b"first\r\ncaf\xe9.mp3\nlast"[..], |line| lines.push(line)).unwrap();
        assert_eq!(lines, vec!["first", "caf\u{FFFD}.mp3", "last"]);
    }

    #[cfg(unix)]
    fn fake_ytdlp(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let dir = std::env::temp_dir().join(format!(
            "media-dl-gui-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let script = dir.join("yt-dlp");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    fn run_fake(script: PathBuf) -> (Result<EngineOutcome, EngineError>, Vec<ProgressEvent>) {
        let engine = YtDlp::new(BinaryLocator::new(Some(script), None));
        let mut events = Vec::new();
        let result = engine.download(
            "https://example.com/x",
            &audio_config(),
            &mut |event: &ProgressEvent| events.push(event.clone()),
        );
        (result, events)
    }

    #[cfg(unix)]
    #[test]
    fn successful_run_reports_progress_and_file() {
        let script = fake_ytdlp(
            "success",
            r#"printf '%s\n' 'media-dl|downloading| 10.0%'
printf '[download] Destination: caf\351.mp3\n'
printf '%s\n' 'media-dl|downloading|100%'
printf '%s\n' 'media-dl-file|/tmp/out/cafe.mp3'
printf 'WARNING: caf\351\n' >&2
exit 0"#,
        );
        let (result, events) = run_fake(script);

        let outcome = result.unwrap();
        assert_eq!(outcome.output_path, Some(PathBuf::from("/tmp/out/cafe.mp3")));
        assert_eq!(
            events,
            vec![
                ProgressEvent {
                    status: "downloading".into(),
                    percent_str: Some(" 10.0%".into()),
                },
                ProgressEvent {
                    status: "downloading".into(),
                    percent_str: Some("100%".into()),
                },
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_run_carries_last_error_line() {
        let script = fake_ytdlp(
            "failure",
            r#"printf '%s\n' 'media-dl|downloading| 5.0%'
printf 'WARNING: caf\351\n' >&2
printf '%s\n' 'ERROR: [generic] Unsupported URL: https://example.com/x' >&2
exit 1"#,
        );
        let (result, events) = run_fake(script);

        assert_eq!(events.len(), 1);
        match result {
            Err(EngineError::Failed { status, message }) => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(message, "[generic] Unsupported URL: https://example.com/x");
            }
            other => panic!("expected a failed run, got {:?}", other),
        }
    }

    #[test]
    fn missing_binary_is_not_found() {
        let dir = std::env::temp_dir().join("media-dl-gui-no-engine");
        let locator = BinaryLocator::new(Some(dir.join("yt-dlp")), Some(dir));
        if locator.locate().is_some() {
            // A real yt-dlp on PATH would be picked up instead.
            return;
        }
        let result = YtDlp::new(locator).download(
            "https://example.com/x",
            &audio_config(),
            &mut |_: &ProgressEvent| {},
        );
        assert!(matches!(result, Err(EngineError::NotFound)));
    }
}
