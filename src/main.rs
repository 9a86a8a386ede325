//! Bounce Reel - headless renderer
//!
//! Usage: bounce-reel <config.json> [--assets DIR] [--frames-dir DIR] [--timeout SECS]
//!
//! Runs one headless job and prints the audio-cue timeline as JSON on stdout.
//! Frames are written as numbered PNGs when `--frames-dir` is given.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use bounce_reel::driver::{AbortSignal, FrameSink, HeadlessJob, JobStatus, RenderedFrame};
use bounce_reel::render::FsAssetResolver;
use bounce_reel::{Configuration, SimError, SimResult};

/// Writes `frame0001.png`, `frame0002.png`, ... into a directory
struct PngDirSink {
    dir: PathBuf,
}

impl FrameSink for PngDirSink {
    fn deliver(&mut self, rendered: RenderedFrame) -> SimResult<()> {
        let path = self
            .dir
            .join(format!("frame{:04}.png", rendered.index + 1));
        rendered.frame.save_png(&path)
    }
}

/// Drops frames; used when only the cue timeline is wanted
struct DiscardSink;

impl FrameSink for DiscardSink {
    fn deliver(&mut self, _frame: RenderedFrame) -> SimResult<()> {
        Ok(())
    }
}

struct Args {
    config: PathBuf,
    assets: PathBuf,
    frames_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut args = args.into_iter();
    let mut config = None;
    let mut assets = PathBuf::from(".");
    let mut frames_dir = None;
    let mut timeout = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets" => assets = args.next().ok_or("--assets needs a directory")?.into(),
            "--frames-dir" => {
                frames_dir = Some(args.next().ok_or("--frames-dir needs a directory")?.into())
            }
            "--timeout" => {
                let secs: f64 = args
                    .next()
                    .ok_or("--timeout needs seconds")?
                    .parse()
                    .map_err(|e| format!("invalid --timeout: {e}"))?;
                timeout = Some(
                    Duration::try_from_secs_f64(secs)
                        .map_err(|e| format!("invalid --timeout: {e}"))?,
                );
            }
            other if config.is_none() => config = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }

    Ok(Args {
        config: config.ok_or("missing configuration path")?,
        assets,
        frames_dir,
        timeout,
    })
}

async fn run(args: Args) -> SimResult<()> {
    let config = Configuration::load(&args.config)?;
    let resolver = FsAssetResolver::new(&args.assets);
    let job = HeadlessJob::new(&config, &resolver)?;
    let abort = AbortSignal::new();

    let report = match &args.frames_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| SimError::FrameSink {
                frame: 0,
                reason: format!("cannot create {}: {e}", dir.display()),
            })?;
            let mut sink = PngDirSink { dir: dir.clone() };
            job.run(&mut sink, &abort, args.timeout).await
        }
        None => job.run(&mut DiscardSink, &abort, args.timeout).await,
    };

    match report.status {
        JobStatus::Completed => {
            match serde_json::to_string_pretty(&report.cues) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Failed to serialize cues: {e}"),
            }
            Ok(())
        }
        JobStatus::Failed { error, .. } => Err(error),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!(
                "usage: bounce-reel <config.json> [--assets DIR] [--frames-dir DIR] [--timeout SECS]"
            );
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_full_command_line() {
        let args = parse(&["run.json", "--assets", "media", "--timeout", "2.5"]).unwrap();
        assert_eq!(args.config, PathBuf::from("run.json"));
        assert_eq!(args.assets, PathBuf::from("media"));
        assert_eq!(args.timeout, Some(Duration::from_millis(2500)));
        assert!(args.frames_dir.is_none());
    }

    #[test]
    fn test_bad_timeout_is_usage_error() {
        for bad in ["-1", "NaN", "1e300", "soon"] {
            let err = parse(&["run.json", "--timeout", bad]).err();
            assert!(
                err.as_deref().is_some_and(|e| e.starts_with("invalid --timeout")),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn test_missing_config_path() {
        assert!(parse(&["--assets", "media"]).is_err());
    }
}
