// Redirection targets
use crate::engine::ast::{OutputMode, Redirects, Word};
use anyhow::{Context, Result};
use colored::*;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;

/// A redirection target that could not be opened. This is the command's
/// failure, not the engine's: callers report it and return status 1.
#[derive(Debug)]
pub struct RedirectFailure {
    pub path: String,
    pub source: io::Error,
}

impl fmt::Display for RedirectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "ambiguous redirect: {}", self.source)
        } else {
            write!(f, "{}: {}", self.path, self.source)
        }
    }
}

impl std::error::Error for RedirectFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Default)]
pub struct OpenedStreams {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
    pub stderr: Option<File>,
}

fn target_path(word: &Word) -> Result<String> {
    let path = word.resolve();
    if path.is_empty() {
        return Err(RedirectFailure {
            path,
            source: io::Error::new(io::ErrorKind::InvalidInput, "target resolved to an empty path"),
        }
        .into());
    }
    Ok(path)
}

fn open_input(path: &str) -> Result<File> {
    File::open(path).map_err(|source| {
        RedirectFailure {
            path: path.to_string(),
            source,
        }
        .into()
    })
}

fn open_output(path: &str, mode: OutputMode) -> Result<File> {
    let mut open_opts = OpenOptions::new();
    match mode {
        OutputMode::Truncate => { open_opts.write(true).create(true).truncate(true); },
        OutputMode::Append => { open_opts.append(true).create(true); },
    };
    open_opts.mode(0o644);
    open_opts.open(path).map_err(|source| {
        RedirectFailure {
            path: path.to_string(),
            source,
        }
        .into()
    })
}

/// Opens every present target. When output and error name the same path the
/// error stream shares the output's open file instead of opening it twice.
pub fn open_streams(redirects: &Redirects) -> Result<OpenedStreams> {
    let mut streams = OpenedStreams::default();

    if let Some(word) = &redirects.input {
        streams.stdin = Some(open_input(&target_path(word)?)?);
    }

    let out_path = redirects.output.as_ref().map(target_path).transpose()?;
    if let Some(path) = &out_path {
        streams.stdout = Some(open_output(path, redirects.output_mode)?);
    }

    if let Some(word) = &redirects.error {
        let err_path = target_path(word)?;
        streams.stderr = match &streams.stdout {
            Some(out) if out_path.as_deref() == Some(err_path.as_str()) => Some(
                out.try_clone()
                    .with_context(|| format!("Failed to duplicate output handle for {}", err_path))?,
            ),
            _ => Some(open_output(&err_path, redirects.error_mode)?),
        };
    }

    Ok(streams)
}

/// Creates or truncates the output and error targets without writing to them,
/// the way a builtin's redirections still touch the filesystem. A path shared
/// by output and error is opened once, with the output's mode.
pub fn touch_outputs(redirects: &Redirects) -> Result<()> {
    let out_path = redirects.output.as_ref().map(target_path).transpose()?;
    if let Some(path) = &out_path {
        drop(open_output(path, redirects.output_mode)?);
    }

    if let Some(word) = &redirects.error {
        let err_path = target_path(word)?;
        if out_path.as_deref() != Some(err_path.as_str()) {
            drop(open_output(&err_path, redirects.error_mode)?);
        }
    }
    Ok(())
}

/// Turns a redirection failure into the command's status 1; anything else
/// stays an engine error.
pub fn report_failure(err: anyhow::Error) -> Result<i32> {
    match err.downcast_ref::<RedirectFailure>() {
        Some(failure) => {
            eprintln!("{} {}", "arbor:".red(), failure);
            Ok(1)
        }
        None => Err(err),
    }
}
