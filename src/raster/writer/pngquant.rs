use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::Error;

pub const PNGQUANT_PROGRAM: &str = "pngquant";

const EXIT_CODE_LARGER_THAN_INPUT: i32 = 98;
const EXIT_CODE_QUALITY_TOO_LOW: i32 = 99;

/// Wrapper around the external `pngquant` executable.
pub struct Pngquant<'a> {
    program: &'a Path,
    quality: u8,
}

impl<'a> Pngquant<'a> {
    pub fn new(program: &'a Path, quality: u8) -> Self {
        Self { program, quality }
    }

    /// Quantizes the PNG at `path`, replacing it in place.
    pub fn optimize_file(&self, path: &Path) -> crate::Result<()> {
        log::info!(
            "Optimizing `{}` with {} at quality {}",
            path.display(),
            self.program.display(),
            self.quality
        );
        let status = Command::new(self.program)
            .args(self.in_place_arguments(path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|e| self.unavailable(e))?;
        self.check_status(status)?;
        Ok(())
    }

    /// Quantizes an in-memory PNG through the tool's standard streams.
    ///
    /// Returns `png` unchanged when the tool declines to write a result.
    pub fn optimize_bytes(&self, png: &[u8]) -> crate::Result<Vec<u8>> {
        log::info!(
            "Optimizing {} bytes with {} at quality {}",
            png.len(),
            self.program.display(),
            self.quality
        );
        let mut child = Command::new(self.program)
            .args(self.stream_arguments())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e))?;
        // pngquant reads the whole image before producing any output
        let written = child
            .stdin
            .take()
            .map_or(Ok(()), |mut stdin| stdin.write_all(png));
        let output = child.wait_with_output().map_err(|e| self.unavailable(e))?;
        // an early exit breaks the pipe, so the status explains a failed write
        let optimized = self.check_status(output.status)?;
        written.map_err(|e| self.unavailable(e))?;
        if optimized {
            Ok(output.stdout)
        } else {
            Ok(png.to_vec())
        }
    }

    fn quality_range_argument(&self) -> String {
        format!("{}-{}", self.quality, self.quality)
    }

    fn in_place_arguments(&self, path: &Path) -> Vec<OsString> {
        vec![
            "--quality".into(),
            self.quality_range_argument().into(),
            "-f".into(),
            "-o".into(),
            path.into(),
            path.into(),
        ]
    }

    fn stream_arguments(&self) -> Vec<OsString> {
        vec![
            "--quality".into(),
            self.quality_range_argument().into(),
            "-".into(),
        ]
    }

    /// Ok(true) when an optimized image was produced.
    fn check_status(&self, status: ExitStatus) -> crate::Result<bool> {
        match status.code() {
            Some(0) => Ok(true),
            Some(EXIT_CODE_LARGER_THAN_INPUT) | Some(EXIT_CODE_QUALITY_TOO_LOW) => {
                log::warn!(
                    "{} could not reach quality {} ({}), keeping the unoptimized image",
                    self.program.display(),
                    self.quality,
                    status
                );
                Ok(false)
            }
            _ => Err(Error::ExternalToolFailure(
                self.program.display().to_string(),
                status,
            )),
        }
    }

    fn unavailable(&self, error: std::io::Error) -> Error {
        Error::ExternalToolUnavailable(self.program.display().to_string(), error)
    }
}
