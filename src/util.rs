use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

#[derive(Debug, Default)]
pub struct CleanSummary {
    pub files: usize,
    pub failures: Vec<(PathBuf, String)>,
}

impl CleanSummary {
    pub fn into_result(self) -> Result<()> {
        info!(files = self.files, failed = self.failures.len(), "processed input files");
        if !self.failures.is_empty() {
            bail!("{} of {} input files failed", self.failures.len(), self.files);
        }
        Ok(())
    }
}

/// Runs `clean` over every input in order and writes each result to stdout.
///
/// A file that cannot be read or cleaned is logged and skipped so the
/// remaining inputs are still processed; failures are collected in the
/// returned summary.
pub fn clean_each_file<F>(paths: &[PathBuf], mut clean: F) -> Result<CleanSummary>
where
    F: FnMut(&Path, String) -> Result<String>,
{
    let stdout = io::stdout();
    let mut summary = CleanSummary {
        files: paths.len(),
        ..CleanSummary::default()
    };

    for path in paths {
        let cleaned = read_text_file(path).and_then(|text| clean(path, text));
        match cleaned {
            Ok(text) => {
                let mut out = stdout.lock();
                out.write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .context("failed to write cleaned text to stdout")?;
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(path = %path.display(), error = %reason, "skipping file");
                summary.failures.push((path.clone(), reason));
            }
        }
    }

    Ok(summary)
}
