//! # Batch Processing
//!
//! Drives the single-image pipeline over every image file in a directory and
//! records one [`BatchEntry`] per file. A failing file is logged and recorded,
//! never fatal: only an unusable input or output directory aborts the batch.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use imgpre_scale::Size;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::Preprocessor;

/// File extensions picked up by batch mode (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Outcome for one file, serialized as
/// `{"status":"ok","size":[w,h]}` or `{"status":"error","error":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchEntry {
    Ok { size: (u32, u32) },
    Error { error: String },
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        matches!(self, BatchEntry::Ok { .. })
    }

    pub fn size(&self) -> Option<Size> {
        match self {
            BatchEntry::Ok { size: (w, h) } => Some(Size::new(*w, *h)),
            BatchEntry::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BatchEntry::Ok { .. } => None,
            BatchEntry::Error { error } => Some(error),
        }
    }
}

/// File name → outcome, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchReport {
    entries: BTreeMap<String, BatchEntry>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, file_name: &str) -> Option<&BatchEntry> {
        self.entries.get(file_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BatchEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn succeeded(&self) -> usize {
        self.entries.values().filter(|e| e.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// `(file name, error description)` for every failed file.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(|(name, e)| e.error().map(|err| (name, err)))
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Report key for `file_name`: the name itself when it is UTF-8, its
    /// escaped form otherwise, with a `#n` suffix if that key is already taken.
    fn unique_key(&self, file_name: &OsStr) -> String {
        let base = match file_name.to_str() {
            Some(name) => name.to_owned(),
            None => format!("{file_name:?}").trim_matches('"').to_owned(),
        };
        if !self.entries.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|key| !self.entries.contains_key(key))
            .unwrap_or(base)
    }

    fn record(&mut self, key: String, entry: BatchEntry) {
        self.entries.insert(key, entry);
    }
}

/// Image files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PipelineError::io(dir, e))? {
        let path = entry.map_err(|e| PipelineError::io(dir, e))?.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

impl Preprocessor {
    /// Process every image in `input_dir`, writing results under the same
    /// file names into `output_dir` (created if missing).
    pub fn process_batch(&mut self, input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> PipelineResult<BatchReport> {
        let (input_dir, output_dir) = (input_dir.as_ref(), output_dir.as_ref());
        let files = list_images(input_dir)?;
        fs::create_dir_all(output_dir).map_err(|e| PipelineError::io(output_dir, e))?;
        info!(input = %input_dir.display(), output = %output_dir.display(), files = files.len(), "starting batch");

        let mut report = BatchReport::default();
        for path in files {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let name = report.unique_key(file_name);
            let entry = match self.process_image(&path, output_dir.join(file_name)) {
                Ok(done) => BatchEntry::Ok {
                    size: (done.size.w, done.size.h),
                },
                Err(e) => {
                    warn!(file = %name, stage = e.stage(), error = %e, "failed to process file");
                    BatchEntry::Error { error: e.to_string() }
                }
            };
            report.record(name, entry);
        }

        if report.failed() > 0 {
            warn!(
                "Batch completed with {} failed files out of {}",
                report.failed(),
                report.len()
            );
        } else {
            info!("Batch completed successfully: {} files processed", report.len());
        }
        Ok(report)
    }
}
