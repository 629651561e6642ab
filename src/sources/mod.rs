pub mod breeze;
#[cfg(feature = "excel")]
pub mod elvanto;
pub mod servantkeeper;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, ShepherdError};
use crate::package::PackageWriter;
use crate::progress::{CancelToken, PhaseResult, ProgressSink};

/// Everything a connector needs while exporting: the package session,
/// a progress handle, the cancellation token, the per-phase row cap and
/// whether profile photos should be collected.
pub struct ExportContext<'a> {
    pub writer: &'a mut PackageWriter,
    pub progress: ProgressSink,
    pub cancel: CancelToken,
    pub loop_threshold: u64,
    pub include_images: bool,
}

// ---------------------------------------------------------------------------
// Source kinds — enum dispatch instead of trait objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Breeze,
    ServantKeeper,
    #[cfg(feature = "excel")]
    Elvanto,
}

impl SourceKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Breeze => "breeze",
            Self::ServantKeeper => "servantkeeper",
            #[cfg(feature = "excel")]
            Self::Elvanto => "elvanto",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Breeze => "Breeze ChMS",
            Self::ServantKeeper => "Servant Keeper",
            #[cfg(feature = "excel")]
            Self::Elvanto => "Elvanto",
        }
    }

    /// Export files the connector looks for in the input directory.
    pub fn input_files(&self) -> &'static [&'static str] {
        match self {
            Self::Breeze => &["people.csv", "giving.csv", "tags.csv", "attendance.csv"],
            Self::ServantKeeper => &["individuals.csv", "contributions.csv", "notes.csv"],
            #[cfg(feature = "excel")]
            Self::Elvanto => &["people.xlsx"],
        }
    }

    pub fn detect(&self, dir: &Path) -> bool {
        match self {
            Self::Breeze => csv_has_column(&dir.join("people.csv"), "Breeze ID"),
            Self::ServantKeeper => csv_has_column(&dir.join("individuals.csv"), "Ind ID"),
            #[cfg(feature = "excel")]
            Self::Elvanto => dir.join("people.xlsx").is_file(),
        }
    }

    /// Run every export phase for this source. Individual phase failures
    /// are recorded and the next phase still runs (best-effort partial
    /// package); only cancellation aborts the whole export.
    pub fn export(&self, input_dir: &Path, ctx: &mut ExportContext) -> Result<Vec<PhaseResult>> {
        match self {
            Self::Breeze => breeze::export(input_dir, ctx),
            Self::ServantKeeper => servantkeeper::export(input_dir, ctx),
            #[cfg(feature = "excel")]
            Self::Elvanto => elvanto::export(input_dir, ctx),
        }
    }
}

pub const ALL_SOURCES: &[SourceKind] = &[
    SourceKind::Breeze,
    SourceKind::ServantKeeper,
    #[cfg(feature = "excel")]
    SourceKind::Elvanto,
];

pub fn get_by_key(key: &str) -> Option<SourceKind> {
    ALL_SOURCES.iter().find(|s| s.key() == key).copied()
}

pub fn detect_source(dir: &Path) -> Option<SourceKind> {
    ALL_SOURCES.iter().find(|s| s.detect(dir)).copied()
}

fn csv_has_column(path: &Path, column: &str) -> bool {
    let Ok(mut reader) = csv::Reader::from_path(path) else {
        return false;
    };
    reader
        .headers()
        .map(|h| h.iter().any(|c| c.trim().eq_ignore_ascii_case(column)))
        .unwrap_or(false)
}

pub(crate) fn compute_checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Run one phase against one input file, catching everything except
/// cancellation so the remaining phases still get their chance.
pub(crate) fn run_phase<F>(
    results: &mut Vec<PhaseResult>,
    phase: &str,
    file: &Path,
    ctx: &mut ExportContext,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut ExportContext, &mut PhaseResult) -> Result<()>,
{
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    ctx.progress.phase_started(phase);

    if !file.is_file() {
        let message = format!("input file not found: {filename}");
        ctx.progress.phase_failed(phase, &message);
        results.push(PhaseResult::failed(phase, &filename, message));
        return Ok(());
    }
    let checksum = match compute_checksum(file) {
        Ok(c) => c,
        Err(e) => {
            let message = e.to_string();
            ctx.progress.phase_failed(phase, &message);
            results.push(PhaseResult::failed(phase, &filename, message));
            return Ok(());
        }
    };

    run_phase_inner(results, phase, &filename, &checksum, ctx, body)
}

/// Like `run_phase` for inputs that are not a single file (a photo
/// directory, an in-memory accumulator flush) — no checksum, no
/// existence check.
pub(crate) fn run_dir_phase<F>(
    results: &mut Vec<PhaseResult>,
    phase: &str,
    label: &str,
    ctx: &mut ExportContext,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut ExportContext, &mut PhaseResult) -> Result<()>,
{
    ctx.progress.phase_started(phase);
    run_phase_inner(results, phase, label, "", ctx, body)
}

fn run_phase_inner<F>(
    results: &mut Vec<PhaseResult>,
    phase: &str,
    label: &str,
    checksum: &str,
    ctx: &mut ExportContext,
    body: F,
) -> Result<()>
where
    F: FnOnce(&mut ExportContext, &mut PhaseResult) -> Result<()>,
{
    let mut result = PhaseResult::new(phase, label, checksum);
    match body(ctx, &mut result) {
        Ok(()) => {
            ctx.progress
                .phase_finished(phase, result.written, result.skipped);
            results.push(result);
        }
        Err(ShepherdError::Cancelled) => return Err(ShepherdError::Cancelled),
        Err(e) => {
            let message = e.to_string();
            ctx.progress.phase_failed(phase, &message);
            result.failure = Some(message);
            results.push(result);
        }
    }
    Ok(())
}
