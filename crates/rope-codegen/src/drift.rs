//! Artifact generation and drift detection.
//!
//! [`generate`] runs the front end and every emitter, producing the artifacts
//! in memory; nothing touches the disk until the whole registry has parsed.
//! [`verify`] regenerates and compares against the committed files.

use std::io::Write;
use std::path::{Path, PathBuf};

use rope_types::{Result, RopeError};
use tempfile::NamedTempFile;

use crate::emit::default_emitters;
use crate::frontend::parse_registry;

/// Where the registry and its artifacts live inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub const REGISTRY: &'static str = "crates/rope-pipeline/src/ops/kind.rs";
    pub const NATIVE: &'static str = "crates/rope-pipeline/src/ops/generated.rs";
    pub const STUBS: &'static str = "crates/rope-pipeline/stubs/ops.pyi";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from `start` to the first directory holding the registry.
    pub fn discover(start: &Path) -> Option<Self> {
        start
            .ancestors()
            .find(|dir| dir.join(Self::REGISTRY).is_file())
            .map(Self::new)
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.resolve(Self::REGISTRY)
    }
}

/// One rendered artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Emitter name (`native`, `stubs`).
    pub name: &'static str,
    pub relative: &'static str,
    pub path: PathBuf,
    pub contents: String,
}

/// Parse the registry at `layout` and render every artifact.
pub fn generate(layout: &Layout) -> Result<Vec<Artifact>> {
    let path = layout.registry_path();
    let source = std::fs::read_to_string(&path).map_err(|e| {
        RopeError::Other(format!("cannot read registry {}: {e}", path.display()))
    })?;
    generate_from_source(&source, layout)
}

/// Render every artifact from registry source text.
pub fn generate_from_source(source: &str, layout: &Layout) -> Result<Vec<Artifact>> {
    let registry = parse_registry(source)?;
    Ok(default_emitters()
        .iter()
        .map(|emitter| Artifact {
            name: emitter.name(),
            relative: emitter.relative_path(),
            path: layout.resolve(emitter.relative_path()),
            contents: emitter.emit(&registry),
        })
        .collect())
}

/// Write rendered artifacts to disk, creating parent directories.
///
/// Every artifact is first staged in a temporary file beside its target; the
/// targets are only replaced once all of them have been staged, so a failed
/// write leaves the committed artifacts as they were.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let dir = match artifact.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(artifact.contents.as_bytes())?;
        // Temp files are created private; keep the mode of the file we replace.
        if let Ok(existing) = std::fs::metadata(&artifact.path) {
            file.as_file().set_permissions(existing.permissions())?;
        }
        staged.push((artifact, file));
    }

    for (artifact, file) in staged {
        file.persist(&artifact.path).map_err(|e| e.error)?;
        tracing::info!(
            artifact = artifact.name,
            path = %artifact.path.display(),
            "Artifact written"
        );
    }
    Ok(())
}

/// Compare a rendered artifact with what is on disk.
///
/// `on_disk` is `None` when the file does not exist. The returned
/// [`RopeError::Drift`] points at the first differing line.
pub fn check_drift(artifact: &Artifact, on_disk: Option<&str>) -> Result<()> {
    let Some(found) = on_disk else {
        return Err(RopeError::Drift {
            artifact: artifact.relative.to_string(),
            line: 1,
            expected: artifact.contents.lines().next().map(str::to_string),
            found: None,
        });
    };
    if found == artifact.contents {
        return Ok(());
    }

    let mut expected_lines = artifact.contents.split('\n');
    let mut found_lines = found.split('\n');
    let mut line = 1;
    loop {
        match (expected_lines.next(), found_lines.next()) {
            (Some(e), Some(f)) if e == f => line += 1,
            (None, None) => break,
            (expected, found) => {
                return Err(RopeError::Drift {
                    artifact: artifact.relative.to_string(),
                    line,
                    expected: expected.map(str::to_string),
                    found: found.map(str::to_string),
                })
            }
        }
    }
    Ok(())
}

/// Regenerate and collect one drift error per out-of-date artifact.
pub fn find_drift(layout: &Layout) -> Result<Vec<RopeError>> {
    let mut drifted = Vec::new();
    for artifact in generate(layout)? {
        let on_disk = match std::fs::read_to_string(&artifact.path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if let Err(drift) = check_drift(&artifact, on_disk.as_deref()) {
            tracing::warn!(artifact = artifact.relative, "{drift}");
            drifted.push(drift);
        }
    }
    Ok(drifted)
}

/// Fail with the first drift, if any.
pub fn verify(layout: &Layout) -> Result<()> {
    match find_drift(layout)?.into_iter().next() {
        Some(drift) => Err(drift),
        None => Ok(()),
    }
}
