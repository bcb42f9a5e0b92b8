use super::templates::render_routes_rs;
use crate::compiler::compile_file;
use crate::error::CompileError;
use crate::spec::RouteDef;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, info, warn};

/// File name of the compiled route table.
pub const ROUTES_JSON: &str = "routes.json";
/// File name of the generated Rust registration list.
pub const ROUTES_RS: &str = "routes.rs";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitOptions {
    /// Also generate `routes.rs`
    pub rust: bool,
}

/// A rendered output file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub contents: String,
}

/// Render every artifact in memory.
pub fn render_artifacts(
    source: &str,
    routes: &[RouteDef],
    options: EmitOptions,
) -> Result<Vec<Artifact>, CompileError> {
    let mut json = serde_json::to_string_pretty(routes).map_err(|e| CompileError::Emit {
        path: PathBuf::from(ROUTES_JSON),
        message: e.to_string(),
    })?;
    json.push('\n');
    let mut artifacts = vec![Artifact {
        file_name: ROUTES_JSON,
        contents: json,
    }];

    if options.rust {
        let rust = render_routes_rs(source, routes).map_err(|e| CompileError::Emit {
            path: PathBuf::from(ROUTES_RS),
            message: e.to_string(),
        })?;
        artifacts.push(Artifact {
            file_name: ROUTES_RS,
            contents: rust,
        });
    }
    Ok(artifacts)
}

fn emit_error(path: &Path, e: impl ToString) -> CompileError {
    CompileError::Emit {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Write artifacts into `out_dir` atomically.
///
/// Every artifact is first written to a temporary file inside `out_dir`, then
/// each is renamed into place. An artifact being replaced is moved aside first.
/// If any write or rename fails, the temporaries are dropped, artifacts already
/// renamed by this call are removed and the files they replaced are restored.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, CompileError> {
    fs::create_dir_all(out_dir).map_err(|e| emit_error(out_dir, e))?;

    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let mut tmp = NamedTempFile::new_in(out_dir).map_err(|e| emit_error(out_dir, e))?;
        tmp.write_all(artifact.contents.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| emit_error(tmp.path(), e))?;
        staged.push((tmp, out_dir.join(artifact.file_name)));
    }

    let mut written: Vec<(PathBuf, Option<TempPath>)> = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        let result = set_aside(out_dir, &target).and_then(|previous| {
            match tmp.persist(&target) {
                Ok(_) => Ok(previous),
                Err(e) => {
                    if let Some(previous) = &previous {
                        restore(previous, &target);
                    }
                    Err(e.error)
                }
            }
        });
        match result {
            Ok(previous) => {
                debug!(artifact = %target.display(), replaced = previous.is_some(), "Artifact written");
                written.push((target, previous));
            }
            Err(e) => {
                warn!(
                    artifact = %target.display(),
                    error = %e,
                    "Failed to move artifact into place, rolling back"
                );
                for (path, previous) in written.iter().rev() {
                    match previous {
                        Some(previous) => restore(previous, path),
                        None => {
                            if let Err(remove_err) = fs::remove_file(path) {
                                warn!(artifact = %path.display(), error = %remove_err, "Rollback failed");
                            }
                        }
                    }
                }
                return Err(emit_error(&target, e));
            }
        }
    }
    // Dropping the set-aside paths deletes the replaced artifacts.
    Ok(written.into_iter().map(|(path, _)| path).collect())
}

/// Move an existing regular file at `target` to a temporary path in `out_dir`.
fn set_aside(out_dir: &Path, target: &Path) -> std::io::Result<Option<TempPath>> {
    if !target.is_file() {
        return Ok(None);
    }
    let aside = tempfile::Builder::new()
        .prefix(".rpcgate-previous-")
        .tempfile_in(out_dir)?
        .into_temp_path();
    fs::rename(target, &aside)?;
    Ok(Some(aside))
}

fn restore(previous: &TempPath, target: &Path) {
    if let Err(e) = fs::rename(previous, target) {
        warn!(artifact = %target.display(), error = %e, "Failed to restore previous artifact");
    }
}

/// Compile a manifest and write its artifacts. Nothing is written on failure.
pub fn compile_to_dir(
    manifest: &Path,
    out_dir: &Path,
    options: EmitOptions,
) -> Result<Vec<PathBuf>, CompileError> {
    let routes = compile_file(manifest)?;
    let source = manifest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let artifacts = render_artifacts(&source, &routes, options)?;
    let written = write_artifacts(out_dir, &artifacts)?;
    info!(
        manifest = %manifest.display(),
        out_dir = %out_dir.display(),
        routes_count = routes.len(),
        artifacts = written.len(),
        "Route artifacts written"
    );
    Ok(written)
}
