pub mod document;
pub mod palette;
pub mod texture;
pub mod transform;
pub mod uv;

use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::scene::Scene;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, info, instrument};

/// Writes `scene` as a picoCAD project to `destination`.
///
/// The document is rendered completely before anything touches the disk, then written to a
/// temporary file next to the destination and renamed over it. A failed export leaves no file.
#[instrument(skip(scene, config), fields(project = %scene.project_name))]
pub fn export_scene(scene: &Scene, destination: &Path, config: &ExportConfig) -> ExportResult<()> {
    let now = Instant::now();
    let document = document::render_document(scene, config)?;
    write_atomically(destination, document.as_bytes())?;
    info!(
        "Exported {} meshes, {} faces to '{}' in {:?}",
        scene.meshes.len(),
        scene.face_count(),
        destination.display(),
        now.elapsed()
    );
    Ok(())
}

fn write_atomically(path: &Path, contents: &[u8]) -> ExportResult<()> {
    let io_error = |source: io::Error| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut file = create_temp_file(path, &directory).map_err(io_error)?;
    file.write_all(contents).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

// Temporary files are owner-only. A replaced file keeps its mode, a new one gets the mode a
// plain write would give it.
fn create_temp_file(path: &Path, directory: &Path) -> io::Result<NamedTempFile> {
    match fs::metadata(path) {
        Ok(existing) => {
            debug!("Replacing '{}'", path.display());
            let file = NamedTempFile::new_in(directory)?;
            file.as_file().set_permissions(existing.permissions())?;
            Ok(file)
        }
        Err(_) => new_file_builder().tempfile_in(directory),
    }
}

#[cfg(unix)]
fn new_file_builder() -> Builder<'static, 'static> {
    use std::os::unix::fs::PermissionsExt;

    let mut builder = Builder::new();
    // Subject to the umask, like `File::create`.
    builder.permissions(fs::Permissions::from_mode(0o666));
    builder
}

#[cfg(not(unix))]
fn new_file_builder() -> Builder<'static, 'static> {
    Builder::new()
}
