use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an export attempt. No output file is left behind when one is returned.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Texture '{name}' is {width}x{height}, picoCAD textures must be at most {max}x{max}")]
    TextureTooLarge {
        name: String,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("Face of mesh '{mesh}' has {corners} vertices, at least 3 are required")]
    DegenerateFace { mesh: String, corners: usize },

    #[error("Face of mesh '{mesh}' references vertex {index}, but the mesh has {count} vertices")]
    InvalidVertexIndex {
        mesh: String,
        index: usize,
        count: usize,
    },

    #[error("Face of mesh '{mesh}' has {uvs} UV coordinates for {corners} vertices")]
    UvCountMismatch {
        mesh: String,
        uvs: usize,
        corners: usize,
    },

    #[error("Face of mesh '{mesh}' references material {index}, but the mesh has {count} materials")]
    MaterialIndexOutOfRange {
        mesh: String,
        index: usize,
        count: usize,
    },

    #[error("Mesh '{mesh}' has a non-finite {what}")]
    NonFiniteCoordinate { mesh: String, what: &'static str },

    #[error("Failed to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
