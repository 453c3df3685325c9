//! Exports 3D scenes to picoCAD project files.
//!
//! A host scene is read through a [`source::SceneSource`] adapter into a [`scene::Scene`],
//! which [`export::export_scene`] turns into a single picoCAD text file.

pub mod config;
pub mod error;
pub mod export;
pub mod scene;
pub mod source;

pub use config::ExportConfig;
pub use error::{ExportError, ExportResult};
pub use export::export_scene;
pub use scene::Scene;
