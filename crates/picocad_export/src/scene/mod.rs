mod material;
mod mesh;

pub use material::{Material, Rgb, TextureImage};
pub use mesh::{Face, MeshObject, MAX_FACE_CORNERS};

use glam::{Quat, Vec3};

/// Used when the source has no file name.
pub const DEFAULT_PROJECT_NAME: &str = "untitled";

/// Object transform in host space: right-handed, Z up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Everything one export writes. Built once from a scene source and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Scene {
    pub project_name: String,
    pub background: Rgb,
    pub meshes: Vec<MeshObject>,
}

impl Scene {
    pub fn new(project_name: Option<&str>, background: Rgb) -> Self {
        let project_name = project_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROJECT_NAME);
        Self {
            project_name: project_name.to_owned(),
            background,
            meshes: Vec::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_names_fall_back_to_untitled() {
        assert_eq!(Scene::new(None, Rgb::default()).project_name, "untitled");
        assert_eq!(Scene::new(Some("  "), Rgb::default()).project_name, "untitled");
        assert_eq!(Scene::new(Some("castle"), Rgb::default()).project_name, "castle");
    }
}
