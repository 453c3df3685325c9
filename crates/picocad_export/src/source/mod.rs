mod gltf_source;
mod scene_file;

pub use gltf_source::GltfSource;
pub use scene_file::SceneFile;

use crate::config::ExportConfig;
use crate::scene::{Material, MeshObject, Rgb, Scene, TextureImage, Transform};
use anyhow::{bail, Context, Result};
use glam::{Vec2, Vec3};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A polygon as the host stores it. Indices refer to the mesh's vertex list.
#[derive(Debug, Clone, Default)]
pub struct SourcePolygon {
    pub vertices: Vec<usize>,
    pub uvs: Vec<Vec2>,
    pub material: Option<usize>,
}

/// A material slot as the host stores it. `image` is an id for `SceneSource::image_pixels`.
#[derive(Debug, Clone)]
pub struct SourceMaterial {
    pub name: String,
    pub color: Rgb,
    pub image: Option<usize>,
    pub backface_culling: bool,
    pub shadeless: bool,
    pub priority: bool,
}

/// What the exporter needs to know about a host scene. Meshes are addressed by their
/// position in `mesh_names`.
pub trait SceneSource {
    fn project_name(&self) -> Option<String>;

    /// World color, if the host has one.
    fn background_color(&self) -> Option<Rgb>;

    fn mesh_names(&self) -> Vec<String>;

    fn transform(&self, mesh: usize) -> Result<Transform>;

    /// Vertex positions in object space.
    fn vertices(&self, mesh: usize) -> Result<Vec<Vec3>>;

    fn faces(&self, mesh: usize) -> Result<Vec<SourcePolygon>>;

    fn materials(&self, mesh: usize) -> Result<Vec<SourceMaterial>>;

    fn image_pixels(&self, image: usize) -> Result<TextureImage>;
}

/// Reads a whole scene through the adapter. Images shared by several materials are loaded once.
#[instrument(skip_all)]
pub fn load_scene(source: &dyn SceneSource, config: &ExportConfig) -> Result<Scene> {
    let background = source.background_color().unwrap_or_else(|| config.background());
    let mut scene = Scene::new(source.project_name().as_deref(), background);
    let mut images: HashMap<usize, Arc<TextureImage>> = HashMap::new();

    for (index, name) in source.mesh_names().into_iter().enumerate() {
        debug!("Reading mesh '{name}'");
        let transform = source.transform(index)?;
        let vertices = source.vertices(index)?;
        let mut mesh = MeshObject::new(&name, transform, vertices);

        for slot in source.materials(index)? {
            let texture = match slot.image {
                Some(image) => Some(match images.get(&image) {
                    Some(texture) => texture.clone(),
                    None => {
                        let texture = Arc::new(
                            source
                                .image_pixels(image)
                                .with_context(|| format!("Failed to read texture of material '{}'", slot.name))?,
                        );
                        images.insert(image, texture.clone());
                        texture
                    }
                }),
                None => None,
            };
            mesh.materials.push(Material {
                name: slot.name,
                color: slot.color,
                texture,
                backface_culling: slot.backface_culling,
                shadeless: slot.shadeless,
                priority: slot.priority,
            });
        }

        for polygon in source.faces(index)? {
            mesh.push_polygon(&polygon.vertices, &polygon.uvs, polygon.material)?;
        }
        scene.meshes.push(mesh);
    }

    info!(
        "Read {} meshes with {} faces from '{}'",
        scene.meshes.len(),
        scene.face_count(),
        scene.project_name
    );
    Ok(scene)
}

/// Opens a scene file, picking the adapter by extension.
pub fn open_scene(path: &Path, config: &ExportConfig) -> Result<Scene> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "gltf" | "glb" => load_scene(&GltfSource::open(path)?, config),
        "ron" => load_scene(&SceneFile::open(path)?, config),
        _ => bail!("Unsupported scene file '{}', expected .gltf, .glb or .ron", path.display()),
    }
}

/// The project name picoCAD shows: the file name without extension.
pub fn project_name_from_path(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::cell::Cell;

    /// In-memory host: one quad and one pentagon sharing a textured material.
    struct TestHost {
        image_reads: Cell<usize>,
    }

    impl SceneSource for TestHost {
        fn project_name(&self) -> Option<String> {
            Some("host".to_string())
        }

        fn background_color(&self) -> Option<Rgb> {
            None
        }

        fn mesh_names(&self) -> Vec<String> {
            vec!["quad".to_string(), "pentagon".to_string()]
        }

        fn transform(&self, _mesh: usize) -> Result<Transform> {
            Ok(Transform::default())
        }

        fn vertices(&self, mesh: usize) -> Result<Vec<Vec3>> {
            Ok((0..4 + mesh).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect())
        }

        fn faces(&self, mesh: usize) -> Result<Vec<SourcePolygon>> {
            Ok(vec![SourcePolygon {
                vertices: (0..4 + mesh).collect(),
                uvs: Vec::new(),
                material: Some(0),
            }])
        }

        fn materials(&self, _mesh: usize) -> Result<Vec<SourceMaterial>> {
            Ok(vec![SourceMaterial {
                name: "checker".to_string(),
                color: Rgb::new(255, 255, 255),
                image: Some(7),
                backface_culling: true,
                shadeless: false,
                priority: false,
            }])
        }

        fn image_pixels(&self, image: usize) -> Result<TextureImage> {
            assert_eq!(image, 7);
            self.image_reads.set(self.image_reads.get() + 1);
            Ok(TextureImage::new("checker", RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]))))
        }
    }

    #[test]
    fn scene_is_assembled_through_the_adapter() {
        let host = TestHost {
            image_reads: Cell::new(0),
        };
        let mut config = ExportConfig::default();
        config.background = [255, 0, 77];
        let scene = load_scene(&host, &config).unwrap();

        assert_eq!(scene.project_name, "host");
        assert_eq!(scene.background, Rgb::new(255, 0, 77));
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.meshes[0].faces.len(), 1);
        assert_eq!(scene.meshes[1].faces.len(), 3);
        assert_eq!(host.image_reads.get(), 1);

        let first = scene.meshes[0].materials[0].texture.as_ref().unwrap();
        let second = scene.meshes[1].materials[0].texture.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        let err = open_scene(Path::new("model.obj"), &ExportConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported scene file"));
    }

    #[test]
    fn project_name_is_the_file_stem() {
        assert_eq!(project_name_from_path(Path::new("dir/castle.blend")).as_deref(), Some("castle"));
    }
}
