use crate::scene::{Rgb, TextureImage, Transform};
use crate::source::{project_name_from_path, SceneSource, SourceMaterial, SourcePolygon};
use anyhow::{Context, Result};
use dunce::canonicalize;
use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Deserialize)]
struct MaterialDesc {
    name: String,
    color: [u8; 3],

    /// Image file, relative to the scene file.
    #[serde(default)]
    texture: Option<String>,

    #[serde(default)]
    backface_culling: bool,

    #[serde(default)]
    shadeless: bool,

    #[serde(default)]
    priority: bool,
}

#[derive(Debug, Deserialize)]
struct FaceDesc {
    vertices: Vec<usize>,

    #[serde(default)]
    uvs: Vec<[f32; 2]>,

    /// Index into the object's material slots.
    #[serde(default)]
    material: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ObjectDesc {
    name: String,

    #[serde(default)]
    position: [f32; 3],

    /// Euler angles in degrees, applied in XYZ order.
    #[serde(default)]
    rotation: [f32; 3],

    #[serde(default = "unit_scale")]
    scale: [f32; 3],

    vertices: Vec<[f32; 3]>,

    /// Names of scene materials.
    #[serde(default)]
    materials: Vec<String>,

    faces: Vec<FaceDesc>,
}

#[derive(Debug, Deserialize)]
struct SceneDesc {
    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    background: Option<[u8; 3]>,

    #[serde(default)]
    materials: Vec<MaterialDesc>,

    objects: Vec<ObjectDesc>,
}

/// Scene adapter for RON scene descriptions, for hosts that dump their scene as data.
/// Coordinates follow the host convention: right-handed, Z up, UV origin bottom left.
#[derive(Debug)]
pub struct SceneFile {
    desc: SceneDesc,
    path: PathBuf,
}

impl SceneFile {
    #[instrument]
    pub fn open(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file '{}'", path.display()))?;
        let mut scene = Self::parse(&content)
            .with_context(|| format!("Failed to parse scene file '{}'", path.display()))?;
        scene.path = path.to_path_buf();
        info!("Loaded {} objects", scene.desc.objects.len());
        Ok(scene)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            desc: ron::de::from_str(content)?,
            path: PathBuf::new(),
        })
    }

    fn object(&self, mesh: usize) -> Result<&ObjectDesc> {
        self.desc.objects.get(mesh).with_context(|| format!("No object with index {mesh}"))
    }

    fn material_index(&self, name: &str) -> Result<usize> {
        self.desc
            .materials
            .iter()
            .position(|m| m.name == name)
            .with_context(|| format!("Material '{name}' not found"))
    }

    fn texture_path(&self, file_name: &str) -> Result<PathBuf> {
        let directory = self.path.parent().unwrap_or(Path::new(""));
        let path = directory.join(file_name);
        canonicalize(&path).with_context(|| format!("Texture '{}' not found", path.display()))
    }
}

impl SceneSource for SceneFile {
    fn project_name(&self) -> Option<String> {
        self.desc.name.clone().or_else(|| project_name_from_path(&self.path))
    }

    fn background_color(&self) -> Option<Rgb> {
        self.desc.background.map(Rgb::from)
    }

    fn mesh_names(&self) -> Vec<String> {
        self.desc.objects.iter().map(|o| o.name.clone()).collect()
    }

    fn transform(&self, mesh: usize) -> Result<Transform> {
        let object = self.object(mesh)?;
        let [x, y, z] = object.rotation.map(f32::to_radians);
        Ok(Transform {
            position: Vec3::from(object.position),
            rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
            scale: Vec3::from(object.scale),
        })
    }

    fn vertices(&self, mesh: usize) -> Result<Vec<Vec3>> {
        Ok(self.object(mesh)?.vertices.iter().copied().map(Vec3::from).collect())
    }

    fn faces(&self, mesh: usize) -> Result<Vec<SourcePolygon>> {
        Ok(self
            .object(mesh)?
            .faces
            .iter()
            .map(|face| SourcePolygon {
                vertices: face.vertices.clone(),
                uvs: face.uvs.iter().copied().map(Vec2::from).collect(),
                material: face.material,
            })
            .collect())
    }

    /// Image ids are indices of scene materials.
    fn materials(&self, mesh: usize) -> Result<Vec<SourceMaterial>> {
        self.object(mesh)?
            .materials
            .iter()
            .map(|name| {
                let index = self.material_index(name)?;
                let material = &self.desc.materials[index];
                Ok(SourceMaterial {
                    name: material.name.clone(),
                    color: Rgb::from(material.color),
                    image: material.texture.as_ref().map(|_| index),
                    backface_culling: material.backface_culling,
                    shadeless: material.shadeless,
                    priority: material.priority,
                })
            })
            .collect()
    }

    fn image_pixels(&self, material_index: usize) -> Result<TextureImage> {
        let material = self
            .desc
            .materials
            .get(material_index)
            .with_context(|| format!("No material with index {material_index}"))?;
        let file_name = material
            .texture
            .as_deref()
            .with_context(|| format!("Material '{}' has no texture", material.name))?;
        let path = self.texture_path(file_name)?;
        debug!("Loading texture {:?}", path);
        let pixels = image::open(&path)
            .with_context(|| format!("Failed to decode texture '{}'", path.display()))?
            .to_rgba8();
        Ok(TextureImage::new(file_name, pixels))
    }
}
