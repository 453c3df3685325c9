use crate::scene::{Rgb, TextureImage, Transform};
use crate::source::{project_name_from_path, SceneSource, SourceMaterial, SourcePolygon};
use anyhow::{bail, Context, Result};
use glam::{Mat4, Vec2, Vec3, Vec4};
use image::RgbaImage;
use itertools::Itertools;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// gltf is right-handed, y up. The exporter works in right-handed, z up.
fn gltf_to_z_up(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], -v[2], v[1])
}

// The same rotation as a matrix, columns are the images of the gltf axes.
fn gltf_to_z_up_matrix() -> Mat4 {
    Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, -1.0, 0.0, 0.0),
        Vec4::W,
    )
}

struct GltfMesh {
    name: String,
    transform: Transform,
    vertices: Vec<Vec3>,
    polygons: Vec<SourcePolygon>,

    /// Global gltf material index for each local material slot.
    material_slots: Vec<usize>,
}

/// Scene adapter for glTF 2.0 files. Every node with a mesh becomes one object; all triangle
/// primitives of the mesh are merged into it.
pub struct GltfSource {
    name: Option<String>,
    meshes: Vec<GltfMesh>,
    materials: Vec<SourceMaterial>,
    images: Vec<gltf::image::Data>,
    image_names: Vec<String>,
}

impl GltfSource {
    #[instrument]
    pub fn open(path: &Path) -> Result<Self> {
        info!("Loading glTF scene");
        let now = Instant::now();

        let (document, buffers, images) = gltf::import(path)
            .with_context(|| format!("Failed to load glTF file '{}'", path.display()))?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .context("No scene found")?;

        let mut meshes = Vec::new();
        for node in scene.nodes() {
            collect_meshes(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
        }

        let materials = document.materials().map(|m| read_material(&m)).collect_vec();
        let image_names = document
            .images()
            .map(|image| match image.name() {
                Some(name) => name.to_string(),
                None => format!("image{}", image.index()),
            })
            .collect_vec();

        info!("Load time {:?}", now.elapsed());
        Ok(Self {
            name: project_name_from_path(path),
            meshes,
            materials,
            images,
            image_names,
        })
    }

    fn mesh(&self, mesh: usize) -> Result<&GltfMesh> {
        self.meshes.get(mesh).with_context(|| format!("No mesh with index {mesh}"))
    }
}

fn collect_meshes(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    meshes: &mut Vec<GltfMesh>,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{}", node.index()));
        meshes.push(read_mesh(&name, &mesh, world, buffers)?);
    }
    for child in node.children() {
        collect_meshes(&child, world, buffers, meshes)?;
    }
    Ok(())
}

fn read_mesh(
    name: &str,
    mesh: &gltf::Mesh,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<GltfMesh> {
    debug!("Loading mesh '{name}'");
    let mut vertices = Vec::new();
    let mut polygons = Vec::new();
    let mut material_slots = Vec::new();
    let mut slots_by_material: HashMap<usize, usize> = HashMap::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!("Mesh '{name}' has a {:?} primitive, ignoring.", primitive.mode());
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let Some(positions) = reader.read_positions() else {
            warn!("Mesh '{name}' has a primitive without vertex positions, ignoring.");
            continue;
        };
        let base = vertices.len();
        vertices.extend(positions.map(gltf_to_z_up));
        let count = vertices.len() - base;

        // gltf puts the UV origin top left.
        let uvs = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().map(|[u, v]| Vec2::new(u, 1.0 - v)).collect_vec())
            .unwrap_or_default();
        if uvs.is_empty() {
            debug!("Mesh '{name}' has no texture coordinates.");
        }

        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().map(|i| i as usize).collect_vec(),
            None => (0..count).collect_vec(),
        };

        let material = primitive.material().index().map(|index| {
            *slots_by_material.entry(index).or_insert_with(|| {
                material_slots.push(index);
                material_slots.len() - 1
            })
        });

        for triangle in indices.chunks_exact(3) {
            if let Some(&index) = triangle.iter().find(|&&i| i >= count) {
                bail!("Mesh '{name}' references vertex {index}, but the primitive has {count}");
            }
            polygons.push(SourcePolygon {
                vertices: triangle.iter().map(|i| base + i).collect(),
                uvs: if uvs.len() == count {
                    triangle.iter().map(|&i| uvs[i]).collect()
                } else {
                    Vec::new()
                },
                material,
            });
        }
    }

    let axes = gltf_to_z_up_matrix();
    let (scale, rotation, position) =
        (axes * world * axes.transpose()).to_scale_rotation_translation();
    debug!("Loaded {} vertices, {} faces", vertices.len(), polygons.len());

    Ok(GltfMesh {
        name: name.to_string(),
        transform: Transform {
            position,
            rotation,
            scale,
        },
        vertices,
        polygons,
        material_slots,
    })
}

fn read_material(material: &gltf::Material) -> SourceMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let name = match (material.name(), material.index()) {
        (Some(name), _) => name.to_string(),
        (None, Some(index)) => format!("material{index}"),
        (None, None) => "default".to_string(),
    };
    SourceMaterial {
        name,
        color: Rgb::from_linear([r, g, b]),
        image: pbr.base_color_texture().map(|info| info.texture().source().index()),
        backface_culling: !material.double_sided(),
        shadeless: material.unlit(),
        priority: false,
    }
}

fn to_rgba(data: &gltf::image::Data) -> Result<RgbaImage> {
    use gltf::image::Format;

    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&p| [p, p, p, 255]).collect(),
        other => bail!("Unsupported texture format {other:?}"),
    };
    RgbaImage::from_raw(data.width, data.height, pixels)
        .context("Texture data does not match its dimensions")
}

impl SceneSource for GltfSource {
    fn project_name(&self) -> Option<String> {
        self.name.clone()
    }

    // glTF has no world color.
    fn background_color(&self) -> Option<Rgb> {
        None
    }

    fn mesh_names(&self) -> Vec<String> {
        self.meshes.iter().map(|m| m.name.clone()).collect()
    }

    fn transform(&self, mesh: usize) -> Result<Transform> {
        Ok(self.mesh(mesh)?.transform)
    }

    fn vertices(&self, mesh: usize) -> Result<Vec<Vec3>> {
        Ok(self.mesh(mesh)?.vertices.clone())
    }

    fn faces(&self, mesh: usize) -> Result<Vec<SourcePolygon>> {
        Ok(self.mesh(mesh)?.polygons.clone())
    }

    fn materials(&self, mesh: usize) -> Result<Vec<SourceMaterial>> {
        self.mesh(mesh)?
            .material_slots
            .iter()
            .map(|&index| {
                self.materials
                    .get(index)
                    .cloned()
                    .with_context(|| format!("No material with index {index}"))
            })
            .collect()
    }

    fn image_pixels(&self, image: usize) -> Result<TextureImage> {
        let data = self.images.get(image).with_context(|| format!("No image with index {image}"))?;
        let name = self.image_names.get(image).map_or("image", String::as_str);
        Ok(TextureImage::new(name, to_rgba(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gltf::image::{Data, Format};
    use image::Rgba;

    fn data(format: Format, pixels: Vec<u8>) -> Data {
        Data {
            pixels,
            format,
            width: 2,
            height: 1,
        }
    }

    #[test]
    fn narrow_formats_are_expanded_to_rgba() {
        let rgb = to_rgba(&data(Format::R8G8B8, vec![1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(*rgb.get_pixel(1, 0), Rgba([4, 5, 6, 255]));

        let gray = to_rgba(&data(Format::R8, vec![7, 9])).unwrap();
        assert_eq!(*gray.get_pixel(0, 0), Rgba([7, 7, 7, 255]));

        let gray_alpha = to_rgba(&data(Format::R8G8, vec![7, 100, 9, 200])).unwrap();
        assert_eq!(*gray_alpha.get_pixel(1, 0), Rgba([9, 9, 9, 200]));
    }

    #[test]
    fn wide_formats_are_rejected() {
        let err = to_rgba(&data(Format::R16, vec![0; 4])).unwrap_err();
        assert!(err.to_string().contains("Unsupported texture format"));
    }

    #[test]
    fn short_pixel_data_is_rejected() {
        assert!(to_rgba(&data(Format::R8G8B8A8, vec![0; 4])).is_err());
    }

    #[test]
    fn axes_matrix_matches_point_conversion() {
        let p = [1.0, 2.0, 3.0];
        assert_eq!(gltf_to_z_up_matrix().transform_point3(Vec3::from(p)), gltf_to_z_up(p));
    }
}
