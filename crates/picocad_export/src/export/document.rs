use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::export::{palette, texture, transform, uv};
use crate::scene::{Face, MeshObject, Scene, TextureImage};
use glam::{UVec2, Vec2};
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, warn};

const FILE_MAGIC: &str = "picocad";

/// Renders the complete picoCAD project file for `scene`.
pub fn render_document(scene: &Scene, config: &ExportConfig) -> ExportResult<String> {
    let texture = select_texture(scene)?;
    let texture_size = texture
        .map(|t| UVec2::new(t.width(), t.height()))
        .unwrap_or(texture::DEFAULT_TEXTURE_SIZE);

    let mut document = header(scene, config);
    document.push_str("{\n");
    let meshes = scene
        .meshes
        .iter()
        .map(|mesh| mesh_record(mesh, texture_size, config))
        .collect::<ExportResult<Vec<_>>>()?
        .join(",\n");
    if !meshes.is_empty() {
        document.push_str(&meshes);
        document.push('\n');
    }
    document.push_str("}%\n");

    match texture {
        Some(texture) => document.push_str(&texture::encode(texture)?),
        None => document.push_str(&texture::default_texture()),
    }
    Ok(document)
}

// picocad;<name>;<zoom>;<background>;<alpha>
fn header(scene: &Scene, config: &ExportConfig) -> String {
    let name = scene.project_name.replace([';', '\n', '\r'], "_");
    let background = palette::resolve(scene.background);
    debug!("Background {} is palette color {:?}", scene.background, background);
    format!(
        "{FILE_MAGIC};{name};{};{};{}\n",
        config.zoom,
        background.index(),
        config.alpha_color.index()
    )
}

/// picoCAD has a single texture per project: the first textured material wins.
/// Every texture is still size checked so oversized images are never silently dropped.
fn select_texture(scene: &Scene) -> ExportResult<Option<&Arc<TextureImage>>> {
    let mut selected: Option<&Arc<TextureImage>> = None;
    for material in scene.meshes.iter().flat_map(|m| &m.materials) {
        let Some(texture) = &material.texture else { continue };
        texture::check_size(texture)?;
        match selected {
            None => {
                debug!("Using texture '{}' from material '{}'", texture.name, material.name);
                selected = Some(texture);
            }
            Some(first) if !Arc::ptr_eq(first, texture) => {
                warn!(
                    "Material '{}' uses texture '{}', but picoCAD supports only one texture. Using '{}'.",
                    material.name, texture.name, first.name
                );
            }
            Some(_) => {}
        }
    }
    Ok(selected)
}

fn mesh_record(mesh: &MeshObject, texture_size: UVec2, config: &ExportConfig) -> ExportResult<String> {
    let precision = config.vertex_precision;
    let position = transform::object_position(&mesh.transform);
    if !position.is_finite() {
        return Err(non_finite(mesh, "position"));
    }

    let vertices = transform::baked_vertices(mesh)
        .into_iter()
        .map(|v| {
            if !v.is_finite() {
                return Err(non_finite(mesh, "vertex"));
            }
            Ok(format!(
                "  {{{},{},{}}}",
                fmt_number(v.x, precision),
                fmt_number(v.y, precision),
                fmt_number(v.z, precision)
            ))
        })
        .collect::<ExportResult<Vec<_>>>()?;
    let faces = mesh
        .faces
        .iter()
        .map(|face| face_record(mesh, face, texture_size, config))
        .collect::<ExportResult<Vec<_>>>()?;

    Ok(format!(
        "{{\n name='{}', pos={{{},{},{}}}, rot={{0,0,0}},\n v={{\n{} }},\n f={{\n{} }}\n}}",
        escape_name(&mesh.name),
        fmt_number(position.x, precision),
        fmt_number(position.y, precision),
        fmt_number(position.z, precision),
        block(&vertices),
        block(&faces),
    ))
}

fn non_finite(mesh: &MeshObject, what: &'static str) -> ExportError {
    ExportError::NonFiniteCoordinate {
        mesh: mesh.name.clone(),
        what,
    }
}

// {1,2,3, dbl=1, noshade=1, notex=1, prio=1, c=8, uv={...} }
fn face_record(
    mesh: &MeshObject,
    face: &Face,
    texture_size: UVec2,
    config: &ExportConfig,
) -> ExportResult<String> {
    let material = mesh.material(face);
    let indices = face.vertices.iter().map(|i| i + 1).join(",");

    let mut flags = String::new();
    if mesh.is_double_sided(face) {
        flags.push_str("dbl=1, ");
    }
    if material.is_some_and(|m| m.shadeless) {
        flags.push_str("noshade=1, ");
    }
    if material.is_some_and(|m| m.texture.is_none()) {
        flags.push_str("notex=1, ");
    }
    if material.is_some_and(|m| m.priority) {
        flags.push_str("prio=1, ");
    }

    let color = material
        .map(|m| palette::resolve(m.color))
        .unwrap_or(config.fallback_color);

    let uvs = if face.uvs.is_empty() {
        vec![Vec2::ZERO; face.vertices.len()]
    } else {
        face.uvs.iter().map(|&uv| uv::remap(uv, texture_size)).collect()
    };
    if !uvs.iter().all(|uv| uv.is_finite()) {
        return Err(non_finite(mesh, "texture coordinate"));
    }
    let uvs = uvs
        .iter()
        .flat_map(|uv| [uv.x, uv.y])
        .map(|n| fmt_number(n, config.uv_precision))
        .join(",");

    Ok(format!("  {{{indices}, {flags}c={}, uv={{{uvs}}} }}", color.index()))
}

fn block(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join(",\n"))
    }
}

/// Fixed precision without negative zero.
fn fmt_number(value: f32, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_owned(),
        _ => text,
    }
}

fn escape_name(name: &str) -> String {
    name.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
