use crate::error::{ExportError, ExportResult};
use crate::scene::{Material, Transform};
use glam::{Vec2, Vec3};

/// Largest polygon picoCAD stores as a single face.
pub const MAX_FACE_CORNERS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Indices into the owning mesh's vertex list, in winding order.
    pub vertices: Vec<usize>,

    /// One UV per corner, or empty if the mesh has no UV layer.
    pub uvs: Vec<Vec2>,

    /// Index into the owning mesh's material list.
    pub material: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MeshObject {
    pub name: String,
    pub transform: Transform,
    pub vertices: Vec<Vec3>,
    pub materials: Vec<Material>,
    pub faces: Vec<Face>,
}

impl MeshObject {
    pub fn new(name: &str, transform: Transform, vertices: Vec<Vec3>) -> Self {
        Self {
            name: name.to_owned(),
            transform,
            vertices,
            materials: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Adds a polygon. Triangles and quads are kept as they are, larger polygons are split
    /// into a triangle fan around the first corner.
    pub fn push_polygon(
        &mut self,
        vertices: &[usize],
        uvs: &[Vec2],
        material: Option<usize>,
    ) -> ExportResult<()> {
        self.validate_polygon(vertices, uvs, material)?;

        if vertices.len() <= MAX_FACE_CORNERS {
            self.faces.push(Face {
                vertices: vertices.to_vec(),
                uvs: uvs.to_vec(),
                material,
            });
            return Ok(());
        }

        for i in 1..vertices.len() - 1 {
            let corners = [0, i, i + 1];
            self.faces.push(Face {
                vertices: corners.iter().map(|&c| vertices[c]).collect(),
                uvs: if uvs.is_empty() {
                    Vec::new()
                } else {
                    corners.iter().map(|&c| uvs[c]).collect()
                },
                material,
            });
        }
        Ok(())
    }

    fn validate_polygon(
        &self,
        vertices: &[usize],
        uvs: &[Vec2],
        material: Option<usize>,
    ) -> ExportResult<()> {
        if vertices.len() < 3 {
            return Err(ExportError::DegenerateFace {
                mesh: self.name.clone(),
                corners: vertices.len(),
            });
        }
        if let Some(&index) = vertices.iter().find(|&&i| i >= self.vertices.len()) {
            return Err(ExportError::InvalidVertexIndex {
                mesh: self.name.clone(),
                index,
                count: self.vertices.len(),
            });
        }
        if !uvs.is_empty() && uvs.len() != vertices.len() {
            return Err(ExportError::UvCountMismatch {
                mesh: self.name.clone(),
                uvs: uvs.len(),
                corners: vertices.len(),
            });
        }
        if let Some(index) = material.filter(|&m| m >= self.materials.len()) {
            return Err(ExportError::MaterialIndexOutOfRange {
                mesh: self.name.clone(),
                index,
                count: self.materials.len(),
            });
        }
        Ok(())
    }

    pub fn material(&self, face: &Face) -> Option<&Material> {
        face.material.and_then(|m| self.materials.get(m))
    }

    /// Faces without a material are double sided.
    pub fn is_double_sided(&self, face: &Face) -> bool {
        self.material(face).map_or(true, Material::is_double_sided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Rgb;

    fn pentagon() -> MeshObject {
        let vertices = (0..5)
            .map(|i| {
                let a = i as f32 * std::f32::consts::TAU / 5.0;
                Vec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        MeshObject::new("pentagon", Transform::default(), vertices)
    }

    #[test]
    fn quads_are_kept() {
        let mut mesh = pentagon();
        mesh.push_polygon(&[0, 1, 2, 3], &[], None).unwrap();
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].vertices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn large_polygons_become_triangle_fans() {
        let mut mesh = pentagon();
        let uvs = (0..5).map(|i| Vec2::new(i as f32, 0.0)).collect::<Vec<_>>();
        mesh.push_polygon(&[0, 1, 2, 3, 4], &uvs, None).unwrap();

        assert_eq!(mesh.faces.len(), 3);
        assert_eq!(mesh.faces[0].vertices, vec![0, 1, 2]);
        assert_eq!(mesh.faces[1].vertices, vec![0, 2, 3]);
        assert_eq!(mesh.faces[2].vertices, vec![0, 3, 4]);
        assert_eq!(mesh.faces[2].uvs, vec![uvs[0], uvs[3], uvs[4]]);
    }

    #[test]
    fn lines_are_rejected() {
        let mut mesh = pentagon();
        let err = mesh.push_polygon(&[0, 1], &[], None).unwrap_err();
        assert!(matches!(err, ExportError::DegenerateFace { corners: 2, .. }));
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn zero_area_faces_pass_through() {
        let mut mesh = pentagon();
        mesh.push_polygon(&[1, 1, 1], &[], None).unwrap();
        assert_eq!(mesh.faces.len(), 1);
    }

    #[test]
    fn out_of_range_references_are_rejected() {
        let mut mesh = pentagon();
        assert!(matches!(
            mesh.push_polygon(&[0, 1, 5], &[], None),
            Err(ExportError::InvalidVertexIndex { index: 5, count: 5, .. })
        ));
        assert!(matches!(
            mesh.push_polygon(&[0, 1, 2], &[Vec2::ZERO], None),
            Err(ExportError::UvCountMismatch { uvs: 1, corners: 3, .. })
        ));
        assert!(matches!(
            mesh.push_polygon(&[0, 1, 2], &[], Some(0)),
            Err(ExportError::MaterialIndexOutOfRange { index: 0, count: 0, .. })
        ));
    }

    #[test]
    fn sidedness_follows_backface_culling() {
        let mut mesh = pentagon();
        let mut culled = Material::new("culled", Rgb::new(255, 0, 0));
        culled.backface_culling = true;
        mesh.materials.push(culled);
        mesh.materials.push(Material::new("open", Rgb::new(0, 0, 255)));
        mesh.push_polygon(&[0, 1, 2], &[], Some(0)).unwrap();
        mesh.push_polygon(&[0, 2, 3], &[], Some(1)).unwrap();
        mesh.push_polygon(&[0, 3, 4], &[], None).unwrap();

        let sides = mesh.faces.iter().map(|f| mesh.is_double_sided(f)).collect::<Vec<_>>();
        assert_eq!(sides, vec![false, true, true]);
    }
}
