use crate::scene::{MeshObject, Transform};
use glam::Vec3;

// The host is right-handed and Z up, picoCAD is Y down. This is a rotation around X, so
// handedness and winding are preserved.
pub fn to_picocad_axes(v: Vec3) -> Vec3 {
    Vec3::new(v.x, -v.z, v.y)
}

/// picoCAD has no object rotation or scale, so both are baked into the vertices.
/// The translation stays on the object.
pub fn bake_vertex(transform: &Transform, v: Vec3) -> Vec3 {
    to_picocad_axes(transform.rotation * (v * transform.scale))
}

pub fn baked_vertices(mesh: &MeshObject) -> Vec<Vec3> {
    mesh.vertices.iter().map(|&v| bake_vertex(&mesh.transform, v)).collect()
}

pub fn object_position(transform: &Transform) -> Vec3 {
    to_picocad_axes(transform.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-5), "{a} != {b}");
    }

    #[test]
    fn up_maps_to_negative_y() {
        assert_eq!(to_picocad_axes(Vec3::Z), -Vec3::Y);
        assert_eq!(to_picocad_axes(Vec3::X), Vec3::X);
        assert_eq!(to_picocad_axes(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn identity_only_remaps_axes() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(bake_vertex(&Transform::default(), v), Vec3::new(1.0, -3.0, 2.0));
    }

    #[test]
    fn scale_is_applied_before_rotation() {
        let transform = Transform {
            position: Vec3::new(5.0, 5.0, 5.0),
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        // Scaled to (2,0,0), then rotated onto +Y, which picoCAD calls +Z.
        assert_close(bake_vertex(&transform, Vec3::X), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn translation_is_kept_on_the_object() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        assert_eq!(bake_vertex(&transform, Vec3::ZERO), Vec3::ZERO);
        assert_eq!(object_position(&transform), Vec3::new(1.0, -3.0, 2.0));
    }
}
