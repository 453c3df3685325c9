use glam::{UVec2, Vec2};

/// picoCAD measures texture coordinates in blocks of 8 texels.
pub const TEXELS_PER_UV_UNIT: f32 = 8.0;

/// Converts a host UV (origin bottom-left, 0..1) to picoCAD units (origin top-left).
pub fn remap(uv: Vec2, texture_size: UVec2) -> Vec2 {
    let size = texture_size.as_vec2();
    Vec2::new(uv.x * size.x, (1.0 - uv.y) * size.y) / TEXELS_PER_UV_UNIT
}
