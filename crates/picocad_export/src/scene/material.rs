use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts a linear float color, as stored by most 3D applications, to sRGB.
    pub fn from_linear(color: [f32; 3]) -> Self {
        let encode = |c: f32| {
            let c = c.clamp(0.0, 1.0);
            let srgb = if c <= 0.0031308 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            };
            (srgb * 255.0).round() as u8
        };
        Self::new(encode(color[0]), encode(color[1]), encode(color[2]))
    }

    pub fn dist_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Texture pixels, top row first. Alpha is carried but never exported.
pub struct TextureImage {
    pub name: String,
    pub pixels: RgbaImage,
}

impl TextureImage {
    pub fn new(name: &str, pixels: RgbaImage) -> Self {
        Self {
            name: name.to_owned(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TextureImage('{}', {}x{})", self.name, self.width(), self.height())
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub color: Rgb,
    pub texture: Option<Arc<TextureImage>>,

    /// Faces are visible from the front only.
    pub backface_culling: bool,

    /// Rendered without lighting (`noshade=1`).
    pub shadeless: bool,

    /// Drawn after other faces (`prio=1`).
    pub priority: bool,
}

impl Material {
    pub fn new(name: &str, color: Rgb) -> Self {
        Self {
            name: name.to_owned(),
            color,
            texture: None,
            backface_culling: false,
            shadeless: false,
            priority: false,
        }
    }

    pub fn is_double_sided(&self) -> bool {
        !self.backface_culling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_extremes_map_to_full_range() {
        assert_eq!(Rgb::from_linear([0.0, 1.0, 2.0]), Rgb::new(0, 255, 255));
        assert_eq!(Rgb::from_linear([-1.0, 0.0, 0.0]), Rgb::new(0, 0, 0));
    }

    #[test]
    fn linear_midtones_are_brightened() {
        // Linear 0.25 is roughly sRGB 137.
        let c = Rgb::from_linear([0.25, 0.25, 0.25]);
        assert_eq!(c.r, 137);
        assert_eq!(c, Rgb::new(c.r, c.r, c.r));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(40, 0, 30);
        assert_eq!(a.dist_sq(b), 30 * 30 + 20 * 20);
        assert_eq!(a.dist_sq(b), b.dist_sq(a));
        assert_eq!(a.dist_sq(a), 0);
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Rgb::new(255, 0, 77).to_string(), "#ff004d");
    }
}
