use crate::error::{ExportError, ExportResult};
use crate::export::palette;
use crate::scene::{Rgb, TextureImage};
use glam::UVec2;
use itertools::Itertools;

/// Largest accepted texture edge.
pub const MAX_TEXTURE_SIZE: u32 = 128;

/// Width of the texture block in a picoCAD file.
pub const TEXTURE_COLUMNS: usize = 128;

/// picoCAD reads at least this many texture rows.
pub const TEXTURE_ROWS: usize = 120;

pub const DEFAULT_TEXTURE_SIZE: UVec2 = UVec2::new(TEXTURE_COLUMNS as u32, TEXTURE_ROWS as u32);

// The checker rows of picoCAD's built-in texture.
const DEFAULT_ROW_A: &str = "00000000eeee8888eeee8888aaaa9999aaaa9999bbbb3333bbbb3333ccccddddccccddddffffeeeeffffeeee7777666677776666555566665555666600000000";
const DEFAULT_ROW_B: &str = "000000008888eeee8888eeee9999aaaa9999aaaa3333bbbb3333bbbbddddccccddddcccceeeeffffeeeeffff6666777766667777666655556666555500000000";
const DEFAULT_PATTERN_ROWS: usize = 16;

const PADDING: char = '0';

pub fn check_size(texture: &TextureImage) -> ExportResult<()> {
    if texture.width() > MAX_TEXTURE_SIZE || texture.height() > MAX_TEXTURE_SIZE {
        return Err(ExportError::TextureTooLarge {
            name: texture.name.clone(),
            width: texture.width(),
            height: texture.height(),
            max: MAX_TEXTURE_SIZE,
        });
    }
    Ok(())
}

/// Encodes the texture as rows of palette hex digits, top row first. The image sits in the
/// top left corner of the block, the rest is padded with black.
pub fn encode(texture: &TextureImage) -> ExportResult<String> {
    check_size(texture)?;

    let width = texture.width() as usize;
    let height = texture.height() as usize;
    let rows = height.max(TEXTURE_ROWS);

    let text = (0..rows)
        .map(|y| {
            (0..TEXTURE_COLUMNS)
                .map(|x| {
                    if x < width && y < height {
                        let p = texture.pixels.get_pixel(x as u32, y as u32);
                        palette::resolve(Rgb::new(p[0], p[1], p[2])).hex()
                    } else {
                        PADDING
                    }
                })
                .collect::<String>()
        })
        .join("\n");
    Ok(text)
}

/// picoCAD's built-in grid texture, used when the scene has no texture.
pub fn default_texture() -> String {
    (0..TEXTURE_ROWS)
        .map(|y| match y {
            y if y >= DEFAULT_PATTERN_ROWS => PADDING.to_string().repeat(TEXTURE_COLUMNS),
            y if (y / 4) % 2 == 0 => DEFAULT_ROW_A.to_owned(),
            _ => DEFAULT_ROW_B.to_owned(),
        })
        .join("\n")
}
