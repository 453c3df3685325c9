use crate::scene::Rgb;
use serde::Deserialize;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// The 16 colors picoCAD can display. Faces, background and transparency refer to them by
/// index, texture pixels by hex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Deserialize)]
#[repr(u8)]
pub enum PaletteColor {
    Black = 0,
    DarkBlue,
    DarkPurple,
    DarkGreen,
    Brown,
    DarkGray,
    LightGray,
    White,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Lavender,
    Pink,
    Peach,
}

const HEX_DIGITS: &[u8; PaletteColor::COUNT] = b"0123456789abcdef";

impl PaletteColor {
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The character used for this color in texture data.
    pub fn hex(self) -> char {
        HEX_DIGITS[self.index() as usize] as char
    }

    pub fn rgb(self) -> Rgb {
        match self {
            PaletteColor::Black => Rgb::new(0, 0, 0),
            PaletteColor::DarkBlue => Rgb::new(29, 43, 83),
            PaletteColor::DarkPurple => Rgb::new(126, 37, 83),
            PaletteColor::DarkGreen => Rgb::new(0, 135, 81),
            PaletteColor::Brown => Rgb::new(171, 82, 54),
            PaletteColor::DarkGray => Rgb::new(95, 87, 79),
            PaletteColor::LightGray => Rgb::new(194, 195, 199),
            PaletteColor::White => Rgb::new(255, 241, 232),
            PaletteColor::Red => Rgb::new(255, 0, 77),
            PaletteColor::Orange => Rgb::new(255, 163, 0),
            PaletteColor::Yellow => Rgb::new(255, 236, 39),
            PaletteColor::Green => Rgb::new(0, 228, 54),
            PaletteColor::Blue => Rgb::new(41, 173, 255),
            PaletteColor::Lavender => Rgb::new(131, 118, 156),
            PaletteColor::Pink => Rgb::new(255, 119, 168),
            PaletteColor::Peach => Rgb::new(255, 204, 170),
        }
    }
}

/// Returns the palette entry closest to `color` in RGB space. Ties go to the lower index.
pub fn resolve(color: Rgb) -> PaletteColor {
    PaletteColor::iter()
        .min_by_key(|entry| color.dist_sq(entry.rgb()))
        .unwrap_or(PaletteColor::Black)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force_distance(color: Rgb) -> u32 {
        PaletteColor::iter()
            .map(|entry| color.dist_sq(entry.rgb()))
            .min()
            .unwrap()
    }

    #[test]
    fn palette_colors_resolve_to_themselves() {
        for entry in PaletteColor::iter() {
            assert_eq!(resolve(entry.rgb()), entry);
            assert_eq!(resolve(resolve(entry.rgb()).rgb()), entry);
        }
    }

    #[test]
    fn resolved_color_has_minimum_distance() {
        for r in (0..=255u32).step_by(15) {
            for g in (0..=255u32).step_by(17) {
                for b in (0..=255u32).step_by(51) {
                    let color = Rgb::new(r as u8, g as u8, b as u8);
                    let resolved = resolve(color);
                    assert_eq!(color.dist_sq(resolved.rgb()), brute_force_distance(color));
                    // Any entry at the same distance must come later in the palette.
                    let first_tie = PaletteColor::iter()
                        .find(|e| color.dist_sq(e.rgb()) == brute_force_distance(color))
                        .unwrap();
                    assert_eq!(resolved, first_tie);
                }
            }
        }
    }

    #[test]
    fn pure_red_resolves_to_red() {
        assert_eq!(resolve(Rgb::new(255, 0, 0)), PaletteColor::Red);
        assert_eq!(PaletteColor::Red.index(), 8);
    }

    #[test]
    fn hex_digits_match_indices() {
        assert_eq!(PaletteColor::Black.hex(), '0');
        assert_eq!(PaletteColor::Red.hex(), '8');
        assert_eq!(PaletteColor::Peach.hex(), 'f');
        assert_eq!(PaletteColor::Blue.hex(), 'c');
    }
}
