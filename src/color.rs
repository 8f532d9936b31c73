use byteorder::{ByteOrder, LE};
use core::fmt;
use core::ops::{Index, IndexMut};

pub const ALPHA_CHANNEL: usize = 3;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color32(pub [u8; 4]);

impl Color32 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub fn to_rgba_u32(self) -> u32 {
        LE::read_u32(&self.0)
    }

    pub fn from_rgba_u32(rgba: u32) -> Self {
        let mut bytes = [0u8; 4];
        LE::write_u32(&mut bytes, rgba);
        Color32(bytes)
    }

    /// Returns the color with channel `channel` swapped into the alpha slot.
    ///
    /// `channel` is 0..=2 for R, G, B; anything else leaves the color unchanged.
    /// Applying the same swap twice restores the original.
    pub fn swap_with_alpha(mut self, channel: usize) -> Self {
        if channel < ALPHA_CHANNEL {
            self.0.swap(channel, ALPHA_CHANNEL);
        }
        self
    }
}

impl fmt::Debug for Color32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:08X}", self.to_rgba_u32().swap_bytes())
    }
}

impl Index<usize> for Color32 {
    type Output = u8;
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl IndexMut<usize> for Color32 {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.0[i]
    }
}

/// Luma weight relative to the two chroma channels.
pub const LUMA_WEIGHT: f32 = 2.0;
pub const ALPHA_WEIGHT: f32 = 1.0;

/// A color in normalized luma/chroma space with straight alpha, all in 0..=1
/// (chroma in -0.5..=0.5).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorYCbCrAlpha {
    pub y: f32,
    pub cb: f32,
    pub cr: f32,
    pub alpha: f32,
}

impl ColorYCbCrAlpha {
    pub fn from_color(color: Color32) -> Self {
        let r = color[0] as f32 / 255.;
        let g = color[1] as f32 / 255.;
        let b = color[2] as f32 / 255.;
        Self {
            y: 0.2989 * r + 0.5866 * g + 0.1145 * b,
            cb: -0.1687 * r - 0.3313 * g + 0.5 * b,
            cr: 0.5 * r - 0.4184 * g - 0.0816 * b,
            alpha: color[3] as f32 / 255.,
        }
    }

    /// Weighted squared distance of the color part only.
    pub fn color_distance(&self, other: &Self) -> f32 {
        let dy = (self.y - other.y) * LUMA_WEIGHT;
        let dcb = self.cb - other.cb;
        let dcr = self.cr - other.cr;
        dy * dy + dcb * dcb + dcr * dcr
    }

    /// Weighted squared distance including alpha.
    pub fn distance(&self, other: &Self) -> f32 {
        let da = (self.alpha - other.alpha) * ALPHA_WEIGHT;
        self.color_distance(other) + da * da
    }
}

/// Squared alpha difference on the same scale as [`ColorYCbCrAlpha::distance`].
pub fn alpha_distance(a: u8, b: u8) -> f32 {
    let d = (a as f32 - b as f32) / 255. * ALPHA_WEIGHT;
    d * d
}

/// Mean perceptual error between two tiles. Zero means bit-exact.
pub fn block_error(original: &[Color32; 16], decoded: &[Color32; 16]) -> f32 {
    let total: f32 = original
        .iter()
        .zip(decoded.iter())
        .map(|(&a, &b)| {
            ColorYCbCrAlpha::from_color(a).distance(&ColorYCbCrAlpha::from_color(b))
        })
        .sum();
    total / 16.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_blocks_have_zero_error() {
        let mut block = [Color32::default(); 16];
        for (i, c) in block.iter_mut().enumerate() {
            *c = Color32::new(i as u8 * 16, 255 - i as u8, 7, 200);
        }
        assert_eq!(block_error(&block, &block), 0.);
    }

    #[test]
    fn luma_differences_weigh_more_than_chroma() {
        let gray = ColorYCbCrAlpha::from_color(Color32::new(128, 128, 128, 255));
        let brighter = ColorYCbCrAlpha::from_color(Color32::new(148, 148, 148, 255));
        // Roughly the same luma as gray, but shifted towards blue.
        let bluer = ColorYCbCrAlpha::from_color(Color32::new(124, 124, 161, 255));

        assert!(gray.distance(&brighter) > gray.distance(&bluer));
    }

    #[test]
    fn alpha_distance_matches_ycbcr_alpha_term() {
        let a = ColorYCbCrAlpha::from_color(Color32::new(10, 20, 30, 0));
        let b = ColorYCbCrAlpha::from_color(Color32::new(10, 20, 30, 255));
        assert!((a.distance(&b) - alpha_distance(0, 255)).abs() < 1e-6);
    }

    #[test]
    fn swap_with_alpha_is_an_involution() {
        let c = Color32::new(1, 2, 3, 4);
        assert_eq!(c.swap_with_alpha(0), Color32::new(4, 2, 3, 1));
        assert_eq!(c.swap_with_alpha(2).swap_with_alpha(2), c);
        assert_eq!(c.swap_with_alpha(3), c);
    }

    #[test]
    fn rgba_u32_round_trip() {
        let c = Color32::new(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_rgba_u32(), 0x4433_2211);
        assert_eq!(Color32::from_rgba_u32(0x4433_2211), c);
        assert_eq!(format!("{:?}", c), "#11223344");
    }
}
