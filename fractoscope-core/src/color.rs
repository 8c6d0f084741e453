use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base hue for the brightness ramp of escaped points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Red,
    Blue,
    Green,
    Purple,
    Orange,
}

impl ColorScheme {
    pub const ALL: [Self; 5] = [Self::Red, Self::Blue, Self::Green, Self::Purple, Self::Orange];

    /// The RGB triple the ramp converges to as the count nears the bound.
    pub fn base(self) -> [u8; 3] {
        match self {
            Self::Red => [255, 0, 0],
            Self::Blue => [0, 0, 255],
            Self::Green => [0, 255, 0],
            Self::Purple => [128, 0, 128],
            Self::Orange => [255, 165, 0],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }
}

impl FromStr for ColorScheme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownName {
                kind: "color scheme",
                value: s.to_string(),
            })
    }
}

/// Map an iteration count to a packed `0xRRGGBB` pixel.
///
/// Points that reached the bound are black. Escaped points get a linear
/// ramp from black (zero steps) toward the scheme's base color, so points
/// that escape very quickly are also close to black. All divisions truncate.
#[inline]
pub fn shade(iter: u32, max_iterations: u32, scheme: ColorScheme) -> u32 {
    if iter >= max_iterations {
        return 0;
    }
    let t = 255 * iter as u64 / max_iterations as u64;
    let [r, g, b] = scheme.base().map(|ch| (ch as u64 * t / 255) as u32);
    (r << 16) | (g << 8) | b
}

/// Split a packed pixel back into `[r, g, b]`.
#[inline]
pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8]
}
