//! Sorted color palettes and nearest-color lookup.

use crate::{color::Color, error::Error};

/// The palette color closest to some pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nearest {
    pub color: Color,
    pub distance_squared: u32,
}

impl Nearest {
    pub fn distance(&self) -> f64 {
        f64::from(self.distance_squared).sqrt()
    }
}

/// A non-empty list of colors, always sorted by packed RGB value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(mut colors: Vec<Color>) -> Result<Self, Error> {
        if colors.is_empty() {
            return Err(Error::InvalidColorCount(0));
        }
        colors.sort_unstable();
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.binary_search(&color).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        self.colors.iter().copied()
    }

    /// Replaces every color with `f(color)`, keeping the palette size, and sorts the result.
    pub fn map(&self, f: impl FnMut(Color) -> Color) -> Palette {
        let mut colors: Vec<_> = self.iter().map(f).collect();
        colors.sort_unstable();
        Palette { colors }
    }

    /// Finds the palette color closest to `color` by Euclidean distance.
    ///
    /// When several palette colors are equally close, the one that comes last in palette
    /// order wins.
    pub fn nearest(&self, color: Color) -> Nearest {
        find_nearest(color, &self.colors)
    }
}

/// Nearest lookup over a plain slice of candidates; `candidates` must not be empty. Equal
/// distances resolve to the later candidate.
pub(crate) fn find_nearest(color: Color, candidates: &[Color]) -> Nearest {
    let mut nearest = Nearest {
        color: candidates[0],
        distance_squared: u32::MAX,
    };
    for &candidate in candidates {
        let distance_squared = candidate.distance_squared(color);
        if distance_squared <= nearest.distance_squared {
            nearest = Nearest {
                color: candidate,
                distance_squared,
            };
        }
    }
    nearest
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = std::slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.colors.iter()
    }
}
