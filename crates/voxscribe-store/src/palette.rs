use serde::{Deserialize, Serialize};
use voxscribe_common::{Result, VoxscribeError};

/// Number of color slots in a MagicaVoxel palette.
pub const PALETTE_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// Fixed 256-entry color palette. Slot 0 still defines a color even though
/// voxel value 0 means "no voxel", so color index 0 can never be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Builds a palette from exactly [`PALETTE_SIZE`] colors.
    pub fn new(colors: Vec<Rgb>) -> Result<Self> {
        if colors.len() != PALETTE_SIZE {
            return Err(VoxscribeError::InvalidConfiguration(format!(
                "palette must have exactly {} colors, got {}",
                PALETTE_SIZE,
                colors.len()
            )));
        }
        Ok(Palette { colors })
    }

    /// Builds a palette from `[r, g, b]` triplets, the shape palette files
    /// deserialize into.
    pub fn from_triplets(triplets: Vec<[u8; 3]>) -> Result<Self> {
        Palette::new(
            triplets
                .into_iter()
                .map(|[r, g, b]| Rgb::new(r, g, b))
                .collect(),
        )
    }

    /// The ramp where slot `i` is `(i, i, i)`.
    pub fn grayscale() -> Self {
        Palette {
            colors: (0..PALETTE_SIZE)
                .map(|i| Rgb::new(i as u8, i as u8, i as u8))
                .collect(),
        }
    }

    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_palette_requires_exactly_256_colors() {
        assert_matches!(
            Palette::new(vec![Rgb::new(0, 0, 0); 255]),
            Err(VoxscribeError::InvalidConfiguration(_))
        );
        assert_matches!(
            Palette::new(vec![Rgb::new(0, 0, 0); 257]),
            Err(VoxscribeError::InvalidConfiguration(_))
        );
        assert!(Palette::new(vec![Rgb::new(0, 0, 0); 256]).is_ok());
    }

    #[test]
    fn test_grayscale_ramp() {
        let palette = Palette::grayscale();
        assert_eq!(palette.colors().len(), PALETTE_SIZE);
        assert_eq!(palette.color(0), Rgb::new(0, 0, 0));
        assert_eq!(palette.color(128), Rgb::new(128, 128, 128));
        assert_eq!(palette.color(255), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_from_triplets() {
        let mut triplets = vec![[0u8, 0, 0]; 256];
        triplets[1] = [255, 0, 0];
        let palette = Palette::from_triplets(triplets).unwrap();
        assert_eq!(palette.color(1), Rgb::new(255, 0, 0));

        assert_matches!(
            Palette::from_triplets(vec![[0u8, 0, 0]; 16]),
            Err(VoxscribeError::InvalidConfiguration(_))
        );
    }
}
