use serde::{Deserialize, Serialize};
use voxscribe_common::{Result, VoxscribeError};

/// Identifies one cubic section in section-space: the global coordinate
/// floor-divided by the section size on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl SectionKey {
    pub fn new(x: i64, y: i64, z: i64) -> Self {
        SectionKey { x, y, z }
    }

    /// Key of the section owning the given global coordinate. Floor division
    /// so that negative coordinates route to the section below them, not
    /// toward zero.
    pub fn containing(x: i64, y: i64, z: i64, section_size: u32) -> Self {
        let size = section_size as i64;
        SectionKey {
            x: x.div_euclid(size),
            y: y.div_euclid(size),
            z: z.div_euclid(size),
        }
    }

    /// Canonical textual form: the three components joined by `separator`.
    pub fn to_text(&self, separator: &str) -> String {
        format!("{}{sep}{}{sep}{}", self.x, self.y, self.z, sep = separator)
    }

    /// Exact inverse of [`to_text`](Self::to_text). Well-formed inputs never
    /// fail; anything else is rejected rather than guessed at.
    pub fn from_text(text: &str, separator: &str) -> Result<Self> {
        let mut components = text.split(separator);
        let mut next = || -> Result<i64> {
            components
                .next()
                .ok_or_else(|| malformed(text))?
                .parse::<i64>()
                .map_err(|_| malformed(text))
        };
        let key = SectionKey {
            x: next()?,
            y: next()?,
            z: next()?,
        };
        if components.next().is_some() {
            return Err(malformed(text));
        }
        Ok(key)
    }
}

fn malformed(text: &str) -> VoxscribeError {
    VoxscribeError::InvalidConfiguration(format!("malformed section key: {:?}", text))
}
