use std::collections::HashMap;

use voxscribe_common::{Result, VoxscribeError};

use crate::key::SectionKey;
use crate::palette::Palette;
use crate::section::Section;

pub const DEFAULT_SECTION_SIZE: u32 = 64;

/// Sparse map from section keys to dense sections, lazily materialized on
/// first write. Sections are iterated in insertion order, which is the order
/// the encoder later emits them, so output is reproducible.
///
/// Not a concurrency-safe object: the contract is single writer, single
/// encoder at a time, and the encoder takes `&mut self` to hold callers to
/// it.
#[derive(Debug)]
pub struct VoxelStore {
    palette: Palette,
    section_size: u32,
    // Valid as a local-coordinate mask only because section_size is
    // validated to be a power of two.
    local_mask: i64,
    entries: Vec<(SectionKey, Section)>,
    slots: HashMap<SectionKey, usize>,
}

impl VoxelStore {
    /// Store with the default section size of 64.
    pub fn new(palette: Palette) -> Self {
        VoxelStore::with_section_size(palette, DEFAULT_SECTION_SIZE)
            .expect("default section size is valid")
    }

    /// Store with an explicit section size. The size must be a power of two
    /// in `1..=256`: masking stands in for modulo on the write path, and
    /// geometry records store local coordinates as single bytes.
    pub fn with_section_size(palette: Palette, section_size: u32) -> Result<Self> {
        if section_size == 0 || section_size > 256 || !section_size.is_power_of_two() {
            return Err(VoxscribeError::InvalidConfiguration(format!(
                "section size must be a power of two in 1..=256, got {}",
                section_size
            )));
        }
        Ok(VoxelStore {
            palette,
            section_size,
            local_mask: section_size as i64 - 1,
            entries: Vec::new(),
            slots: HashMap::new(),
        })
    }

    pub fn section_size(&self) -> u32 {
        self.section_size
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Key of the section owning a global coordinate.
    pub fn key_of(&self, x: i64, y: i64, z: i64) -> SectionKey {
        SectionKey::containing(x, y, z, self.section_size)
    }

    /// Places a voxel at an unbounded global coordinate. `color_index` 0
    /// clears the voxel; 1-255 reference the palette. May grow the section
    /// map by one entry.
    pub fn set_voxel(&mut self, x: i64, y: i64, z: i64, color_index: u8) {
        let key = self.key_of(x, y, z);
        let (lx, ly, lz) = self.local_coordinates(x, y, z);
        let section = self.section_mut(key);
        section.set(lx, ly, lz, color_index);
    }

    /// Palette index at a global coordinate; 0 for anything never written.
    pub fn get_voxel(&self, x: i64, y: i64, z: i64) -> u8 {
        let key = self.key_of(x, y, z);
        let (lx, ly, lz) = self.local_coordinates(x, y, z);
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1.get(lx, ly, lz),
            None => 0,
        }
    }

    // Two's-complement AND against the mask equals euclidean remainder for
    // power-of-two sizes, negative coordinates included.
    fn local_coordinates(&self, x: i64, y: i64, z: i64) -> (u32, u32, u32) {
        (
            (x & self.local_mask) as u32,
            (y & self.local_mask) as u32,
            (z & self.local_mask) as u32,
        )
    }

    fn section_mut(&mut self, key: SectionKey) -> &mut Section {
        let slot = match self.slots.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.entries.push((key, Section::new(self.section_size)));
                self.slots.insert(key, slot);
                slot
            }
        };
        &mut self.entries[slot].1
    }

    pub fn section_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = (&SectionKey, &Section)> {
        self.entries.iter().map(|(key, section)| (key, section))
    }

    /// Mutable iteration in insertion order; the encoder's release mode uses
    /// this to free each section's storage as soon as its geometry is out.
    pub fn sections_mut(&mut self) -> impl Iterator<Item = (&SectionKey, &mut Section)> {
        self.entries
            .iter_mut()
            .map(|(key, section)| (&*key, section))
    }

    /// Empties the section map. Irreversible; part of the encoder's
    /// release-internal-data mode.
    pub fn clear_sections(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }
}
