use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use voxscribe_common::{Result, VoxscribeError};
use voxscribe_store::{Palette, Section, SectionKey, VoxelStore, PALETTE_SIZE};

/// MagicaVoxel format version emitted in the file header.
pub const VOX_VERSION: u32 = 150;

const TAG_FILE: &[u8; 4] = b"VOX ";
const TAG_MAIN: &[u8; 4] = b"MAIN";
const TAG_SIZE: &[u8; 4] = b"SIZE";
const TAG_XYZI: &[u8; 4] = b"XYZI";
const TAG_TRANSFORM_NODE: &[u8; 4] = b"nTRN";
const TAG_GROUP_NODE: &[u8; 4] = b"nGRP";
const TAG_SHAPE_NODE: &[u8; 4] = b"nSHP";
const TAG_PALETTE: &[u8; 4] = b"RGBA";

const ROOT_TRANSFORM_NODE: u32 = 0;
const ROOT_GROUP_NODE: u32 = 1;
const NO_NODE: i32 = -1;

/// Node and model indices a section owns, derived purely from its ordinal
/// position in the store's iteration order. The root transform is node 0 and
/// the root group node 1, so the section at ordinal k holds nodes `2k + 2`
/// and `2k + 3` and references model k.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeAssignment {
    transform_node: u32,
    shape_node: u32,
    model: u32,
}

impl NodeAssignment {
    fn for_ordinal(ordinal: usize) -> Self {
        let transform_node = ordinal as u32 * 2 + 2;
        NodeAssignment {
            transform_node,
            shape_node: transform_node + 1,
            model: ordinal as u32,
        }
    }
}

/// Encoder for the complete ".vox" document: per-section geometry records,
/// the transform/group/shape scene graph positioning each section in world
/// space, and the palette.
///
/// Holding `&mut` on the store for the whole pass is the single-writer,
/// single-encoder contract: no voxel write can interleave with encoding.
pub struct VoxEncoder<'a> {
    store: &'a mut VoxelStore,
}

impl<'a> VoxEncoder<'a> {
    pub fn new(store: &'a mut VoxelStore) -> Self {
        VoxEncoder { store }
    }

    /// Produces the document bytes for the current store contents.
    ///
    /// With `release_internal_data` each section's storage is freed right
    /// after its geometry is emitted and the section map is cleared once all
    /// sections are visited; the consume is one-shot. Without it the store
    /// is left intact and re-encoding yields identical bytes.
    pub fn encode(self, release_internal_data: bool) -> Result<Vec<u8>> {
        let section_count = self.store.section_count();
        let section_size = self.store.section_size();
        let mut children = Vec::new();

        // 1. Geometry: a SIZE + XYZI pair per section, in iteration order.
        let mut emitted = 0;
        for (_, section) in self.store.sections_mut() {
            write_size_record(&mut children, section_size)?;
            write_xyzi_record(&mut children, section)?;
            if release_internal_data {
                section.release_data();
            }
            emitted += 1;
        }
        if emitted != section_count {
            return Err(VoxscribeError::EncodingInvariant(format!(
                "geometry pass emitted {} sections, expected {}",
                emitted, section_count
            )));
        }

        // 2. Scene graph: root transform, root group, then one transform +
        //    shape pair per section in the same order as the geometry.
        let keys: Vec<SectionKey> = self.store.sections().map(|(key, _)| *key).collect();
        if keys.len() != section_count {
            return Err(VoxscribeError::EncodingInvariant(format!(
                "section map changed mid-encode: {} keys, expected {}",
                keys.len(),
                section_count
            )));
        }
        write_root_transform_node(&mut children)?;
        write_root_group_node(&mut children, section_count)?;
        for (ordinal, key) in keys.iter().enumerate() {
            let nodes = NodeAssignment::for_ordinal(ordinal);
            write_section_transform_node(&mut children, nodes, key, section_size)?;
            write_section_shape_node(&mut children, nodes)?;
        }

        if release_internal_data {
            self.store.clear_sections();
        }

        // 3. Palette, always all 256 slots.
        write_palette_record(&mut children, self.store.palette())?;

        // 4. File header and the MAIN container: no content of its own, all
        //    records flattened inline as its children.
        if children.len() > u32::MAX as usize {
            return Err(VoxscribeError::OutOfRangeValue(format!(
                "document children span {} bytes, above the u32 limit",
                children.len()
            )));
        }
        let mut document = Vec::with_capacity(children.len() + 20);
        document.write_all(TAG_FILE)?;
        document.write_u32::<LittleEndian>(VOX_VERSION)?;
        document.write_all(TAG_MAIN)?;
        document.write_u32::<LittleEndian>(0)?;
        document.write_u32::<LittleEndian>(children.len() as u32)?;
        document.write_all(&children)?;
        Ok(document)
    }
}

/// One-call surface over [`VoxEncoder`].
pub fn write_vox(store: &mut VoxelStore, release_internal_data: bool) -> Result<Vec<u8>> {
    VoxEncoder::new(store).encode(release_internal_data)
}

// Every record is tag, u32 content length, u32 children length (always 0
// outside MAIN), then the content bytes.
fn write_record(out: &mut Vec<u8>, tag: &[u8; 4], content: &[u8]) -> io::Result<()> {
    out.write_all(tag)?;
    out.write_u32::<LittleEndian>(content.len() as u32)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_all(content)
}

fn write_ascii_string(out: &mut Vec<u8>, value: &str) -> io::Result<()> {
    debug_assert!(value.is_ascii(), "dictionary strings must be ASCII");
    out.write_u32::<LittleEndian>(value.len() as u32)?;
    out.write_all(value.as_bytes())
}

// Attribute dictionary: entry count, then length-prefixed key and value per
// entry. Written even when empty. Slice order is emission order.
fn write_dict(out: &mut Vec<u8>, entries: &[(&str, &str)]) -> io::Result<()> {
    out.write_u32::<LittleEndian>(entries.len() as u32)?;
    for (key, value) in entries {
        write_ascii_string(out, key)?;
        write_ascii_string(out, value)?;
    }
    Ok(())
}

fn write_size_record(out: &mut Vec<u8>, section_size: u32) -> io::Result<()> {
    let mut content = Vec::with_capacity(12);
    content.write_u32::<LittleEndian>(section_size)?;
    content.write_u32::<LittleEndian>(section_size)?;
    content.write_u32::<LittleEndian>(section_size)?;
    write_record(out, TAG_SIZE, &content)
}

// Sparse voxel list: count, then an {x, y, z, color} byte quadruple per
// non-empty voxel, scanned x-outer / y-middle / z-inner.
fn write_xyzi_record(out: &mut Vec<u8>, section: &Section) -> io::Result<()> {
    let size = section.size();
    let mut voxels = Vec::new();
    let mut voxel_count: u32 = 0;
    for x in 0..size {
        for y in 0..size {
            for z in 0..size {
                let color = section.get(x, y, z);
                if color != 0 {
                    voxels.write_u8(x as u8)?;
                    voxels.write_u8(y as u8)?;
                    voxels.write_u8(z as u8)?;
                    voxels.write_u8(color)?;
                    voxel_count += 1;
                }
            }
        }
    }
    let mut content = Vec::with_capacity(voxels.len() + 4);
    content.write_u32::<LittleEndian>(voxel_count)?;
    content.extend_from_slice(&voxels);
    write_record(out, TAG_XYZI, &content)
}

fn write_root_transform_node(out: &mut Vec<u8>) -> io::Result<()> {
    let mut content = Vec::new();
    content.write_u32::<LittleEndian>(ROOT_TRANSFORM_NODE)?;
    write_dict(&mut content, &[])?;
    content.write_u32::<LittleEndian>(ROOT_GROUP_NODE)?;
    content.write_i32::<LittleEndian>(NO_NODE)?; // reserved
    content.write_i32::<LittleEndian>(NO_NODE)?; // layer
    content.write_u32::<LittleEndian>(1)?; // frame count
    write_dict(&mut content, &[])?;
    write_record(out, TAG_TRANSFORM_NODE, &content)
}

fn write_root_group_node(out: &mut Vec<u8>, section_count: usize) -> io::Result<()> {
    let mut content = Vec::new();
    content.write_u32::<LittleEndian>(ROOT_GROUP_NODE)?;
    write_dict(&mut content, &[])?;
    content.write_u32::<LittleEndian>(section_count as u32)?;
    for ordinal in 0..section_count {
        content.write_u32::<LittleEndian>(NodeAssignment::for_ordinal(ordinal).transform_node)?;
    }
    write_record(out, TAG_GROUP_NODE, &content)
}

// World-space translation of a section: its key scaled by the section size,
// with Z lifted by half a section to match MagicaVoxel's Z-up centering.
fn section_translation(key: &SectionKey, section_size: u32) -> String {
    let size = section_size as i64;
    SectionKey::new(key.x * size, key.y * size, key.z * size + size / 2).to_text(" ")
}

fn write_section_transform_node(
    out: &mut Vec<u8>,
    nodes: NodeAssignment,
    key: &SectionKey,
    section_size: u32,
) -> io::Result<()> {
    let translation = section_translation(key, section_size);
    let mut content = Vec::new();
    content.write_u32::<LittleEndian>(nodes.transform_node)?;
    write_dict(&mut content, &[])?;
    content.write_u32::<LittleEndian>(nodes.shape_node)?;
    content.write_i32::<LittleEndian>(NO_NODE)?; // reserved
    content.write_i32::<LittleEndian>(NO_NODE)?; // layer
    content.write_u32::<LittleEndian>(1)?; // frame count
    write_dict(&mut content, &[("_t", translation.as_str())])?;
    write_record(out, TAG_TRANSFORM_NODE, &content)
}

fn write_section_shape_node(out: &mut Vec<u8>, nodes: NodeAssignment) -> io::Result<()> {
    let mut content = Vec::new();
    content.write_u32::<LittleEndian>(nodes.shape_node)?;
    write_dict(&mut content, &[])?;
    content.write_u32::<LittleEndian>(1)?; // model count, always 1
    content.write_u32::<LittleEndian>(nodes.model)?;
    write_dict(&mut content, &[])?; // per-model attributes
    write_record(out, TAG_SHAPE_NODE, &content)
}

fn write_palette_record(out: &mut Vec<u8>, palette: &Palette) -> io::Result<()> {
    let mut content = Vec::with_capacity(PALETTE_SIZE * 4);
    for color in palette.colors() {
        content.write_u8(color.r)?;
        content.write_u8(color.g)?;
        content.write_u8(color.b)?;
        content.write_u8(255)?;
    }
    write_record(out, TAG_PALETTE, &content)
}
