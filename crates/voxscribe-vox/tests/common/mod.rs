//! Test-side reader for the encoded document: enough structure to walk the
//! record list and the node attribute dictionaries, nothing more.

/// One typed record from the MAIN container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tag: String,
    pub content: Vec<u8>,
}

pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

pub fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

/// Checks the file header and MAIN bookkeeping, then returns the flattened
/// record list.
pub fn parse_document(bytes: &[u8]) -> Vec<Record> {
    assert_eq!(&bytes[0..4], b"VOX ", "file magic");
    assert_eq!(read_u32(bytes, 4), 150, "format version");
    assert_eq!(&bytes[8..12], b"MAIN", "root container tag");
    assert_eq!(read_u32(bytes, 12), 0, "MAIN content length");
    assert_eq!(
        read_u32(bytes, 16) as usize,
        bytes.len() - 20,
        "MAIN children length must span the rest of the file"
    );

    let mut records = Vec::new();
    let mut offset = 20;
    while offset < bytes.len() {
        let tag = String::from_utf8(bytes[offset..offset + 4].to_vec()).unwrap();
        let content_length = read_u32(bytes, offset + 4) as usize;
        let children_length = read_u32(bytes, offset + 8);
        assert_eq!(children_length, 0, "record {} children length", tag);
        let content = bytes[offset + 12..offset + 12 + content_length].to_vec();
        records.push(Record { tag, content });
        offset += 12 + content_length;
    }
    assert_eq!(offset, bytes.len(), "records must tile MAIN exactly");
    records
}

/// Reads a length-prefixed ASCII string, advancing `offset` past it.
pub fn parse_string(bytes: &[u8], offset: &mut usize) -> String {
    let length = read_u32(bytes, *offset) as usize;
    *offset += 4;
    let value = String::from_utf8(bytes[*offset..*offset + length].to_vec()).unwrap();
    *offset += length;
    value
}

/// Reads an attribute dictionary, advancing `offset` past it.
pub fn parse_dict(bytes: &[u8], offset: &mut usize) -> Vec<(String, String)> {
    let count = read_u32(bytes, *offset) as usize;
    *offset += 4;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let key = parse_string(bytes, offset);
        let value = parse_string(bytes, offset);
        entries.push((key, value));
    }
    entries
}

/// Fields of a transform node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformNode {
    pub node: u32,
    pub child: u32,
    pub reserved: i32,
    pub layer: i32,
    pub frame_count: u32,
    pub frame: Vec<(String, String)>,
}

pub fn parse_transform_node(record: &Record) -> TransformNode {
    assert_eq!(record.tag, "nTRN");
    let bytes = &record.content;
    let mut offset = 0;
    let node = read_u32(bytes, offset);
    offset += 4;
    let attributes = parse_dict(bytes, &mut offset);
    assert!(attributes.is_empty(), "transform node attributes");
    let child = read_u32(bytes, offset);
    let reserved = read_i32(bytes, offset + 4);
    let layer = read_i32(bytes, offset + 8);
    let frame_count = read_u32(bytes, offset + 12);
    offset += 16;
    let frame = parse_dict(bytes, &mut offset);
    assert_eq!(offset, bytes.len(), "transform node content size");
    TransformNode {
        node,
        child,
        reserved,
        layer,
        frame_count,
        frame,
    }
}

/// Fields of a shape node record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeNode {
    pub node: u32,
    pub model_count: u32,
    pub model: u32,
}

pub fn parse_shape_node(record: &Record) -> ShapeNode {
    assert_eq!(record.tag, "nSHP");
    let bytes = &record.content;
    let mut offset = 0;
    let node = read_u32(bytes, offset);
    offset += 4;
    let attributes = parse_dict(bytes, &mut offset);
    assert!(attributes.is_empty(), "shape node attributes");
    let model_count = read_u32(bytes, offset);
    let model = read_u32(bytes, offset + 4);
    offset += 8;
    let model_attributes = parse_dict(bytes, &mut offset);
    assert!(model_attributes.is_empty(), "per-model attributes");
    assert_eq!(offset, bytes.len(), "shape node content size");
    ShapeNode {
        node,
        model_count,
        model,
    }
}

/// Child node ids listed by a group node record.
pub fn parse_group_children(record: &Record) -> (u32, Vec<u32>) {
    assert_eq!(record.tag, "nGRP");
    let bytes = &record.content;
    let mut offset = 0;
    let node = read_u32(bytes, offset);
    offset += 4;
    let attributes = parse_dict(bytes, &mut offset);
    assert!(attributes.is_empty(), "group node attributes");
    let child_count = read_u32(bytes, offset) as usize;
    offset += 4;
    let mut children = Vec::with_capacity(child_count);
    for _ in 0..child_count {
        children.push(read_u32(bytes, offset));
        offset += 4;
    }
    assert_eq!(offset, bytes.len(), "group node content size");
    (node, children)
}

/// Voxel quadruples from an XYZI record.
pub fn parse_voxels(record: &Record) -> Vec<[u8; 4]> {
    assert_eq!(record.tag, "XYZI");
    let bytes = &record.content;
    let count = read_u32(bytes, 0) as usize;
    assert_eq!(bytes.len(), 4 + count * 4, "XYZI content size");
    (0..count)
        .map(|i| bytes[4 + i * 4..8 + i * 4].try_into().unwrap())
        .collect()
}
