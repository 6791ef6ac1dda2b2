//! EmfPlusRegion object

use super::path::Path;
use super::GraphicsVersion;
use crate::codec::ByteReader;
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::shape::{CombineMode, RegionNode};

/// Maximum nesting depth of region nodes
pub const MAX_REGION_DEPTH: usize = 256;

wire_enum! {
    pub enum RegionNodeType: u32 {
        And = 0x0000_0001,
        Union = 0x0000_0002,
        Xor = 0x0000_0003,
        Exclude = 0x0000_0004,
        Complement = 0x0000_0005,
        Rect = 0x1000_0000,
        Path = 0x1000_0001,
        Empty = 0x1000_0002,
        Infinite = 0x1000_0003,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub version: GraphicsVersion,
    /// Number of child nodes as declared by the region header
    pub node_count: u32,
    pub root: RegionNode,
}

impl Region {
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        let node_count = reader.read_u32()?;
        let root = read_node(&mut reader, 0)?;
        Ok((
            Self {
                version,
                node_count,
                root,
            },
            reader.position(),
        ))
    }
}

fn read_node(reader: &mut ByteReader<'_>, depth: usize) -> EmfPlusResult<RegionNode> {
    if depth > MAX_REGION_DEPTH {
        return Err(EmfPlusError::LimitExceeded {
            what: "region nesting",
            value: depth as i64,
            limit: MAX_REGION_DEPTH as u64,
        });
    }

    let tag = reader.read_u32()?;
    let node_type = RegionNodeType::from_raw(tag).ok_or(EmfPlusError::UnknownTag {
        what: "region node",
        tag,
    })?;

    let mode = match node_type {
        RegionNodeType::Rect => return Ok(RegionNode::Rect(reader.read_rect_float()?)),
        RegionNodeType::Path => return Ok(RegionNode::Path(Path::decode_sized(reader)?.to_geometry())),
        RegionNodeType::Empty => return Ok(RegionNode::Empty),
        RegionNodeType::Infinite => return Ok(RegionNode::Infinite),
        RegionNodeType::And => CombineMode::Intersect,
        RegionNodeType::Union => CombineMode::Union,
        RegionNodeType::Xor => CombineMode::Xor,
        RegionNodeType::Exclude => CombineMode::Exclude,
        RegionNodeType::Complement => CombineMode::Complement,
    };

    let left = read_node(reader, depth + 1)?;
    let right = read_node(reader, depth + 1)?;
    Ok(RegionNode::Combine {
        mode,
        left: Box::new(left),
        right: Box::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RectF;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn rect_node(buf: &mut Vec<u8>, x: f32, y: f32, w: f32, h: f32) {
        buf.write_u32::<LittleEndian>(0x1000_0000).unwrap();
        for v in [x, y, w, h] {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }
    }

    #[test]
    fn test_union_of_rects() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(2).unwrap();
        buf.write_u32::<LittleEndian>(0x0000_0002).unwrap();
        rect_node(&mut buf, 0.0, 0.0, 1.0, 1.0);
        rect_node(&mut buf, 2.0, 2.0, 1.0, 1.0);

        let (region, consumed) = Region::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(
            region.root,
            RegionNode::Combine {
                mode: CombineMode::Union,
                left: Box::new(RegionNode::Rect(RectF::new(0.0, 0.0, 1.0, 1.0))),
                right: Box::new(RegionNode::Rect(RectF::new(2.0, 2.0, 1.0, 1.0))),
            }
        );
    }

    #[test]
    fn test_infinite_region() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0x1000_0003).unwrap();
        let (region, _) = Region::decode(&buf).unwrap();
        assert!(region.root.is_infinite());
    }

    #[test]
    fn test_nesting_is_bounded() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        for _ in 0..(MAX_REGION_DEPTH + 2) {
            buf.write_u32::<LittleEndian>(0x0000_0001).unwrap();
        }
        assert!(matches!(Region::decode(&buf), Err(EmfPlusError::LimitExceeded { .. })));
    }
}
