//! Line caps, joins and custom line cap objects

use super::path::Path;
use super::GraphicsVersion;
use crate::codec::ByteReader;
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::types::PointF;
use log::warn;

const PATH_CAP_FILL_PATH: u32 = 0x0000_0001;
const PATH_CAP_LINE_PATH: u32 = 0x0000_0002;

wire_enum! {
    pub enum LineCapType: u32 {
        Flat = 0x00,
        Square = 0x01,
        Round = 0x02,
        Triangle = 0x03,
        NoAnchor = 0x10,
        SquareAnchor = 0x11,
        RoundAnchor = 0x12,
        DiamondAnchor = 0x13,
        ArrowAnchor = 0x14,
        AnchorMask = 0xF0,
        Custom = 0xFF,
    }
}

wire_enum! {
    pub enum LineJoinType: u32 {
        Miter = 0,
        Bevel = 1,
        Round = 2,
        MiterClipped = 3,
    }
}

/// Read a cap tag; unknown values are kept as `None`
pub(crate) fn read_line_cap(reader: &mut ByteReader<'_>) -> EmfPlusResult<Option<LineCapType>> {
    let raw = reader.read_u32()?;
    let cap = LineCapType::from_raw(raw);
    if cap.is_none() {
        warn!("Unknown line cap type {:#x}", raw);
    }
    Ok(cap)
}

pub(crate) fn read_line_join(reader: &mut ByteReader<'_>) -> EmfPlusResult<Option<LineJoinType>> {
    let raw = reader.read_u32()?;
    let join = LineJoinType::from_raw(raw);
    if join.is_none() {
        warn!("Unknown line join type {:#x}", raw);
    }
    Ok(join)
}

/// Fields shared by both custom cap flavours
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCap {
    pub start_cap: Option<LineCapType>,
    pub end_cap: Option<LineCapType>,
    pub join: Option<LineJoinType>,
    pub miter_limit: f32,
    pub width_scale: f32,
    pub fill_hot_spot: PointF,
    pub line_hot_spot: PointF,
}

impl BaseCap {
    fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        Ok(Self {
            start_cap: read_line_cap(reader)?,
            end_cap: read_line_cap(reader)?,
            join: read_line_join(reader)?,
            miter_limit: reader.read_f32()?,
            width_scale: reader.read_f32()?,
            fill_hot_spot: reader.read_point_float()?,
            line_hot_spot: reader.read_point_float()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustableArrowCap {
    pub width: f32,
    pub height: f32,
    pub middle_inset: f32,
    pub filled: bool,
    pub base: BaseCap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathArrowCap {
    pub flags: u32,
    pub base_cap: Option<LineCapType>,
    pub base_inset: f32,
    pub base: BaseCap,
    pub fill_path: Option<Path>,
    pub outline_path: Option<Path>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomLineCapKind {
    AdjustableArrow(AdjustableArrowCap),
    PathArrow(PathArrowCap),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomLineCap {
    pub version: GraphicsVersion,
    pub kind: CustomLineCapKind,
}

impl CustomLineCap {
    /// Stand-alone custom line cap object
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let cap = Self::read(&mut reader)?;
        Ok((cap, reader.position()))
    }

    /// Custom cap embedded in a pen, prefixed by its byte size. The cap is
    /// decoded from exactly that window; unread bytes inside it are skipped.
    pub fn read_sized(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let size = reader.read_i32()?;
        if size < 0 {
            return Err(EmfPlusError::InvalidData(format!("negative custom line cap size {}", size)));
        }
        let window = reader.read_slice(size as usize)?;
        Self::read(&mut ByteReader::new(window))
    }

    fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let version = GraphicsVersion::read(reader)?;
        let adjustable = reader.read_i32()? != 0;
        let kind = if adjustable {
            let width = reader.read_f32()?;
            let height = reader.read_f32()?;
            let middle_inset = reader.read_f32()?;
            let filled = reader.read_i32()? != 0;
            CustomLineCapKind::AdjustableArrow(AdjustableArrowCap {
                width,
                height,
                middle_inset,
                filled,
                base: BaseCap::read(reader)?,
            })
        } else {
            let flags = reader.read_u32()?;
            let base_cap = read_line_cap(reader)?;
            let base_inset = reader.read_f32()?;
            let base = BaseCap::read(reader)?;
            let fill_path = if flags & PATH_CAP_FILL_PATH != 0 {
                Some(Path::decode_sized(reader)?)
            } else {
                None
            };
            let outline_path = if flags & PATH_CAP_LINE_PATH != 0 {
                Some(Path::decode_sized(reader)?)
            } else {
                None
            };
            CustomLineCapKind::PathArrow(PathArrowCap {
                flags,
                base_cap,
                base_inset,
                base,
                fill_path,
                outline_path,
            })
        };
        Ok(Self { version, kind })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    pub(crate) fn write_base_cap(buf: &mut Vec<u8>) {
        buf.write_u32::<LittleEndian>(0x02).unwrap();
        buf.write_u32::<LittleEndian>(0x14).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        for v in [10.0f32, 1.0, 0.0, 0.0, 0.0, 0.0] {
            buf.write_f32::<LittleEndian>(v).unwrap();
        }
    }

    /// Size-prefixed adjustable arrow cap as embedded in a pen
    pub(crate) fn adjustable_cap_bytes() -> Vec<u8> {
        let mut body = Vec::new();
        body.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        body.write_i32::<LittleEndian>(1).unwrap();
        for v in [3.0f32, 4.0, 0.5] {
            body.write_f32::<LittleEndian>(v).unwrap();
        }
        body.write_i32::<LittleEndian>(1).unwrap();
        write_base_cap(&mut body);

        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(body.len() as i32).unwrap();
        buf.extend_from_slice(&body);
        buf
    }

    #[test]
    fn test_adjustable_arrow_cap() {
        let data = adjustable_cap_bytes();
        let mut reader = ByteReader::new(&data);
        let cap = CustomLineCap::read_sized(&mut reader).unwrap();
        assert_eq!(reader.remaining(), 0);
        match cap.kind {
            CustomLineCapKind::AdjustableArrow(arrow) => {
                assert_eq!((arrow.width, arrow.height), (3.0, 4.0));
                assert!(arrow.filled);
                assert_eq!(arrow.base.start_cap, Some(LineCapType::Round));
                assert_eq!(arrow.base.end_cap, Some(LineCapType::ArrowAnchor));
                assert_eq!(arrow.base.join, Some(LineJoinType::Bevel));
            }
            other => panic!("unexpected cap {:?}", other),
        }
    }

    #[test]
    fn test_path_arrow_cap_with_fill_path() {
        let path = crate::object::path::tests::path_bytes(0, &[(0.0, 0.0), (1.0, 1.0)], &[0x00, 0x01]);
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_i32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(PATH_CAP_FILL_PATH).unwrap();
        buf.write_u32::<LittleEndian>(0x03).unwrap();
        buf.write_f32::<LittleEndian>(0.25).unwrap();
        write_base_cap(&mut buf);
        buf.write_i32::<LittleEndian>(path.len() as i32).unwrap();
        buf.extend_from_slice(&path);

        let (cap, consumed) = CustomLineCap::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        match cap.kind {
            CustomLineCapKind::PathArrow(arrow) => {
                assert_eq!(arrow.base_cap, Some(LineCapType::Triangle));
                assert_eq!(arrow.fill_path.map(|p| p.points.len()), Some(2));
                assert!(arrow.outline_path.is_none());
            }
            other => panic!("unexpected cap {:?}", other),
        }
    }

    #[test]
    fn test_sized_cap_stays_in_its_window() {
        let cap = adjustable_cap_bytes();
        let mut data = cap.clone();
        // padding inside the declared size, then a trailing field
        data[..4].copy_from_slice(&((cap.len() - 4 + 8) as i32).to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        data.write_u32::<LittleEndian>(0xCAFE_F00D).unwrap();

        let mut reader = ByteReader::new(&data);
        CustomLineCap::read_sized(&mut reader).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 0xCAFE_F00D);
    }

    #[test]
    fn test_undersized_cap_does_not_read_past_its_window() {
        let mut data = adjustable_cap_bytes();
        data[..4].copy_from_slice(&8i32.to_le_bytes());
        let mut reader = ByteReader::new(&data);
        assert!(CustomLineCap::read_sized(&mut reader).is_err());
    }
}
