//! EmfPlusPath object

use super::GraphicsVersion;
use crate::codec::{ByteReader, PointEncoding, INT_SIZE};
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::shape::PathGeometry;
use crate::types::PointF;
use log::warn;

/// Path flag: point types are run-length encoded
pub const PATH_FLAG_RLE: u16 = 0x1000;

const POINT_TYPE_MASK: u8 = 0x07;
const POINT_TYPE_DASHED: u8 = 0x10;
const POINT_TYPE_MARKER: u8 = 0x20;
const POINT_TYPE_CLOSE: u8 = 0x80;

const RLE_COUNT_MASK: u8 = 0x3F;

wire_enum! {
    pub enum PointType: u8 {
        Start = 0,
        Line = 1,
        Bezier = 3,
    }
}

/// Decoded point type byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathPointType {
    pub kind: PointType,
    pub dashed: bool,
    pub marker: bool,
    pub close: bool,
}

impl PathPointType {
    /// Decode a point type byte. The type selects how many points a segment
    /// consumes, so an unknown type is a fatal `UnknownTag` rather than a
    /// placeholder.
    pub fn from_byte(value: u8) -> EmfPlusResult<Self> {
        let kind = PointType::from_raw(value & POINT_TYPE_MASK).ok_or(EmfPlusError::UnknownTag {
            what: "path point type",
            tag: u32::from(value & POINT_TYPE_MASK),
        })?;
        Ok(Self {
            kind,
            dashed: value & POINT_TYPE_DASHED != 0,
            marker: value & POINT_TYPE_MARKER != 0,
            close: value & POINT_TYPE_CLOSE != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub version: GraphicsVersion,
    pub flags: u16,
    pub points: Vec<PointF>,
    pub point_types: Vec<PathPointType>,
}

impl Path {
    /// Decode a path from exactly its object window
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        let count = reader.read_u32()? as usize;
        let flags = reader.read_u16()?;
        // reserved
        reader.read_u16()?;

        let encoding = PointEncoding::from_flags(flags);
        let points = encoding.read_points(&mut reader, count)?;

        let point_types = if flags & PATH_FLAG_RLE != 0 {
            read_rle_point_types(&mut reader, count)?
        } else {
            reader.ensure_available("path point types", count)?;
            (0..count)
                .map(|_| reader.read_u8().and_then(PathPointType::from_byte))
                .collect::<EmfPlusResult<Vec<_>>>()?
        };

        // pad to a 4-byte boundary, as far as the window allows
        let padding = (INT_SIZE - reader.position() % INT_SIZE) % INT_SIZE;
        reader.skip(padding.min(reader.remaining()))?;

        Ok((
            Self {
                version,
                flags,
                points,
                point_types,
            },
            reader.position(),
        ))
    }

    /// Decode a path prefixed by a signed 32-bit byte size
    pub fn decode_sized(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let size = reader.read_i32()?;
        if size < 0 {
            return Err(EmfPlusError::InvalidData(format!("negative embedded path size {}", size)));
        }
        let window = reader.read_slice(size as usize)?;
        let (path, _) = Self::decode(window)?;
        Ok(path)
    }

    /// Build the renderable path; Bezier segments consume three points and
    /// a close bit on any consumed point closes the figure.
    pub fn to_geometry(&self) -> PathGeometry {
        let mut geometry = PathGeometry::new();
        let n = self.points.len().min(self.point_types.len());
        let mut i = 0;
        while i < n {
            let point_type = self.point_types[i];
            let consumed = match point_type.kind {
                PointType::Start => {
                    geometry.move_to(self.points[i]);
                    1
                }
                PointType::Line => {
                    geometry.line_to(self.points[i]);
                    1
                }
                PointType::Bezier if i + 2 < n => {
                    geometry.curve_to(self.points[i], self.points[i + 1], self.points[i + 2]);
                    3
                }
                PointType::Bezier => {
                    warn!("Truncated bezier segment at point {} of {}", i, n);
                    geometry.line_to(self.points[i]);
                    1
                }
            };
            if self.point_types[i..i + consumed].iter().any(|t| t.close) {
                geometry.close();
            }
            i += consumed;
        }
        geometry
    }
}

fn read_rle_point_types(reader: &mut ByteReader<'_>, count: usize) -> EmfPlusResult<Vec<PathPointType>> {
    let mut types = Vec::with_capacity(count.min(reader.remaining()));
    while types.len() < count {
        let run = reader.read_u8()?;
        let point_type = PathPointType::from_byte(reader.read_u8()?)?;
        let run_len = usize::from(run & RLE_COUNT_MASK);
        if types.len() + run_len > count {
            return Err(EmfPlusError::LimitExceeded {
                what: "path point type run",
                value: (types.len() + run_len) as i64,
                limit: count as u64,
            });
        }
        types.extend(std::iter::repeat(point_type).take(run_len));
    }
    Ok(types)
}
