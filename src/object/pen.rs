//! EmfPlusPen object
//!
//! The optional fields after the width are each gated by one bit of the pen
//! data flags and always appear in bit order, whatever subset is present.

use super::brush::Brush;
use super::line_cap::{read_line_cap, read_line_join, CustomLineCap, LineCapType, LineJoinType};
use super::GraphicsVersion;
use crate::codec::ByteReader;
use crate::error::EmfPlusResult;
use crate::properties::{DrawProperties, LineDash, PenCap, PenJoin, PenStyle, UnitType};
use crate::types::Transform;
use log::warn;

pub const PEN_DATA_TRANSFORM: u32 = 0x0000_0001;
pub const PEN_DATA_START_CAP: u32 = 0x0000_0002;
pub const PEN_DATA_END_CAP: u32 = 0x0000_0004;
pub const PEN_DATA_JOIN: u32 = 0x0000_0008;
pub const PEN_DATA_MITER_LIMIT: u32 = 0x0000_0010;
pub const PEN_DATA_LINE_STYLE: u32 = 0x0000_0020;
pub const PEN_DATA_DASHED_LINE_CAP: u32 = 0x0000_0040;
pub const PEN_DATA_DASHED_LINE_OFFSET: u32 = 0x0000_0080;
pub const PEN_DATA_DASHED_LINE: u32 = 0x0000_0100;
pub const PEN_DATA_NON_CENTER: u32 = 0x0000_0200;
pub const PEN_DATA_COMPOUND_LINE: u32 = 0x0000_0400;
pub const PEN_DATA_CUSTOM_START_CAP: u32 = 0x0000_0800;
pub const PEN_DATA_CUSTOM_END_CAP: u32 = 0x0000_1000;

/// Largest dash or compound array accepted
pub const MAX_PEN_ARRAY_LEN: usize = 1000;

wire_enum! {
    pub enum LineStyle: u32 {
        Solid = 0,
        Dash = 1,
        Dot = 2,
        DashDot = 3,
        DashDotDot = 4,
        Custom = 5,
    }
}

wire_enum! {
    pub enum DashedLineCapType: u32 {
        Flat = 0,
        Round = 2,
        Triangle = 3,
    }
}

wire_enum! {
    pub enum PenAlignment: u32 {
        Center = 0,
        Inset = 1,
        Left = 2,
        Outset = 3,
        Right = 4,
    }
}

fn read_tag<T>(reader: &mut ByteReader<'_>, what: &str, from_raw: fn(u32) -> Option<T>) -> EmfPlusResult<Option<T>> {
    let raw = reader.read_u32()?;
    let value = from_raw(raw);
    if value.is_none() {
        warn!("Unknown {} {:#x}", what, raw);
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub version: GraphicsVersion,
    pub flags: u32,
    pub unit: Option<UnitType>,
    pub width: f32,
    pub transform: Option<Transform>,
    pub start_cap: Option<LineCapType>,
    pub end_cap: Option<LineCapType>,
    pub join: Option<LineJoinType>,
    pub miter_limit: f32,
    pub line_style: Option<LineStyle>,
    pub dashed_line_cap: Option<DashedLineCapType>,
    pub dash_offset: Option<f32>,
    pub dashes: Option<Vec<f32>>,
    pub alignment: Option<PenAlignment>,
    pub compound: Option<Vec<f32>>,
    pub custom_start_cap: Option<CustomLineCap>,
    pub custom_end_cap: Option<CustomLineCap>,
    pub brush: Brush,
}

impl Pen {
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        // type, always zero
        reader.read_u32()?;
        let flags = reader.read_u32()?;
        let unit = read_tag(&mut reader, "pen unit", UnitType::from_raw)?;
        let width = reader.read_f32()?;

        let mut transform = None;
        let mut start_cap = Some(LineCapType::Flat);
        let mut end_cap = Some(LineCapType::Flat);
        let mut join = Some(LineJoinType::Round);
        let mut miter_limit = 1.0;
        let mut line_style = Some(LineStyle::Solid);
        let mut dashed_line_cap = None;
        let mut dash_offset = None;
        let mut dashes = None;
        let mut alignment = None;
        let mut compound = None;
        let mut custom_start_cap = None;
        let mut custom_end_cap = None;

        if flags & PEN_DATA_TRANSFORM != 0 {
            transform = Some(reader.read_transform()?);
        }
        if flags & PEN_DATA_START_CAP != 0 {
            start_cap = read_line_cap(&mut reader)?;
        }
        if flags & PEN_DATA_END_CAP != 0 {
            end_cap = read_line_cap(&mut reader)?;
        }
        if flags & PEN_DATA_JOIN != 0 {
            join = read_line_join(&mut reader)?;
        }
        if flags & PEN_DATA_MITER_LIMIT != 0 {
            miter_limit = reader.read_f32()?;
        }
        if flags & PEN_DATA_LINE_STYLE != 0 {
            line_style = read_tag(&mut reader, "line style", LineStyle::from_raw)?;
        }
        if flags & PEN_DATA_DASHED_LINE_CAP != 0 {
            dashed_line_cap = read_tag(&mut reader, "dashed line cap", DashedLineCapType::from_raw)?;
        }
        if flags & PEN_DATA_DASHED_LINE_OFFSET != 0 {
            dash_offset = Some(reader.read_f32()?);
        }
        if flags & PEN_DATA_DASHED_LINE != 0 {
            dashes = Some(reader.read_float_array("dashed line data", MAX_PEN_ARRAY_LEN)?);
        }
        if flags & PEN_DATA_NON_CENTER != 0 {
            alignment = read_tag(&mut reader, "pen alignment", PenAlignment::from_raw)?;
        }
        if flags & PEN_DATA_COMPOUND_LINE != 0 {
            compound = Some(reader.read_float_array("compound line data", MAX_PEN_ARRAY_LEN)?);
        }
        if flags & PEN_DATA_CUSTOM_START_CAP != 0 {
            custom_start_cap = Some(CustomLineCap::read_sized(&mut reader)?);
        }
        if flags & PEN_DATA_CUSTOM_END_CAP != 0 {
            custom_end_cap = Some(CustomLineCap::read_sized(&mut reader)?);
        }

        let brush = Brush::read(&mut reader, true)?;
        let pen = Pen {
            version,
            flags,
            unit,
            width,
            transform,
            start_cap,
            end_cap,
            join,
            miter_limit,
            line_style,
            dashed_line_cap,
            dash_offset,
            dashes,
            alignment,
            compound,
            custom_start_cap,
            custom_end_cap,
            brush,
        };
        Ok((pen, reader.position()))
    }

    /// Stroke style derived from caps, join, dashes and unit
    pub fn style(&self) -> PenStyle {
        // only the start cap is honoured
        let cap = match self.start_cap {
            Some(LineCapType::Round) => PenCap::Round,
            Some(LineCapType::Square) => PenCap::Square,
            _ => PenCap::Flat,
        };
        let join = match self.join {
            Some(LineJoinType::Round) => PenJoin::Round,
            Some(LineJoinType::Miter) | Some(LineJoinType::MiterClipped) => PenJoin::Miter,
            _ => PenJoin::Bevel,
        };
        let dash = if self.dashes.is_some() {
            LineDash::UserStyle
        } else {
            LineDash::Solid
        };
        PenStyle {
            cap,
            join,
            dash,
            dashes: self.dashes.clone(),
            alternate: dash != LineDash::Solid && self.dash_offset == Some(0.0),
            geometric: matches!(self.unit, Some(UnitType::World) | Some(UnitType::Display)),
        }
    }

    pub fn apply(&self, fragments: &[Vec<u8>], props: &mut DrawProperties) -> EmfPlusResult<()> {
        self.brush.apply_pen(fragments, props)?;
        props.pen_width = f64::from(self.width);
        props.pen_style = Some(self.style());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::object::brush::tests::solid_brush_bytes;
    use crate::types::Color;
    use byteorder::{LittleEndian, WriteBytesExt};

    pub(crate) fn pen_bytes(flags: u32, width: f32, optional: &[u8], argb: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(flags).unwrap();
        buf.write_u32::<LittleEndian>(2).unwrap();
        buf.write_f32::<LittleEndian>(width).unwrap();
        buf.extend_from_slice(optional);
        buf.extend(solid_brush_bytes(argb));
        buf
    }

    #[test]
    fn test_plain_pen() {
        let data = pen_bytes(0, 2.5, &[], 0xFF00_00FF);
        let (pen, consumed) = Pen::decode(&data).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(pen.unit, Some(UnitType::Pixel));

        let mut props = DrawProperties::default();
        pen.apply(&[], &mut props).unwrap();
        assert_eq!(props.pen_color, Color::rgba(0, 0, 255, 255));
        assert_eq!(props.pen_width, 2.5);
        let style = props.pen_style.unwrap();
        assert_eq!(style.cap, PenCap::Flat);
        assert_eq!(style.join, PenJoin::Round);
        assert_eq!(style.dash, LineDash::Solid);
        assert!(!style.geometric);
    }

    #[test]
    fn test_fields_follow_canonical_order() {
        let mut optional = Vec::new();
        for v in [1.0f32, 0.0, 0.0, 1.0, 5.0, 6.0] {
            optional.write_f32::<LittleEndian>(v).unwrap();
        }
        optional.write_u32::<LittleEndian>(1).unwrap();
        optional.write_i32::<LittleEndian>(2).unwrap();
        optional.write_f32::<LittleEndian>(3.0).unwrap();
        optional.write_f32::<LittleEndian>(1.0).unwrap();

        let flags = PEN_DATA_DASHED_LINE | PEN_DATA_JOIN | PEN_DATA_TRANSFORM;
        let data = pen_bytes(flags, 1.0, &optional, 0xFF00_0000);
        let (pen, consumed) = Pen::decode(&data).unwrap();

        assert_eq!(consumed, 20 + 24 + 4 + 4 + 2 * 4 + 12);
        assert_eq!(pen.transform, Some(Transform::new(1.0, 0.0, 0.0, 1.0, 5.0, 6.0)));
        assert_eq!(pen.join, Some(LineJoinType::Bevel));
        assert_eq!(pen.dashes, Some(vec![3.0, 1.0]));
        assert_eq!(pen.start_cap, Some(LineCapType::Flat));

        let style = pen.style();
        assert_eq!(style.join, PenJoin::Bevel);
        assert_eq!(style.dash, LineDash::UserStyle);
        assert!(!style.alternate);
    }

    #[test]
    fn test_oversized_dash_array_rejected() {
        let mut optional = Vec::new();
        optional.write_i32::<LittleEndian>(1001).unwrap();
        let data = pen_bytes(PEN_DATA_DASHED_LINE, 1.0, &optional, 0xFF00_0000);
        assert!(matches!(
            Pen::decode(&data),
            Err(crate::error::EmfPlusError::LimitExceeded { .. })
        ));
    }

    #[test]
    fn test_negative_compound_array_rejected() {
        let mut optional = Vec::new();
        optional.write_i32::<LittleEndian>(-1).unwrap();
        let data = pen_bytes(PEN_DATA_COMPOUND_LINE, 1.0, &optional, 0xFF00_0000);
        assert!(Pen::decode(&data).is_err());
    }

    #[test]
    fn test_custom_start_cap_and_round_cap() {
        let mut optional = Vec::new();
        optional.write_u32::<LittleEndian>(2).unwrap();
        optional.write_f32::<LittleEndian>(0.0).unwrap();
        optional.extend(crate::object::line_cap::tests::adjustable_cap_bytes());

        let flags = PEN_DATA_START_CAP | PEN_DATA_DASHED_LINE_OFFSET | PEN_DATA_CUSTOM_START_CAP;
        let data = pen_bytes(flags, 1.0, &optional, 0xFF00_0000);
        let (pen, consumed) = Pen::decode(&data).unwrap();
        assert_eq!(consumed, data.len());
        assert!(pen.custom_start_cap.is_some());
        assert!(pen.custom_end_cap.is_none());
        assert_eq!(pen.dash_offset, Some(0.0));
        assert_eq!(pen.style().cap, PenCap::Round);
    }
}
