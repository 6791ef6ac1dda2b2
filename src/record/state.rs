//! Header, transform, clip, save/restore and rendering-hint records

use super::RecordType;
use crate::codec::ByteReader;
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::graphics::Graphics;
use crate::object::{GraphicsObject, GraphicsVersion};
use crate::properties::{
    CompositingMode, CompositingQuality, InterpolationMode, PixelOffsetMode, TextRenderingHint, UnitType,
};
use crate::shape::{CombineMode, RegionNode};
use crate::types::{RectF, Transform};
use log::warn;

/// Header flag: the file also carries an EMF rendering
pub const HEADER_FLAG_DUAL: u16 = 0x0001;
/// Transform records: the matrix is applied after the world transform
pub const FLAG_POST_MULTIPLY: u16 = 0x2000;

const FLAG_LOW_BYTE: u16 = 0x00FF;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderRecord {
    pub version: GraphicsVersion,
    pub emf_plus_flags: u32,
    pub dpi_x: u32,
    pub dpi_y: u32,
    pub dual: bool,
}

impl HeaderRecord {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        if !version.is_valid() {
            warn!("Header with unexpected graphics version {:#010x}", version.raw());
        }
        let emf_plus_flags = reader.read_u32()?;
        let dpi_x = reader.read_u32()?;
        let dpi_y = reader.read_u32()?;
        Ok((
            Self {
                version,
                emf_plus_flags,
                dpi_x,
                dpi_y,
                dual: flags & HEADER_FLAG_DUAL != 0,
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics) {
        if self.dpi_x > 0 {
            graphics.dpi = f64::from(self.dpi_x);
            graphics.update_window_mapping();
        }
    }
}

fn read_hint<T>(what: &str, raw: u16, from_raw: fn(u16) -> Option<T>) -> Option<T> {
    let value = from_raw(raw);
    if value.is_none() {
        warn!("Unknown {} {:#x}", what, raw);
    }
    value
}

fn combine_mode(flags: u16) -> EmfPlusResult<CombineMode> {
    let raw = u32::from((flags >> 8) & 0xF);
    CombineMode::from_raw(raw).ok_or(EmfPlusError::UnknownTag {
        what: "combine mode",
        tag: raw,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum StateRecord {
    SetRenderingOrigin { x: i32, y: i32 },
    SetAntiAliasMode { enabled: bool, smoothing_mode: u8 },
    SetTextRenderingHint(Option<TextRenderingHint>),
    SetTextContrast(u16),
    SetInterpolationMode(Option<InterpolationMode>),
    SetPixelOffsetMode(Option<PixelOffsetMode>),
    SetCompositingMode(Option<CompositingMode>),
    SetCompositingQuality(Option<CompositingQuality>),
    Save(u32),
    Restore(u32),
    BeginContainerNoParams(u32),
    EndContainer(u32),
    SetWorldTransform(Transform),
    ResetWorldTransform,
    MultiplyWorldTransform { transform: Transform, post: bool },
    TranslateWorldTransform { dx: f32, dy: f32, post: bool },
    ScaleWorldTransform { sx: f32, sy: f32, post: bool },
    RotateWorldTransform { angle: f32, post: bool },
    SetPageTransform { unit: Option<UnitType>, scale: f32 },
    ResetClip,
    SetClipRect { mode: CombineMode, rect: RectF },
    SetClipPath { mode: CombineMode, path_id: u32 },
    SetClipRegion { mode: CombineMode, region_id: u32 },
}

impl StateRecord {
    pub fn decode(record_type: RecordType, flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let post = flags & FLAG_POST_MULTIPLY != 0;
        let hint = flags & FLAG_LOW_BYTE;
        let record = match record_type {
            RecordType::SetRenderingOrigin => StateRecord::SetRenderingOrigin {
                x: reader.read_i32()?,
                y: reader.read_i32()?,
            },
            RecordType::SetAntiAliasMode => StateRecord::SetAntiAliasMode {
                enabled: flags & 0x0001 != 0,
                smoothing_mode: ((flags >> 1) & 0x7F) as u8,
            },
            RecordType::SetTextRenderingHint => {
                StateRecord::SetTextRenderingHint(read_hint("text rendering hint", hint, TextRenderingHint::from_raw))
            }
            RecordType::SetTextContrast => StateRecord::SetTextContrast(flags & 0x0FFF),
            RecordType::SetInterpolationMode => {
                StateRecord::SetInterpolationMode(read_hint("interpolation mode", hint, InterpolationMode::from_raw))
            }
            RecordType::SetPixelOffsetMode => {
                StateRecord::SetPixelOffsetMode(read_hint("pixel offset mode", hint, PixelOffsetMode::from_raw))
            }
            RecordType::SetCompositingMode => {
                StateRecord::SetCompositingMode(read_hint("compositing mode", hint, CompositingMode::from_raw))
            }
            RecordType::SetCompositingQuality => StateRecord::SetCompositingQuality(read_hint(
                "compositing quality",
                hint,
                CompositingQuality::from_raw,
            )),
            RecordType::Save => StateRecord::Save(reader.read_u32()?),
            RecordType::Restore => StateRecord::Restore(reader.read_u32()?),
            RecordType::BeginContainerNoParams => StateRecord::BeginContainerNoParams(reader.read_u32()?),
            RecordType::EndContainer => StateRecord::EndContainer(reader.read_u32()?),
            RecordType::SetWorldTransform => StateRecord::SetWorldTransform(reader.read_transform()?),
            RecordType::ResetWorldTransform => StateRecord::ResetWorldTransform,
            RecordType::MultiplyWorldTransform => StateRecord::MultiplyWorldTransform {
                transform: reader.read_transform()?,
                post,
            },
            RecordType::TranslateWorldTransform => StateRecord::TranslateWorldTransform {
                dx: reader.read_f32()?,
                dy: reader.read_f32()?,
                post,
            },
            RecordType::ScaleWorldTransform => StateRecord::ScaleWorldTransform {
                sx: reader.read_f32()?,
                sy: reader.read_f32()?,
                post,
            },
            RecordType::RotateWorldTransform => StateRecord::RotateWorldTransform {
                angle: reader.read_f32()?,
                post,
            },
            RecordType::SetPageTransform => {
                let raw = u32::from(flags & FLAG_LOW_BYTE);
                let unit = UnitType::from_raw(raw);
                if unit.is_none() {
                    warn!("Unknown page unit {:#x}, keeping the current unit", raw);
                }
                StateRecord::SetPageTransform {
                    unit,
                    scale: reader.read_f32()?,
                }
            }
            RecordType::ResetClip => StateRecord::ResetClip,
            RecordType::SetClipRect => StateRecord::SetClipRect {
                mode: combine_mode(flags)?,
                rect: reader.read_rect_float()?,
            },
            RecordType::SetClipPath => StateRecord::SetClipPath {
                mode: combine_mode(flags)?,
                path_id: u32::from(flags & FLAG_LOW_BYTE),
            },
            RecordType::SetClipRegion => StateRecord::SetClipRegion {
                mode: combine_mode(flags)?,
                region_id: u32::from(flags & FLAG_LOW_BYTE),
            },
            other => {
                return Err(EmfPlusError::InvalidData(format!(
                    "{:?} is not a state record",
                    other
                )))
            }
        };
        Ok((record, reader.position()))
    }

    pub fn apply(self, graphics: &mut Graphics) -> EmfPlusResult<()> {
        match self {
            StateRecord::SetRenderingOrigin { x, y } => graphics.props.rendering_origin = (x, y),
            StateRecord::SetAntiAliasMode {
                enabled,
                smoothing_mode,
            } => {
                graphics.props.hints.antialias = enabled;
                graphics.props.hints.smoothing_mode = smoothing_mode;
            }
            StateRecord::SetTextRenderingHint(value) => graphics.props.hints.text_rendering_hint = value,
            StateRecord::SetTextContrast(value) => graphics.props.hints.text_contrast = value,
            StateRecord::SetInterpolationMode(value) => graphics.props.hints.interpolation_mode = value,
            StateRecord::SetPixelOffsetMode(value) => graphics.props.hints.pixel_offset_mode = value,
            StateRecord::SetCompositingMode(value) => graphics.props.hints.compositing_mode = value,
            StateRecord::SetCompositingQuality(value) => graphics.props.hints.compositing_quality = value,
            StateRecord::Save(index) | StateRecord::BeginContainerNoParams(index) => graphics.save(index),
            StateRecord::Restore(index) | StateRecord::EndContainer(index) => graphics.restore(index)?,
            StateRecord::SetWorldTransform(transform) => graphics.set_world_transform(transform),
            StateRecord::ResetWorldTransform => graphics.reset_world_transform(),
            StateRecord::MultiplyWorldTransform { transform, post } => {
                graphics.multiply_world_transform(&transform, post)
            }
            StateRecord::TranslateWorldTransform { dx, dy, post } => {
                graphics.multiply_world_transform(&Transform::translate(f64::from(dx), f64::from(dy)), post)
            }
            StateRecord::ScaleWorldTransform { sx, sy, post } => {
                graphics.multiply_world_transform(&Transform::scale(f64::from(sx), f64::from(sy)), post)
            }
            StateRecord::RotateWorldTransform { angle, post } => {
                graphics.multiply_world_transform(&Transform::rotate(f64::from(angle)), post)
            }
            StateRecord::SetPageTransform { unit, scale } => {
                let unit = unit.unwrap_or(graphics.props.page_unit);
                graphics.set_page_transform(unit, f64::from(scale));
            }
            StateRecord::ResetClip => graphics.reset_clip(),
            StateRecord::SetClipRect { mode, rect } => graphics.set_clip(mode, RegionNode::Rect(rect)),
            StateRecord::SetClipPath { mode, path_id } => {
                let shape = match &graphics.objects.get(path_id)?.object {
                    GraphicsObject::Path(path) => RegionNode::Path(path.to_geometry()),
                    other => return Err(clip_object_error("path", path_id, other)),
                };
                graphics.set_clip(mode, shape);
            }
            StateRecord::SetClipRegion { mode, region_id } => {
                let shape = match &graphics.objects.get(region_id)?.object {
                    GraphicsObject::Region(region) => region.root.clone(),
                    other => return Err(clip_object_error("region", region_id, other)),
                };
                graphics.set_clip(mode, shape);
            }
        }
        Ok(())
    }
}

fn clip_object_error(expected: &str, slot: u32, found: &GraphicsObject) -> EmfPlusError {
    EmfPlusError::InvalidData(format!(
        "clip {} in slot {} has object type {:#x}",
        expected,
        slot,
        found.object_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::object::brush::tests::solid_brush_bytes;
    use crate::object::path::tests::path_bytes;
    use crate::record::tests::play;
    use crate::types::PointF;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn run(g: &mut Graphics, record_type: RecordType, flags: u16, data: &[u8]) -> EmfPlusResult<()> {
        let mut canvas = RecordingCanvas::new();
        play(g, &mut canvas, record_type.raw(), flags, data)
    }

    fn u32_bytes(value: u32) -> Vec<u8> {
        value.to_le_bytes().to_vec()
    }

    fn floats(values: &[f32]) -> Vec<u8> {
        let mut buf = Vec::new();
        for v in values {
            buf.write_f32::<LittleEndian>(*v).unwrap();
        }
        buf
    }

    #[test]
    fn test_header_sets_dpi() {
        let mut data = u32_bytes(0xDBC0_1002);
        data.extend(u32_bytes(0));
        data.extend(u32_bytes(144));
        data.extend(u32_bytes(144));
        let (record, consumed) = HeaderRecord::decode(HEADER_FLAG_DUAL, &data).unwrap();
        assert_eq!(consumed, 16);
        assert!(record.dual);

        let mut g = Graphics::default();
        run(&mut g, RecordType::Header, 1, &data).unwrap();
        assert_eq!(g.dpi, 144.0);
    }

    #[test]
    fn test_save_restore_records() {
        let mut g = Graphics::default();
        run(&mut g, RecordType::SetWorldTransform, 0, &floats(&[2.0, 0.0, 0.0, 2.0, 0.0, 0.0])).unwrap();
        run(&mut g, RecordType::Save, 0, &u32_bytes(1)).unwrap();
        run(&mut g, RecordType::ResetWorldTransform, 0, &[]).unwrap();
        assert!(g.props.transform.is_identity());
        run(&mut g, RecordType::Restore, 0, &u32_bytes(1)).unwrap();
        assert_eq!(g.props.transform, Transform::scale(2.0, 2.0));

        let err = run(&mut g, RecordType::EndContainer, 0, &u32_bytes(9)).unwrap_err();
        assert!(matches!(err, EmfPlusError::MissingSavedState(9)));
    }

    #[test]
    fn test_translate_pre_and_post() {
        let mut g = Graphics::default();
        run(&mut g, RecordType::ScaleWorldTransform, 0, &floats(&[2.0, 2.0])).unwrap();
        run(&mut g, RecordType::TranslateWorldTransform, 0, &floats(&[5.0, 0.0])).unwrap();
        // translate applies to the point before the scale
        assert_eq!(g.props.transform.apply(PointF::new(0.0, 0.0)), PointF::new(10.0, 0.0));

        run(&mut g, RecordType::ResetWorldTransform, 0, &[]).unwrap();
        run(&mut g, RecordType::ScaleWorldTransform, 0, &floats(&[2.0, 2.0])).unwrap();
        run(&mut g, RecordType::TranslateWorldTransform, FLAG_POST_MULTIPLY, &floats(&[5.0, 0.0])).unwrap();
        assert_eq!(g.props.transform.apply(PointF::new(0.0, 0.0)), PointF::new(5.0, 0.0));
    }

    #[test]
    fn test_page_transform_points() {
        let mut g = Graphics::new(144.0);
        run(&mut g, RecordType::SetPageTransform, 3, &floats(&[1.5])).unwrap();
        assert_eq!(g.props.page_unit, UnitType::Point);
        assert_eq!(g.props.transform.apply(PointF::new(1.0, 0.0)), PointF::new(3.0, 0.0));

        // unknown unit keeps the current one
        run(&mut g, RecordType::SetPageTransform, 0x7F, &floats(&[1.0])).unwrap();
        assert_eq!(g.props.page_unit, UnitType::Point);
    }

    #[test]
    fn test_clip_rect_and_reset() {
        let mut g = Graphics::default();
        run(&mut g, RecordType::SetClipRect, 0x0000, &floats(&[0.0, 0.0, 4.0, 4.0])).unwrap();
        assert_eq!(g.props.clip, RegionNode::Rect(RectF::new(0.0, 0.0, 4.0, 4.0)));
        run(&mut g, RecordType::SetClipRect, 0x0400, &floats(&[1.0, 1.0, 1.0, 1.0])).unwrap();
        assert!(matches!(
            g.props.clip,
            RegionNode::Combine {
                mode: CombineMode::Exclude,
                ..
            }
        ));
        run(&mut g, RecordType::ResetClip, 0, &[]).unwrap();
        assert!(g.props.clip.is_infinite());
    }

    #[test]
    fn test_clip_path_from_table() {
        let mut g = Graphics::default();
        let mut canvas = RecordingCanvas::new();
        let path = path_bytes(0, &[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0)], &[0x00, 0x01, 0x81]);
        play(&mut g, &mut canvas, RecordType::Object.raw(), 0x0302, &path).unwrap();
        play(&mut g, &mut canvas, RecordType::Object.raw(), 0x0103, &solid_brush_bytes(0)).unwrap();

        run(&mut g, RecordType::SetClipPath, 0x0102, &[]).unwrap();
        assert!(matches!(
            &g.props.clip,
            RegionNode::Combine { mode: CombineMode::Intersect, right, .. } if matches!(**right, RegionNode::Path(_))
        ));

        let err = run(&mut g, RecordType::SetClipPath, 0x0003, &[]).unwrap_err();
        assert!(matches!(err, EmfPlusError::InvalidData(_)));
    }

    #[test]
    fn test_unknown_combine_mode() {
        let mut g = Graphics::default();
        let err = run(&mut g, RecordType::SetClipRect, 0x0900, &floats(&[0.0; 4])).unwrap_err();
        assert!(matches!(err, EmfPlusError::UnknownTag { tag: 9, .. }));
    }

    #[test]
    fn test_flag_only_hints() {
        let mut g = Graphics::default();
        run(&mut g, RecordType::SetAntiAliasMode, 0x0009, &[]).unwrap();
        run(&mut g, RecordType::SetTextRenderingHint, 0x0004, &[]).unwrap();
        run(&mut g, RecordType::SetTextContrast, 0x03E8, &[]).unwrap();
        run(&mut g, RecordType::SetInterpolationMode, 0x0007, &[]).unwrap();
        run(&mut g, RecordType::SetPixelOffsetMode, 0x0004, &[]).unwrap();
        run(&mut g, RecordType::SetCompositingMode, 0x0001, &[]).unwrap();
        run(&mut g, RecordType::SetCompositingQuality, 0x00FF, &[]).unwrap();

        let hints = &g.props.hints;
        assert!(hints.antialias);
        assert_eq!(hints.smoothing_mode, 4);
        assert_eq!(hints.text_rendering_hint, Some(TextRenderingHint::Antialias));
        assert_eq!(hints.text_contrast, 1000);
        assert_eq!(hints.interpolation_mode, Some(InterpolationMode::HighQualityBicubic));
        assert_eq!(hints.pixel_offset_mode, Some(PixelOffsetMode::Half));
        assert_eq!(hints.compositing_mode, Some(CompositingMode::SourceCopy));
        assert_eq!(hints.compositing_quality, None);
    }

    #[test]
    fn test_rendering_origin() {
        let mut g = Graphics::default();
        let mut data = Vec::new();
        data.write_i32::<LittleEndian>(-3).unwrap();
        data.write_i32::<LittleEndian>(7).unwrap();
        run(&mut g, RecordType::SetRenderingOrigin, 0, &data).unwrap();
        assert_eq!(g.props.rendering_origin, (-3, 7));
    }
}
