//! Drawing records: fills, strokes, images and positioned text

use crate::canvas::Canvas;
use crate::codec::{ByteReader, PointEncoding, FLAG_COMPRESSED, INT_SIZE, SHORT_SIZE};
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::geometry::parallelogram_transform;
use crate::graphics::Graphics;
use crate::object::ApplyMode;
use crate::properties::{BackgroundMode, BrushStyle, RasterOp, TextAlign, TextVerticalAlign, UnitType};
use crate::shape::Shape;
use crate::types::{Color, PointF, RectF, Transform};
use log::{debug, warn};

/// Record flag: the brush field holds an ARGB literal instead of a brush id
pub const FLAG_SOLID_COLOR: u16 = 0x8000;

const OBJECT_ID_MASK: u16 = 0x00FF;
/// Cap on variable-length payloads of drawing records
const MAX_RECORD_SIZE: usize = 1_000_000;

// DrawDriverString options
pub const DRIVER_STRING_CMAP_LOOKUP: u32 = 0x0001;
pub const DRIVER_STRING_VERTICAL: u32 = 0x0002;
/// Glyphs are laid out from the first position only
pub const DRIVER_STRING_REALIZED_ADVANCE: u32 = 0x0004;
pub const DRIVER_STRING_LIMIT_SUBPIXEL: u32 = 0x0008;

fn object_id(flags: u16) -> u32 {
    u32::from(flags & OBJECT_ID_MASK)
}

/// Fill source of a record: inline colour or brush table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrushSource {
    Color(Color),
    Object(u32),
}

impl BrushSource {
    fn read(flags: u16, reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        if flags & FLAG_SOLID_COLOR != 0 {
            Ok(BrushSource::Color(reader.read_argb()?))
        } else {
            Ok(BrushSource::Object(reader.read_u32()?))
        }
    }

    fn apply(self, graphics: &mut Graphics) -> EmfPlusResult<()> {
        match self {
            BrushSource::Color(color) => {
                graphics.props.brush_style = BrushStyle::Solid;
                graphics.props.brush_color = color;
                Ok(())
            }
            BrushSource::Object(id) => graphics.apply_object(id, ApplyMode::Brush),
        }
    }
}

/// Fill `shape` with the stroke style suspended, so no outline is drawn
fn fill_without_pen(graphics: &mut Graphics, canvas: &mut dyn Canvas, shape: &Shape) {
    let pen_style = graphics.props.pen_style.take();
    canvas.fill(shape, &graphics.props);
    graphics.props.pen_style = pen_style;
}

fn read_rects(flags: u16, reader: &mut ByteReader<'_>) -> EmfPlusResult<Vec<RectF>> {
    let compressed = flags & FLAG_COMPRESSED != 0;
    let rect_size = if compressed { 4 * SHORT_SIZE } else { 4 * INT_SIZE };
    let count = reader.read_count("rect array", rect_size)?;
    (0..count).map(|_| reader.read_rect(compressed)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillRects {
    pub brush: BrushSource,
    pub rects: Vec<RectF>,
}

impl FillRects {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let brush = BrushSource::read(flags, &mut reader)?;
        let rects = read_rects(flags, &mut reader)?;
        Ok((Self { brush, rects }, reader.position()))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        self.brush.apply(graphics)?;
        fill_without_pen(graphics, canvas, &Shape::Rects(self.rects));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRects {
    pub pen_id: u32,
    pub rects: Vec<RectF>,
}

impl DrawRects {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let rects = read_rects(flags, &mut reader)?;
        Ok((
            Self {
                pen_id: object_id(flags),
                rects,
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        graphics.apply_object(self.pen_id, ApplyMode::Pen)?;
        for rect in self.rects {
            canvas.draw(&Shape::Rects(vec![rect]), &graphics.props);
        }
        Ok(())
    }
}

/// Fill the region or path object selected by the record flags
fn fill_object(
    graphics: &mut Graphics,
    canvas: &mut dyn Canvas,
    brush: BrushSource,
    object_id: u32,
) -> EmfPlusResult<()> {
    brush.apply(graphics)?;
    graphics.apply_object(object_id, ApplyMode::Object)?;
    match graphics.props.path.clone() {
        Some(shape) => fill_without_pen(graphics, canvas, &shape),
        None => debug!("Fill without a current path"),
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillRegion {
    pub brush: BrushSource,
    pub region_id: u32,
}

impl FillRegion {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let brush = BrushSource::read(flags, &mut reader)?;
        Ok((
            Self {
                brush,
                region_id: object_id(flags),
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        fill_object(graphics, canvas, self.brush, self.region_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPath {
    pub brush: BrushSource,
    pub path_id: u32,
}

impl FillPath {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let brush = BrushSource::read(flags, &mut reader)?;
        Ok((
            Self {
                brush,
                path_id: object_id(flags),
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        fill_object(graphics, canvas, self.brush, self.path_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawPath {
    pub pen_id: u32,
    pub path_id: u32,
}

impl DrawPath {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let pen_id = reader.read_u32()?;
        Ok((
            Self {
                pen_id,
                path_id: object_id(flags),
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        graphics.apply_object(self.pen_id, ApplyMode::Pen)?;
        graphics.apply_object(self.path_id, ApplyMode::Object)?;
        if let Some(shape) = &graphics.props.path {
            canvas.draw(shape, &graphics.props);
        }
        Ok(())
    }
}

fn read_src_unit(reader: &mut ByteReader<'_>) -> EmfPlusResult<i32> {
    let unit = reader.read_i32()?;
    if u32::try_from(unit).ok().and_then(UnitType::from_raw) != Some(UnitType::Pixel) {
        warn!("Image source unit {} is not pixels", unit);
    }
    Ok(unit)
}

/// Apply the optional image attributes and the image object of an image
/// record. Attributes are only looked up when their slot is occupied.
fn apply_image_objects(graphics: &mut Graphics, attributes_id: u32, image_id: u32) -> EmfPlusResult<()> {
    if graphics.objects.find(attributes_id)?.is_some() {
        graphics.apply_object(attributes_id, ApplyMode::Object)?;
    } else {
        debug!("No image attributes in slot {}", attributes_id);
    }
    graphics.apply_object(image_id, ApplyMode::Object)
}

/// Draw the current image with raster op and background mode forced to
/// source-copy/transparent, restoring both (and the transform) afterwards
fn draw_current_image(
    graphics: &mut Graphics,
    canvas: &mut dyn Canvas,
    src: &RectF,
    dst: &RectF,
    transform: Option<&Transform>,
) {
    let Some(image) = graphics.props.image.clone() else {
        debug!("Image record without a loadable image");
        return;
    };
    let props = &mut graphics.props;
    let saved = (props.raster_op, props.background_mode, props.transform);
    props.raster_op = RasterOp::SrcCopy;
    props.background_mode = BackgroundMode::Transparent;
    if let Some(transform) = transform {
        props.transform = props.transform.concatenate(transform);
    }
    canvas.draw_image(&image, src, dst, props);
    (props.raster_op, props.background_mode, props.transform) = saved;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawImage {
    pub image_id: u32,
    pub attributes_id: u32,
    pub src_unit: i32,
    pub src_rect: RectF,
    pub dest_rect: RectF,
}

impl DrawImage {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let attributes_id = reader.read_u32()?;
        let src_unit = read_src_unit(&mut reader)?;
        let src_rect = reader.read_rect_float()?;
        let dest_rect = reader.read_rect(flags & FLAG_COMPRESSED != 0)?;
        Ok((
            Self {
                image_id: object_id(flags),
                attributes_id,
                src_unit,
                src_rect,
                dest_rect,
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        apply_image_objects(graphics, self.attributes_id, self.image_id)?;
        draw_current_image(graphics, canvas, &self.src_rect, &self.dest_rect, None);
        Ok(())
    }
}

/// Image drawn into a parallelogram
#[derive(Debug, Clone, PartialEq)]
pub struct DrawImagePoints {
    pub image_id: u32,
    pub attributes_id: u32,
    pub src_unit: i32,
    pub src_rect: RectF,
    /// Lower-left, lower-right and upper-left corner, in wire order
    pub points: [PointF; 3],
    /// Maps the source rectangle onto the parallelogram
    pub transform: Transform,
}

impl DrawImagePoints {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let attributes_id = reader.read_u32()?;
        let src_unit = read_src_unit(&mut reader)?;
        let src_rect = reader.read_rect_float()?;
        let count = reader.read_u32()?;
        if count != 3 {
            return Err(EmfPlusError::InvalidData(format!(
                "parallelogram needs 3 points, found {}",
                count
            )));
        }
        let mut points = PointEncoding::from_flags(flags).reader();
        let points = [
            points.next(&mut reader)?,
            points.next(&mut reader)?,
            points.next(&mut reader)?,
        ];
        let transform = parallelogram_transform(&src_rect, &points)?;
        Ok((
            Self {
                image_id: object_id(flags),
                attributes_id,
                src_unit,
                src_rect,
                points,
                transform,
            },
            reader.position(),
        ))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        apply_image_objects(graphics, self.attributes_id, self.image_id)?;
        // the parallelogram transform already maps src onto the destination
        draw_current_image(graphics, canvas, &self.src_rect, &self.src_rect, Some(&self.transform));
        Ok(())
    }
}

/// Text with explicit glyph positions
#[derive(Debug, Clone, PartialEq)]
pub struct DrawDriverString {
    pub font_id: u32,
    pub brush: BrushSource,
    pub options: u32,
    /// One UTF-16 unit per glyph, parallel to `positions`
    pub glyphs: Vec<u16>,
    pub positions: Vec<PointF>,
    pub transform: Option<Transform>,
}

impl DrawDriverString {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let brush = BrushSource::read(flags, &mut reader)?;
        let options = reader.read_u32()?;
        let matrix_present = reader.read_u32()?;
        let glyph_count = reader.read_count("driver string glyphs", SHORT_SIZE)?;

        let raw = reader.read_bytes(glyph_count * SHORT_SIZE, MAX_RECORD_SIZE)?;
        let glyphs: Vec<u16> = raw.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();

        // every glyph has a position on the wire, even with realized advance
        let positions = PointEncoding::Float.read_points(&mut reader, glyph_count)?;
        let transform = if matrix_present != 0 {
            Some(reader.read_transform()?)
        } else {
            None
        };

        Ok((
            Self {
                font_id: object_id(flags),
                brush,
                options,
                glyphs,
                positions,
                transform,
            },
            reader.position(),
        ))
    }

    pub fn is_realized_advance(&self) -> bool {
        self.options & DRIVER_STRING_REALIZED_ADVANCE != 0
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        graphics.props.text_align = TextAlign::Left;
        graphics.props.text_valign = TextVerticalAlign::Baseline;
        graphics.apply_object(self.font_id, ApplyMode::Object)?;
        match self.brush {
            BrushSource::Color(color) => graphics.props.text_color = color,
            BrushSource::Object(id) => {
                graphics.apply_object(id, ApplyMode::Brush)?;
                graphics.props.text_color = graphics.props.brush_color;
            }
        }

        let saved_transform = graphics.props.transform;
        if let Some(transform) = &self.transform {
            graphics.props.transform = saved_transform.concatenate(transform);
        }
        if self.is_realized_advance() {
            if let Some(origin) = self.positions.first() {
                canvas.draw_string(&String::from_utf16_lossy(&self.glyphs), *origin, &graphics.props);
            }
        } else {
            for (glyph, origin) in self.glyphs.iter().zip(&self.positions) {
                let text = String::from_utf16_lossy(std::slice::from_ref(glyph));
                canvas.draw_string(&text, *origin, &graphics.props);
            }
        }
        graphics.props.transform = saved_transform;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CanvasOp, RecordingCanvas};
    use crate::object::brush::tests::solid_brush_bytes;
    use crate::object::image::tests::bitmap_bytes;
    use crate::object::path::tests::path_bytes;
    use crate::object::pen::tests::pen_bytes;
    use crate::properties::{LineDash, PenCap, PenJoin, PenStyle};
    use crate::record::tests::play;
    use crate::record::RecordType;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn define(g: &mut Graphics, object_type: u16, slot: u16, data: &[u8]) {
        let mut canvas = RecordingCanvas::new();
        play(g, &mut canvas, RecordType::Object.raw(), (object_type << 8) | slot, data).unwrap();
    }

    fn compressed_rect_record(brush: u32, rect: [i16; 4]) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(brush).unwrap();
        data.write_u32::<LittleEndian>(1).unwrap();
        for v in rect {
            data.write_i16::<LittleEndian>(v).unwrap();
        }
        data
    }

    fn solid_pen_style() -> PenStyle {
        PenStyle {
            cap: PenCap::Flat,
            join: PenJoin::Round,
            dash: LineDash::Solid,
            dashes: None,
            alternate: false,
            geometric: false,
        }
    }

    #[test]
    fn test_fill_rects_with_brush_object() {
        let mut g = Graphics::default();
        define(&mut g, 1, 0, &solid_brush_bytes(0xFFFF_0000));

        let mut canvas = RecordingCanvas::new();
        let data = compressed_rect_record(0, [0, 0, 5, 5]);
        play(&mut g, &mut canvas, RecordType::FillRects.raw(), FLAG_COMPRESSED, &data).unwrap();

        let fills: Vec<_> = canvas.fills().collect();
        assert_eq!(fills.len(), 1);
        let (shape, props) = fills[0];
        assert_eq!(*shape, Shape::Rects(vec![RectF::new(0.0, 0.0, 5.0, 5.0)]));
        assert_eq!(props.brush_color, Color::rgba(255, 0, 0, 255));
        assert!(g.objects.get(0).is_ok());
    }

    #[test]
    fn test_fill_rects_inline_color_suspends_pen() {
        let mut g = Graphics::default();
        g.props.pen_style = Some(solid_pen_style());

        let mut canvas = RecordingCanvas::new();
        let data = compressed_rect_record(0xFF00_FF00, [1, 2, 3, 4]);
        play(
            &mut g,
            &mut canvas,
            RecordType::FillRects.raw(),
            FLAG_COMPRESSED | FLAG_SOLID_COLOR,
            &data,
        )
        .unwrap();

        let (_, props) = canvas.fills().next().unwrap();
        assert_eq!(props.brush_color, Color::rgba(0, 255, 0, 255));
        assert_eq!(props.brush_style, BrushStyle::Solid);
        assert!(props.pen_style.is_none());
        assert_eq!(g.props.pen_style, Some(solid_pen_style()));
    }

    #[test]
    fn test_fill_rects_missing_brush() {
        let mut g = Graphics::default();
        let mut canvas = RecordingCanvas::new();
        let data = compressed_rect_record(7, [0, 0, 1, 1]);
        let err = play(&mut g, &mut canvas, RecordType::FillRects.raw(), FLAG_COMPRESSED, &data).unwrap_err();
        assert!(matches!(err, EmfPlusError::MissingObject(7)));
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_float_rects_truncated() {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(2).unwrap();
        data.write_f32::<LittleEndian>(1.0).unwrap();
        assert!(matches!(
            FillRects::decode(0, &data),
            Err(EmfPlusError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_draw_path_strokes_with_pen() {
        let mut g = Graphics::default();
        define(&mut g, 2, 1, &pen_bytes(0, 3.0, &[], 0xFF00_00FF));
        define(&mut g, 3, 2, &path_bytes(0, &[(0.0, 0.0), (10.0, 0.0)], &[0x00, 0x01]));

        let mut canvas = RecordingCanvas::new();
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(1).unwrap();
        play(&mut g, &mut canvas, RecordType::DrawPath.raw(), 0x0002, &data).unwrap();

        let strokes: Vec<_> = canvas.strokes().collect();
        assert_eq!(strokes.len(), 1);
        let (shape, props) = strokes[0];
        assert!(matches!(shape, Shape::Path(path) if path.segments.len() == 2));
        assert_eq!(props.pen_width, 3.0);
        assert_eq!(props.pen_color, Color::rgba(0, 0, 255, 255));
    }

    #[test]
    fn test_draw_rects_strokes_each_rect() {
        let mut g = Graphics::default();
        define(&mut g, 2, 4, &pen_bytes(0, 1.0, &[], 0xFF00_0000));

        let mut canvas = RecordingCanvas::new();
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(2).unwrap();
        for v in [0i16, 0, 1, 1, 5, 5, 2, 2] {
            data.write_i16::<LittleEndian>(v).unwrap();
        }
        play(&mut g, &mut canvas, RecordType::DrawRects.raw(), FLAG_COMPRESSED | 4, &data).unwrap();
        assert_eq!(canvas.strokes().count(), 2);
    }

    fn image_points_record(count: u32, points: &[(f32, f32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        for v in [0.0f32, 0.0, 1.0, 1.0] {
            data.write_f32::<LittleEndian>(v).unwrap();
        }
        data.write_u32::<LittleEndian>(count).unwrap();
        for (x, y) in points {
            data.write_f32::<LittleEndian>(*x).unwrap();
            data.write_f32::<LittleEndian>(*y).unwrap();
        }
        data
    }

    #[test]
    fn test_draw_image_points_wrong_count() {
        let data = image_points_record(4, &[(0.0, 0.0); 4]);
        assert!(matches!(
            DrawImagePoints::decode(0, &data),
            Err(EmfPlusError::InvalidData(_))
        ));
    }

    #[test]
    fn test_draw_image_points_restores_state() {
        let mut g = Graphics::default();
        define(&mut g, 5, 3, &bitmap_bytes(0, 0x0026_200A, 1, 1, &[0, 0, 255, 255]));

        let mut canvas = RecordingCanvas::new();
        let data = image_points_record(3, &[(10.0, 40.0), (30.0, 40.0), (10.0, 20.0)]);
        play(&mut g, &mut canvas, RecordType::DrawImagePoints.raw(), 0x0003, &data).unwrap();

        match &canvas.ops[..] {
            [CanvasOp::Image { src, dst, props, image }] => {
                assert_eq!(src, dst);
                assert_eq!((image.width, image.height), (1, 1));
                assert_eq!(props.raster_op, RasterOp::SrcCopy);
                assert_eq!(props.background_mode, BackgroundMode::Transparent);
                assert_eq!(props.transform.apply(PointF::new(0.0, 0.0)), PointF::new(10.0, 40.0));
                assert_eq!(props.transform.apply(PointF::new(0.0, 1.0)), PointF::new(10.0, 20.0));
            }
            other => panic!("unexpected ops {:?}", other),
        }
        assert_eq!(g.props.raster_op, RasterOp::PatCopy);
        assert_eq!(g.props.background_mode, BackgroundMode::Opaque);
        assert!(g.props.transform.is_identity());
    }

    #[test]
    fn test_draw_image_with_unloadable_payload_draws_nothing() {
        let mut g = Graphics::default();
        define(&mut g, 5, 0, &bitmap_bytes(1, 0, 0, 0, &[1, 2, 3, 4]));

        let mut canvas = RecordingCanvas::new();
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(9).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        for v in [0.0f32, 0.0, 1.0, 1.0] {
            data.write_f32::<LittleEndian>(v).unwrap();
        }
        for v in [0i16, 0, 8, 8] {
            data.write_i16::<LittleEndian>(v).unwrap();
        }
        play(&mut g, &mut canvas, RecordType::DrawImage.raw(), FLAG_COMPRESSED, &data).unwrap();
        assert!(canvas.ops.is_empty());
    }

    fn driver_string_record(options: u32, text: &str, positions: &[(f32, f32)]) -> Vec<u8> {
        let units: Vec<u16> = text.encode_utf16().collect();
        driver_string_units(options, &units, positions)
    }

    fn driver_string_units(options: u32, units: &[u16], positions: &[(f32, f32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(0xFF11_2233).unwrap();
        data.write_u32::<LittleEndian>(options).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(units.len() as u32).unwrap();
        for unit in units {
            data.write_u16::<LittleEndian>(*unit).unwrap();
        }
        for (x, y) in positions {
            data.write_f32::<LittleEndian>(*x).unwrap();
            data.write_f32::<LittleEndian>(*y).unwrap();
        }
        data
    }

    fn font_bytes() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_f32::<LittleEndian>(12.0).unwrap();
        buf.write_u32::<LittleEndian>(3).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(5).unwrap();
        for unit in "Arial".encode_utf16() {
            buf.write_u16::<LittleEndian>(unit).unwrap();
        }
        buf
    }

    #[test]
    fn test_driver_string_per_glyph() {
        let mut g = Graphics::default();
        define(&mut g, 6, 1, &font_bytes());

        let mut canvas = RecordingCanvas::new();
        let data = driver_string_record(0, "Hi", &[(1.0, 2.0), (7.0, 2.0)]);
        play(&mut g, &mut canvas, RecordType::DrawDriverString.raw(), FLAG_SOLID_COLOR | 1, &data).unwrap();

        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 2);
        assert_eq!((texts[0].0, texts[0].1), ("H", PointF::new(1.0, 2.0)));
        assert_eq!((texts[1].0, texts[1].1), ("i", PointF::new(7.0, 2.0)));
        let props = texts[0].2;
        assert_eq!(props.text_color, Color::from_argb(0xFF11_2233));
        assert_eq!(props.text_valign, TextVerticalAlign::Baseline);
        assert_eq!(props.font.as_ref().map(|f| f.family.as_str()), Some("Arial"));
    }

    #[test]
    fn test_driver_string_realized_advance() {
        let mut g = Graphics::default();
        define(&mut g, 6, 1, &font_bytes());

        let mut canvas = RecordingCanvas::new();
        let data = driver_string_record(DRIVER_STRING_REALIZED_ADVANCE, "Hi", &[(1.0, 2.0), (0.0, 0.0)]);
        play(&mut g, &mut canvas, RecordType::DrawDriverString.raw(), FLAG_SOLID_COLOR | 1, &data).unwrap();

        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 1);
        assert_eq!((texts[0].0, texts[0].1), ("Hi", PointF::new(1.0, 2.0)));
    }

    #[test]
    fn test_driver_string_surrogate_units_keep_positions() {
        let mut g = Graphics::default();
        define(&mut g, 6, 1, &font_bytes());

        let mut canvas = RecordingCanvas::new();
        let units = [0xD834, 0xDD1E, 0x0041];
        let data = driver_string_units(0, &units, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        play(&mut g, &mut canvas, RecordType::DrawDriverString.raw(), FLAG_SOLID_COLOR | 1, &data).unwrap();

        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1].1, PointF::new(10.0, 0.0));
        assert_eq!((texts[2].0, texts[2].1), ("A", PointF::new(20.0, 0.0)));
    }

    #[test]
    fn test_driver_string_realized_advance_joins_surrogates() {
        let mut g = Graphics::default();
        define(&mut g, 6, 1, &font_bytes());

        let mut canvas = RecordingCanvas::new();
        let units = [0xD834, 0xDD1E, 0x0041];
        let data = driver_string_units(DRIVER_STRING_REALIZED_ADVANCE, &units, &[(3.0, 4.0), (0.0, 0.0), (0.0, 0.0)]);
        play(&mut g, &mut canvas, RecordType::DrawDriverString.raw(), FLAG_SOLID_COLOR | 1, &data).unwrap();

        let texts: Vec<_> = canvas.texts().collect();
        assert_eq!(texts.len(), 1);
        assert_eq!((texts[0].0, texts[0].1), ("\u{1D11E}A", PointF::new(3.0, 4.0)));
    }

    #[test]
    fn test_driver_string_glyph_cap() {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(0xFF00_0000).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>((MAX_RECORD_SIZE / 2 + 1) as u32).unwrap();
        data.resize(data.len() + MAX_RECORD_SIZE + 2, 0);
        assert!(matches!(
            DrawDriverString::decode(FLAG_SOLID_COLOR, &data),
            Err(EmfPlusError::LimitExceeded { .. })
        ));
    }
}
