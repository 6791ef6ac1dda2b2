//! EmfPlusBrush object and its five brush data layouts
//!
//! A brush record keeps its payload raw. The concrete `BrushData` is decoded
//! from the payload plus any continuation fragments when the brush is
//! applied; a brush that arrived in one piece is also decoded up front so
//! layout errors surface with the object record.

use super::image::Image;
use super::path::Path;
use super::GraphicsVersion;
use crate::codec::{ByteReader, INT_SIZE};
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::image_loader::ImageLoader;
use crate::properties::{BrushStyle, ColorStop, DrawProperties};
use crate::types::{Color, PointF, RectF, Transform};
use log::{debug, warn};
use std::borrow::Cow;
use std::rc::Rc;

/// Cap on the raw payload of a single brush record
pub const MAX_BRUSH_SIZE: usize = 1_000_000;

pub const BRUSH_DATA_PATH: u32 = 0x0000_0001;
pub const BRUSH_DATA_TRANSFORM: u32 = 0x0000_0002;
pub const BRUSH_DATA_PRESET_COLORS: u32 = 0x0000_0004;
pub const BRUSH_DATA_BLEND_FACTORS_H: u32 = 0x0000_0008;
pub const BRUSH_DATA_BLEND_FACTORS_V: u32 = 0x0000_0010;
pub const BRUSH_DATA_FOCUS_SCALES: u32 = 0x0000_0040;
pub const BRUSH_DATA_IS_GAMMA_CORRECTED: u32 = 0x0000_0080;
pub const BRUSH_DATA_DO_NOT_TRANSFORM: u32 = 0x0000_0100;

wire_enum! {
    pub enum BrushType: u32 {
        SolidColor = 0,
        HatchFill = 1,
        TextureFill = 2,
        PathGradient = 3,
        LinearGradient = 4,
    }
}

wire_enum! {
    pub enum WrapMode: u32 {
        Tile = 0,
        TileFlipX = 1,
        TileFlipY = 2,
        TileFlipXY = 3,
        Clamp = 4,
    }
}

wire_enum! {
    pub enum HatchStyle: u32 {
        Horizontal = 0x00,
        Vertical = 0x01,
        ForwardDiagonal = 0x02,
        BackwardDiagonal = 0x03,
        LargeGrid = 0x04,
        DiagonalCross = 0x05,
        Percent05 = 0x06,
        Percent10 = 0x07,
        Percent20 = 0x08,
        Percent25 = 0x09,
        Percent30 = 0x0A,
        Percent40 = 0x0B,
        Percent50 = 0x0C,
        Percent60 = 0x0D,
        Percent70 = 0x0E,
        Percent75 = 0x0F,
        Percent80 = 0x10,
        Percent90 = 0x11,
        LightDownwardDiagonal = 0x12,
        LightUpwardDiagonal = 0x13,
        DarkDownwardDiagonal = 0x14,
        DarkUpwardDiagonal = 0x15,
        WideDownwardDiagonal = 0x16,
        WideUpwardDiagonal = 0x17,
        LightVertical = 0x18,
        LightHorizontal = 0x19,
        NarrowVertical = 0x1A,
        NarrowHorizontal = 0x1B,
        DarkVertical = 0x1C,
        DarkHorizontal = 0x1D,
        DashedDownwardDiagonal = 0x1E,
        DashedUpwardDiagonal = 0x1F,
        DashedHorizontal = 0x20,
        DashedVertical = 0x21,
        SmallConfetti = 0x22,
        LargeConfetti = 0x23,
        ZigZag = 0x24,
        Wave = 0x25,
        DiagonalBrick = 0x26,
        HorizontalBrick = 0x27,
        Weave = 0x28,
        Plaid = 0x29,
        Divot = 0x2A,
        DottedGrid = 0x2B,
        DottedDiamond = 0x2C,
        Shingle = 0x2D,
        Trellis = 0x2E,
        Sphere = 0x2F,
        SmallGrid = 0x30,
        SmallCheckerBoard = 0x31,
        LargeCheckerBoard = 0x32,
        OutlinedDiamond = 0x33,
        SolidDiamond = 0x34,
    }
}

/// Read a wrap mode tag; unknown values are kept as `None`
pub(crate) fn read_wrap_mode(reader: &mut ByteReader<'_>) -> EmfPlusResult<Option<WrapMode>> {
    let raw = reader.read_u32()?;
    let wrap_mode = WrapMode::from_raw(raw);
    if wrap_mode.is_none() {
        warn!("Unknown wrap mode {:#x}", raw);
    }
    Ok(wrap_mode)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolidBrush {
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HatchBrush {
    pub style: Option<HatchStyle>,
    pub fore_color: Color,
    pub back_color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureBrush {
    pub flags: u32,
    pub wrap_mode: Option<WrapMode>,
    pub transform: Option<Transform>,
    pub image: Option<Image>,
}

/// Explicit (position, color) blend
#[derive(Debug, Clone, PartialEq)]
pub struct BlendColors {
    pub positions: Vec<f32>,
    pub colors: Vec<Color>,
}

/// (position, factor) blend between the start and end colours
#[derive(Debug, Clone, PartialEq)]
pub struct BlendFactors {
    pub positions: Vec<f32>,
    pub factors: Vec<f32>,
}

impl BlendColors {
    fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let count = reader.read_count("blend colors", 2 * INT_SIZE)?;
        let positions = (0..count).map(|_| reader.read_f32()).collect::<EmfPlusResult<Vec<_>>>()?;
        let colors = (0..count).map(|_| reader.read_argb()).collect::<EmfPlusResult<Vec<_>>>()?;
        Ok(Self { positions, colors })
    }

    fn stops(&self) -> Vec<ColorStop> {
        self.positions
            .iter()
            .zip(&self.colors)
            .map(|(&position, &color)| ColorStop::new(position, color))
            .collect()
    }
}

impl BlendFactors {
    fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        let count = reader.read_count("blend factors", 2 * INT_SIZE)?;
        let positions = (0..count).map(|_| reader.read_f32()).collect::<EmfPlusResult<Vec<_>>>()?;
        let factors = (0..count).map(|_| reader.read_f32()).collect::<EmfPlusResult<Vec<_>>>()?;
        Ok(Self { positions, factors })
    }

    fn stops(&self, start: Color, end: Color) -> Vec<ColorStop> {
        self.positions
            .iter()
            .zip(&self.factors)
            .map(|(&position, &factor)| ColorStop::new(position, interpolate_color(start, end, f64::from(factor))))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradientBrush {
    pub flags: u32,
    pub wrap_mode: Option<WrapMode>,
    pub rect: RectF,
    pub start_color: Color,
    pub end_color: Color,
    pub transform: Option<Transform>,
    pub preset_colors: Option<BlendColors>,
    pub blend_h: Option<BlendFactors>,
    pub blend_v: Option<BlendFactors>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    Path(Path),
    Points(Vec<PointF>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathGradientBrush {
    pub flags: u32,
    pub wrap_mode: Option<WrapMode>,
    pub center_color: Color,
    pub center_point: PointF,
    pub surrounding_colors: Vec<Color>,
    pub boundary: Option<Boundary>,
    pub transform: Option<Transform>,
    pub preset_colors: Option<BlendColors>,
    pub blend_h: Option<BlendFactors>,
    pub focus_scales: Option<(f32, f32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrushData {
    Solid(SolidBrush),
    Hatch(HatchBrush),
    Texture(TextureBrush),
    PathGradient(PathGradientBrush),
    LinearGradient(LinearGradientBrush),
}

impl BrushData {
    pub fn decode(brush_type: BrushType, data: &[u8]) -> EmfPlusResult<Self> {
        let mut reader = ByteReader::new(data);
        let brush = match brush_type {
            BrushType::SolidColor => BrushData::Solid(SolidBrush {
                color: reader.read_argb()?,
            }),
            BrushType::HatchFill => {
                let raw = reader.read_u32()?;
                let style = HatchStyle::from_raw(raw);
                if style.is_none() {
                    warn!("Unknown hatch style {:#x}", raw);
                }
                BrushData::Hatch(HatchBrush {
                    style,
                    fore_color: reader.read_argb()?,
                    back_color: reader.read_argb()?,
                })
            }
            BrushType::TextureFill => BrushData::Texture(read_texture(&mut reader)?),
            BrushType::PathGradient => BrushData::PathGradient(read_path_gradient(&mut reader)?),
            BrushType::LinearGradient => BrushData::LinearGradient(read_linear_gradient(&mut reader)?),
        };
        Ok(brush)
    }

    /// Apply as the fill brush
    pub fn apply(&self, props: &mut DrawProperties, loader: &dyn ImageLoader) {
        match self {
            BrushData::Solid(solid) => {
                props.brush_color = solid.color;
                props.brush_transform = None;
                props.brush_style = BrushStyle::Solid;
            }
            BrushData::Hatch(hatch) => {
                props.brush_color = hatch.fore_color;
                props.background_color = hatch.back_color;
                props.brush_hatch = hatch.style;
                props.brush_style = BrushStyle::Hatched;
            }
            BrushData::Texture(texture) => {
                props.image = texture
                    .image
                    .as_ref()
                    .and_then(|image| image.load(&[], loader))
                    .map(Rc::new);
                props.brush_bitmap = props.image.clone();
                props.brush_style = BrushStyle::Pattern;
                props.brush_transform = texture.transform;
            }
            BrushData::LinearGradient(gradient) => gradient.apply(props),
            BrushData::PathGradient(_) => {
                debug!("Path gradient brush has no fill effect");
            }
        }
    }

    /// Apply as the colour source of a pen
    pub fn apply_pen(&self, props: &mut DrawProperties) {
        match self {
            BrushData::Solid(solid) => props.pen_color = solid.color,
            BrushData::Hatch(hatch) => props.pen_color = hatch.fore_color,
            _ => debug!("Brush kind has no pen effect"),
        }
    }
}

impl LinearGradientBrush {
    fn apply(&self, props: &mut DrawProperties) {
        props.brush_style = BrushStyle::LinearGradient;
        props.brush_rect = Some(self.rect);
        props.brush_transform = self.transform;
        props.brush_wrap_mode = self.wrap_mode;

        props.brush_colors_h = match (&self.preset_colors, &self.blend_h) {
            (Some(preset), _) => Some(preset.stops()),
            (None, Some(blend)) => Some(blend.stops(self.start_color, self.end_color)),
            (None, None) => None,
        };
        props.brush_colors_v = self
            .blend_v
            .as_ref()
            .map(|blend| blend.stops(self.start_color, self.end_color));

        if self.preset_colors.is_none() && self.blend_h.is_none() && self.blend_v.is_none() {
            props.brush_colors_h = Some(vec![
                ColorStop::new(0.0, self.start_color),
                ColorStop::new(1.0, self.end_color),
            ]);
        }
    }
}

fn read_optional_transform(reader: &mut ByteReader<'_>, flags: u32) -> EmfPlusResult<Option<Transform>> {
    if flags & BRUSH_DATA_TRANSFORM != 0 {
        Ok(Some(reader.read_transform()?))
    } else {
        Ok(None)
    }
}

fn read_texture(reader: &mut ByteReader<'_>) -> EmfPlusResult<TextureBrush> {
    let flags = reader.read_u32()?;
    let wrap_mode = read_wrap_mode(reader)?;
    let transform = read_optional_transform(reader, flags)?;
    let image = if reader.remaining() > 0 {
        Some(Image::read(reader)?)
    } else {
        None
    };
    Ok(TextureBrush {
        flags,
        wrap_mode,
        transform,
        image,
    })
}

fn read_linear_gradient(reader: &mut ByteReader<'_>) -> EmfPlusResult<LinearGradientBrush> {
    let flags = reader.read_u32()?;
    let wrap_mode = read_wrap_mode(reader)?;
    let rect = reader.read_rect_float()?;
    let start_color = reader.read_argb()?;
    let end_color = reader.read_argb()?;
    // reserved1, reserved2
    reader.skip(2 * INT_SIZE)?;
    let transform = read_optional_transform(reader, flags)?;

    let preset = flags & BRUSH_DATA_PRESET_COLORS != 0;
    let blend_h = flags & BRUSH_DATA_BLEND_FACTORS_H != 0;
    let blend_v = flags & BRUSH_DATA_BLEND_FACTORS_V != 0;
    if preset && (blend_h || blend_v) {
        return Err(EmfPlusError::InvalidFlags(format!(
            "linear gradient {:#x} combines preset colors with blend factors",
            flags
        )));
    }

    let preset_colors = if preset { Some(BlendColors::read(reader)?) } else { None };
    let blend_v = if blend_v { Some(BlendFactors::read(reader)?) } else { None };
    let blend_h = if blend_h { Some(BlendFactors::read(reader)?) } else { None };

    Ok(LinearGradientBrush {
        flags,
        wrap_mode,
        rect,
        start_color,
        end_color,
        transform,
        preset_colors,
        blend_h,
        blend_v,
    })
}

fn read_path_gradient(reader: &mut ByteReader<'_>) -> EmfPlusResult<PathGradientBrush> {
    let flags = reader.read_u32()?;
    let wrap_mode = read_wrap_mode(reader)?;
    let center_color = reader.read_argb()?;
    let mut brush = PathGradientBrush {
        flags,
        wrap_mode,
        center_color,
        center_point: PointF::default(),
        surrounding_colors: Vec::new(),
        boundary: None,
        transform: None,
        preset_colors: None,
        blend_h: None,
        focus_scales: None,
    };
    // nothing after the center colour is trusted once the wrap mode is unknown
    if wrap_mode.is_none() {
        return Ok(brush);
    }

    brush.center_point = reader.read_point_float()?;
    let count = reader.read_count("surrounding colors", INT_SIZE)?;
    brush.surrounding_colors = (0..count).map(|_| reader.read_argb()).collect::<EmfPlusResult<Vec<_>>>()?;

    brush.boundary = Some(if flags & BRUSH_DATA_PATH != 0 {
        Boundary::Path(Path::decode_sized(reader)?)
    } else {
        let count = reader.read_count("boundary points", 2 * INT_SIZE)?;
        let points = (0..count)
            .map(|_| reader.read_point_float())
            .collect::<EmfPlusResult<Vec<_>>>()?;
        Boundary::Points(points)
    });

    brush.transform = read_optional_transform(reader, flags)?;

    let preset = flags & BRUSH_DATA_PRESET_COLORS != 0;
    let blend_h = flags & BRUSH_DATA_BLEND_FACTORS_H != 0;
    if preset && blend_h {
        return Err(EmfPlusError::InvalidFlags(format!(
            "path gradient {:#x} combines preset colors with blend factors",
            flags
        )));
    }
    if preset {
        brush.preset_colors = Some(BlendColors::read(reader)?);
    }
    if blend_h {
        brush.blend_h = Some(BlendFactors::read(reader)?);
    }

    if flags & BRUSH_DATA_FOCUS_SCALES != 0 {
        let count = reader.read_u32()?;
        if count != 2 {
            return Err(EmfPlusError::InvalidData(format!("focus scale count {} (expected 2)", count)));
        }
        brush.focus_scales = Some((reader.read_f32()?, reader.read_f32()?));
    }

    Ok(brush)
}

fn srgb_to_linear(component: u8) -> f64 {
    let c = f64::from(component) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f64) -> u8 {
    let v = value.clamp(0.0, 1.0);
    let c = if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (c * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Interpolate in linear (scRGB) space; alpha is interpolated directly
pub fn interpolate_color(start: Color, end: Color, factor: f64) -> Color {
    let mix = |s: u8, e: u8| {
        let s = srgb_to_linear(s);
        linear_to_srgb(s + factor * (srgb_to_linear(e) - s))
    };
    let alpha = f64::from(start.a) + factor * (f64::from(end.a) - f64::from(start.a));
    Color::rgba(
        mix(start.r, end.r),
        mix(start.g, end.g),
        mix(start.b, end.b),
        alpha.round().clamp(0.0, 255.0) as u8,
    )
}

/// EmfPlusBrush object: type tag plus raw brush data
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub version: GraphicsVersion,
    pub brush_type: BrushType,
    pub data: Vec<u8>,
    decoded: Option<BrushData>,
}

impl Brush {
    /// Decode a brush whose window starts with a valid graphics version.
    ///
    /// With `complete` set the brush data is decoded immediately; otherwise
    /// it waits for the continuation fragments.
    pub fn decode(data: &[u8], complete: bool) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let brush = Self::read(&mut reader, complete)?;
        Ok((brush, reader.position()))
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>, complete: bool) -> EmfPlusResult<Self> {
        let version = GraphicsVersion::read(reader)?;
        let tag = reader.read_u32()?;
        let brush_type = BrushType::from_raw(tag).ok_or(EmfPlusError::UnknownTag { what: "brush type", tag })?;
        let data = reader.read_remaining(MAX_BRUSH_SIZE)?;
        let decoded = if complete {
            Some(BrushData::decode(brush_type, &data)?)
        } else {
            None
        };
        Ok(Self {
            version,
            brush_type,
            data,
            decoded,
        })
    }

    /// Brush data decoded from the own payload plus continuation fragments
    pub fn brush_data(&self, fragments: &[Vec<u8>]) -> EmfPlusResult<Cow<'_, BrushData>> {
        if let (Some(decoded), true) = (&self.decoded, fragments.is_empty()) {
            return Ok(Cow::Borrowed(decoded));
        }
        let mut data = self.data.clone();
        for fragment in fragments {
            data.extend_from_slice(fragment);
        }
        Ok(Cow::Owned(BrushData::decode(self.brush_type, &data)?))
    }

    pub fn apply(&self, fragments: &[Vec<u8>], props: &mut DrawProperties, loader: &dyn ImageLoader) -> EmfPlusResult<()> {
        self.brush_data(fragments)?.apply(props, loader);
        Ok(())
    }

    pub fn apply_pen(&self, fragments: &[Vec<u8>], props: &mut DrawProperties) -> EmfPlusResult<()> {
        self.brush_data(fragments)?.apply_pen(props);
        Ok(())
    }
}
