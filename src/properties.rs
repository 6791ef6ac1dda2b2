//! Mutable draw-properties bag shared by every record of a render pass

use crate::image_loader::LoadedImage;
use crate::object::brush::{HatchStyle, WrapMode};
use crate::object::font::Font;
use crate::shape::{RegionNode, Shape};
use crate::types::{Color, RectF, Transform};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushStyle {
    Solid,
    Null,
    Hatched,
    Pattern,
    LinearGradient,
}

/// One stop of a gradient colour ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenCap {
    Flat,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenJoin {
    Miter,
    Bevel,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDash {
    Solid,
    UserStyle,
}

/// Stroke style derived from a pen object
#[derive(Debug, Clone, PartialEq)]
pub struct PenStyle {
    pub cap: PenCap,
    pub join: PenJoin,
    pub dash: LineDash,
    pub dashes: Option<Vec<f32>>,
    pub alternate: bool,
    pub geometric: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterOp {
    PatCopy,
    SrcCopy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Transparent,
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextVerticalAlign {
    Top,
    Baseline,
    Bottom,
}

wire_enum! {
    pub enum UnitType: u32 {
        World = 0,
        Display = 1,
        Pixel = 2,
        Point = 3,
        Inch = 4,
        Document = 5,
        Millimeter = 6,
    }
}

impl UnitType {
    /// Device pixels per unit at the given DPI
    pub fn pixels_per_unit(self, dpi: f64) -> f64 {
        match self {
            UnitType::World | UnitType::Display | UnitType::Pixel => 1.0,
            UnitType::Point => dpi / 72.0,
            UnitType::Inch => dpi,
            UnitType::Document => dpi / 300.0,
            UnitType::Millimeter => dpi / 25.4,
        }
    }
}

wire_enum! {
    pub enum TextRenderingHint: u16 {
        SystemDefault = 0,
        SingleBitPerPixelGridFit = 1,
        SingleBitPerPixel = 2,
        AntialiasGridFit = 3,
        Antialias = 4,
        ClearTypeGridFit = 5,
    }
}

wire_enum! {
    pub enum InterpolationMode: u16 {
        Default = 0,
        LowQuality = 1,
        HighQuality = 2,
        Bilinear = 3,
        Bicubic = 4,
        NearestNeighbor = 5,
        HighQualityBilinear = 6,
        HighQualityBicubic = 7,
    }
}

wire_enum! {
    pub enum PixelOffsetMode: u16 {
        Default = 0,
        HighSpeed = 1,
        HighQuality = 2,
        None = 3,
        Half = 4,
    }
}

wire_enum! {
    pub enum CompositingMode: u16 {
        SourceOver = 0,
        SourceCopy = 1,
    }
}

wire_enum! {
    pub enum CompositingQuality: u16 {
        Default = 1,
        HighSpeed = 2,
        HighQuality = 3,
        GammaCorrected = 4,
        AssumeLinear = 5,
    }
}

/// Values set by the flag-only rendering hint records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderingHints {
    pub antialias: bool,
    pub smoothing_mode: u8,
    pub text_rendering_hint: Option<TextRenderingHint>,
    pub text_contrast: u16,
    pub interpolation_mode: Option<InterpolationMode>,
    pub pixel_offset_mode: Option<PixelOffsetMode>,
    pub compositing_mode: Option<CompositingMode>,
    pub compositing_quality: Option<CompositingQuality>,
}

#[derive(Debug, Clone)]
pub struct DrawProperties {
    pub brush_style: BrushStyle,
    pub brush_color: Color,
    pub brush_hatch: Option<HatchStyle>,
    pub brush_transform: Option<Transform>,
    pub brush_rect: Option<RectF>,
    pub brush_wrap_mode: Option<WrapMode>,
    pub brush_colors_h: Option<Vec<ColorStop>>,
    pub brush_colors_v: Option<Vec<ColorStop>>,
    pub brush_bitmap: Option<Rc<LoadedImage>>,
    pub background_color: Color,

    pub pen_color: Color,
    pub pen_width: f64,
    pub pen_style: Option<PenStyle>,

    /// Effective transform (window mapping combined with the world transform)
    pub transform: Transform,
    pub world_transform: Transform,
    pub clip: RegionNode,
    pub path: Option<Shape>,
    pub image: Option<Rc<LoadedImage>>,
    pub font: Option<Font>,

    pub raster_op: RasterOp,
    pub background_mode: BackgroundMode,
    pub text_align: TextAlign,
    pub text_valign: TextVerticalAlign,
    pub text_color: Color,

    pub hints: RenderingHints,
    pub rendering_origin: (i32, i32),
    pub page_unit: UnitType,
    pub page_scale: f64,
}

impl Default for DrawProperties {
    fn default() -> Self {
        Self {
            brush_style: BrushStyle::Solid,
            brush_color: Color::white(),
            brush_hatch: None,
            brush_transform: None,
            brush_rect: None,
            brush_wrap_mode: None,
            brush_colors_h: None,
            brush_colors_v: None,
            brush_bitmap: None,
            background_color: Color::white(),
            pen_color: Color::black(),
            pen_width: 1.0,
            pen_style: None,
            transform: Transform::identity(),
            world_transform: Transform::identity(),
            clip: RegionNode::Infinite,
            path: None,
            image: None,
            font: None,
            raster_op: RasterOp::PatCopy,
            background_mode: BackgroundMode::Opaque,
            text_align: TextAlign::Left,
            text_valign: TextVerticalAlign::Top,
            text_color: Color::black(),
            hints: RenderingHints::default(),
            rendering_origin: (0, 0),
            page_unit: UnitType::Pixel,
            page_scale: 1.0,
        }
    }
}
