//! SVG backend for the record player

use crate::canvas::Canvas;
use crate::image_loader::LoadedImage;
use crate::properties::{BrushStyle, ColorStop, DrawProperties, PenCap, PenJoin, TextAlign, TextVerticalAlign};
use crate::shape::{RegionNode, Shape};
use crate::types::{PointF, RectF, Transform};
use std::rc::Rc;
use svg::node::element::{
    ClipPath, Definitions, Element, Group, Image, LinearGradient, Path, Pattern, Stop, Text, SVG,
};
use svg::node::Text as TextNode;
use svg::Document;

const DEFAULT_FONT_FAMILY: &str = "Arial";
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Canvas that collects SVG elements and serializes them with `finish`
pub struct SvgCanvas {
    width: u32,
    height: u32,
    definitions: Vec<Element>,
    elements: Vec<Element>,
    next_id: usize,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            definitions: Vec::new(),
            elements: Vec::new(),
            next_id: 0,
        }
    }

    /// Number of drawn elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn new_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    fn gradient(&mut self, stops: &[ColorStop], rect: &RectF, transform: Option<&Transform>) -> String {
        let id = self.new_id("gradient");
        let mut gradient = LinearGradient::new()
            .set("id", id.as_str())
            .set("gradientUnits", "userSpaceOnUse")
            .set("x1", rect.x)
            .set("y1", rect.y)
            .set("x2", rect.x + rect.width)
            .set("y2", rect.y);
        if let Some(transform) = transform {
            gradient = gradient.set("gradientTransform", transform.to_svg());
        }
        for stop in stops {
            gradient = gradient.add(
                Stop::new()
                    .set("offset", f64::from(stop.position))
                    .set("stop-color", stop.color.to_css()),
            );
        }
        self.definitions.push(gradient.into());
        format!("url(#{})", id)
    }

    fn pattern(&mut self, image: &LoadedImage, transform: Option<&Transform>) -> String {
        let id = self.new_id("pattern");
        let mut pattern = Pattern::new()
            .set("id", id.as_str())
            .set("patternUnits", "userSpaceOnUse")
            .set("width", image.width)
            .set("height", image.height);
        if let Some(transform) = transform {
            pattern = pattern.set("patternTransform", transform.to_svg());
        }
        pattern = pattern.add(
            Image::new()
                .set("width", image.width)
                .set("height", image.height)
                .set("href", image.to_data_uri()),
        );
        self.definitions.push(pattern.into());
        format!("url(#{})", id)
    }

    fn fill_paint(&mut self, props: &DrawProperties) -> String {
        match props.brush_style {
            BrushStyle::Null => "none".to_string(),
            BrushStyle::LinearGradient => match (&props.brush_colors_h, &props.brush_rect) {
                (Some(stops), Some(rect)) if !stops.is_empty() => {
                    self.gradient(stops, rect, props.brush_transform.as_ref())
                }
                _ => props.brush_color.to_css(),
            },
            BrushStyle::Pattern => match &props.brush_bitmap {
                Some(image) => self.pattern(image, props.brush_transform.as_ref()),
                None => props.brush_color.to_css(),
            },
            // hatch patterns are approximated by their fore colour
            BrushStyle::Solid | BrushStyle::Hatched => props.brush_color.to_css(),
        }
    }

    fn clip_reference(&mut self, clip: &RegionNode) -> Option<String> {
        if clip.is_infinite() {
            return None;
        }
        let id = self.new_id("clip");
        let clip_path = ClipPath::new()
            .set("id", id.as_str())
            .set("clipPathUnits", "userSpaceOnUse")
            .add(Path::new().set("d", clip.outline().to_svg_data()));
        self.definitions.push(clip_path.into());
        Some(format!("url(#{})", id))
    }

    /// Wrap `element` in a group carrying the transform and clip of `props`
    fn push(&mut self, element: Element, props: &DrawProperties) {
        let clip = self.clip_reference(&props.clip);
        if props.transform.is_identity() && clip.is_none() {
            self.elements.push(element);
            return;
        }
        let mut group = Group::new();
        if !props.transform.is_identity() {
            group = group.set("transform", props.transform.to_svg());
        }
        if let Some(clip) = clip {
            group = group.set("clip-path", clip);
        }
        self.elements.push(group.add(element).into());
    }

    fn stroke(path: Path, props: &DrawProperties) -> Path {
        let mut path = path
            .set("stroke", props.pen_color.to_css())
            .set("stroke-width", props.pen_width);
        if let Some(style) = &props.pen_style {
            let cap = match style.cap {
                PenCap::Flat => "butt",
                PenCap::Round => "round",
                PenCap::Square => "square",
            };
            let join = match style.join {
                PenJoin::Miter => "miter",
                PenJoin::Bevel => "bevel",
                PenJoin::Round => "round",
            };
            path = path.set("stroke-linecap", cap).set("stroke-linejoin", join);
            if let Some(dashes) = &style.dashes {
                // dash lengths are multiples of the pen width
                let pattern: Vec<String> = dashes
                    .iter()
                    .map(|d| (f64::from(*d) * props.pen_width).to_string())
                    .collect();
                path = path.set("stroke-dasharray", pattern.join(" "));
            }
        }
        path
    }

    pub fn finish(self) -> String {
        let mut document = Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));
        if !self.definitions.is_empty() {
            let mut defs = Definitions::new();
            for definition in self.definitions {
                defs = defs.add(definition);
            }
            document = document.add(defs);
        }
        for element in self.elements {
            document = document.add(element);
        }
        document.to_string()
    }
}

impl Canvas for SvgCanvas {
    fn fill(&mut self, shape: &Shape, props: &DrawProperties) {
        let paint = self.fill_paint(props);
        let mut path = Path::new().set("d", shape.to_path().to_svg_data()).set("fill", paint);
        if props.pen_style.is_some() {
            path = Self::stroke(path, props);
        }
        self.push(path.into(), props);
    }

    fn draw(&mut self, shape: &Shape, props: &DrawProperties) {
        let path = Path::new().set("d", shape.to_path().to_svg_data()).set("fill", "none");
        self.push(Self::stroke(path, props).into(), props);
    }

    fn draw_image(&mut self, image: &Rc<LoadedImage>, src: &RectF, dst: &RectF, props: &DrawProperties) {
        let picture = Image::new()
            .set("width", image.width)
            .set("height", image.height)
            .set("preserveAspectRatio", "none")
            .set("href", image.to_data_uri());
        // the viewport crops the source rectangle and scales it into dst
        let viewport = SVG::new()
            .set("x", dst.x)
            .set("y", dst.y)
            .set("width", dst.width)
            .set("height", dst.height)
            .set("viewBox", format!("{} {} {} {}", src.x, src.y, src.width, src.height))
            .set("preserveAspectRatio", "none")
            .add(picture);
        self.push(viewport.into(), props);
    }

    fn draw_string(&mut self, text: &str, origin: PointF, props: &DrawProperties) {
        let (family, size) = match &props.font {
            Some(font) if !font.family.is_empty() => (font.family.as_str(), f64::from(font.em_size)),
            Some(font) => (DEFAULT_FONT_FAMILY, f64::from(font.em_size)),
            None => (DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE),
        };
        let anchor = match props.text_align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let baseline = match props.text_valign {
            TextVerticalAlign::Top => "hanging",
            TextVerticalAlign::Baseline => "alphabetic",
            TextVerticalAlign::Bottom => "text-after-edge",
        };
        let mut element = Text::new()
            .set("x", origin.x)
            .set("y", origin.y)
            .set("font-family", family)
            .set("font-size", size)
            .set("text-anchor", anchor)
            .set("dominant-baseline", baseline)
            .set("fill", props.text_color.to_css());
        if let Some(font) = &props.font {
            if font.is_bold() {
                element = element.set("font-weight", "bold");
            }
            if font.is_italic() {
                element = element.set("font-style", "italic");
            }
        }
        self.push(element.add(TextNode::new(text)).into(), props);
    }
}
