//! Renderable geometry: paths, clip/region trees and fill areas

use crate::types::{PointF, RectF};
use std::fmt::Write;

/// One drawing command of a renderable path
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    MoveTo(PointF),
    LineTo(PointF),
    CurveTo(PointF, PointF, PointF),
    Close,
}

/// Renderable path built from an EMF+ path object or from rectangles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathGeometry {
    pub segments: Vec<PathSegment>,
}

impl PathGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, point: PointF) {
        self.segments.push(PathSegment::MoveTo(point));
    }

    pub fn line_to(&mut self, point: PointF) {
        self.segments.push(PathSegment::LineTo(point));
    }

    pub fn curve_to(&mut self, c1: PointF, c2: PointF, end: PointF) {
        self.segments.push(PathSegment::CurveTo(c1, c2, end));
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a closed rectangle outline
    pub fn add_rect(&mut self, rect: &RectF) {
        self.move_to(PointF::new(rect.x, rect.y));
        self.line_to(PointF::new(rect.x + rect.width, rect.y));
        self.line_to(PointF::new(rect.x + rect.width, rect.y + rect.height));
        self.line_to(PointF::new(rect.x, rect.y + rect.height));
        self.close();
    }

    pub fn from_rects(rects: &[RectF]) -> Self {
        let mut path = Self::new();
        for rect in rects {
            path.add_rect(rect);
        }
        path
    }

    /// SVG path `d` attribute
    pub fn to_svg_data(&self) -> String {
        let mut d = String::new();
        for segment in &self.segments {
            if !d.is_empty() {
                d.push(' ');
            }
            // writing to a String cannot fail
            let _ = match segment {
                PathSegment::MoveTo(p) => write!(d, "M {} {}", p.x, p.y),
                PathSegment::LineTo(p) => write!(d, "L {} {}", p.x, p.y),
                PathSegment::CurveTo(c1, c2, p) => {
                    write!(d, "C {} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathSegment::Close => write!(d, "Z"),
            };
        }
        d
    }
}

wire_enum! {
    /// How a new clip shape is combined with the current clip
    pub enum CombineMode: u32 {
        Replace = 0,
        Intersect = 1,
        Union = 2,
        Xor = 3,
        Exclude = 4,
        Complement = 5,
    }
}

/// Region tree, used both for region objects and for the clip
#[derive(Debug, Clone, PartialEq)]
pub enum RegionNode {
    Combine {
        mode: CombineMode,
        left: Box<RegionNode>,
        right: Box<RegionNode>,
    },
    Rect(RectF),
    Path(PathGeometry),
    Empty,
    Infinite,
}

impl RegionNode {
    /// Combine `self` (the current area) with `other`
    pub fn combine(self, mode: CombineMode, other: RegionNode) -> RegionNode {
        match mode {
            CombineMode::Replace => other,
            _ => RegionNode::Combine {
                mode,
                left: Box::new(self),
                right: Box::new(other),
            },
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, RegionNode::Infinite)
    }

    /// Outline approximation of the covered area.
    ///
    /// Leaves on the subtracted side of Exclude and Complement are dropped,
    /// everything else is unioned. Infinite leaves have no outline.
    pub fn outline(&self) -> PathGeometry {
        let mut path = PathGeometry::new();
        self.collect_outline(&mut path);
        path
    }

    fn collect_outline(&self, path: &mut PathGeometry) {
        match self {
            RegionNode::Rect(rect) => path.add_rect(rect),
            RegionNode::Path(geometry) => path.segments.extend(geometry.segments.iter().cloned()),
            RegionNode::Empty | RegionNode::Infinite => {}
            RegionNode::Combine { mode, left, right } => match mode {
                CombineMode::Exclude => left.collect_outline(path),
                CombineMode::Complement => right.collect_outline(path),
                _ => {
                    left.collect_outline(path);
                    right.collect_outline(path);
                }
            },
        }
    }
}

/// Area handed to the canvas by fill and draw records
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rects(Vec<RectF>),
    Path(PathGeometry),
    Region(RegionNode),
}

impl Shape {
    pub fn to_path(&self) -> PathGeometry {
        match self {
            Shape::Rects(rects) => PathGeometry::from_rects(rects),
            Shape::Path(path) => path.clone(),
            Shape::Region(region) => region.outline(),
        }
    }
}
