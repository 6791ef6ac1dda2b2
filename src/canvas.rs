//! Rendering backend interface and a display-list implementation

use crate::image_loader::LoadedImage;
use crate::properties::DrawProperties;
use crate::shape::Shape;
use crate::types::{PointF, RectF};
use std::rc::Rc;

/// Drawing backend driven by the record decoders.
///
/// Every call receives the draw properties in effect for that operation.
/// `fill` strokes the outline as well when a pen style is active.
pub trait Canvas {
    fn fill(&mut self, shape: &Shape, props: &DrawProperties);

    fn draw(&mut self, shape: &Shape, props: &DrawProperties);

    /// Draw the `src` part of `image` scaled into `dst`
    fn draw_image(&mut self, image: &Rc<LoadedImage>, src: &RectF, dst: &RectF, props: &DrawProperties);

    fn draw_string(&mut self, text: &str, origin: PointF, props: &DrawProperties);
}

/// One captured canvas call
#[derive(Debug, Clone)]
pub enum CanvasOp {
    Fill {
        shape: Shape,
        props: DrawProperties,
    },
    Draw {
        shape: Shape,
        props: DrawProperties,
    },
    Image {
        image: Rc<LoadedImage>,
        src: RectF,
        dst: RectF,
        props: DrawProperties,
    },
    Text {
        text: String,
        origin: PointF,
        props: DrawProperties,
    },
}

/// Canvas that records every call as a display list
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fills(&self) -> impl Iterator<Item = (&Shape, &DrawProperties)> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Fill { shape, props } => Some((shape, props)),
            _ => None,
        })
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&Shape, &DrawProperties)> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Draw { shape, props } => Some((shape, props)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, PointF, &DrawProperties)> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Text { text, origin, props } => Some((text.as_str(), *origin, props)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn fill(&mut self, shape: &Shape, props: &DrawProperties) {
        self.ops.push(CanvasOp::Fill {
            shape: shape.clone(),
            props: props.clone(),
        });
    }

    fn draw(&mut self, shape: &Shape, props: &DrawProperties) {
        self.ops.push(CanvasOp::Draw {
            shape: shape.clone(),
            props: props.clone(),
        });
    }

    fn draw_image(&mut self, image: &Rc<LoadedImage>, src: &RectF, dst: &RectF, props: &DrawProperties) {
        self.ops.push(CanvasOp::Image {
            image: Rc::clone(image),
            src: *src,
            dst: *dst,
            props: props.clone(),
        });
    }

    fn draw_string(&mut self, text: &str, origin: PointF, props: &DrawProperties) {
        self.ops.push(CanvasOp::Text {
            text: text.to_string(),
            origin,
            props: props.clone(),
        });
    }
}
