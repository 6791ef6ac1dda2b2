//! EMF+ record decoder
//!
//! Decodes EMF+ record streams (bare, or embedded in EMF comment records),
//! materializes the graphics objects they define and plays the drawing
//! records onto a [`Canvas`]. [`SvgCanvas`] renders the result as SVG.

#[macro_use]
mod macros;

pub mod canvas;
pub mod codec;
pub mod error;
pub mod geometry;
pub mod graphics;
pub mod image_loader;
pub mod metafile;
pub mod object;
pub mod object_table;
pub mod options;
pub mod properties;
pub mod record;
pub mod shape;
pub mod stream;
pub mod svg_canvas;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use canvas::{Canvas, CanvasOp, RecordingCanvas};
pub use error::{EmfPlusError, EmfPlusResult};
pub use graphics::Graphics;
pub use object::{ApplyMode, GraphicsObject};
pub use object_table::ObjectTable;
pub use options::RenderOptions;
pub use properties::DrawProperties;
pub use record::{Record, RecordHeader, RecordType};
pub use stream::{emfplus_buffers, render_emf_to_svg, render_records_to_svg, Player, RecordIter};
pub use svg_canvas::SvgCanvas;
