//! EMF+ graphics objects
//!
//! `decode_object` turns the payload of an Object record into either a
//! complete `GraphicsObject` or a continuation fragment for an object that
//! is already in the table.

pub mod brush;
pub mod font;
pub mod image;
pub mod image_attributes;
pub mod line_cap;
pub mod path;
pub mod pen;
pub mod region;

use crate::codec::{ByteReader, INT_SIZE};
use crate::error::EmfPlusResult;
use crate::image_loader::ImageLoader;
use crate::properties::DrawProperties;
use crate::shape::Shape;
use log::{debug, warn};
use std::rc::Rc;

use self::brush::{Brush, MAX_BRUSH_SIZE};
use self::font::Font;
use self::image::Image;
use self::image_attributes::ImageAttributes;
use self::line_cap::CustomLineCap;
use self::path::Path;
use self::pen::Pen;
use self::region::Region;

/// Number of object table slots
pub const OBJECT_TABLE_SIZE: usize = 64;
/// Upper 20 bits of every valid graphics version value
pub const GRAPHICS_VERSION_SIGNATURE: u32 = 0xDBC01;
/// Cap on the raw payload kept for a single object or fragment
pub const MAX_OBJECT_SIZE: usize = 50_000_000;
/// Object record flag: a total object size precedes the object data
pub const OBJECT_FLAG_CONTINUABLE: u16 = 0x8000;
const OBJECT_TYPE_MASK: u16 = 0x7F00;
const OBJECT_ID_MASK: u16 = 0x00FF;

wire_enum! {
    pub enum ObjectType: u8 {
        Invalid = 0,
        Brush = 1,
        Pen = 2,
        Path = 3,
        Region = 4,
        Image = 5,
        Font = 6,
        StringFormat = 7,
        ImageAttributes = 8,
        CustomLineCap = 9,
    }
}

/// Object type and slot packed into an Object record's flags
pub fn object_flags(flags: u16) -> (u8, u8) {
    (((flags & OBJECT_TYPE_MASK) >> 8) as u8, (flags & OBJECT_ID_MASK) as u8)
}

/// EmfPlusGraphicsVersion: 20-bit signature plus 12-bit version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsVersion(u32);

impl Default for GraphicsVersion {
    fn default() -> Self {
        // GDI+ 1.1
        Self((GRAPHICS_VERSION_SIGNATURE << 12) | 0x002)
    }
}

impl GraphicsVersion {
    pub fn read(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        Ok(Self(reader.read_u32()?))
    }

    /// Read the version without consuming it
    pub fn peek(reader: &mut ByteReader<'_>) -> EmfPlusResult<Self> {
        reader.mark();
        let version = Self::read(reader);
        reader.reset();
        version
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn signature(self) -> u32 {
        self.0 >> 12
    }

    pub fn version(self) -> u32 {
        self.0 & 0xFFF
    }

    /// False for the payload bytes of a continuation fragment
    pub fn is_valid(self) -> bool {
        self.signature() == GRAPHICS_VERSION_SIGNATURE
    }
}

/// Object kept as raw bytes (string formats and unknown object types)
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueObject {
    pub object_type: u8,
    pub version: GraphicsVersion,
    pub data: Vec<u8>,
}

impl OpaqueObject {
    pub fn decode(object_type: u8, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        let data = reader.read_remaining(MAX_OBJECT_SIZE)?;
        Ok((
            Self {
                object_type,
                version,
                data,
            },
            reader.position(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsObject {
    Brush(Brush),
    Pen(Pen),
    Path(Path),
    Region(Region),
    Image(Image),
    ImageAttributes(ImageAttributes),
    Font(Font),
    StringFormat(OpaqueObject),
    CustomLineCap(CustomLineCap),
    Unknown(OpaqueObject),
}

/// How a table entry is applied to the draw properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Fill source of a fill record
    Brush,
    /// Stroke source of a draw record
    Pen,
    /// Path, region, image or font selected by a record's object id
    Object,
}

impl GraphicsObject {
    /// Wire object type, used to validate continuations
    pub fn object_type(&self) -> u8 {
        let known = match self {
            GraphicsObject::Brush(_) => ObjectType::Brush,
            GraphicsObject::Pen(_) => ObjectType::Pen,
            GraphicsObject::Path(_) => ObjectType::Path,
            GraphicsObject::Region(_) => ObjectType::Region,
            GraphicsObject::Image(_) => ObjectType::Image,
            GraphicsObject::ImageAttributes(_) => ObjectType::ImageAttributes,
            GraphicsObject::Font(_) => ObjectType::Font,
            GraphicsObject::StringFormat(_) => ObjectType::StringFormat,
            GraphicsObject::CustomLineCap(_) => ObjectType::CustomLineCap,
            GraphicsObject::Unknown(opaque) => return opaque.object_type,
        };
        known.raw()
    }

    pub fn apply(
        &self,
        mode: ApplyMode,
        fragments: &[Vec<u8>],
        props: &mut DrawProperties,
        loader: &dyn ImageLoader,
    ) -> EmfPlusResult<()> {
        match (mode, self) {
            (ApplyMode::Pen, GraphicsObject::Pen(pen)) => pen.apply(fragments, props),
            (ApplyMode::Pen, GraphicsObject::Brush(brush)) => brush.apply_pen(fragments, props),
            (ApplyMode::Pen, other) => {
                warn!("Object type {:#x} cannot be used as a pen", other.object_type());
                Ok(())
            }
            (_, GraphicsObject::Brush(brush)) => brush.apply(fragments, props, loader),
            (ApplyMode::Brush, other) => {
                warn!("Object type {:#x} cannot be used as a brush", other.object_type());
                Ok(())
            }
            (ApplyMode::Object, GraphicsObject::Pen(pen)) => pen.apply(fragments, props),
            (ApplyMode::Object, GraphicsObject::Path(path)) => {
                props.path = Some(Shape::Path(path.to_geometry()));
                Ok(())
            }
            (ApplyMode::Object, GraphicsObject::Region(region)) => {
                props.path = Some(Shape::Region(region.root.clone()));
                Ok(())
            }
            (ApplyMode::Object, GraphicsObject::Image(image)) => {
                props.image = image.load(fragments, loader).map(Rc::new);
                Ok(())
            }
            (ApplyMode::Object, GraphicsObject::Font(font)) => {
                props.font = Some(font.clone());
                Ok(())
            }
            (ApplyMode::Object, other) => {
                debug!("Object type {:#x} has no standalone effect", other.object_type());
                Ok(())
            }
        }
    }
}

/// Raw trailing bytes of an object split over several records
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationFragment {
    pub object_type: u8,
    pub total_size: Option<u32>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedObject {
    Complete(GraphicsObject),
    Continuation(ContinuationFragment),
}

/// Decode the payload of an Object record.
///
/// Returns the decoded object (or fragment) and the number of bytes consumed
/// from `data`, including the total object size of continuable records.
pub fn decode_object(flags: u16, data: &[u8]) -> EmfPlusResult<(DecodedObject, usize)> {
    let (type_raw, _) = object_flags(flags);
    let continuable = flags & OBJECT_FLAG_CONTINUABLE != 0;

    let mut reader = ByteReader::new(data);
    let total_size = if continuable { Some(reader.read_u32()?) } else { None };
    let offset = reader.position();
    let object_type = ObjectType::from_raw(type_raw);

    // the continuable flag is not reliably set, so the version decides
    if let Some(kind @ (ObjectType::Brush | ObjectType::Image)) = object_type {
        let fresh = reader.remaining() >= INT_SIZE && GraphicsVersion::peek(&mut reader)?.is_valid();
        if !fresh {
            let cap = if kind == ObjectType::Brush {
                MAX_BRUSH_SIZE
            } else {
                MAX_OBJECT_SIZE
            };
            let fragment = ContinuationFragment {
                object_type: type_raw,
                total_size,
                data: reader.read_remaining(cap)?,
            };
            return Ok((DecodedObject::Continuation(fragment), reader.position()));
        }
    }

    let window = &data[offset..];
    let (object, consumed) = match object_type {
        Some(ObjectType::Brush) => {
            let (brush, n) = Brush::decode(window, !continuable)?;
            (GraphicsObject::Brush(brush), n)
        }
        Some(ObjectType::Pen) => {
            let (pen, n) = Pen::decode(window)?;
            (GraphicsObject::Pen(pen), n)
        }
        Some(ObjectType::Path) => {
            let (path, n) = Path::decode(window)?;
            (GraphicsObject::Path(path), n)
        }
        Some(ObjectType::Region) => {
            let (region, n) = Region::decode(window)?;
            (GraphicsObject::Region(region), n)
        }
        Some(ObjectType::Image) => {
            let (image, n) = Image::decode(window)?;
            (GraphicsObject::Image(image), n)
        }
        Some(ObjectType::ImageAttributes) => {
            let (attributes, n) = ImageAttributes::decode(window)?;
            (GraphicsObject::ImageAttributes(attributes), n)
        }
        Some(ObjectType::Font) => {
            let (font, n) = Font::decode(window)?;
            (GraphicsObject::Font(font), n)
        }
        Some(ObjectType::StringFormat) => {
            let (opaque, n) = OpaqueObject::decode(type_raw, window)?;
            (GraphicsObject::StringFormat(opaque), n)
        }
        Some(ObjectType::CustomLineCap) => {
            let (cap, n) = CustomLineCap::decode(window)?;
            (GraphicsObject::CustomLineCap(cap), n)
        }
        Some(ObjectType::Invalid) | None => {
            debug!("Unknown object type {:#x} kept as raw bytes", type_raw);
            let (opaque, n) = OpaqueObject::decode(type_raw, window)?;
            (GraphicsObject::Unknown(opaque), n)
        }
    };
    Ok((DecodedObject::Complete(object), offset + consumed))
}
