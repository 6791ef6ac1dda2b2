//! EmfPlusImageAttributes object

use super::brush::{read_wrap_mode, WrapMode};
use super::GraphicsVersion;
use crate::codec::{ByteReader, INT_SIZE};
use crate::error::EmfPlusResult;
use crate::types::Color;
use log::warn;

wire_enum! {
    pub enum ObjectClamp: u32 {
        RectClamp = 0,
        BitmapClamp = 1,
    }
}

/// Consumed by image drawing records; applying it has no effect
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttributes {
    pub version: GraphicsVersion,
    pub wrap_mode: Option<WrapMode>,
    pub clamp_color: Color,
    pub object_clamp: Option<ObjectClamp>,
}

impl ImageAttributes {
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        reader.skip(INT_SIZE)?;
        let wrap_mode = read_wrap_mode(&mut reader)?;
        let clamp_color = reader.read_argb()?;
        let raw = reader.read_u32()?;
        let object_clamp = ObjectClamp::from_raw(raw);
        if object_clamp.is_none() {
            warn!("Unknown object clamp {:#x}", raw);
        }
        reader.skip(INT_SIZE)?;
        Ok((
            Self {
                version,
                wrap_mode,
                clamp_color,
                object_clamp,
            },
            reader.position(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    #[test]
    fn test_decode_image_attributes() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(4).unwrap();
        buf.write_u32::<LittleEndian>(0x8000_FF00).unwrap();
        buf.write_u32::<LittleEndian>(1).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();

        let (attrs, consumed) = ImageAttributes::decode(&buf).unwrap();
        assert_eq!(consumed, 24);
        assert_eq!(attrs.wrap_mode, Some(WrapMode::Clamp));
        assert_eq!(attrs.clamp_color, Color::rgba(0, 0xFF, 0, 0x80));
        assert_eq!(attrs.object_clamp, Some(ObjectClamp::BitmapClamp));
    }

    #[test]
    fn test_truncated_attributes() {
        let buf = 0xDBC0_1002u32.to_le_bytes();
        assert!(ImageAttributes::decode(&buf).is_err());
    }
}
