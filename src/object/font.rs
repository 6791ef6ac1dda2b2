//! EmfPlusFont object: em size and family name only, no font matching

use super::GraphicsVersion;
use crate::codec::{ByteReader, SHORT_SIZE};
use crate::error::EmfPlusResult;
use crate::properties::UnitType;
use log::warn;

pub const FONT_STYLE_BOLD: u32 = 0x01;
pub const FONT_STYLE_ITALIC: u32 = 0x02;
pub const FONT_STYLE_UNDERLINE: u32 = 0x04;
pub const FONT_STYLE_STRIKEOUT: u32 = 0x08;

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub version: GraphicsVersion,
    pub em_size: f32,
    pub size_unit: Option<UnitType>,
    pub style_flags: u32,
    pub family: String,
}

impl Font {
    pub fn decode(data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let mut reader = ByteReader::new(data);
        let version = GraphicsVersion::read(&mut reader)?;
        let em_size = reader.read_f32()?;
        let unit = reader.read_u32()?;
        let size_unit = UnitType::from_raw(unit);
        if size_unit.is_none() {
            warn!("Unknown font size unit {:#x}", unit);
        }
        let style_flags = reader.read_u32()?;
        // reserved
        reader.read_u32()?;
        let length = reader.read_u32()? as usize;
        let name = reader.read_slice(length.saturating_mul(SHORT_SIZE))?;
        let units: Vec<u16> = name.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
        Ok((
            Self {
                version,
                em_size,
                size_unit,
                style_flags,
                family: String::from_utf16_lossy(&units),
            },
            reader.position(),
        ))
    }

    pub fn is_bold(&self) -> bool {
        self.style_flags & FONT_STYLE_BOLD != 0
    }

    pub fn is_italic(&self) -> bool {
        self.style_flags & FONT_STYLE_ITALIC != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{LittleEndian, WriteBytesExt};

    #[test]
    fn test_decode_font() {
        let mut buf = Vec::new();
        buf.write_u32::<LittleEndian>(0xDBC0_1002).unwrap();
        buf.write_f32::<LittleEndian>(12.0).unwrap();
        buf.write_u32::<LittleEndian>(3).unwrap();
        buf.write_u32::<LittleEndian>(FONT_STYLE_BOLD).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(5).unwrap();
        for unit in "Arial".encode_utf16() {
            buf.write_u16::<LittleEndian>(unit).unwrap();
        }

        let (font, consumed) = Font::decode(&buf).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(font.family, "Arial");
        assert_eq!(font.size_unit, Some(UnitType::Point));
        assert!(font.is_bold());
        assert!(!font.is_italic());
    }
}
