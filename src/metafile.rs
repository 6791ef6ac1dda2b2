//! Bounds of embedded legacy metafiles (EMF and WMF payloads)

use crate::codec::ByteReader;
use crate::error::EmfPlusResult;
use crate::types::RectF;

/// EMR_HEADER record type
const EMR_HEADER: u32 = 1;
/// " EMF" at offset 40 of the EMF header
const ENHMETA_SIGNATURE: u32 = 0x464D_4520;
/// Placeable WMF key
const WMF_PLACEABLE_KEY: u32 = 0x9AC6_CDD7;
/// Header size in words of a standard WMF
const WMF_HEADER_WORDS: u16 = 9;

/// Check for an EMF header record
pub fn is_emf_format(data: &[u8]) -> bool {
    let mut reader = ByteReader::new(data);
    if reader.read_u32().ok() != Some(EMR_HEADER) {
        return false;
    }
    data.get(40..44)
        .map(|sig| u32::from_le_bytes([sig[0], sig[1], sig[2], sig[3]]) == ENHMETA_SIGNATURE)
        .unwrap_or(false)
}

/// Check for a placeable or standard WMF header
pub fn is_wmf_format(data: &[u8]) -> bool {
    let mut reader = ByteReader::new(data);
    match reader.read_u32() {
        Ok(WMF_PLACEABLE_KEY) => true,
        Ok(first) => {
            let words = [(first & 0xFFFF) as u16, (first >> 16) as u16];
            (words[0] == 1 || words[0] == 2) && words[1] == WMF_HEADER_WORDS
        }
        Err(_) => false,
    }
}

/// `rclBounds` of the EMF header, in device units
pub fn emf_bounds(data: &[u8]) -> EmfPlusResult<Option<RectF>> {
    if !is_emf_format(data) {
        return Ok(None);
    }
    let mut reader = ByteReader::new(data);
    // type and size
    reader.skip(8)?;
    let left = reader.read_i32()?;
    let top = reader.read_i32()?;
    let right = reader.read_i32()?;
    let bottom = reader.read_i32()?;
    Ok(Some(RectF::new(
        f64::from(left),
        f64::from(top),
        f64::from(right) - f64::from(left),
        f64::from(bottom) - f64::from(top),
    )))
}

/// Bounding box of a placeable WMF, in logical units.
///
/// Standard WMF files carry no bounding box in their header.
pub fn wmf_bounds(data: &[u8]) -> EmfPlusResult<Option<RectF>> {
    let mut reader = ByteReader::new(data);
    if reader.read_u32()? != WMF_PLACEABLE_KEY {
        return Ok(None);
    }
    // HWmf handle
    reader.skip(2)?;
    let left = reader.read_i16()?;
    let top = reader.read_i16()?;
    let right = reader.read_i16()?;
    let bottom = reader.read_i16()?;
    Ok(Some(RectF::new(
        f64::from(left),
        f64::from(top),
        f64::from(right) - f64::from(left),
        f64::from(bottom) - f64::from(top),
    )))
}
