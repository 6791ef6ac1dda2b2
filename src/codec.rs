//! Little-endian primitive codec for EMF+ payloads
//!
//! `ByteReader` wraps a `Cursor` over exactly one record (or object) window,
//! so a decoder can never read past the declared size: running off the end
//! surfaces as `EmfPlusError::Io`.

use crate::error::{EmfPlusError, EmfPlusResult};
use crate::types::{Color, PointF, RectF, Transform};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

pub const BYTE_SIZE: usize = 1;
pub const SHORT_SIZE: usize = 2;
pub const INT_SIZE: usize = 4;

/// Record flag selecting 16-bit integer coordinates
pub const FLAG_COMPRESSED: u16 = 0x4000;
/// Record flag selecting relative (delta) point coordinates
pub const FLAG_RELATIVE: u16 = 0x0800;

/// Byte cursor over a single decode window
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
    mark: u64,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
            mark: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    /// Remember the current position for a later `reset`
    pub fn mark(&mut self) {
        self.mark = self.cursor.position();
    }

    pub fn reset(&mut self) {
        self.cursor.set_position(self.mark);
    }

    pub fn read_u8(&mut self) -> EmfPlusResult<u8> {
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u16(&mut self) -> EmfPlusResult<u16> {
        Ok(self.cursor.read_u16::<LittleEndian>()?)
    }

    pub fn read_i16(&mut self) -> EmfPlusResult<i16> {
        Ok(self.cursor.read_i16::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> EmfPlusResult<u32> {
        Ok(self.cursor.read_u32::<LittleEndian>()?)
    }

    pub fn read_i32(&mut self) -> EmfPlusResult<i32> {
        Ok(self.cursor.read_i32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> EmfPlusResult<f32> {
        Ok(self.cursor.read_f32::<LittleEndian>()?)
    }

    pub fn skip(&mut self, len: usize) -> EmfPlusResult<()> {
        self.ensure_available("skip", len)?;
        self.cursor.set_position(self.cursor.position() + len as u64);
        Ok(())
    }

    /// Borrow the next `len` bytes without copying
    pub fn read_slice(&mut self, len: usize) -> EmfPlusResult<&'a [u8]> {
        self.ensure_available("byte slice", len)?;
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// Copy the next `len` bytes, refusing anything above `max_len`
    pub fn read_bytes(&mut self, len: usize, max_len: usize) -> EmfPlusResult<Vec<u8>> {
        if len > max_len {
            return Err(EmfPlusError::LimitExceeded {
                what: "raw payload",
                value: len as i64,
                limit: max_len as u64,
            });
        }
        Ok(self.read_slice(len)?.to_vec())
    }

    /// Everything left in the window, bounded by `max_len`
    pub fn read_remaining(&mut self, max_len: usize) -> EmfPlusResult<Vec<u8>> {
        let len = self.remaining();
        self.read_bytes(len, max_len)
    }

    /// Read a 32-bit element count and check that `count * element_size`
    /// bytes are actually present before anything is allocated.
    pub fn read_count(&mut self, what: &'static str, element_size: usize) -> EmfPlusResult<usize> {
        let count = self.read_i32()?;
        if count < 0 {
            return Err(EmfPlusError::LimitExceeded {
                what,
                value: i64::from(count),
                limit: i32::MAX as u64,
            });
        }
        let count = count as usize;
        self.ensure_available(what, count.saturating_mul(element_size))?;
        Ok(count)
    }

    pub fn ensure_available(&self, context: &'static str, len: usize) -> EmfPlusResult<()> {
        if len > self.remaining() {
            return Err(EmfPlusError::SizeMismatch {
                context,
                declared: len as u64,
                available: self.remaining() as u64,
            });
        }
        Ok(())
    }

    /// EmfPlusARGB: stored as 0xAARRGGBB
    pub fn read_argb(&mut self) -> EmfPlusResult<Color> {
        Ok(Color::from_argb(self.read_u32()?))
    }

    /// EmfPlusRect: four 16-bit signed integers
    pub fn read_rect_compressed(&mut self) -> EmfPlusResult<RectF> {
        let x = self.read_i16()?;
        let y = self.read_i16()?;
        let width = self.read_i16()?;
        let height = self.read_i16()?;
        Ok(RectF::new(f64::from(x), f64::from(y), f64::from(width), f64::from(height)))
    }

    /// EmfPlusRectF: four 32-bit floats
    pub fn read_rect_float(&mut self) -> EmfPlusResult<RectF> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let width = self.read_f32()?;
        let height = self.read_f32()?;
        Ok(RectF::new(f64::from(x), f64::from(y), f64::from(width), f64::from(height)))
    }

    pub fn read_rect(&mut self, compressed: bool) -> EmfPlusResult<RectF> {
        if compressed {
            self.read_rect_compressed()
        } else {
            self.read_rect_float()
        }
    }

    /// EmfPlusPoint: two 16-bit signed integers
    pub fn read_point_compressed(&mut self) -> EmfPlusResult<PointF> {
        let x = self.read_i16()?;
        let y = self.read_i16()?;
        Ok(PointF::new(f64::from(x), f64::from(y)))
    }

    /// EmfPlusPointF: two 32-bit floats
    pub fn read_point_float(&mut self) -> EmfPlusResult<PointF> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(PointF::new(f64::from(x), f64::from(y)))
    }

    /// EmfPlusTransformMatrix: m11, m12, m21, m22, dx, dy as floats
    pub fn read_transform(&mut self) -> EmfPlusResult<Transform> {
        let m11 = self.read_f32()?;
        let m12 = self.read_f32()?;
        let m21 = self.read_f32()?;
        let m22 = self.read_f32()?;
        let dx = self.read_f32()?;
        let dy = self.read_f32()?;
        Ok(Transform::new(
            f64::from(m11),
            f64::from(m12),
            f64::from(m21),
            f64::from(m22),
            f64::from(dx),
            f64::from(dy),
        ))
    }

    /// Array of 32-bit floats prefixed by a signed count in `0..=max_count`
    pub fn read_float_array(&mut self, what: &'static str, max_count: usize) -> EmfPlusResult<Vec<f32>> {
        let count = self.read_i32()?;
        if count < 0 || count as usize > max_count {
            return Err(EmfPlusError::LimitExceeded {
                what,
                value: i64::from(count),
                limit: max_count as u64,
            });
        }
        let count = count as usize;
        self.ensure_available(what, count * INT_SIZE)?;
        (0..count).map(|_| self.read_f32()).collect()
    }
}

/// Decode an EmfPlusInteger7 / EmfPlusInteger15 value.
///
/// Returns the sign-extended value and the number of bytes consumed.
pub fn read_emfplus_integer(reader: &mut ByteReader<'_>) -> EmfPlusResult<(i32, usize)> {
    let first = reader.read_u8()?;
    if first & 0x80 == 0 {
        let value = (((first << 1) as i8) >> 1) as i32;
        return Ok((value, BYTE_SIZE));
    }
    let second = reader.read_u8()?;
    let raw = ((u16::from(first) << 8) | u16::from(second)) & 0x7FFF;
    let value = (((raw << 1) as i16) >> 1) as i32;
    Ok((value, SHORT_SIZE))
}

/// Point array encoding selected by record/path flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointEncoding {
    Relative,
    Compressed,
    Float,
}

impl PointEncoding {
    /// Relative takes priority over compressed
    pub fn from_flags(flags: u16) -> Self {
        if flags & FLAG_RELATIVE != 0 {
            PointEncoding::Relative
        } else if flags & FLAG_COMPRESSED != 0 {
            PointEncoding::Compressed
        } else {
            PointEncoding::Float
        }
    }

    /// Smallest number of bytes a single point can occupy
    pub fn min_point_size(self) -> usize {
        match self {
            PointEncoding::Relative => 2 * BYTE_SIZE,
            PointEncoding::Compressed => 2 * SHORT_SIZE,
            PointEncoding::Float => 2 * INT_SIZE,
        }
    }

    pub fn reader(self) -> PointReader {
        PointReader {
            encoding: self,
            last: PointF::default(),
        }
    }

    /// Read `count` points with this encoding
    pub fn read_points(self, reader: &mut ByteReader<'_>, count: usize) -> EmfPlusResult<Vec<PointF>> {
        reader.ensure_available("point array", count.saturating_mul(self.min_point_size()))?;
        let mut points = self.reader();
        (0..count).map(|_| points.next(reader)).collect()
    }
}

/// Stateful point reader: relative points are deltas from the previous
/// point, with (0,0) assumed before the first one.
pub struct PointReader {
    encoding: PointEncoding,
    last: PointF,
}

impl PointReader {
    pub fn next(&mut self, reader: &mut ByteReader<'_>) -> EmfPlusResult<PointF> {
        let point = match self.encoding {
            PointEncoding::Relative => {
                let (dx, _) = read_emfplus_integer(reader)?;
                let (dy, _) = read_emfplus_integer(reader)?;
                PointF::new(self.last.x + f64::from(dx), self.last.y + f64::from(dy))
            }
            PointEncoding::Compressed => reader.read_point_compressed()?,
            PointEncoding::Float => reader.read_point_float()?,
        };
        self.last = point;
        Ok(point)
    }
}
