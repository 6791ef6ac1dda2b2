//! EMF+ records
//!
//! Each record is decoded from exactly its declared data window and then
//! applied to the render-pass `Graphics`, drawing through a `Canvas`.

pub mod draw;
pub mod object;
pub mod state;

use crate::canvas::Canvas;
use crate::error::EmfPlusResult;
use crate::graphics::Graphics;
use log::debug;

use self::draw::{
    DrawDriverString, DrawImage, DrawImagePoints, DrawPath, DrawRects, FillPath, FillRects, FillRegion,
};
use self::object::ObjectRecord;
use self::state::{HeaderRecord, StateRecord};

/// Size of the common record header: type, flags, size, data size
pub const RECORD_HEADER_SIZE: usize = 12;

wire_enum! {
    pub enum RecordType: u16 {
        Header = 0x4001,
        EndOfFile = 0x4002,
        Comment = 0x4003,
        GetDc = 0x4004,
        Object = 0x4008,
        FillRects = 0x400A,
        DrawRects = 0x400B,
        FillRegion = 0x4013,
        FillPath = 0x4014,
        DrawPath = 0x4015,
        DrawImage = 0x401A,
        DrawImagePoints = 0x401B,
        SetRenderingOrigin = 0x401D,
        SetAntiAliasMode = 0x401E,
        SetTextRenderingHint = 0x401F,
        SetTextContrast = 0x4020,
        SetInterpolationMode = 0x4021,
        SetPixelOffsetMode = 0x4022,
        SetCompositingMode = 0x4023,
        SetCompositingQuality = 0x4024,
        Save = 0x4025,
        Restore = 0x4026,
        BeginContainerNoParams = 0x4028,
        EndContainer = 0x4029,
        SetWorldTransform = 0x402A,
        ResetWorldTransform = 0x402B,
        MultiplyWorldTransform = 0x402C,
        TranslateWorldTransform = 0x402D,
        ScaleWorldTransform = 0x402E,
        RotateWorldTransform = 0x402F,
        SetPageTransform = 0x4030,
        ResetClip = 0x4031,
        SetClipRect = 0x4032,
        SetClipPath = 0x4033,
        SetClipRegion = 0x4034,
        DrawDriverString = 0x4036,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: u16,
    pub flags: u16,
    /// Total record size including the header
    pub size: u32,
    /// Size of the record data that follows the header
    pub data_size: u32,
    /// Position of the record in the stream
    pub record_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Header(HeaderRecord),
    EndOfFile,
    Comment(Vec<u8>),
    GetDc,
    Object(ObjectRecord),
    FillRects(FillRects),
    DrawRects(DrawRects),
    FillRegion(FillRegion),
    FillPath(FillPath),
    DrawPath(DrawPath),
    DrawImage(DrawImage),
    DrawImagePoints(DrawImagePoints),
    DrawDriverString(DrawDriverString),
    State(StateRecord),
    Unknown { record_type: u16, data: Vec<u8> },
}

impl Record {
    /// Decode the record data window described by `header`.
    ///
    /// Returns the record and the number of bytes of `data` consumed.
    pub fn decode(header: &RecordHeader, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let flags = header.flags;
        let Some(record_type) = RecordType::from_raw(header.record_type) else {
            debug!("Unknown record type {:#06x}, {} bytes", header.record_type, data.len());
            return Ok((
                Record::Unknown {
                    record_type: header.record_type,
                    data: data.to_vec(),
                },
                data.len(),
            ));
        };

        let (record, consumed) = match record_type {
            RecordType::Header => {
                let (record, n) = HeaderRecord::decode(flags, data)?;
                (Record::Header(record), n)
            }
            RecordType::EndOfFile => (Record::EndOfFile, 0),
            RecordType::Comment => (Record::Comment(data.to_vec()), data.len()),
            RecordType::GetDc => (Record::GetDc, 0),
            RecordType::Object => {
                let (record, n) = ObjectRecord::decode(flags, data)?;
                (Record::Object(record), n)
            }
            RecordType::FillRects => {
                let (record, n) = FillRects::decode(flags, data)?;
                (Record::FillRects(record), n)
            }
            RecordType::DrawRects => {
                let (record, n) = DrawRects::decode(flags, data)?;
                (Record::DrawRects(record), n)
            }
            RecordType::FillRegion => {
                let (record, n) = FillRegion::decode(flags, data)?;
                (Record::FillRegion(record), n)
            }
            RecordType::FillPath => {
                let (record, n) = FillPath::decode(flags, data)?;
                (Record::FillPath(record), n)
            }
            RecordType::DrawPath => {
                let (record, n) = DrawPath::decode(flags, data)?;
                (Record::DrawPath(record), n)
            }
            RecordType::DrawImage => {
                let (record, n) = DrawImage::decode(flags, data)?;
                (Record::DrawImage(record), n)
            }
            RecordType::DrawImagePoints => {
                let (record, n) = DrawImagePoints::decode(flags, data)?;
                (Record::DrawImagePoints(record), n)
            }
            RecordType::DrawDriverString => {
                let (record, n) = DrawDriverString::decode(flags, data)?;
                (Record::DrawDriverString(record), n)
            }
            other => {
                let (record, n) = StateRecord::decode(other, flags, data)?;
                (Record::State(record), n)
            }
        };
        debug!(
            "Record #{} {:?} flags={:#06x} size={} consumed={}",
            header.record_id, record_type, flags, header.size, consumed
        );
        Ok((record, consumed))
    }

    pub fn apply(self, graphics: &mut Graphics, canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        match self {
            Record::Header(record) => {
                record.apply(graphics);
                Ok(())
            }
            Record::EndOfFile | Record::Comment(_) => Ok(()),
            Record::GetDc => {
                graphics.get_dc = true;
                Ok(())
            }
            Record::Object(record) => record.apply(graphics),
            Record::FillRects(record) => record.apply(graphics, canvas),
            Record::DrawRects(record) => record.apply(graphics, canvas),
            Record::FillRegion(record) => record.apply(graphics, canvas),
            Record::FillPath(record) => record.apply(graphics, canvas),
            Record::DrawPath(record) => record.apply(graphics, canvas),
            Record::DrawImage(record) => record.apply(graphics, canvas),
            Record::DrawImagePoints(record) => record.apply(graphics, canvas),
            Record::DrawDriverString(record) => record.apply(graphics, canvas),
            Record::State(record) => record.apply(graphics),
            Record::Unknown { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use byteorder::{LittleEndian, WriteBytesExt};

    /// Serialized record: header followed by `data`
    pub(crate) fn record_bytes(record_type: u16, flags: u16, data: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_u16::<LittleEndian>(record_type).unwrap();
        buf.write_u16::<LittleEndian>(flags).unwrap();
        buf.write_u32::<LittleEndian>((RECORD_HEADER_SIZE + data.len()) as u32).unwrap();
        buf.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        buf.extend_from_slice(data);
        buf
    }

    pub(crate) fn header(record_type: u16, flags: u16, data: &[u8]) -> RecordHeader {
        RecordHeader {
            record_type,
            flags,
            size: (RECORD_HEADER_SIZE + data.len()) as u32,
            data_size: data.len() as u32,
            record_id: 0,
        }
    }

    /// Decode and apply a single record
    pub(crate) fn play(
        graphics: &mut Graphics,
        canvas: &mut RecordingCanvas,
        record_type: u16,
        flags: u16,
        data: &[u8],
    ) -> EmfPlusResult<()> {
        let (record, _) = Record::decode(&header(record_type, flags, data), data)?;
        record.apply(graphics, canvas)
    }

    #[test]
    fn test_unknown_record_is_kept() {
        let data = [1u8, 2, 3, 4];
        let (record, consumed) = Record::decode(&header(0x40FF, 0, &data), &data).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(
            record,
            Record::Unknown {
                record_type: 0x40FF,
                data: data.to_vec()
            }
        );
    }

    #[test]
    fn test_get_dc_sets_flag() {
        let mut g = Graphics::default();
        let mut canvas = RecordingCanvas::new();
        play(&mut g, &mut canvas, RecordType::GetDc.raw(), 0, &[]).unwrap();
        assert!(g.get_dc);
        assert!(canvas.ops.is_empty());
    }
}
