//! Record stream dispatch: splits EMF+ record buffers into records, pulls
//! EMF+ buffers out of EMF comment records and plays them onto a canvas

use crate::canvas::Canvas;
use crate::codec::ByteReader;
use crate::error::{EmfPlusError, EmfPlusResult};
use crate::graphics::Graphics;
use crate::metafile::{emf_bounds, is_emf_format};
use crate::options::RenderOptions;
use crate::record::{Record, RecordHeader, RecordType, RECORD_HEADER_SIZE};
use crate::svg_canvas::SvgCanvas;
use log::{debug, warn};

const EMR_EOF: u32 = 14;
const EMR_COMMENT: u32 = 70;
/// "EMF+" comment identifier
const EMFPLUS_SIGNATURE: u32 = 0x2B46_4D45;
const EMR_HEADER_SIZE: usize = 8;

/// Iterator over the records of one EMF+ record buffer.
///
/// Yields each header with its data window. A structural error ends the
/// iteration after it is reported.
pub struct RecordIter<'a> {
    data: &'a [u8],
    offset: usize,
    next_id: u64,
}

impl<'a> RecordIter<'a> {
    pub fn new(data: &'a [u8], first_id: u64) -> Self {
        Self {
            data,
            offset: 0,
            next_id: first_id,
        }
    }

    /// Id the next record will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn read_next(&mut self) -> EmfPlusResult<(RecordHeader, &'a [u8])> {
        let data: &'a [u8] = self.data;
        let mut reader = ByteReader::new(&data[self.offset..]);
        reader.ensure_available("record header", RECORD_HEADER_SIZE)?;
        let record_type = reader.read_u16()?;
        let flags = reader.read_u16()?;
        let size = reader.read_u32()?;
        let data_size = reader.read_u32()?;

        if (size as usize) < RECORD_HEADER_SIZE {
            return Err(EmfPlusError::InvalidData(format!(
                "record {:#06x} declares size {} below the header size",
                record_type, size
            )));
        }
        if data_size as usize > size as usize - RECORD_HEADER_SIZE {
            return Err(EmfPlusError::SizeMismatch {
                context: "record data",
                declared: u64::from(data_size),
                available: u64::from(size) - RECORD_HEADER_SIZE as u64,
            });
        }
        let available = data.len() - self.offset;
        if size as usize > available {
            return Err(EmfPlusError::SizeMismatch {
                context: "record",
                declared: u64::from(size),
                available: available as u64,
            });
        }

        let start = self.offset + RECORD_HEADER_SIZE;
        let window = &data[start..start + data_size as usize];
        let header = RecordHeader {
            record_type,
            flags,
            size,
            data_size,
            record_id: self.next_id,
        };
        self.offset += size as usize;
        self.next_id += 1;
        Ok((header, window))
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = EmfPlusResult<(RecordHeader, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }
        let result = self.read_next();
        if result.is_err() {
            self.offset = self.data.len();
        }
        Some(result)
    }
}

/// EMF+ record buffers carried by the `EMR_COMMENT` records of an EMF file,
/// in file order
pub fn emfplus_buffers(emf: &[u8]) -> EmfPlusResult<Vec<&[u8]>> {
    let mut buffers = Vec::new();
    let mut offset = 0;
    while offset + EMR_HEADER_SIZE <= emf.len() {
        let mut reader = ByteReader::new(&emf[offset..]);
        let record_type = reader.read_u32()?;
        let size = reader.read_u32()? as usize;
        if size < EMR_HEADER_SIZE || offset + size > emf.len() {
            return Err(EmfPlusError::SizeMismatch {
                context: "EMF record",
                declared: size as u64,
                available: (emf.len() - offset) as u64,
            });
        }
        if record_type == EMR_EOF {
            break;
        }
        if record_type == EMR_COMMENT && size >= 16 {
            let comment_size = reader.read_u32()? as usize;
            let identifier = reader.read_u32()?;
            if identifier == EMFPLUS_SIGNATURE {
                // comment data starts with the identifier
                let end = (offset + 12 + comment_size).min(offset + size);
                let start = offset + 16;
                if end > start {
                    buffers.push(&emf[start..end]);
                }
            }
        }
        offset += size;
    }
    Ok(buffers)
}

/// Plays EMF+ record buffers onto a canvas, keeping the object table and
/// draw properties across buffers
pub struct Player {
    pub graphics: Graphics,
    options: RenderOptions,
    next_record_id: u64,
}

impl Player {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            graphics: Graphics::new(options.dpi),
            options,
            next_record_id: 0,
        }
    }

    pub fn with_graphics(options: RenderOptions, graphics: Graphics) -> Self {
        Self {
            graphics,
            options,
            next_record_id: 0,
        }
    }

    fn play_record(&mut self, header: &RecordHeader, data: &[u8], canvas: &mut dyn Canvas) -> EmfPlusResult<()> {
        let (record, consumed) = Record::decode(header, data)?;
        if consumed < data.len() {
            debug!(
                "Record #{} left {} of {} data bytes unread",
                header.record_id,
                data.len() - consumed,
                data.len()
            );
        }
        record.apply(&mut self.graphics, canvas)
    }

    /// Play every record of `buffer`. Returns the number of records applied.
    ///
    /// In lenient mode a failing record is logged and skipped, and a broken
    /// record header ends the buffer.
    pub fn play(&mut self, buffer: &[u8], canvas: &mut dyn Canvas) -> EmfPlusResult<usize> {
        let mut records = RecordIter::new(buffer, self.next_record_id);
        let mut applied = 0;
        while let Some(next) = records.next() {
            self.next_record_id = records.next_id();
            let (header, data) = match next {
                Ok(next) => next,
                Err(e) if !self.options.strict => {
                    warn!("Stopping record buffer: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            };
            match self.play_record(&header, data, canvas) {
                Ok(()) => applied += 1,
                Err(e) if !self.options.strict => {
                    warn!(
                        "Skipping record #{} ({:?}): {}",
                        header.record_id,
                        RecordType::from_raw(header.record_type),
                        e
                    );
                }
                Err(e) => return Err(e),
            }
            if header.record_type == RecordType::EndOfFile.raw() {
                break;
            }
        }
        Ok(applied)
    }

    /// Play the EMF+ records embedded in an EMF file
    pub fn play_emf(&mut self, emf: &[u8], canvas: &mut dyn Canvas) -> EmfPlusResult<usize> {
        let mut applied = 0;
        for buffer in emfplus_buffers(emf)? {
            applied += self.play(buffer, canvas)?;
        }
        Ok(applied)
    }
}

/// Render the EMF+ content of an EMF file to an SVG document
pub fn render_emf_to_svg(emf: &[u8], options: &RenderOptions) -> EmfPlusResult<String> {
    if !is_emf_format(emf) {
        return Err(EmfPlusError::InvalidData("input is not an EMF file".to_string()));
    }
    let (width, height) = match emf_bounds(emf)? {
        Some(bounds) if bounds.width.abs() >= 1.0 && bounds.height.abs() >= 1.0 => {
            (bounds.width.abs().ceil() as u32, bounds.height.abs().ceil() as u32)
        }
        _ => (options.width, options.height),
    };
    let mut canvas = SvgCanvas::new(width, height);
    let mut player = Player::new(options.clone());
    let applied = player.play_emf(emf, &mut canvas)?;
    debug!("Rendered {} EMF+ records into {}x{}", applied, width, height);
    Ok(canvas.finish())
}

/// Render a bare EMF+ record buffer to an SVG document
pub fn render_records_to_svg(records: &[u8], options: &RenderOptions) -> EmfPlusResult<String> {
    let mut canvas = SvgCanvas::new(options.width, options.height);
    let mut player = Player::new(options.clone());
    player.play(records, &mut canvas)?;
    Ok(canvas.finish())
}
