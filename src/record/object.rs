//! Object record: defines (or continues) a graphics object in the table

use crate::error::EmfPlusResult;
use crate::graphics::Graphics;
use crate::object::{decode_object, object_flags, DecodedObject};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub flags: u16,
    pub slot: u8,
    pub object: DecodedObject,
}

impl ObjectRecord {
    pub fn decode(flags: u16, data: &[u8]) -> EmfPlusResult<(Self, usize)> {
        let (_, slot) = object_flags(flags);
        let (object, consumed) = decode_object(flags, data)?;
        Ok((Self { flags, slot, object }, consumed))
    }

    /// Register the object, or link the fragment to the object at its slot
    pub fn apply(self, graphics: &mut Graphics) -> EmfPlusResult<()> {
        graphics.objects.register(u32::from(self.slot), self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::error::EmfPlusError;
    use crate::object::brush::tests::solid_brush_bytes;
    use crate::object::GraphicsObject;
    use crate::record::tests::play;
    use crate::record::RecordType;

    #[test]
    fn test_object_record_registers_brush() {
        let mut g = Graphics::default();
        let mut canvas = RecordingCanvas::new();
        play(&mut g, &mut canvas, RecordType::Object.raw(), 0x0105, &solid_brush_bytes(0xFF00_00FF)).unwrap();
        let entry = g.objects.get(5).unwrap();
        assert!(matches!(entry.object, GraphicsObject::Brush(_)));
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut g = Graphics::default();
        let mut canvas = RecordingCanvas::new();
        let err = play(&mut g, &mut canvas, RecordType::Object.raw(), 0x0140, &solid_brush_bytes(0)).unwrap_err();
        assert!(matches!(err, EmfPlusError::ObjectIdOutOfRange(64)));
    }
}
