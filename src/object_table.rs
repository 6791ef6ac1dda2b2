//! Slot-indexed registry of decoded graphics objects for one render pass

use crate::error::{EmfPlusError, EmfPlusResult};
use crate::image_loader::ImageLoader;
use crate::object::{ApplyMode, ContinuationFragment, DecodedObject, GraphicsObject, OBJECT_TABLE_SIZE};
use crate::properties::DrawProperties;
use log::debug;

/// Object plus the continuation fragments appended to it, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    pub object: GraphicsObject,
    pub fragments: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ObjectTable {
    slots: Vec<Option<TableEntry>>,
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self::new()
    }
}

fn check_slot(slot: u32) -> EmfPlusResult<usize> {
    let index = slot as usize;
    if index >= OBJECT_TABLE_SIZE {
        return Err(EmfPlusError::ObjectIdOutOfRange(slot));
    }
    Ok(index)
}

impl ObjectTable {
    pub fn new() -> Self {
        Self {
            slots: vec![None; OBJECT_TABLE_SIZE],
        }
    }

    /// Store `object` at `slot`, releasing the previous owner and its fragments
    pub fn set(&mut self, slot: u32, object: GraphicsObject) -> EmfPlusResult<()> {
        let index = check_slot(slot)?;
        if self.slots[index].is_some() {
            debug!("Replacing object in slot {}", slot);
        }
        self.slots[index] = Some(TableEntry {
            object,
            fragments: Vec::new(),
        });
        Ok(())
    }

    pub fn get(&self, slot: u32) -> EmfPlusResult<&TableEntry> {
        let index = check_slot(slot)?;
        self.slots[index]
            .as_ref()
            .ok_or(EmfPlusError::MissingObject(index as u8))
    }

    /// Entry at `slot`, `None` when the slot is empty
    pub fn find(&self, slot: u32) -> EmfPlusResult<Option<&TableEntry>> {
        let index = check_slot(slot)?;
        Ok(self.slots[index].as_ref())
    }

    /// Append a continuation fragment to the object already at `slot`
    pub fn append(&mut self, slot: u32, fragment: ContinuationFragment) -> EmfPlusResult<()> {
        let index = check_slot(slot)?;
        let entry = self.slots[index]
            .as_mut()
            .ok_or(EmfPlusError::MissingObject(index as u8))?;
        let found = entry.object.object_type();
        if found != fragment.object_type {
            return Err(EmfPlusError::ContinuationMismatch {
                slot: index as u8,
                expected: fragment.object_type,
                found,
            });
        }
        entry.fragments.push(fragment.data);
        Ok(())
    }

    /// Register a complete object or link a continuation
    pub fn register(&mut self, slot: u32, decoded: DecodedObject) -> EmfPlusResult<()> {
        match decoded {
            DecodedObject::Complete(object) => self.set(slot, object),
            DecodedObject::Continuation(fragment) => self.append(slot, fragment),
        }
    }

    pub fn apply(
        &self,
        slot: u32,
        mode: ApplyMode,
        props: &mut DrawProperties,
        loader: &dyn ImageLoader,
    ) -> EmfPlusResult<()> {
        let entry = self.get(slot)?;
        entry.object.apply(mode, &entry.fragments, props, loader)
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::DefaultImageLoader;
    use crate::object::{decode_object, OpaqueObject};
    use crate::object::image::tests::bitmap_bytes;
    use crate::object::GraphicsVersion;

    fn opaque(object_type: u8) -> GraphicsObject {
        GraphicsObject::Unknown(OpaqueObject {
            object_type,
            version: GraphicsVersion::default(),
            data: Vec::new(),
        })
    }

    #[test]
    fn test_set_replaces_owner() {
        let mut table = ObjectTable::new();
        table.set(3, opaque(0x20)).unwrap();
        table.set(3, opaque(0x21)).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(3).unwrap().object.object_type(), 0x21);
    }

    #[test]
    fn test_missing_and_out_of_range() {
        let table = ObjectTable::new();
        assert!(matches!(table.get(5), Err(EmfPlusError::MissingObject(5))));
        assert!(matches!(table.get(64), Err(EmfPlusError::ObjectIdOutOfRange(64))));
        assert!(table.find(5).unwrap().is_none());
    }

    #[test]
    fn test_image_continuation_is_linked() {
        let mut table = ObjectTable::new();
        let first = bitmap_bytes(1, 0, 0, 0, &[1, 2, 3]);
        let (decoded, _) = decode_object(0x8503, &[&[0u8, 1, 0, 0][..], &first].concat()).unwrap();
        table.register(3, decoded).unwrap();

        let tail = vec![4u8, 5, 6, 7, 8];
        let (decoded, _) = decode_object(0x8503, &[&[0u8, 1, 0, 0][..], &tail].concat()).unwrap();
        table.register(3, decoded).unwrap();

        let entry = table.get(3).unwrap();
        assert_eq!(entry.fragments, vec![tail]);
        match &entry.object {
            GraphicsObject::Image(image) => assert_eq!(image.raw_data(&entry.fragments), vec![1, 2, 3, 4, 5, 6, 7, 8]),
            other => panic!("unexpected object {:?}", other),
        }
    }

    #[test]
    fn test_continuation_kind_mismatch() {
        let mut table = ObjectTable::new();
        table.set(3, opaque(0x02)).unwrap();
        let fragment = ContinuationFragment {
            object_type: 5,
            total_size: None,
            data: vec![1],
        };
        assert!(matches!(
            table.append(3, fragment),
            Err(EmfPlusError::ContinuationMismatch {
                slot: 3,
                expected: 5,
                found: 2
            })
        ));
    }

    #[test]
    fn test_split_brush_applies_after_continuation() {
        let mut table = ObjectTable::new();
        let brush = crate::object::brush::tests::solid_brush_bytes(0xFF00_FF00);
        let mut first = vec![0u8, 0, 0, 0];
        first.extend_from_slice(&brush[..10]);
        let (decoded, _) = decode_object(0x8100, &first).unwrap();
        table.register(0, decoded).unwrap();

        let mut second = vec![0u8, 0, 0, 0];
        second.extend_from_slice(&brush[10..]);
        let (decoded, _) = decode_object(0x8100, &second).unwrap();
        table.register(0, decoded).unwrap();

        let mut props = DrawProperties::default();
        table
            .apply(0, ApplyMode::Brush, &mut props, &DefaultImageLoader)
            .unwrap();
        assert_eq!(props.brush_color, crate::types::Color::rgba(0, 255, 0, 255));
    }
}
