//! Render-pass context: draw properties, saved states, object table and
//! window mapping

use crate::error::{EmfPlusError, EmfPlusResult};
use crate::image_loader::{DefaultImageLoader, ImageLoader};
use crate::object::ApplyMode;
use crate::object_table::ObjectTable;
use crate::properties::{DrawProperties, UnitType};
use crate::shape::{CombineMode, RegionNode};
use crate::types::Transform;
use log::debug;
use std::collections::HashMap;

pub struct Graphics {
    pub props: DrawProperties,
    saved: HashMap<u32, DrawProperties>,
    pub objects: ObjectTable,
    /// Window mapping from page units to device pixels
    initial_transform: Transform,
    /// Set by GetDC; legacy records after it should be drawn by the host
    pub get_dc: bool,
    pub dpi: f64,
    loader: Box<dyn ImageLoader>,
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new(96.0)
    }
}

impl Graphics {
    pub fn new(dpi: f64) -> Self {
        Self::with_loader(dpi, Box::new(DefaultImageLoader))
    }

    pub fn with_loader(dpi: f64, loader: Box<dyn ImageLoader>) -> Self {
        let mut graphics = Self {
            props: DrawProperties::default(),
            saved: HashMap::new(),
            objects: ObjectTable::new(),
            initial_transform: Transform::identity(),
            get_dc: false,
            dpi,
            loader,
        };
        graphics.update_window_mapping();
        graphics
    }

    pub fn loader(&self) -> &dyn ImageLoader {
        self.loader.as_ref()
    }

    pub fn initial_transform(&self) -> Transform {
        self.initial_transform
    }

    /// Apply the object at `slot` to the current draw properties
    pub fn apply_object(&mut self, slot: u32, mode: ApplyMode) -> EmfPlusResult<()> {
        self.objects
            .apply(slot, mode, &mut self.props, self.loader.as_ref())
    }

    pub fn save(&mut self, index: u32) {
        if self.saved.insert(index, self.props.clone()).is_some() {
            debug!("Overwriting saved state {}", index);
        }
    }

    /// Replace the current properties with the snapshot at `index`.
    /// The snapshot stays available for later restores.
    pub fn restore(&mut self, index: u32) -> EmfPlusResult<()> {
        let snapshot = self
            .saved
            .get(&index)
            .ok_or(EmfPlusError::MissingSavedState(index))?;
        self.props = snapshot.clone();
        Ok(())
    }

    /// Recompute the page-unit mapping and the effective transform
    pub fn update_window_mapping(&mut self) {
        let factor = self.props.page_scale * self.props.page_unit.pixels_per_unit(self.dpi);
        self.initial_transform = Transform::scale(factor, factor);
        self.props.transform = self.initial_transform.concatenate(&self.props.world_transform);
    }

    pub fn set_page_transform(&mut self, unit: UnitType, scale: f64) {
        self.props.page_unit = unit;
        self.props.page_scale = scale;
        self.update_window_mapping();
    }

    /// Replace the world transform, discarding prior concatenations
    pub fn set_world_transform(&mut self, transform: Transform) {
        self.props.world_transform = transform;
        self.update_window_mapping();
    }

    pub fn reset_world_transform(&mut self) {
        self.props.world_transform = Transform::identity();
        self.props.transform = self.initial_transform;
    }

    /// Combine `transform` with the world transform and re-derive the
    /// effective transform from the initial one. The window mapping is not
    /// recomputed.
    pub fn multiply_world_transform(&mut self, transform: &Transform, post: bool) {
        let world = &self.props.world_transform;
        self.props.world_transform = if post {
            world.pre_concatenate(transform)
        } else {
            world.concatenate(transform)
        };
        self.props.transform = self.initial_transform.concatenate(&self.props.world_transform);
    }

    pub fn set_clip(&mut self, mode: CombineMode, shape: RegionNode) {
        let current = std::mem::replace(&mut self.props.clip, RegionNode::Infinite);
        self.props.clip = current.combine(mode, shape);
    }

    pub fn reset_clip(&mut self) {
        self.props.clip = RegionNode::Infinite;
    }
}
