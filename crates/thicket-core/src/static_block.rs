//! Static block storage: a fixed set of declared slots
//!
//! A [`StaticLayout`] is assembled once per block type from explicit slot
//! descriptors. Layouts compose: a derived layout lists its base layout's
//! slots first, followed by its own. Every [`StaticBlock`] built from a
//! layout shares it through an `Arc`, so per-instance storage is one
//! optional handle per slot plus any overflow attributes.

use crate::category::Category;
use crate::error::{Error, Result};
use crate::limits::{validate_key_name, validate_slot_count, ValidationError};
use crate::node::NodeId;
use crate::ordered::OrderedMap;
use std::collections::HashSet;
use std::sync::Arc;

/// A declared slot on a static layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub name: Arc<str>,
    /// Category the slot accepts; `None` accepts any
    pub category: Option<Category>,
}

/// Fixed slot set shared by every block of one static type
#[derive(Debug, Clone)]
pub struct StaticLayout {
    name: String,
    slots: Vec<SlotDescriptor>,
    allow_overflow: bool,
}

impl StaticLayout {
    pub fn builder(name: impl Into<String>) -> StaticLayoutBuilder {
        StaticLayoutBuilder {
            name: name.into(),
            base: Vec::new(),
            slots: Vec::new(),
            allow_overflow: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared slots, inherited ones first
    pub fn slots(&self) -> &[SlotDescriptor] {
        &self.slots
    }

    pub fn allows_overflow(&self) -> bool {
        self.allow_overflow
    }

    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| &*s.name == name)
    }
}

/// Builder for [`StaticLayout`]
#[derive(Debug, Clone)]
pub struct StaticLayoutBuilder {
    name: String,
    base: Vec<SlotDescriptor>,
    slots: Vec<SlotDescriptor>,
    allow_overflow: bool,
}

impl StaticLayoutBuilder {
    /// Inherit every slot of `base`, placed before this layout's own slots
    pub fn extends(mut self, base: &StaticLayout) -> Self {
        self.base.extend(base.slots.iter().cloned());
        self.allow_overflow |= base.allow_overflow;
        self
    }

    /// Declare a slot accepting any category
    pub fn slot(mut self, name: &str) -> Self {
        self.slots.push(SlotDescriptor {
            name: Arc::from(name),
            category: None,
        });
        self
    }

    /// Declare a slot accepting a single category
    pub fn typed_slot(mut self, name: &str, category: impl Into<Category>) -> Self {
        self.slots.push(SlotDescriptor {
            name: Arc::from(name),
            category: Some(category.into()),
        });
        self
    }

    /// Accept attachments under undeclared names
    pub fn allow_overflow(mut self) -> Self {
        self.allow_overflow = true;
        self
    }

    pub fn build(self) -> Result<Arc<StaticLayout>> {
        let mut slots = self.base;
        slots.extend(self.slots);
        validate_slot_count(slots.len())?;

        let mut seen = HashSet::new();
        for slot in &slots {
            validate_key_name(&slot.name)?;
            if !seen.insert(slot.name.clone()) {
                return Err(ValidationError::DuplicateSlot(slot.name.to_string()).into());
            }
        }

        Ok(Arc::new(StaticLayout {
            name: self.name,
            slots,
            allow_overflow: self.allow_overflow,
        }))
    }
}

/// Children of a block with a fixed, pre-declared slot set
#[derive(Debug, Clone)]
pub struct StaticBlock {
    layout: Arc<StaticLayout>,
    slots: Vec<Option<NodeId>>,
    overflow: OrderedMap<Arc<str>, NodeId>,
}

impl StaticBlock {
    pub fn new(layout: Arc<StaticLayout>) -> Self {
        let slots = vec![None; layout.slots.len()];
        Self {
            layout,
            slots,
            overflow: OrderedMap::new(),
        }
    }

    pub fn layout(&self) -> &Arc<StaticLayout> {
        &self.layout
    }

    /// Number of occupied slots and overflow attributes
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count() + self.overflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        match self.layout.slot_index(name) {
            Some(i) => self.slots[i],
            None => self.overflow.get(name).copied(),
        }
    }

    /// Check that `name` may hold a child of `category`
    pub(crate) fn check_slot(&self, name: &str, category: &Category) -> Result<()> {
        match self.layout.slot_index(name) {
            Some(i) => match &self.layout.slots[i].category {
                Some(expected) if expected != category => Err(Error::CategoryMismatch {
                    expected: expected.clone(),
                    found: category.clone(),
                }),
                _ => Ok(()),
            },
            None if self.layout.allow_overflow => validate_key_name(name).map_err(Into::into),
            None => Err(Error::UnknownSlot {
                layout: self.layout.name.clone(),
                slot: name.to_string(),
            }),
        }
    }

    /// Store `child` at `name`, returning the previous occupant
    pub(crate) fn put(&mut self, name: &str, child: NodeId) -> Option<NodeId> {
        match self.layout.slot_index(name) {
            Some(i) => self.slots[i].replace(child),
            None => self.overflow.insert(Arc::from(name), child),
        }
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<NodeId> {
        match self.layout.slot_index(name) {
            Some(i) => self.slots[i].take(),
            None => self.overflow.shift_remove(name),
        }
    }

    /// Next occupied entry at or after `cursor`: declared slots, then overflow
    pub fn next_occupied(&self, cursor: &mut usize) -> Option<(&Arc<str>, NodeId)> {
        while *cursor < self.slots.len() {
            let i = *cursor;
            *cursor += 1;
            if let Some(id) = self.slots[i] {
                return Some((&self.layout.slots[i].name, id));
            }
        }
        let i = *cursor - self.slots.len();
        let (name, id) = self.overflow.get_index(i)?;
        *cursor += 1;
        Some((name, *id))
    }

    /// Occupied entries: declared slots in layout order, then overflow
    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, NodeId)> + '_ {
        let mut cursor = 0;
        std::iter::from_fn(move || self.next_occupied(&mut cursor))
    }

    /// Name under which `child` is stored, scanning slots then overflow
    pub fn key_of(&self, child: NodeId) -> Option<&Arc<str>> {
        self.iter().find(|(_, id)| *id == child).map(|(name, _)| name)
    }
}
