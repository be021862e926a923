//! The card: root of one device's capability tree.
//!
//! A `Card` owns the register bus and the component tree built by discovery.
//! Callers address components and attributes by id; every operation checks the
//! id's card serial first, then resolves it, and only then touches hardware.
//!
//! A card is `Send` but not `Sync`: register read-modify-write sequences need
//! exclusive access, so every operation takes `&mut self`. Share a card across
//! threads by wrapping it in a `Mutex`.

use tracing::{debug, warn};

use crate::card::identity::CardIdentity;
use crate::card::interconnect::Bus;
use crate::common::{DagError, GrwError, Result};
use crate::discovery::{self, read_table};
use crate::firmware::{ImageMatch, check_image, image_index};
use crate::model::{
    Attribute, AttributeCode, AttributeId, AttributeValue, Component, ComponentCode, ComponentId, ComponentSummary,
};

/// An opened (or offline) capture card.
#[derive(Debug)]
pub struct Card {
    serial: u32,
    identity: CardIdentity,
    bus: Bus,
    root: Component,
}

impl Card {
    pub(crate) fn new(serial: u32, identity: CardIdentity, bus: Bus, root: Component) -> Self {
        Self {
            serial,
            identity,
            bus,
            root,
        }
    }

    /// Returns the process-unique serial stamped into this card's ids.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Returns what the driver reported at open.
    pub fn identity(&self) -> &CardIdentity {
        &self.identity
    }

    /// Returns the root component.
    pub fn root(&self) -> &Component {
        &self.root
    }

    /// Returns the register bus for raw access.
    pub fn bus(&mut self) -> &mut Bus {
        &mut self.bus
    }

    fn check_component(&self, id: ComponentId) -> Result<()> {
        if id.card() == self.serial {
            Ok(())
        } else {
            Err(DagError::InvalidCardRef)
        }
    }

    fn check_attribute(&self, id: AttributeId) -> Result<()> {
        if id.card() == self.serial {
            Ok(())
        } else {
            Err(DagError::InvalidCardRef)
        }
    }

    /// Resolves a component id.
    ///
    /// # Errors
    ///
    /// `InvalidCardRef` for another card's id, `NoSuchComponent` if unknown.
    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        self.check_component(id)?;
        self.root.find(id).ok_or(DagError::NoSuchComponent)
    }

    /// Finds the component of kind `code` with instance `index`.
    ///
    /// # Errors
    ///
    /// `NoSuchComponent` if the card has none.
    pub fn find_component(&self, code: ComponentCode, index: u32) -> Result<ComponentId> {
        self.root
            .find_by_code(code, index)
            .map(Component::id)
            .ok_or(DagError::NoSuchComponent)
    }

    /// Returns the id of `component`'s attribute with `code`.
    ///
    /// # Errors
    ///
    /// `InvalidCardRef`, `NoSuchComponent`, or `NoSuchAttribute`.
    pub fn attribute_of(&self, component: ComponentId, code: AttributeCode) -> Result<AttributeId> {
        self.component(component)?
            .attribute_by_code(code)
            .map(Attribute::id)
            .ok_or(DagError::NoSuchAttribute)
    }

    /// Resolves an attribute id.
    ///
    /// # Errors
    ///
    /// `InvalidCardRef` for another card's id, `NoSuchAttribute` if unknown.
    pub fn attribute(&self, id: AttributeId) -> Result<&Attribute> {
        self.check_attribute(id)?;
        self.root.find_attribute(id).ok_or(DagError::NoSuchAttribute)
    }

    fn attribute_mut(&mut self, id: AttributeId) -> Result<(&mut Attribute, &mut Bus)> {
        self.check_attribute(id)?;
        let attr = self.root.find_attribute_mut(id).ok_or(DagError::NoSuchAttribute)?;
        Ok((attr, &mut self.bus))
    }

    /// Reads an attribute.
    ///
    /// # Errors
    ///
    /// Id errors, or the attribute's own failure.
    pub fn get_attribute(&mut self, id: AttributeId) -> Result<&AttributeValue> {
        let (attr, bus) = self.attribute_mut(id)?;
        attr.get_value(bus)
    }

    /// Writes an attribute.
    ///
    /// # Errors
    ///
    /// Id errors, `StatusAttribute`, `InvalidParameter`, or the attribute's own failure.
    pub fn set_attribute(&mut self, id: AttributeId, value: &AttributeValue) -> Result<()> {
        let (attr, bus) = self.attribute_mut(id)?;
        attr.set_value(bus, value)
    }

    /// Renders an attribute as text; `Ok(None)` if it has no text form.
    ///
    /// # Errors
    ///
    /// Id errors, or the attribute's own failure.
    pub fn attribute_to_text(&mut self, id: AttributeId) -> Result<Option<String>> {
        let (attr, bus) = self.attribute_mut(id)?;
        attr.to_text(bus)
    }

    /// Parses and applies text; `Ok(false)` if the attribute has no text form.
    ///
    /// # Errors
    ///
    /// Id errors, `StatusAttribute`, parse or attribute failures.
    pub fn attribute_from_text(&mut self, id: AttributeId, text: &str) -> Result<bool> {
        let (attr, bus) = self.attribute_mut(id)?;
        attr.from_text(bus, text)
    }

    /// Returns and clears the latched transport error of an attribute's register.
    ///
    /// # Errors
    ///
    /// Id errors.
    pub fn attribute_last_error(&mut self, id: AttributeId) -> Result<Option<GrwError>> {
        let (attr, _) = self.attribute_mut(id)?;
        Ok(attr.grw_last_error())
    }

    /// Resets every top-level component.
    ///
    /// # Errors
    ///
    /// The first component failure; later components are not reset.
    pub fn reset(&mut self) -> Result<()> {
        for child in self.root.children_mut() {
            child.reset(&mut self.bus)?;
        }
        debug!(card = self.serial, "reset");
        Ok(())
    }

    /// Applies default configuration to every top-level component.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn set_defaults(&mut self) -> Result<()> {
        for child in self.root.children_mut() {
            child.set_defaults(&mut self.bus)?;
        }
        debug!(card = self.serial, "defaults applied");
        Ok(())
    }

    /// Re-reads the enumeration table and re-points every module's registers.
    ///
    /// Call after loading new firmware, which may move register blocks.
    ///
    /// # Errors
    ///
    /// The first component failure.
    pub fn update_register_base(&mut self) -> Result<()> {
        let table = read_table(&mut self.bus);
        discovery::update_register_base(&mut self.root, &mut self.bus, &table)
    }

    /// Returns a serializable description of the whole tree.
    pub fn inventory(&self) -> ComponentSummary {
        self.root.summary()
    }

    /// Returns the inventory as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// `General` if serialization fails.
    pub fn inventory_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.inventory()).map_err(|e| DagError::General(e.to_string()))
    }

    /// Checks that `bytes` may be loaded into slot `load_index` of this card.
    ///
    /// # Errors
    ///
    /// `CardNotSupported` if the card has no image for the slot,
    /// `FirmwareVerifyFailed` unless the image matches exactly.
    pub fn check_firmware(&self, bytes: &[u8], load_index: u32) -> Result<()> {
        let id = &self.identity;
        let Some(image) = image_index(id.device_id, load_index) else {
            warn!(device_id = id.device_id, load_index, "no firmware image for card");
            return Err(DagError::CardNotSupported);
        };
        match check_image(image, id.copro, bytes, id.board_rev) {
            ImageMatch::Exact => Ok(()),
            grade => {
                warn!(image = image.0, grade = grade.code(), "firmware rejected");
                Err(DagError::FirmwareVerifyFailed)
            }
        }
    }

    /// Closes the card, tearing down its tree.
    pub fn close(self) {}
}

impl Drop for Card {
    fn drop(&mut self) {
        self.root.dispose();
        debug!(card = self.serial, "card closed");
    }
}
