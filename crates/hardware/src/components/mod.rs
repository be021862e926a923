//! Per-kind component constructors.
//!
//! Each kind lives in its own module and exposes a constructor with the
//! [`ModuleCtor`] shape (table-backed kinds) or a bespoke `build` function
//! (card info and sensor, which discovery always adds).

/// Card identification.
pub mod card_info;

/// Packet processor.
pub mod gpp;

/// Packet buffer manager.
pub mod pbm;

/// IOM-tunnelled PHY.
pub mod phy;

/// Network port.
pub mod port;

/// Temperature sensor.
pub mod sensor;

/// Memory streams.
pub mod stream;

use crate::card::identity::CardIdentity;
use crate::discovery::RegisterEntry;
use crate::grw::Grw;
use crate::model::{
    Attribute, AttributeBehavior, AttributeClass, AttributeCode, AttributeValue, Component,
    ComponentBehavior, ComponentCode, Constant, IdAllocator, ValueType,
};

/// What a constructor may consult while building a component.
#[derive(Debug)]
pub struct BuildContext<'a> {
    /// Id source for the card under construction.
    pub ids: &'a mut IdAllocator,
    /// Card identification.
    pub identity: &'a CardIdentity,
    /// The enumeration table as read at discovery.
    pub table: &'a [RegisterEntry],
}

/// Constructor for a table-backed module: entry plus running per-module index.
pub type ModuleCtor = fn(&mut BuildContext<'_>, RegisterEntry, u32) -> Component;

/// Builds one component and its attributes.
pub(crate) struct Assembler<'a> {
    ids: &'a mut IdAllocator,
    component: Component,
}

impl<'a> Assembler<'a> {
    pub(crate) fn new(
        ids: &'a mut IdAllocator,
        code: ComponentCode,
        index: u32,
        behavior: impl ComponentBehavior + 'static,
    ) -> Self {
        let component = Component::new(ids.component(), code, index, behavior);
        Self { ids, component }
    }

    pub(crate) fn module(mut self, entry: RegisterEntry, index: u32) -> Self {
        self.component = self.component.with_module(entry, index);
        self
    }

    pub(crate) fn attr(
        &mut self,
        class: AttributeClass,
        code: AttributeCode,
        value_type: ValueType,
        behavior: impl AttributeBehavior + 'static,
        grw: Option<Grw>,
    ) {
        let mut attr = Attribute::new(self.ids.attribute(), self.component.id(), code, class, value_type, behavior);
        if let Some(grw) = grw {
            attr = attr.with_grw(grw);
        }
        let _ = self.component.push_attribute(attr);
    }

    pub(crate) fn config(
        &mut self,
        code: AttributeCode,
        value_type: ValueType,
        behavior: impl AttributeBehavior + 'static,
        grw: Grw,
    ) {
        self.attr(AttributeClass::Config, code, value_type, behavior, Some(grw))
    }

    pub(crate) fn status(
        &mut self,
        code: AttributeCode,
        value_type: ValueType,
        behavior: impl AttributeBehavior + 'static,
        grw: Grw,
    ) {
        self.attr(AttributeClass::Status, code, value_type, behavior, Some(grw))
    }

    pub(crate) fn constant(&mut self, code: AttributeCode, value: AttributeValue) {
        let value_type = value.value_type();
        self.attr(AttributeClass::Status, code, value_type, Constant::new(value), None)
    }

    pub(crate) fn finish(self) -> Component {
        self.component
    }
}
