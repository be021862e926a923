//! Components: the nodes of a card's capability tree.
//!
//! A component owns its attributes and child components outright. Kind-specific
//! state and lifecycle hooks live in a [`ComponentBehavior`] trait object chosen
//! by the constructor that built the component.
//!
//! Lifecycle:
//! 1. **Construction:** A per-kind constructor creates the component and its attributes.
//! 2. **Post-initialization:** Runs once over the whole tree, parent before children.
//! 3. **Reset / defaults:** Driven by the card over the root's direct children.
//! 4. **Disposal:** Recursive, the component's own hook first, then children, then attributes.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::card::interconnect::Bus;
use crate::common::{DagError, Result};
use crate::discovery::RegisterEntry;
use crate::grw::Grw;
use crate::model::attribute::{Attribute, AttributeSummary};
use crate::model::codes::{AttributeCode, ComponentCode};
use crate::model::ids::{AttributeId, ComponentId};
use crate::model::value::AttributeValue;

/// Whether post-initialization continues into a component's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostInit {
    /// Post-initialize the children next.
    #[default]
    Recurse,
    /// The component handled its children itself.
    SkipChildren,
}

/// Context handed to component lifecycle hooks.
#[derive(Debug)]
pub struct ComponentContext<'a> {
    bus: &'a mut Bus,
    attributes: &'a mut [Attribute],
}

impl<'a> ComponentContext<'a> {
    /// Returns the register bus.
    pub fn bus(&mut self) -> &mut Bus {
        self.bus
    }

    /// Returns the component's attribute with `code`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchAttribute` if the component has none.
    pub fn attribute(&mut self, code: AttributeCode) -> Result<&mut Attribute> {
        self.attributes
            .iter_mut()
            .find(|a| a.code() == code)
            .ok_or(DagError::NoSuchAttribute)
    }

    /// Reads an attribute by code.
    ///
    /// # Errors
    ///
    /// `NoSuchAttribute`, or the attribute's own failure.
    pub fn get(&mut self, code: AttributeCode) -> Result<AttributeValue> {
        let bus = &mut *self.bus;
        let attr = self
            .attributes
            .iter_mut()
            .find(|a| a.code() == code)
            .ok_or(DagError::NoSuchAttribute)?;
        attr.get_value(bus).cloned()
    }

    /// Writes an attribute by code.
    ///
    /// # Errors
    ///
    /// `NoSuchAttribute`, or the attribute's own failure.
    pub fn set(&mut self, code: AttributeCode, value: &AttributeValue) -> Result<()> {
        let bus = &mut *self.bus;
        let attr = self
            .attributes
            .iter_mut()
            .find(|a| a.code() == code)
            .ok_or(DagError::NoSuchAttribute)?;
        attr.set_value(bus, value)
    }

    /// Returns the GRW bound to the attribute with `code`, if any.
    pub fn grw(&mut self, code: AttributeCode) -> Option<&mut Grw> {
        self.attributes
            .iter_mut()
            .find(|a| a.code() == code)
            .and_then(Attribute::grw_mut)
    }
}

/// Per-kind component behavior.
///
/// Every hook has a no-op default so simple kinds only override what they need.
pub trait ComponentBehavior: Send + fmt::Debug {
    /// Brings the hardware block to a usable state once the tree is built.
    fn post_initialize(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<PostInit> {
        Ok(PostInit::Recurse)
    }

    /// Returns the block to its power-on state.
    fn reset(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Applies the block's default configuration.
    fn set_defaults(&mut self, _ctx: &mut ComponentContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Re-points the component's registers at a new base address.
    fn update_register_base(&mut self, _ctx: &mut ComponentContext<'_>, _entry: &RegisterEntry) -> Result<()> {
        Ok(())
    }

    /// Releases behavior resources.
    fn dispose(&mut self) {}
}

/// The table entry a component was built from and its per-module index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModuleSlot {
    /// Table entry.
    pub entry: RegisterEntry,
    /// Running index among table entries with the same module code.
    pub index: u32,
}

/// Behavior for components with no hooks of their own, such as the root.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passive;

impl ComponentBehavior for Passive {}

/// One node of the capability tree.
#[derive(Debug)]
pub struct Component {
    id: ComponentId,
    code: ComponentCode,
    index: u32,
    name: String,
    description: String,
    module: Option<ModuleSlot>,
    attributes: Vec<Attribute>,
    children: Vec<Component>,
    behavior: Box<dyn ComponentBehavior>,
}

/// Serializable description of a component subtree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentSummary {
    /// Component id.
    pub id: ComponentId,
    /// Component kind.
    pub code: ComponentCode,
    /// Instance index within its kind.
    pub index: u32,
    /// Component name.
    pub name: String,
    /// Component description.
    pub description: String,
    /// Register base of the backing module, if discovered from the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_base: Option<u64>,
    /// Attributes in declaration order.
    pub attributes: Vec<AttributeSummary>,
    /// Children in tree order.
    pub children: Vec<ComponentSummary>,
}

impl Component {
    /// Creates a component with no attributes or children.
    ///
    /// Singleton kinds keep the bare kind name; others get the index appended.
    pub fn new(id: ComponentId, code: ComponentCode, index: u32, behavior: impl ComponentBehavior + 'static) -> Self {
        let name = match code {
            ComponentCode::Root | ComponentCode::CardInfo | ComponentCode::Sensor => code.name().to_owned(),
            _ => format!("{}{index}", code.name()),
        };
        Self {
            id,
            code,
            index,
            name,
            description: code.description().to_owned(),
            module: None,
            attributes: Vec::new(),
            children: Vec::new(),
            behavior: Box::new(behavior),
        }
    }

    /// Records the table entry this component was built from.
    pub fn with_module(mut self, entry: RegisterEntry, index: u32) -> Self {
        self.module = Some(ModuleSlot { entry, index });
        self
    }

    /// Returns the component id.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns the component kind.
    pub fn code(&self) -> ComponentCode {
        self.code
    }

    /// Returns the instance index within its kind.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the component description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the table entry this component was built from.
    pub fn module(&self) -> Option<ModuleSlot> {
        self.module
    }

    /// Returns the attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the children in tree order.
    pub fn children(&self) -> &[Component] {
        &self.children
    }

    /// Appends an attribute.
    pub fn push_attribute(&mut self, attribute: Attribute) -> AttributeId {
        let id = attribute.id();
        self.attributes.push(attribute);
        id
    }

    /// Appends a child component.
    pub fn push_child(&mut self, child: Component) -> ComponentId {
        let id = child.id;
        self.children.push(child);
        id
    }

    /// Finds a component in this subtree by id.
    pub fn find(&self, id: ComponentId) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Finds a component in this subtree by id, mutably.
    pub fn find_mut(&mut self, id: ComponentId) -> Option<&mut Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Finds the first component of `code` with instance `index` in this subtree.
    pub fn find_by_code(&self, code: ComponentCode, index: u32) -> Option<&Self> {
        if self.code == code && self.index == index {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_code(code, index))
    }

    /// Finds an attribute in this subtree by id.
    pub fn find_attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.id() == id)
            .or_else(|| self.children.iter().find_map(|c| c.find_attribute(id)))
    }

    /// Finds an attribute in this subtree by id, mutably.
    pub fn find_attribute_mut(&mut self, id: AttributeId) -> Option<&mut Attribute> {
        if let Some(pos) = self.attributes.iter().position(|a| a.id() == id) {
            return Some(&mut self.attributes[pos]);
        }
        self.children.iter_mut().find_map(|c| c.find_attribute_mut(id))
    }

    /// Returns this component's attribute with `code`.
    pub fn attribute_by_code(&self, code: AttributeCode) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.code() == code)
    }

    /// Returns the number of components in this subtree, including itself.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    /// Returns a serializable description of this subtree.
    pub fn summary(&self) -> ComponentSummary {
        ComponentSummary {
            id: self.id,
            code: self.code,
            index: self.index,
            name: self.name.clone(),
            description: self.description.clone(),
            register_base: self.module.map(|m| m.entry.base),
            attributes: self.attributes.iter().map(Attribute::summary).collect(),
            children: self.children.iter().map(Self::summary).collect(),
        }
    }

    fn context<'a>(&'a mut self, bus: &'a mut Bus) -> (&'a mut dyn ComponentBehavior, ComponentContext<'a>) {
        (
            self.behavior.as_mut(),
            ComponentContext {
                bus,
                attributes: &mut self.attributes,
            },
        )
    }

    /// Post-initializes this component, its attributes, then its children
    /// unless the hook asks to skip them.
    pub(crate) fn post_initialize(&mut self, bus: &mut Bus) -> Result<()> {
        let (behavior, mut ctx) = self.context(bus);
        let flow = behavior.post_initialize(&mut ctx)?;
        for attr in &mut self.attributes {
            attr.post_initialize(bus)?;
        }
        debug!(component = %self.name, ?flow, "post-initialized");
        if flow == PostInit::Recurse {
            for child in &mut self.children {
                child.post_initialize(bus)?;
            }
        }
        Ok(())
    }

    pub(crate) fn reset(&mut self, bus: &mut Bus) -> Result<()> {
        let (behavior, mut ctx) = self.context(bus);
        behavior.reset(&mut ctx)
    }

    pub(crate) fn set_defaults(&mut self, bus: &mut Bus) -> Result<()> {
        let (behavior, mut ctx) = self.context(bus);
        behavior.set_defaults(&mut ctx)
    }

    pub(crate) fn update_register_base(&mut self, bus: &mut Bus, entry: RegisterEntry) -> Result<()> {
        let (behavior, mut ctx) = self.context(bus);
        behavior.update_register_base(&mut ctx, &entry)?;
        if let Some(slot) = self.module.as_mut() {
            slot.entry = entry;
        }
        Ok(())
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Component] {
        &mut self.children
    }

    /// Tears down this subtree: own hook, then children, then attributes.
    pub(crate) fn dispose(&mut self) {
        self.behavior.dispose();
        for child in &mut self.children {
            child.dispose();
        }
        for attr in &mut self.attributes {
            attr.dispose();
        }
        self.children.clear();
        self.attributes.clear();
    }
}
