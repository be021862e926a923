//! Board temperature sensor on the SMBus.
//!
//! The sensor hangs off whichever SMBus controller the enumeration table
//! reports: a version 0 block is the raw two-wire controller, version 1 the
//! DRB-mediated one. Without a controller the attributes stay unbound and every
//! access latches an error.

use tracing::warn;

use crate::card::identity::SensorLocation;
use crate::common::{Result, SmbusAddress};
use crate::components::{Assembler, BuildContext};
use crate::discovery::{ModuleCode, RegisterEntry};
use crate::grw::{DrbSmbus, Grw, RawSmbus};
use crate::model::{
    AttributeBehavior, AttributeCode, AttributeIo, AttributeValue, Component, ComponentBehavior, ComponentCode,
    ComponentContext, RegisterField, ValueType,
};

/// Local temperature register.
pub const REG_LOCAL_TEMP: u8 = 0x00;
/// Local high-limit register.
pub const REG_LOCAL_HIGH: u8 = 0x05;
/// High limit applied by `set_defaults`, in degrees Celsius.
pub const DEFAULT_HIGH_LIMIT: u32 = 85;

/// Two's-complement temperature byte.
#[derive(Clone, Copy, Debug, Default)]
struct Celsius;

impl AttributeBehavior for Celsius {
    fn get(&mut self, io: &mut AttributeIo<'_>) -> Result<AttributeValue> {
        let raw = io.read()? as u8;
        Ok(AttributeValue::Int32(i32::from(raw as i8)))
    }

    fn to_text(&mut self, io: &mut AttributeIo<'_>) -> Option<Result<String>> {
        Some(self.get(io).map(|v| format!("{v} C")))
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Sensor;

impl ComponentBehavior for Sensor {
    fn set_defaults(&mut self, ctx: &mut ComponentContext<'_>) -> Result<()> {
        ctx.set(AttributeCode::TemperatureLimit, &AttributeValue::Uint32(DEFAULT_HIGH_LIMIT))
    }
}

fn grw_for(controller: Option<RegisterEntry>, address: SmbusAddress) -> Grw {
    match controller {
        Some(e) if e.version == 0 => Grw::new(address, RawSmbus::new(e.base)),
        Some(e) => Grw::new(address, DrbSmbus::new(e.base)),
        None => Grw::unbound(address),
    }
}

/// Builds the sensor component at `location`.
pub fn build(ctx: &mut BuildContext<'_>, location: SensorLocation) -> Component {
    let controller = ctx.table.iter().copied().find(|e| e.module == ModuleCode::SMBUS);
    if controller.is_none() {
        warn!(?location, "card reports a sensor but no smbus controller");
    }
    let at = |register| SmbusAddress {
        device_register: register,
        device_address: location.device_address,
        line: location.line,
        sub_bus: location.sub_bus,
    };

    let mut a = Assembler::new(ctx.ids, ComponentCode::Sensor, 0, Sensor);
    a.status(
        AttributeCode::Temperature,
        ValueType::Int32,
        Celsius,
        grw_for(controller, at(REG_LOCAL_TEMP)),
    );
    a.config(
        AttributeCode::TemperatureLimit,
        ValueType::Uint32,
        RegisterField::new(0xFF),
        grw_for(controller, at(REG_LOCAL_HIGH)),
    );
    a.finish()
}
