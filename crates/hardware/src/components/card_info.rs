//! Card identification component.
//!
//! Exposes what the driver reported at open as constants, plus the serial
//! number read from the ROM trailer.

use crate::common::GrwAddress;
use crate::components::{Assembler, BuildContext};
use crate::grw::{Grw, RomRead};
use crate::model::{AttributeCode, AttributeValue, Component, ComponentCode, Passive, RegisterWord, ValueType};

/// Offset of the serial number within the ROM trailer payload.
pub const ROM_SERIAL_OFFSET: u64 = 0x0;

/// Builds the card info component.
pub fn build(ctx: &mut BuildContext<'_>) -> Component {
    let identity = ctx.identity;
    let mut a = Assembler::new(ctx.ids, ComponentCode::CardInfo, 0, Passive);
    a.constant(AttributeCode::PciDeviceId, AttributeValue::Uint32(u32::from(identity.device_id)));
    a.constant(AttributeCode::BoardRevision, AttributeValue::Uint32(identity.board_rev));
    a.constant(AttributeCode::CoprocessorType, AttributeValue::Int32(identity.copro));
    a.constant(AttributeCode::FirmwareLoadIndex, AttributeValue::Uint32(identity.load_index));
    a.constant(AttributeCode::RxStreamCount, AttributeValue::Uint32(identity.rx_streams));
    a.constant(AttributeCode::TxStreamCount, AttributeValue::Uint32(identity.tx_streams));
    a.status(
        AttributeCode::SerialNumber,
        ValueType::Uint32,
        RegisterWord,
        Grw::new(GrwAddress(ROM_SERIAL_OFFSET), RomRead),
    );
    a.finish()
}
