//! Static firmware catalogs.
//!
//! Two ordered tables drive image matching:
//! 1. **Image index table:** `(PCI device id, load slot)` → image index.
//! 2. **Image catalog:** image index → accepted design-name prefix, part,
//!    coprocessor and minimum board revision.
//!
//! Both are scanned first-match-wins, so row order is significant. Several
//! image indices carry more than one row for the same card (alternative builds
//! with different coprocessor fits or board revisions); their order is kept
//! exactly as listed. Rows for lab-only builds sit in a separate table that is
//! only compiled with the `lab-images` feature and is scanned after the
//! production rows.

use serde::Serialize;

use crate::card::identity::CoproId;

/// Canonical firmware image index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ImageIndex(pub u32);

/// Wildcard coprocessor id in catalog rows.
pub const ANY_COPRO: CoproId = -1;

/// One row of the image index table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageIndexRecord {
    /// PCI device id.
    pub device_id: u16,
    /// Firmware load slot on the card.
    pub load_index: u32,
    /// Image index for that slot.
    pub image: ImageIndex,
}

/// One row of the image catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FirmwareImageRecord {
    /// Image index the row applies to.
    pub image: ImageIndex,
    /// Required prefix of the bitstream design name.
    pub name_prefix: &'static str,
    /// Required bitstream part name.
    pub part: &'static str,
    /// Required coprocessor, or [`ANY_COPRO`].
    pub copro: CoproId,
    /// Minimum board revision.
    pub min_board_rev: u32,
}

const fn idx(device_id: u16, load_index: u32, image: u32) -> ImageIndexRecord {
    ImageIndexRecord {
        device_id,
        load_index,
        image: ImageIndex(image),
    }
}

const fn img(image: u32, name_prefix: &'static str, part: &'static str, copro: CoproId, min_board_rev: u32) -> FirmwareImageRecord {
    FirmwareImageRecord {
        image: ImageIndex(image),
        name_prefix,
        part,
        copro,
        min_board_rev,
    }
}

/// `(device id, load slot)` → image index, in lookup order.
pub static IMAGE_INDEX_TABLE: &[ImageIndexRecord] = &[
    idx(0x3500, 0, 20),
    idx(0x3500, 1, 21),
    idx(0x3800, 0, 24),
    idx(0x4300, 0, 30),
    idx(0x4300, 1, 31),
    idx(0x4500, 0, 34),
    idx(0x4500, 1, 35),
    idx(0x6100, 0, 40),
    idx(0x7100, 0, 44),
    idx(0x7100, 1, 45),
    idx(0x8100, 0, 50),
    idx(0x8100, 1, 51),
    idx(0x8200, 0, 52),
    idx(0x8200, 1, 53),
    idx(0x9200, 0, 60),
    idx(0x9200, 1, 61),
];

/// Production image catalog, in match order.
pub static IMAGE_CATALOG: &[FirmwareImageRecord] = &[
    img(20, "dag35pci", "2s200fg256", ANY_COPRO, 0),
    img(21, "dag35ppp", "2s200fg256", ANY_COPRO, 0),
    img(24, "dag38s", "2v1000fg456", ANY_COPRO, 0),
    img(30, "dag43s", "2v3000ff1152", ANY_COPRO, 0),
    img(31, "dag43ge", "2v3000ff1152", ANY_COPRO, 0),
    img(34, "dag45", "2vp30ff896", ANY_COPRO, 0),
    img(35, "dag45g", "2vp30ff896", ANY_COPRO, 0),
    img(40, "dag61", "2vp50ff1152", ANY_COPRO, 1),
    img(40, "dag61", "2vp70ff1517", ANY_COPRO, 3),
    img(44, "dag71s", "2vp30ff896", 1, 0),
    img(44, "dag71s_erf", "2vp30ff896", ANY_COPRO, 0),
    img(45, "dag71s_pp", "2vp30ff896", 2, 0),
    img(50, "dag81", "4vlx100ff1148", ANY_COPRO, 0),
    img(51, "dag81_ipf", "4vlx100ff1148", 1, 0),
    img(51, "dag81_ipf", "4vlx100ff1148", 2, 0),
    img(52, "dag82x", "4vfx60ff1152", ANY_COPRO, 0),
    img(52, "dag82x", "4vfx60ff1152", ANY_COPRO, 0),
    img(53, "dag82x_pp", "4vfx60ff1152", 2, 2),
    img(60, "dag92x", "5vlx110tff1136", ANY_COPRO, 0),
    img(61, "dag92x_tx", "5vlx110tff1136", ANY_COPRO, 0),
];

/// Lab-only image catalog, scanned after the production rows.
#[cfg(feature = "lab-images")]
pub static LAB_IMAGE_CATALOG: &[FirmwareImageRecord] = &[
    img(20, "dag35lab", "2s200fg256", ANY_COPRO, 0),
    img(44, "dag71s_lab", "2vp30ff896", ANY_COPRO, 0),
    img(52, "dag82x_lab", "4vfx60ff1152", ANY_COPRO, 0),
];

/// Lab-only image catalog; empty without the `lab-images` feature.
#[cfg(not(feature = "lab-images"))]
pub static LAB_IMAGE_CATALOG: &[FirmwareImageRecord] = &[];

/// Every catalog row in match order.
pub fn catalog() -> impl Iterator<Item = &'static FirmwareImageRecord> {
    IMAGE_CATALOG.iter().chain(LAB_IMAGE_CATALOG)
}
