//! Firmware compatibility matching.
//!
//! Pure functions over static catalogs; nothing here touches a card. It provides:
//! 1. **Catalogs:** The image index table and the image catalog (`catalog`).
//! 2. **Header parsing:** Xilinx bitstream identity records (`xrev`).
//! 3. **Matching:** Image index lookup and image grading (`matcher`).

/// Image index table and image catalog.
pub mod catalog;

/// Image lookup and grading.
pub mod matcher;

/// Bitstream header parsing.
pub mod xrev;

pub use catalog::{FirmwareImageRecord, ImageIndex, ImageIndexRecord};
pub use matcher::{ImageMatch, check_image, check_image_file, check_image_type, image_index};
pub use xrev::{XrevError, XrevInfo, parse_xrev};
