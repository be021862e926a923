//! Firmware image compatibility matching.
//!
//! Grades a candidate bitstream against the catalog rows for an image index:
//!
//! | Grade                   | Code | Meaning                                        |
//! |-------------------------|------|------------------------------------------------|
//! | [`ImageMatch::Exact`]   | 0    | Part, name prefix and coprocessor all match    |
//! | [`ImageMatch::TypeOnly`]| 1    | Some row's part matches, no row matches fully  |
//! | [`ImageMatch::NoMatch`] | 2    | No eligible row has this part                  |
//! | [`ImageMatch::Malformed`]| -1  | Too short, or the header does not parse        |
//!
//! Rows are eligible when their image index matches and the board revision is
//! at least the row's minimum. The scan is first-match-wins in catalog order.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::card::identity::CoproId;
use crate::common::{DagError, Result};
use crate::firmware::catalog::{ANY_COPRO, FirmwareImageRecord, IMAGE_INDEX_TABLE, ImageIndex, catalog};
use crate::firmware::xrev::{XrevInfo, parse_xrev};

/// Smallest buffer that can hold a bitstream header.
pub const MIN_IMAGE_LEN: usize = 128;
/// Marker opening the optional serial-number block.
pub const SERIAL_MAGIC: u32 = 0x1234_5678;
/// Size of the serial-number block.
pub const SERIAL_HEADER_LEN: usize = 8;

/// Outcome of grading an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageMatch {
    /// Loadable.
    Exact,
    /// Right part, wrong design; `copro_mismatch` if only the coprocessor differs.
    TypeOnly {
        /// A row matched name and part but required another coprocessor.
        copro_mismatch: bool,
    },
    /// No eligible row has this part.
    NoMatch,
    /// Not a bitstream.
    Malformed,
}

impl ImageMatch {
    /// Returns the numeric grade: 0, 1, 2, or -1.
    pub const fn code(self) -> i32 {
        match self {
            Self::Exact => 0,
            Self::TypeOnly { .. } => 1,
            Self::NoMatch => 2,
            Self::Malformed => -1,
        }
    }

    /// Returns `true` for [`ImageMatch::Exact`].
    pub const fn is_exact(self) -> bool {
        matches!(self, Self::Exact)
    }
}

/// Looks up the image index for a device and load slot.
pub fn image_index(device_id: u16, load_index: u32) -> Option<ImageIndex> {
    IMAGE_INDEX_TABLE
        .iter()
        .find(|r| r.device_id == device_id && r.load_index == load_index)
        .map(|r| r.image)
}

/// Drops the serial-number block if the image starts with one.
fn strip_serial(bytes: &[u8]) -> &[u8] {
    match bytes.get(..4) {
        Some(m) if m == SERIAL_MAGIC.to_le_bytes() => bytes.get(SERIAL_HEADER_LEN..).unwrap_or_default(),
        _ => bytes,
    }
}

fn header(bytes: &[u8]) -> Option<XrevInfo<'_>> {
    if bytes.len() < MIN_IMAGE_LEN {
        debug!(len = bytes.len(), "image too short");
        return None;
    }
    match parse_xrev(strip_serial(bytes)) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!(error = %e, "image header does not parse");
            None
        }
    }
}

fn eligible(image: ImageIndex, board_rev: u32) -> impl Iterator<Item = &'static FirmwareImageRecord> {
    catalog().filter(move |r| r.image == image && board_rev >= r.min_board_rev)
}

/// Grades `bytes` for a board with image index `image`, coprocessor `copro`
/// and revision `board_rev`.
pub fn check_image(image: ImageIndex, copro: CoproId, bytes: &[u8], board_rev: u32) -> ImageMatch {
    let Some(info) = header(bytes) else {
        return ImageMatch::Malformed;
    };

    let mut grade = ImageMatch::NoMatch;
    for row in eligible(image, board_rev).filter(|r| r.part == info.part) {
        if !info.name.starts_with(row.name_prefix) {
            if grade == ImageMatch::NoMatch {
                grade = ImageMatch::TypeOnly { copro_mismatch: false };
            }
            continue;
        }
        if row.copro == ANY_COPRO || row.copro == copro {
            debug!(image = image.0, name = info.name, "image matches");
            return ImageMatch::Exact;
        }
        warn!(
            image = image.0,
            name = info.name,
            required = row.copro,
            fitted = copro,
            "image built for a different coprocessor"
        );
        grade = ImageMatch::TypeOnly { copro_mismatch: true };
    }
    grade
}

/// Returns the coprocessor the matching catalog row was built for.
///
/// Walks the same rows as [`check_image`] and returns the declared coprocessor
/// of the first row whose part and name prefix match; 0 when that row is a
/// wildcard, nothing matches or the image is malformed.
pub fn check_image_type(image: ImageIndex, bytes: &[u8], board_rev: u32) -> CoproId {
    let Some(info) = header(bytes) else {
        return 0;
    };
    eligible(image, board_rev)
        .find(|r| r.part == info.part && info.name.starts_with(r.name_prefix))
        .map_or(0, |r| if r.copro == ANY_COPRO { 0 } else { r.copro })
}

/// Reads an image from disk and grades it with [`check_image`].
///
/// # Errors
///
/// Returns `Image` if the file cannot be read.
pub fn check_image_file(path: impl AsRef<Path>, image: ImageIndex, copro: CoproId, board_rev: u32) -> Result<ImageMatch> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| DagError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(check_image(image, copro, &bytes, board_rev))
}
