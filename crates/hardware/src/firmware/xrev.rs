//! Xilinx bitstream header parsing.
//!
//! A `.bit` file opens with a length-prefixed magic field and a length-one
//! field, then a sequence of keyed records:
//!
//! | Key | Payload                                   |
//! |-----|-------------------------------------------|
//! | `a` | u16 BE length, design name (NUL-terminated) |
//! | `b` | u16 BE length, part name                  |
//! | `c` | u16 BE length, build date                 |
//! | `d` | u16 BE length, build time                 |
//! | `e` | u32 BE length of the configuration data   |
//!
//! Parsing stops at the `e` record. Strings are returned as slices of the
//! caller's buffer.

use thiserror::Error;

/// Identity strings recovered from a bitstream header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct XrevInfo<'a> {
    /// Design name (A-record).
    pub name: &'a str,
    /// Part name (B-record).
    pub part: &'a str,
    /// Build date (C-record).
    pub date: &'a str,
    /// Build time (D-record).
    pub time: &'a str,
    /// Length of the configuration data following the header.
    pub data_len: u32,
}

/// Header parse failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum XrevError {
    /// The buffer ends inside the header.
    #[error("bitstream header truncated at byte {0}")]
    Truncated(usize),
    /// A record key outside `a`..=`e`.
    #[error("unexpected record key {0:#04x}")]
    UnknownKey(u8),
    /// A record string is not valid UTF-8.
    #[error("record {0:?} is not valid text")]
    BadText(char),
    /// The name or part record is missing.
    #[error("header has no {0:?} record")]
    Missing(char),
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], XrevError> {
        let end = self.pos.checked_add(n).ok_or(XrevError::Truncated(self.pos))?;
        let bytes = self.buf.get(self.pos..end).ok_or(XrevError::Truncated(self.pos))?;
        self.pos = end;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, XrevError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, XrevError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, XrevError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn text(&mut self, key: char) -> Result<&'a str, XrevError> {
        let len = usize::from(self.u16()?);
        let raw = self.take(len)?;
        let raw = raw.split(|b| *b == 0).next().unwrap_or(raw);
        std::str::from_utf8(raw).map_err(|_| XrevError::BadText(key))
    }
}

/// Parses the header of a Xilinx bitstream.
///
/// # Errors
///
/// Fails if the buffer ends early, holds an unknown record or lacks the name
/// or part record.
pub fn parse_xrev(buf: &[u8]) -> Result<XrevInfo<'_>, XrevError> {
    let mut cur = Cursor { buf, pos: 0 };
    let magic_len = usize::from(cur.u16()?);
    let _ = cur.take(magic_len)?;
    let _ = cur.u16()?;

    let mut info = XrevInfo::default();
    let (mut has_name, mut has_part) = (false, false);
    loop {
        match cur.u8()? {
            b'a' => {
                info.name = cur.text('a')?;
                has_name = true;
            }
            b'b' => {
                info.part = cur.text('b')?;
                has_part = true;
            }
            b'c' => info.date = cur.text('c')?,
            b'd' => info.time = cur.text('d')?,
            b'e' => {
                info.data_len = cur.u32()?;
                break;
            }
            other => return Err(XrevError::UnknownKey(other)),
        }
    }
    if !has_name {
        return Err(XrevError::Missing('a'));
    }
    if !has_part {
        return Err(XrevError::Missing('b'));
    }
    Ok(info)
}
