//! Precompiled-unit cache format.
//!
//! A cached unit is a 4-byte magic tag followed by a recursive, length-
//! prefixed encoding of the code object. The reader validates the tag
//! before touching anything else; the engine treats a mismatch as fatal and
//! never falls back to recompiling.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic      [u8; 4]            "MGC\x01"
//! unit:
//!   name     u32 len + bytes
//!   filename u32 len + bytes
//!   code     u32 len + bytes
//!   names    u32 count + (u32 len + bytes)*
//!   consts   u32 count + tagged entries
//! const tags: 0 none | 1 int(i64) | 2 str | 3 names | 4 nested unit
//! ```

use crate::code::{CodeObject, Const};
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Leading format tag of a cached unit.
pub const CACHE_MAGIC: [u8; 4] = *b"MGC\x01";

const TAG_NONE: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_STR: u8 = 2;
const TAG_NAMES: u8 = 3;
const TAG_CODE: u8 = 4;

/// Sanity bound on table lengths; anything larger is a corrupt stream, not
/// a real unit.
const MAX_LEN: u32 = 1 << 28;

// =============================================================================
// Errors
// =============================================================================

/// Failure while reading a cached unit.
#[derive(Debug)]
pub enum CacheError {
    /// The leading format tag did not match [`CACHE_MAGIC`].
    BadMagic { found: [u8; 4] },
    /// The tag matched but the payload is not a valid encoding.
    Malformed(&'static str),
    /// Underlying I/O failure.
    Io(io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::BadMagic { found } => {
                write!(f, "bad cache magic {:02x?}", found)
            }
            CacheError::Malformed(what) => write!(f, "malformed cache: {}", what),
            CacheError::Io(err) => write!(f, "cache read failed: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CacheError {
    fn from(err: io::Error) -> Self {
        CacheError::Io(err)
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Serialize a unit, magic tag first.
pub fn write_cache<W: Write>(w: &mut W, code: &CodeObject) -> io::Result<()> {
    w.write_all(&CACHE_MAGIC)?;
    write_unit(w, code)
}

fn write_unit<W: Write>(w: &mut W, code: &CodeObject) -> io::Result<()> {
    write_str(w, &code.name)?;
    write_str(w, &code.filename)?;
    write_bytes(w, &code.code)?;

    w.write_all(&(code.names.len() as u32).to_le_bytes())?;
    for name in code.names.iter() {
        write_str(w, name)?;
    }

    w.write_all(&(code.consts.len() as u32).to_le_bytes())?;
    for c in code.consts.iter() {
        match c {
            Const::None => w.write_all(&[TAG_NONE])?,
            Const::Int(n) => {
                w.write_all(&[TAG_INT])?;
                w.write_all(&n.to_le_bytes())?;
            }
            Const::Str(s) => {
                w.write_all(&[TAG_STR])?;
                write_str(w, s)?;
            }
            Const::Names(names) => {
                w.write_all(&[TAG_NAMES])?;
                w.write_all(&(names.len() as u32).to_le_bytes())?;
                for name in names.iter() {
                    write_str(w, name)?;
                }
            }
            Const::Code(nested) => {
                w.write_all(&[TAG_CODE])?;
                write_unit(w, nested)?;
            }
        }
    }
    Ok(())
}

fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_bytes(w, s.as_bytes())
}

fn write_bytes<W: Write>(w: &mut W, b: &[u8]) -> io::Result<()> {
    w.write_all(&(b.len() as u32).to_le_bytes())?;
    w.write_all(b)
}

// =============================================================================
// Reader
// =============================================================================

/// Deserialize a unit, validating the magic tag first.
pub fn read_cache<R: Read>(r: &mut R) -> Result<Arc<CodeObject>, CacheError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != CACHE_MAGIC {
        return Err(CacheError::BadMagic { found: magic });
    }
    read_unit(r).map(Arc::new)
}

fn read_unit<R: Read>(r: &mut R) -> Result<CodeObject, CacheError> {
    let name: Arc<str> = Arc::from(read_str(r)?);
    let filename: Arc<str> = Arc::from(read_str(r)?);
    let code = read_blob(r)?.into_boxed_slice();

    let name_count = read_len(r, "name table")?;
    let mut names = Vec::with_capacity(name_count);
    for _ in 0..name_count {
        names.push(Arc::from(read_str(r)?));
    }

    let const_count = read_len(r, "constant pool")?;
    let mut consts = Vec::with_capacity(const_count);
    for _ in 0..const_count {
        let mut tag = [0u8; 1];
        r.read_exact(&mut tag)?;
        consts.push(match tag[0] {
            TAG_NONE => Const::None,
            TAG_INT => {
                let mut buf = [0u8; 8];
                r.read_exact(&mut buf)?;
                Const::Int(i64::from_le_bytes(buf))
            }
            TAG_STR => Const::Str(Arc::from(read_str(r)?)),
            TAG_NAMES => {
                let count = read_len(r, "from-list")?;
                let mut list = Vec::with_capacity(count);
                for _ in 0..count {
                    list.push(Arc::from(read_str(r)?));
                }
                Const::Names(list.into_boxed_slice())
            }
            TAG_CODE => Const::Code(Arc::new(read_unit(r)?)),
            _ => return Err(CacheError::Malformed("unknown constant tag")),
        });
    }

    Ok(CodeObject {
        name,
        filename,
        code,
        names: names.into_boxed_slice(),
        consts: consts.into_boxed_slice(),
    })
}

fn read_len<R: Read>(r: &mut R, what: &'static str) -> Result<usize, CacheError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    let len = u32::from_le_bytes(buf);
    if len > MAX_LEN {
        return Err(CacheError::Malformed(what));
    }
    Ok(len as usize)
}

fn read_blob<R: Read>(r: &mut R) -> Result<Vec<u8>, CacheError> {
    let len = read_len(r, "blob")?;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_str<R: Read>(r: &mut R) -> Result<String, CacheError> {
    String::from_utf8(read_blob(r)?).map_err(|_| CacheError::Malformed("non-utf8 string"))
}

// =============================================================================
// Tests
// =============================================================================
