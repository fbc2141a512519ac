//! Write binary data into a growable buffer.
//!
//! # Overview
//!
//! [BufferWriter] owns a contiguous byte region, a logical size, and a cursor. Writes land at the
//! cursor and grow the region as needed:
//! - Capacity grows to the next power of two (up to [MAX_SIZE]) and existing bytes are preserved
//! - The logical size is the furthest offset ever written, independent of the cursor
//! - The cursor can be moved back to patch previously written bytes in place
//! - [BufferWriter::shrink] trims unused capacity
//!
//! # Supported Types
//!
//! Natively supports:
//! - Integers: `u8`, `u16`, `u32`, `u64`, `i8`, `i16`, `i32`, `i64`
//! - Floats: `f32`, `f64`
//! - `bool` (one byte)
//! - Strings and byte slices, with or without a 4-byte length prefix
//!
//! Composite values are written by encoders stored in a [Registry] and looked up by the value's
//! type at runtime (see [BufferWriter::write_data_type]).
//!
//! # Example
//!
//! ```
//! use commonware_writer::{BufferWriter, Error};
//!
//! fn main() -> Result<(), Error> {
//!     let mut writer = BufferWriter::new(0);
//!
//!     // Reserve room for a length we don't know yet
//!     writer.write_u32(0)?;
//!     writer.write_string("hello", None)?;
//!     writer.write_f32(1.5)?;
//!
//!     // Backfill the total length
//!     let size = writer.size();
//!     writer.set_cursor(0)?;
//!     writer.write_u32(size as u32)?;
//!
//!     assert_eq!(writer.size(), 17);
//!     assert_eq!(writer.capacity(), 32);
//!     assert_eq!(&writer.to_bytes()[..4], &[17, 0, 0, 0]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod writer;

// Re-export main types and traits
pub use config::{Config, Endianness, MAX_SIZE};
pub use error::Error;
pub use registry::{Encodable, Registry, TypeTag};
pub use writer::BufferWriter;
