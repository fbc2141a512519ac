//! Configuration for [crate::BufferWriter].

use crate::registry::Registry;
use std::sync::Arc;

/// The largest logical size (and capacity) a writer may reach: 1 GiB.
pub const MAX_SIZE: usize = 1 << 30;

/// Byte order used for multi-byte scalars and string length prefixes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Endianness {
    /// Least significant byte first.
    #[default]
    Little,

    /// Most significant byte first.
    Big,
}

/// Configuration for a [crate::BufferWriter].
///
/// # Examples
///
/// ```
/// use commonware_writer::{BufferWriter, Config, Endianness};
///
/// let mut writer = BufferWriter::with_config(Config {
///     initial_capacity: 16,
///     endianness: Endianness::Big,
///     ..Default::default()
/// });
/// writer.write_u16(0x0102).unwrap();
/// assert_eq!(writer.capacity(), 16);
/// assert_eq!(&writer.to_bytes()[..], &[0x01, 0x02]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Bytes to allocate up front.
    ///
    /// Requests larger than [MAX_SIZE] are clamped to [MAX_SIZE] rather than rejected.
    pub initial_capacity: usize,

    /// Byte order of every multi-byte write.
    pub endianness: Endianness,

    /// Encoders consulted by [crate::BufferWriter::write_data_type].
    pub registry: Arc<Registry>,
}
