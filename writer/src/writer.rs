//! Growable buffer with a repositionable cursor.
//!
//! # Growth
//!
//! Every write first asks [BufferWriter] to make room for `cursor + width` bytes. The logical
//! size is raised to that value even when no reallocation is needed, so the size is the
//! high-water mark of every byte ever written. When the backing store is too small, it is
//! replaced by a zero-filled allocation of the next power of two (or exactly the requested
//! size, if that is already a power of two) and the old contents are copied over. Nothing is
//! written until that check has passed, so a failed write leaves the writer untouched.
//!
//! # Byte order
//!
//! Multi-byte scalars and string length prefixes use the [Endianness] of the writer's
//! [Config] (little-endian by default).

use crate::{
    config::{Config, Endianness, MAX_SIZE},
    registry::{Registry, TypeTag},
    Error,
};
use bytes::{BufMut, Bytes, BytesMut};
use std::{any::Any, sync::Arc};
use tracing::{debug, trace, warn};

/// Width of the length prefix written by [BufferWriter::write_string].
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// A growable byte buffer supporting sequential and random-position writes.
///
/// Invariant: `cursor <= size <= capacity <= MAX_SIZE`.
#[derive(Debug, Clone)]
pub struct BufferWriter {
    // Zero-filled; its length is the capacity.
    storage: BytesMut,
    size: usize,
    cursor: usize,
    endianness: Endianness,
    registry: Arc<Registry>,
}

impl Default for BufferWriter {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

// Generates a fixed-width scalar writer that honors the configured byte order.
macro_rules! impl_write_scalar {
    ($name:ident, $type:ty, $put_be:ident, $put_le:ident) => {
        #[doc = concat!("Writes a `", stringify!($type), "` at the cursor and advances it by ")]
        #[doc = concat!("`size_of::<", stringify!($type), ">()` bytes.")]
        #[inline]
        pub fn $name(&mut self, value: $type) -> Result<(), Error> {
            let endianness = self.endianness;
            self.put(std::mem::size_of::<$type>(), |mut dst| match endianness {
                Endianness::Little => dst.$put_le(value),
                Endianness::Big => dst.$put_be(value),
            })
        }
    };
}

impl BufferWriter {
    /// Creates a writer with `initial_capacity` bytes preallocated.
    ///
    /// `initial_capacity` is clamped to [MAX_SIZE].
    pub fn new(initial_capacity: usize) -> Self {
        Self::with_config(Config {
            initial_capacity,
            ..Default::default()
        })
    }

    /// Creates a writer from a [Config].
    ///
    /// Unlike growth during a write, an oversized `initial_capacity` is not an error: it is
    /// clamped to [MAX_SIZE].
    pub fn with_config(cfg: Config) -> Self {
        let capacity = if cfg.initial_capacity > MAX_SIZE {
            warn!(
                requested = cfg.initial_capacity,
                max = MAX_SIZE,
                "clamping initial capacity"
            );
            MAX_SIZE
        } else {
            cfg.initial_capacity
        };
        Self {
            storage: BytesMut::zeroed(capacity),
            size: 0,
            cursor: 0,
            endianness: cfg.endianness,
            registry: cfg.registry,
        }
    }

    /// Ensures the backing store can hold `desired` bytes and raises the logical size to at
    /// least `desired`.
    fn ensure_capacity(&mut self, desired: usize) -> Result<(), Error> {
        if desired > MAX_SIZE {
            return Err(Error::CapacityExceeded(desired, MAX_SIZE));
        }
        self.size = self.size.max(desired);
        let capacity = self.storage.len();
        if desired <= capacity {
            return Ok(());
        }

        // `next_power_of_two` returns `desired` itself when it is already a power of two
        let new_capacity = desired.next_power_of_two();
        let mut grown = BytesMut::zeroed(new_capacity);
        grown[..capacity].copy_from_slice(&self.storage);
        self.storage = grown;
        trace!(old = capacity, new = new_capacity, "grew buffer");
        Ok(())
    }

    /// Reserves `width` bytes at the cursor, hands them to `fill`, then advances the cursor.
    #[inline]
    fn put(&mut self, width: usize, fill: impl FnOnce(&mut [u8])) -> Result<(), Error> {
        let end = self.end(width)?;
        self.ensure_capacity(end)?;
        fill(&mut self.storage[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }

    /// Returns the offset `width` bytes past the cursor.
    fn end(&self, width: usize) -> Result<usize, Error> {
        self.cursor
            .checked_add(width)
            .ok_or(Error::CapacityExceeded(usize::MAX, MAX_SIZE))
    }

    /// Writes a `u8` at the cursor and advances it by 1 byte.
    ///
    /// Values narrowed from wider integers with `as` are truncated, not rejected. The same holds
    /// for every integer writer.
    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.put(1, |mut dst| dst.put_u8(value))
    }

    /// Writes an `i8` at the cursor and advances it by 1 byte.
    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.put(1, |mut dst| dst.put_i8(value))
    }

    impl_write_scalar!(write_u16, u16, put_u16, put_u16_le);
    impl_write_scalar!(write_i16, i16, put_i16, put_i16_le);
    impl_write_scalar!(write_u32, u32, put_u32, put_u32_le);
    impl_write_scalar!(write_i32, i32, put_i32, put_i32_le);
    impl_write_scalar!(write_u64, u64, put_u64, put_u64_le);
    impl_write_scalar!(write_i64, i64, put_i64, put_i64_le);
    impl_write_scalar!(write_f32, f32, put_f32, put_f32_le);
    impl_write_scalar!(write_f64, f64, put_f64, put_f64_le);

    /// Writes `true` as 1 and `false` as 0 (a single byte).
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_u8(if value { 1 } else { 0 })
    }

    /// Writes `value` preceded by a 4-byte length prefix.
    ///
    /// If `length` is provided, at most `length` bytes of `value` are written and the prefix
    /// records the truncated length. Consumes `len + 4` bytes.
    pub fn write_string(
        &mut self,
        value: impl AsRef<[u8]>,
        length: Option<usize>,
    ) -> Result<(), Error> {
        let content = truncate(value.as_ref(), length);

        // Check room for the prefix and the content before writing either
        let end = self.end(LENGTH_PREFIX_SIZE)?;
        let end = end
            .checked_add(content.len())
            .ok_or(Error::CapacityExceeded(usize::MAX, MAX_SIZE))?;
        self.ensure_capacity(end)?;

        let len = u32::try_from(content.len())
            .map_err(|_| Error::CapacityExceeded(content.len(), MAX_SIZE))?;
        self.write_u32(len)?;
        self.write_bytes(content)
    }

    /// Writes `value` without a length prefix.
    ///
    /// If `length` is provided, at most `length` bytes of `value` are written. Readers must know
    /// the length out-of-band.
    pub fn write_string_raw(
        &mut self,
        value: impl AsRef<[u8]>,
        length: Option<usize>,
    ) -> Result<(), Error> {
        self.write_bytes(truncate(value.as_ref(), length))
    }

    /// Writes `value` verbatim at the cursor.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.put(value.len(), |mut dst| dst.put_slice(value))
    }

    /// Writes `value` with the encoder registered for its type.
    ///
    /// Returns [Error::UnsupportedType] if the writer's [Registry] has no encoder for `T`.
    pub fn write_data_type<T: Any>(&mut self, value: &T) -> Result<(), Error> {
        let tag = TypeTag::of::<T>();
        let registry = self.registry.clone();
        let Some(encode) = registry.get(&tag) else {
            debug!(tag = tag.name(), "no encoder registered");
            return Err(Error::UnsupportedType(tag));
        };
        encode(self, value)
    }

    /// Returns the offset of the next write.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor to `position`.
    ///
    /// `position` may be anywhere in `[0, size]`. Moving back allows previously written bytes
    /// (such as a length prefix) to be overwritten in place.
    pub fn set_cursor(&mut self, position: usize) -> Result<(), Error> {
        if position > self.size {
            return Err(Error::CursorOutOfRange(position, self.size));
        }
        self.cursor = position;
        Ok(())
    }

    /// Moves the cursor back to the start of the buffer.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Returns the number of bytes written (the furthest offset ever reached).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the number of bytes allocated.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the registry consulted by [Self::write_data_type].
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Reallocates the backing store to exactly [Self::size] bytes.
    ///
    /// Does not change the size or cursor.
    pub fn shrink(&mut self) {
        let capacity = self.storage.len();
        if self.size == capacity {
            return;
        }
        self.storage = BytesMut::from(&self.storage[..self.size]);
        debug!(old = capacity, new = self.size, "shrunk buffer");
    }

    /// Returns a copy of the written bytes (excluding unused capacity).
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.storage[..self.size])
    }

    /// Consumes the writer, returning the written bytes (excluding unused capacity).
    pub fn into_bytes(self) -> Bytes {
        let mut storage = self.storage;
        storage.truncate(self.size);
        storage.freeze()
    }

    /// Returns the entire backing store, including unused capacity.
    pub fn buffer(&self) -> &[u8] {
        &self.storage
    }
}

fn truncate(value: &[u8], length: Option<usize>) -> &[u8] {
    match length {
        Some(length) if length < value.len() => &value[..length],
        _ => value,
    }
}
