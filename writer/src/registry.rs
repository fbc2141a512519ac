//! Encoders for composite values.
//!
//! A [Registry] maps the runtime type of a value (its [TypeTag]) to a routine that writes it
//! using the primitive operations of [BufferWriter]. The writer only consults the registry from
//! [BufferWriter::write_data_type]; the encodings themselves are entirely up to the caller.
//!
//! # Example
//!
//! ```
//! use commonware_writer::{BufferWriter, Config, Encodable, Error, Registry};
//! use std::sync::Arc;
//!
//! struct Color {
//!     r: u8,
//!     g: u8,
//!     b: u8,
//! }
//!
//! impl Encodable for Color {
//!     fn write_to(&self, writer: &mut BufferWriter) -> Result<(), Error> {
//!         writer.write_u8(self.r)?;
//!         writer.write_u8(self.g)?;
//!         writer.write_u8(self.b)
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_encodable::<Color>();
//!
//! let mut writer = BufferWriter::with_config(Config {
//!     registry: Arc::new(registry),
//!     ..Default::default()
//! });
//! writer.write_data_type(&Color { r: 1, g: 2, b: 3 }).unwrap();
//! assert_eq!(&writer.to_bytes()[..], &[1, 2, 3]);
//! ```

use crate::{BufferWriter, Error};
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
};

/// Discriminator of a value's runtime type.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag of `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the name of the tagged type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Trait for values that know how to write themselves to a [BufferWriter].
pub trait Encodable: Any {
    /// Writes this value at the writer's cursor.
    fn write_to(&self, writer: &mut BufferWriter) -> Result<(), Error>;
}

type EncodeFn = Box<dyn Fn(&mut BufferWriter, &dyn Any) -> Result<(), Error> + Send + Sync>;

/// Mapping from [TypeTag] to encoder.
#[derive(Default)]
pub struct Registry {
    encoders: HashMap<TypeTag, EncodeFn>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `encode` as the encoder for values of type `T`.
    ///
    /// Replaces any encoder previously registered for `T`.
    pub fn register<T, F>(&mut self, encode: F)
    where
        T: Any,
        F: Fn(&mut BufferWriter, &T) -> Result<(), Error> + Send + Sync + 'static,
    {
        let tag = TypeTag::of::<T>();
        let erased: EncodeFn = Box::new(move |writer, value| match value.downcast_ref::<T>() {
            Some(value) => encode(writer, value),
            None => Err(Error::UnsupportedType(tag)),
        });
        self.encoders.insert(tag, erased);
    }

    /// Registers [Encodable::write_to] as the encoder for values of type `T`.
    pub fn register_encodable<T: Encodable>(&mut self) {
        self.register::<T, _>(|writer, value| value.write_to(writer));
    }

    /// Returns true if an encoder is registered for `T`.
    pub fn contains<T: Any>(&self) -> bool {
        self.encoders.contains_key(&TypeTag::of::<T>())
    }

    /// Returns the number of registered encoders.
    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    /// Returns true if no encoders are registered.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub(crate) fn get(&self, tag: &TypeTag) -> Option<&EncodeFn> {
        self.encoders.get(tag)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.encoders.keys().map(TypeTag::name))
            .finish()
    }
}
