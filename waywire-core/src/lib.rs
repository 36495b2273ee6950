//! Wire-level Wayland types.
//!
//! This crate holds the data model shared by every layer of waywire: object
//! ids, message headers, interface descriptors and the word-oriented message
//! codec in [`marshal`].

use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;

pub mod marshal;

pub use marshal::{ArgReader, ArgWriter, Marshal, MarshalError, Unmarshal, UnmarshalError};

/// A Wayland object ID.
///
/// Uniquely identifies an object on one connection at one point in time. An
/// ID may be reused after the server confirms its death with
/// `wl_display.delete_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub NonZeroU32);

impl ObjectId {
    /// The `wl_display` singleton, always object 1.
    pub const DISPLAY: Self = Self(unsafe { NonZeroU32::new_unchecked(1) });
    pub const MAX_CLIENT: Self = Self(unsafe { NonZeroU32::new_unchecked(0xFEFF_FFFF) });
    pub const MIN_SERVER: Self = Self(unsafe { NonZeroU32::new_unchecked(0xFF00_0000) });

    /// Wrap a raw wire word, `None` for the null object.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The numeric representation of the ID.
    pub fn as_u32(self) -> u32 {
        self.0.get()
    }

    /// Whether the object with this ID was created by the server.
    pub fn created_by_server(self) -> bool {
        self >= Self::MIN_SERVER
    }

    /// Whether the object with this ID was created by the client.
    pub fn created_by_client(self) -> bool {
        self <= Self::MAX_CLIENT
    }
}

/// The header of a Wayland message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// The ID of the associated object.
    pub object_id: ObjectId,
    /// Size of the message in bytes, including the header. Always a
    /// multiple of four and at least [`MessageHeader::SIZE`].
    pub size: u16,
    /// The opcode of the message.
    pub opcode: u16,
}

impl MessageHeader {
    /// The size of the header in bytes.
    pub const SIZE: usize = 8;
    /// The size of the header in wire words.
    pub const WORDS: usize = 2;

    /// Number of words in the message body described by this header.
    pub fn body_words(&self) -> usize {
        (self.size as usize).saturating_sub(Self::SIZE) / 4
    }
}

/// Signed 24.8 decimal number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(256);

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 256.0
    }

    pub fn as_int(self) -> i32 {
        self.0 / 256
    }
}

impl From<i32> for Fixed {
    fn from(value: i32) -> Self {
        Self(value * 256)
    }
}

impl From<f64> for Fixed {
    fn from(value: f64) -> Self {
        Self((value * 256.0) as i32)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_f64().fmt(f)
    }
}

/// A Wayland interface: a named, versioned vocabulary of requests and
/// events.
///
/// Opcodes are positional: the wire opcode of a message is its index in the
/// `requests` or `events` table. Renaming a field is a non-change,
/// reordering one is a protocol break.
///
/// `PartialEq` and `Hash` are delegated to the `name` field.
pub struct Interface {
    pub name: &'static CStr,
    pub version: u32,
    pub requests: &'static [MessageDesc],
    pub events: &'static [MessageDesc],
}

/// Message direction, used to select an interface's request or event table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Event,
}

impl Interface {
    fn table(&self, dir: Direction) -> &'static [MessageDesc] {
        match dir {
            Direction::Request => self.requests,
            Direction::Event => self.events,
        }
    }

    /// Number of opcodes the interface defines in the given direction.
    pub fn op_count(&self, dir: Direction) -> usize {
        self.table(dir).len()
    }

    /// The argument record of one opcode, `None` if it is out of range.
    pub fn signature(&self, dir: Direction, opcode: u16) -> Option<&'static [ArgKind]> {
        self.table(dir).get(opcode as usize).map(|desc| desc.signature)
    }
}

/// A description of a single Wayland request or event.
#[derive(Debug, Clone, Copy)]
pub struct MessageDesc {
    pub name: &'static str,
    pub signature: &'static [ArgKind],
}

impl MessageDesc {
    /// Number of file descriptors the message carries out of band.
    pub fn fd_count(&self) -> usize {
        self.signature
            .iter()
            .filter(|arg| matches!(arg, ArgKind::Fd))
            .count()
    }
}

/// The kind of one message argument.
///
/// Every kind except `String`, `Array` and `Fd` occupies exactly one wire
/// word; `Fd` occupies none and travels on the ancillary channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Int,
    Uint,
    Fixed,
    Object,
    NewId,
    Enum,
    Bitfield,
    String,
    Array,
    Fd,
}

impl PartialEq for &'static Interface {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for &'static Interface {}

impl Hash for &'static Interface {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Interface").field(&self.name).finish()
    }
}

/// Define a closed protocol enum.
///
/// Values outside the listed set are rejected by the decoder with
/// [`UnmarshalError::UnknownEnumTag`].
#[macro_export]
macro_rules! wl_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$item_attr:meta])* $item:ident = $value:literal, )+
        }
    ) => {
        $(#[$attr])*
        #[repr(u32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        $vis enum $name {
            $( $(#[$item_attr])* $item = $value, )+
        }

        impl From<$name> for u32 {
            fn from(val: $name) -> u32 {
                val as u32
            }
        }

        impl TryFrom<u32> for $name {
            type Error = $crate::marshal::UnmarshalError;
            fn try_from(val: u32) -> Result<Self, Self::Error> {
                match val {
                    $( $value => Ok(Self::$item), )+
                    other => Err($crate::marshal::UnmarshalError::UnknownEnumTag(other)),
                }
            }
        }
    };
}

/// Define an open protocol enum: a set of named values over a `u32` that
/// accepts and preserves unknown tags for forward compatibility.
#[macro_export]
macro_rules! wl_open_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$item_attr:meta])* $item:ident = $value:literal, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(pub u32);

        #[allow(non_upper_case_globals)]
        impl $name {
            $( $(#[$item_attr])* pub const $item: Self = Self($value); )+
        }

        impl From<u32> for $name {
            fn from(val: u32) -> Self {
                Self(val)
            }
        }

        impl From<$name> for u32 {
            fn from(val: $name) -> u32 {
                val.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match *self {
                    $( Self::$item => f.write_str(stringify!($item)), )+
                    Self(other) => write!(f, "{other:#010x}"),
                }
            }
        }
    };
}

/// Define a protocol bitfield: a fixed-layout bitset over a `u32`.
#[macro_export]
macro_rules! wl_bitfield {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$item_attr:meta])* $item:ident = $value:literal, )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        $vis struct $name(pub u32);

        #[allow(non_upper_case_globals)]
        impl $name {
            $( $(#[$item_attr])* pub const $item: Self = Self($value); )+

            pub fn empty() -> Self {
                Self(0)
            }

            pub fn contains(self, item: Self) -> bool {
                self.0 & item.0 != 0
            }
        }

        impl From<u32> for $name {
            fn from(val: u32) -> Self {
                Self(val)
            }
        }

        impl From<$name> for u32 {
            fn from(val: $name) -> u32 {
                val.0
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }
    };
}
