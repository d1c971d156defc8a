//! Exotically-sized integers used by the MIDI wire format.
//!
//! MIDI data bytes only carry 7 bits of payload, channels are 4 bits wide and a few values
//! (pitch bend, song position) are assembled from two data bytes into a 14-bit integer.
//! The wrappers here make those ranges part of the type, so a decoded `u7` can never hold a
//! status byte by accident.

use crate::prelude::*;

macro_rules! restricted_int {
    {$(#[$attr:meta])* $name:ident : $inner:tt => $bits:expr} => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
        #[repr(transparent)]
        #[allow(non_camel_case_types)]
        pub struct $name($inner);
        impl From<$inner> for $name {
            /// Lossy conversion, loses the top bits.
            #[inline]
            fn from(raw: $inner) -> $name {
                $name::new(raw)
            }
        }
        impl From<$name> for $inner {
            #[inline]
            fn from(restricted: $name) -> $inner {
                restricted.0
            }
        }
        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
        impl fmt::LowerHex for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                fmt::LowerHex::fmt(&self.0, f)
            }
        }
        impl $name {
            const MASK: $inner = (1 << $bits) - 1;

            /// The maximum value that this restricted integer can hold.
            #[inline]
            pub const fn max_value() -> $name {
                $name(Self::MASK)
            }

            /// Creates a restricted int from its non-restricted counterpart by masking off the
            /// extra bits.
            #[inline]
            pub const fn new(raw: $inner) -> $name {
                $name(raw & Self::MASK)
            }

            /// Returns `Some` if the raw integer is within range of the restricted integer, and
            /// `None` otherwise.
            #[inline]
            pub fn try_from(raw: $inner) -> Option<$name> {
                if raw <= Self::MASK {
                    Some($name(raw))
                } else {
                    None
                }
            }

            /// Get the inner integer out of the wrapper.
            /// The inner integer is guaranteed to be in range of the restricted wrapper.
            #[inline]
            pub const fn as_int(self) -> $inner {
                self.0
            }
        }
    };
}

restricted_int! {
    /// A 4-bit integer, used for MIDI channels.
    u4: u8 => 4
}
restricted_int! {
    /// A 7-bit integer, the payload of a single MIDI data byte.
    u7: u8 => 7
}
restricted_int! {
    /// A 14-bit integer, assembled from two data bytes (least significant byte first).
    u14: u16 => 14
}

impl u14 {
    /// Join a 14-bit value from its two 7-bit halves, as they travel on the wire.
    #[inline]
    pub const fn from_lsb_msb(lsb: u7, msb: u7) -> u14 {
        u14((lsb.0 as u16) | ((msb.0 as u16) << 7))
    }

    /// The least significant 7 bits.
    #[inline]
    pub const fn lsb(self) -> u7 {
        u7((self.0 & 0x7F) as u8)
    }

    /// The most significant 7 bits.
    #[inline]
    pub const fn msb(self) -> u7 {
        u7((self.0 >> 7) as u8)
    }
}

impl From<u7> for u14 {
    #[inline]
    fn from(small: u7) -> u14 {
        u14(small.0 as u16)
    }
}

impl From<u4> for u7 {
    #[inline]
    fn from(small: u4) -> u7 {
        u7(small.0)
    }
}
