//! # Overview
//!
//! `midirx` decodes raw, undelimited MIDI byte streams, such as the ones coming out of a 5-pin
//! DIN cable, a UART or a low-level driver, into typed MIDI messages.
//!
//! Bytes are fed one at a time to a [`Decoder`](struct.Decoder.html), which calls one
//! [`Handler`](trait.Handler.html) method for each message as soon as its last byte arrives:
//!
//! ```rust
//! use midirx::{Decoder, Handler, HeapBuffer, NoteMessage};
//!
//! struct Keyboard;
//! impl Handler for Keyboard {
//!     type Timestamp = ();
//!     fn note_on(&mut self, msg: NoteMessage, _ts: ()) {
//!         println!("key {} pressed with velocity {}", msg.key, msg.vel);
//!     }
//!     fn note_off(&mut self, msg: NoteMessage, _ts: ()) {
//!         println!("key {} released", msg.key);
//!     }
//! }
//!
//! let mut decoder = Decoder::new(HeapBuffer::default(), Keyboard).unwrap();
//! for &byte in &[0x90, 0x3C, 0x64, 0x40, 0x64, 0x80, 0x3C, 0x00] {
//!     decoder.feed(byte, ());
//! }
//! ```
//!
//! # About raw MIDI streams
//!
//! Most OS MIDI APIs hand out complete, delimited messages. Raw streams are rarer, but they are
//! what device drivers and embedded microcontrollers deal with, and they come with a few quirks
//! the decoder takes care of:
//!
//! - **Running status**: a channel message may omit its status byte if it is the same as the
//!     previous one.
//! - **Realtime interleaving**: single-byte System Realtime messages may appear anywhere, even in
//!     between the data bytes of another message, without disturbing it.
//! - **Partial messages**: a stream may be picked up (or cut) in the middle of a message. Stray
//!     data bytes are reported as [`DecodeError`](enum.DecodeError.html)s through the handler,
//!     and decoding resumes on the next status byte.
//! - **System exclusive**: variable-length messages are accumulated into a fixed-capacity
//!     [`Buffer`](trait.Buffer.html) supplied by the caller. Oversized messages are reported once
//!     and dropped.
//!
//! # Timestamps
//!
//! Every byte is fed along with a timestamp of the caller's choosing (the `Timestamp` associated
//! type of the handler). Timestamps are never inspected, only passed to the handler along with the
//! message that the byte completed, or with the error it caused.
//!
//! # About features
//!
//! - The `alloc` feature enables [`HeapBuffer`](struct.HeapBuffer.html) and the closure-based
//!     [`Callbacks`](struct.Callbacks.html) table.
//! - The `std` feature (enabled by default, implies `alloc`) makes errors implement
//!     `std::error::Error` and enables `std` support in `tracing`.
//!
//! With both disabled the crate is `no_std` and never allocates: use a
//! [`SliceBuffer`](struct.SliceBuffer.html) or a [`stack_buffer!`](macro.stack_buffer.html) type
//! as sysex storage.
//!
//! # Logging
//!
//! The decoder logs through `tracing`: every decoded message at `TRACE` level, resynchronization
//! at `DEBUG` and oversized sysex messages at `WARN`.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

mod prelude {
    pub(crate) use crate::primitive::{u14, u4, u7};
    #[cfg(feature = "alloc")]
    pub(crate) use alloc::vec::Vec;
    pub(crate) use core::{fmt, marker::PhantomData};
}

mod buffer;
#[cfg(feature = "alloc")]
mod callbacks;
mod error;
pub mod handler;
mod message;
mod primitive;
mod stream;

#[cfg(feature = "alloc")]
pub use crate::{buffer::HeapBuffer, callbacks::Callbacks};
pub use crate::{
    buffer::{Buffer, BufferFull, SliceBuffer},
    error::{DecodeError, Error, Result},
    handler::Handler,
    message::{
        ChannelPressure, ControlChange, LiveEvent, MtcQuarterFrame, MtcQuarterFrameMessage,
        NoteMessage, PitchBend, PolyPressure, ProgramChange, SystemRealtime,
    },
    stream::Decoder,
};

/// Exotically-sized integers used by the MIDI standard.
pub mod num {
    pub use crate::primitive::{u14, u4, u7};
}

#[cfg(test)]
mod test;
