//! Storage for system-exclusive messages.
//!
//! The decoder never allocates on its own: sysex payloads are accumulated into a caller-supplied
//! [`Buffer`](trait.Buffer.html), and the capacity of that buffer is the largest sysex message
//! the decoder will deliver.
//!
//! Three buffer flavors are provided:
//!
//! - [`SliceBuffer`](struct.SliceBuffer.html) borrows storage the caller already owns, such as a
//!     static array on an embedded target.
//! - [`HeapBuffer`](struct.HeapBuffer.html) owns a fixed-capacity heap allocation (requires the
//!     `alloc` feature).
//! - [`stack_buffer!`](../macro.stack_buffer.html) defines an inline array buffer type.

use crate::prelude::*;

/// The buffer has no room left for another byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct BufferFull;

/// Describes types that can be used as sysex buffers for the [`Decoder`](../struct.Decoder.html)
/// type.
///
/// Buffers have a fixed capacity: once `capacity()` bytes are stored, `push` must fail without
/// modifying the stored bytes.
pub trait Buffer {
    /// Append a single byte, or fail if the buffer is full.
    fn push(&mut self, byte: u8) -> core::result::Result<(), BufferFull>;
    /// Forget all stored bytes. The capacity does not change.
    fn clear(&mut self);
    /// The bytes stored since the last `clear`.
    fn as_slice(&self) -> &[u8];
    /// The maximum amount of bytes this buffer can hold.
    fn capacity(&self) -> usize;
}

impl<B: Buffer + ?Sized> Buffer for &mut B {
    #[inline]
    fn push(&mut self, byte: u8) -> core::result::Result<(), BufferFull> {
        (**self).push(byte)
    }
    #[inline]
    fn clear(&mut self) {
        (**self).clear()
    }
    #[inline]
    fn as_slice(&self) -> &[u8] {
        (**self).as_slice()
    }
    #[inline]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}

fn fmt_hex(name: &str, data: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}[", name)?;
    for databyte in data.iter() {
        write!(f, "{:02x}", databyte)?;
    }
    write!(f, "]")
}

/// A buffer backed by a caller-owned byte slice.
///
/// The capacity is the length of the slice.
pub struct SliceBuffer<'a> {
    buf: &'a mut [u8],
    len: usize,
}
impl<'a> SliceBuffer<'a> {
    /// Use the given storage for sysex data.
    /// Any previous contents of the slice are ignored and will be overwritten.
    #[inline]
    pub fn new(storage: &'a mut [u8]) -> SliceBuffer<'a> {
        SliceBuffer {
            buf: storage,
            len: 0,
        }
    }

    /// Give the storage back to the caller.
    #[inline]
    pub fn into_inner(self) -> &'a mut [u8] {
        self.buf
    }
}
impl Buffer for SliceBuffer<'_> {
    #[inline]
    fn push(&mut self, byte: u8) -> core::result::Result<(), BufferFull> {
        let slot = self.buf.get_mut(self.len).ok_or(BufferFull)?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }
    #[inline]
    fn clear(&mut self) {
        self.len = 0;
    }
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
    #[inline]
    fn capacity(&self) -> usize {
        self.buf.len()
    }
}
impl fmt::Debug for SliceBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_hex("SliceBuffer", self.as_slice(), f)
    }
}

/// A heap-allocated buffer with a fixed maximum capacity.
///
/// Memory is reserved upfront, so pushing never reallocates.
///
/// This type is only available with the `alloc` feature enabled.
#[cfg(feature = "alloc")]
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct HeapBuffer {
    buf: Vec<u8>,
    cap: usize,
}
#[cfg(feature = "alloc")]
impl HeapBuffer {
    /// A reasonable default for live MIDI, large enough for most patch dumps.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Create a buffer that holds at most `cap` bytes.
    #[inline]
    pub fn with_capacity(cap: usize) -> HeapBuffer {
        HeapBuffer {
            buf: Vec::with_capacity(cap),
            cap,
        }
    }
}
#[cfg(feature = "alloc")]
impl Default for HeapBuffer {
    #[inline]
    fn default() -> HeapBuffer {
        HeapBuffer::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
#[cfg(feature = "alloc")]
impl Buffer for HeapBuffer {
    #[inline]
    fn push(&mut self, byte: u8) -> core::result::Result<(), BufferFull> {
        if self.buf.len() >= self.cap {
            Err(BufferFull)
        } else {
            self.buf.push(byte);
            Ok(())
        }
    }
    #[inline]
    fn clear(&mut self) {
        self.buf.clear()
    }
    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf[..]
    }
    #[inline]
    fn capacity(&self) -> usize {
        self.cap
    }
}
#[cfg(feature = "alloc")]
impl fmt::Debug for HeapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_hex("HeapBuffer", self.as_slice(), f)
    }
}

/// Define a stack buffer type, suitable for use with [`Decoder`](struct.Decoder.html).
///
/// # Usage
///
/// The `stack_buffer!` macro defines a buffer type, which can later be instantiated for use with
/// a `Decoder`.
///
/// ```rust
/// midirx::stack_buffer! {
///     struct MyBuffer([u8; 512]);
/// }
///
/// let decoder = midirx::Decoder::new(MyBuffer::new(), ()).unwrap();
/// assert_eq!(decoder.capacity(), 512);
/// ```
///
/// Buffers can have attributes, documentation, and be made `pub`lic.
///
/// ```rust
/// midirx::stack_buffer! {
///     /// A very small buffer.
///     #[repr(C)]
///     pub struct TinyBuffer([u8; 16]);
/// }
///
/// use midirx::Buffer;
/// let mut buf = TinyBuffer::default();
/// buf.push(0x41).unwrap();
/// assert_eq!(buf.as_slice(), &[0x41]);
/// ```
#[macro_export]
macro_rules! stack_buffer {
    {
        @impl_def {$($attr:meta)*} {$($pub:ident)?} {$name:ident} {$size:expr}
    } => {
        $(#[$attr])*
        #[derive(Clone)]
        $($pub)? struct $name {
            buf: [u8; $size],
            len: usize,
        }
        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                write!(f, concat!(stringify!($name), "["))?;
                for databyte in self.buf[..self.len].iter() {
                    write!(f, "{:02x}", databyte)?;
                }
                write!(f, "]")
            }
        }
        impl $name {
            pub const MAX_CAP: usize = $size;
            #[inline]
            $($pub)? const fn new() -> $name {
                $name {
                    buf: [0; $size],
                    len: 0,
                }
            }
        }
        impl core::default::Default for $name {
            #[inline]
            fn default() -> $name {
                Self::new()
            }
        }
        impl $crate::Buffer for $name {
            #[inline]
            fn push(&mut self, byte: u8) -> core::result::Result<(), $crate::BufferFull> {
                if self.len >= Self::MAX_CAP {
                    Err($crate::BufferFull)
                } else {
                    self.buf[self.len] = byte;
                    self.len += 1;
                    Ok(())
                }
            }
            #[inline]
            fn clear(&mut self) {
                self.len = 0;
            }
            #[inline]
            fn as_slice(&self) -> &[u8] {
                &self.buf[..self.len]
            }
            #[inline]
            fn capacity(&self) -> usize {
                Self::MAX_CAP
            }
        }
    };
    {
        $(#[$attr:meta])*
        struct $name:ident([u8; $size:expr]);
    } => {
        $crate::stack_buffer!(@impl_def {$($attr)*} {} {$name} {$size});
    };
    {
        $(#[$attr:meta])*
        pub struct $name:ident([u8; $size:expr]);
    } => {
        $crate::stack_buffer!(@impl_def {$($attr)*} {pub} {$name} {$size});
    };
}
