use thiserror::Error;

/// Errors detected when setting up a [`Decoder`](struct.Decoder.html).
///
/// These are API misuse errors and are returned through `Result`.
/// Anomalies in the byte stream itself are never returned: they are reported in-band as
/// [`DecodeError`](enum.DecodeError.html)s through the handler's `error` slot.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The system-exclusive buffer cannot hold a single byte.
    #[error("sysex buffer must have a capacity of at least 1 byte")]
    ZeroCapacity,
}

/// The result type used when constructing decoders.
pub type Result<T> = core::result::Result<T, Error>;

/// A local anomaly in the MIDI byte stream.
///
/// None of these are fatal: after reporting, the decoder waits for the next status byte and
/// resynchronizes on its own. Treating them as diagnostics (eg. to log a noisy MIDI line) is
/// perfectly fine.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// A data byte arrived while no message was known to be in progress.
    ///
    /// Happens when the stream is picked up in the middle of a message, or after a message was
    /// cut short.
    #[error("data byte without a message in progress")]
    MessageAborted,
    /// A data byte arrived where a status byte was required, for example right after a
    /// single-shot system common message completed.
    #[error("unexpected data byte after a completed message")]
    UnexpectedData,
    /// A system-exclusive message outgrew the sysex buffer.
    ///
    /// Reported once per message; the whole message is discarded.
    #[error("system exclusive message larger than the {capacity} byte buffer")]
    SysexTooLarge {
        /// Capacity of the buffer that overflowed.
        capacity: usize,
    },
}
