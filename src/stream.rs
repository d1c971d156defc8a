//! The streaming decoder, turning raw, undelimited MIDI bytes into messages.
//!
//! Raw MIDI streams are what travels through a 5-pin DIN cable or a UART: there is no framing
//! other than the status bytes themselves, messages may omit their status byte (running status),
//! single-byte realtime messages may show up anywhere (even between the data bytes of another
//! message), and a connection may be picked up or lost in the middle of a message.
//!
//! The [`Decoder`](struct.Decoder.html) consumes such a stream one byte at a time and calls the
//! matching [`Handler`](trait.Handler.html) slot as soon as a message is complete.

use crate::{
    buffer::{Buffer, BufferFull},
    handler::Handler,
    message::{
        ChannelPressure, ControlChange, MtcQuarterFrame, MtcQuarterFrameMessage, NoteMessage,
        PitchBend, PolyPressure, ProgramChange, SystemRealtime,
    },
    prelude::*,
    DecodeError, Error, Result,
};
use tracing::{debug, trace, warn};

/// The 7 kinds of channel message, selected by bits 6-4 of the status byte.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ChannelKind {
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
}
impl ChannelKind {
    /// Only valid for status bytes in the `0x80 ..= 0xEF` range.
    fn from_status(status: u8) -> ChannelKind {
        use ChannelKind::*;
        match status >> 4 {
            0x8 => NoteOff,
            0x9 => NoteOn,
            0xA => PolyPressure,
            0xB => ControlChange,
            0xC => ProgramChange,
            0xD => ChannelPressure,
            _ => PitchBend,
        }
    }

    /// Program change and channel pressure carry a single data byte, everything else carries two.
    fn is_single_byte(self) -> bool {
        matches!(self, ChannelKind::ProgramChange | ChannelKind::ChannelPressure)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct ChannelStatus {
    kind: ChannelKind,
    channel: u4,
}

/// Where the next data byte goes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Continuation {
    /// No status byte seen since the stream started or lost sync.
    Aborted,
    /// A message that does not repeat just completed.
    Closed,
    /// A channel message, holding its first data byte once it arrives.
    /// Completed messages re-arm this state with `None`, which implements running status.
    Channel(ChannelStatus, Option<u7>),
    /// Accumulating a system-exclusive message into the sysex buffer.
    SysEx,
    /// The sysex in progress outgrew the buffer, and will be dropped when it ends.
    SysExOverflowed,
    MtcQuarterFrame,
    SongPositionLsb,
    SongPositionMsb(u7),
    SongSelect,
}

/// A streaming raw MIDI decoder.
///
/// The decoder owns all parsing state for a single stream, so decoding several streams (eg. one
/// per input port) takes one decoder each.
///
/// # Usage
///
/// ```rust
/// use midirx::{Decoder, Handler, NoteMessage, SliceBuffer};
///
/// struct Printer;
/// impl Handler for Printer {
///     type Timestamp = u64;
///     fn note_on(&mut self, msg: NoteMessage, ts: u64) {
///         println!("{}: key {} down on channel {}", ts, msg.key, msg.channel);
///     }
/// }
///
/// let mut storage = [0; 256];
/// let mut decoder = Decoder::new(SliceBuffer::new(&mut storage), Printer).unwrap();
/// for (ts, &byte) in [0x92, 0x3C, 0x40].iter().enumerate() {
///     decoder.feed(byte, ts as u64);
/// }
/// ```
///
/// # Recovery
///
/// Stream anomalies are reported through [`Handler::error`](trait.Handler.html#method.error) and
/// never stop the decoder: stray data bytes are reported and discarded until the next status byte
/// arrives, at which point decoding carries on as usual.
///
/// # Policies
///
/// - A system-exclusive message that is interrupted by any status byte other than a realtime
///     byte or its `0xF7` terminator (including another `0xF0`) is discarded without a callback.
/// - A system-exclusive message larger than the buffer is reported once as
///     `DecodeError::SysexTooLarge` and discarded as a whole.
/// - Pitch bend values are delivered raw, `0x2000` being the center.
/// - The reserved realtime bytes `0xF9` and `0xFD` are ignored.
pub struct Decoder<B, H: Handler> {
    sysex: B,
    handler: Option<H>,
    cont: Continuation,
    running_status: Option<u8>,
}

impl<B: Buffer, H: Handler> Decoder<B, H> {
    /// Create a fresh decoder, delivering messages to `handler` and collecting system-exclusive
    /// messages into `buffer`.
    ///
    /// Any previous contents of the buffer are cleared.
    /// Fails with `Error::ZeroCapacity` if the buffer cannot hold a single byte.
    pub fn new(mut buffer: B, handler: H) -> Result<Decoder<B, H>> {
        ensure!(buffer.capacity() > 0, Error::ZeroCapacity);
        buffer.clear();
        Ok(Decoder {
            sysex: buffer,
            handler: Some(handler),
            cont: Continuation::Aborted,
            running_status: None,
        })
    }

    /// Feed a single raw byte, calling at most one handler slot.
    ///
    /// `ts` is passed verbatim to the handler if this byte completes a message or causes an
    /// error.
    pub fn feed(&mut self, byte: u8, ts: H::Timestamp) {
        match byte {
            0xF8..=0xFF => self.realtime(byte, ts),
            0xF0..=0xF7 => self.system_common(byte, ts),
            0x80..=0xEF => self.channel_status(byte),
            _ => self.data(u7::new(byte), ts),
        }
    }

    /// Feed a slice of bytes, all sharing the same timestamp.
    ///
    /// Calling `feed_all` with many small slices is equivalent to calling `feed_all` with one
    /// large concatenation of them all (save for timestamps).
    pub fn feed_all(&mut self, bytes: &[u8], ts: H::Timestamp) {
        for &byte in bytes {
            self.feed(byte, ts);
        }
    }

    /// Discard any message in progress along with running status, as if the stream had just
    /// been connected.
    ///
    /// The handler is kept.
    pub fn reset(&mut self) {
        self.sysex.clear();
        self.cont = Continuation::Aborted;
        self.running_status = None;
    }

    /// Detach the handler and discard any message in progress.
    ///
    /// Afterwards every handler slot behaves as a no-op: bytes are still decoded, but nothing is
    /// delivered until a handler is attached again.
    /// Safe to call at any point, including in the middle of a message, and any number of times.
    pub fn teardown(&mut self) -> Option<H> {
        if !matches!(self.cont, Continuation::Aborted | Continuation::Closed) {
            debug!("tearing down decoder with a message in progress");
        }
        self.reset();
        self.handler.take()
    }

    /// Install a new handler, returning the previous one if any.
    ///
    /// Decoding state is left untouched.
    pub fn attach(&mut self, handler: H) -> Option<H> {
        self.handler.replace(handler)
    }

    /// The installed handler, if the decoder was not torn down.
    #[inline]
    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    /// The installed handler, if the decoder was not torn down.
    #[inline]
    pub fn handler_mut(&mut self) -> Option<&mut H> {
        self.handler.as_mut()
    }

    /// The status byte that data bytes without a status byte of their own will be attributed to.
    #[inline]
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    /// The largest system-exclusive payload this decoder can deliver.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.sysex.capacity()
    }

    /// Whether a system-exclusive message was started and not yet terminated.
    #[inline]
    pub fn sysex_in_progress(&self) -> bool {
        matches!(self.cont, Continuation::SysEx | Continuation::SysExOverflowed)
    }

    /// Take the decoder apart, giving back the buffer and the handler.
    pub fn into_parts(self) -> (B, Option<H>) {
        (self.sysex, self.handler)
    }

    #[inline]
    fn emit(&mut self, f: impl FnOnce(&mut H)) {
        if let Some(handler) = self.handler.as_mut() {
            f(handler);
        }
    }

    fn report(&mut self, err: DecodeError, ts: H::Timestamp) {
        debug!(%err, "midi stream out of sync");
        self.emit(|h| h.error(err, ts));
    }

    /// Drop a sysex message that is being interrupted by a foreign status byte.
    fn abandon_sysex(&mut self) {
        if self.sysex_in_progress() {
            debug!(
                len = self.sysex.as_slice().len(),
                "discarding unterminated sysex message"
            );
            self.sysex.clear();
        }
    }

    fn realtime(&mut self, status: u8, ts: H::Timestamp) {
        // Realtime bytes are invisible to every other message: they may be interleaved anywhere
        // and must not touch the continuation, running status or sysex buffer.
        let rt = match SystemRealtime::new(status) {
            Some(rt) => rt,
            None => {
                trace!(status, "ignoring reserved realtime byte");
                return;
            }
        };
        trace!(?rt, "system realtime");
        self.emit(|h| match rt {
            SystemRealtime::TimingClock => h.timing_clock(ts),
            SystemRealtime::Start => h.song_start(ts),
            SystemRealtime::Continue => h.song_continue(ts),
            SystemRealtime::Stop => h.song_stop(ts),
            SystemRealtime::ActiveSensing => h.active_sensing(ts),
            SystemRealtime::Reset => h.system_reset(ts),
        });
    }

    fn system_common(&mut self, status: u8, ts: H::Timestamp) {
        self.running_status = None;
        match status {
            0xF0 => {
                // A new sysex always closes the previous one
                self.abandon_sysex();
                self.sysex.clear();
                self.cont = Continuation::SysEx;
            }
            0xF7 => {
                match self.cont {
                    Continuation::SysEx => {
                        trace!(len = self.sysex.as_slice().len(), "system exclusive");
                        if let Some(handler) = self.handler.as_mut() {
                            handler.system_exclusive(self.sysex.as_slice(), ts);
                        }
                    }
                    Continuation::SysExOverflowed => {
                        debug!("dropping oversized sysex message");
                    }
                    _ => trace!("ignoring end of exclusive without a sysex in progress"),
                }
                self.sysex.clear();
                self.cont = Continuation::Closed;
            }
            _ => {
                self.abandon_sysex();
                self.cont = match status {
                    0xF1 => Continuation::MtcQuarterFrame,
                    0xF2 => Continuation::SongPositionLsb,
                    0xF3 => Continuation::SongSelect,
                    0xF6 => {
                        trace!("tune request");
                        self.emit(|h| h.tune_request(ts));
                        Continuation::Closed
                    }
                    _ => {
                        // 0xF4 and 0xF5, undefined
                        trace!(status, "ignoring undefined system common message");
                        Continuation::Closed
                    }
                };
            }
        }
    }

    fn channel_status(&mut self, status: u8) {
        self.abandon_sysex();
        self.running_status = Some(status);
        let status = ChannelStatus {
            kind: ChannelKind::from_status(status),
            channel: u4::new(status),
        };
        self.cont = Continuation::Channel(status, None);
    }

    fn data(&mut self, byte: u7, ts: H::Timestamp) {
        match self.cont {
            Continuation::Aborted => self.report(DecodeError::MessageAborted, ts),
            Continuation::Closed => self.report(DecodeError::UnexpectedData, ts),
            Continuation::Channel(status, None) if status.kind.is_single_byte() => {
                self.channel_message(status, byte, u7::default(), ts);
            }
            Continuation::Channel(status, None) => {
                self.cont = Continuation::Channel(status, Some(byte));
            }
            Continuation::Channel(status, Some(first)) => {
                self.cont = Continuation::Channel(status, None);
                self.channel_message(status, first, byte, ts);
            }
            Continuation::SysEx => {
                if let Err(BufferFull) = self.sysex.push(byte.as_int()) {
                    let capacity = self.sysex.capacity();
                    warn!(capacity, "sysex message too large for its buffer, dropping it");
                    self.sysex.clear();
                    self.cont = Continuation::SysExOverflowed;
                    self.emit(|h| h.error(DecodeError::SysexTooLarge { capacity }, ts));
                }
            }
            Continuation::SysExOverflowed => {}
            Continuation::MtcQuarterFrame => {
                self.cont = Continuation::Closed;
                let msg = MtcQuarterFrame {
                    kind: MtcQuarterFrameMessage::from_code(byte.as_int() >> 4),
                    value: u4::new(byte.as_int()),
                };
                trace!(?msg, "mtc quarter frame");
                self.emit(|h| h.mtc_quarter_frame(msg, ts));
            }
            Continuation::SongPositionLsb => {
                self.cont = Continuation::SongPositionMsb(byte);
            }
            Continuation::SongPositionMsb(lsb) => {
                self.cont = Continuation::Closed;
                let position = u14::from_lsb_msb(lsb, byte);
                trace!(%position, "song position");
                self.emit(|h| h.song_position(position, ts));
            }
            Continuation::SongSelect => {
                self.cont = Continuation::Closed;
                trace!(song = %byte, "song select");
                self.emit(|h| h.song_select(byte, ts));
            }
        }
    }

    /// Deliver a complete channel message.
    /// Single-byte messages ignore `second`.
    fn channel_message(&mut self, status: ChannelStatus, first: u7, second: u7, ts: H::Timestamp) {
        let channel = status.channel;
        trace!(kind = ?status.kind, %channel, %first, %second, "channel message");
        self.emit(|h| match status.kind {
            ChannelKind::NoteOff => h.note_off(
                NoteMessage {
                    channel,
                    key: first,
                    vel: second,
                },
                ts,
            ),
            ChannelKind::NoteOn => h.note_on(
                NoteMessage {
                    channel,
                    key: first,
                    vel: second,
                },
                ts,
            ),
            ChannelKind::PolyPressure => h.poly_pressure(
                PolyPressure {
                    channel,
                    key: first,
                    value: second,
                },
                ts,
            ),
            ChannelKind::ControlChange => h.control_change(
                ControlChange {
                    channel,
                    control: first,
                    value: second,
                },
                ts,
            ),
            ChannelKind::ProgramChange => h.program_change(
                ProgramChange {
                    channel,
                    program: first,
                },
                ts,
            ),
            ChannelKind::ChannelPressure => h.channel_pressure(
                ChannelPressure {
                    channel,
                    value: first,
                },
                ts,
            ),
            ChannelKind::PitchBend => h.pitch_bend(
                PitchBend {
                    channel,
                    value: u14::from_lsb_msb(first, second),
                },
                ts,
            ),
        });
    }
}

impl<B: fmt::Debug, H: Handler> fmt::Debug for Decoder<B, H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("sysex", &self.sysex)
            .field("continuation", &self.cont)
            .field("running_status", &self.running_status)
            .field("attached", &self.handler.is_some())
            .finish()
    }
}
