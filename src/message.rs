//! Typed payloads of decoded MIDI messages.
//!
//! Each message kind the decoder understands has its own small `Copy` type, handed to the
//! matching [`Handler`](../trait.Handler.html) slot. [`LiveEvent`](enum.LiveEvent.html) gathers
//! all of them into a single enum, for consumers that prefer one closure over a callback table.

use crate::prelude::*;

/// A Note On or Note Off message.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct NoteMessage {
    /// The channel this message is associated with.
    pub channel: u4,
    /// The MIDI key, usually `60` is middle C.
    pub key: u7,
    /// How hard the key was struck (or released).
    pub vel: u7,
}

/// Polyphonic key pressure, ie. aftertouch for a single key.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PolyPressure {
    pub channel: u4,
    /// The key being pressed.
    pub key: u7,
    /// The new pressure value.
    pub value: u7,
}

/// A controller changed its value.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ControlChange {
    pub channel: u4,
    /// The controller number.
    pub control: u7,
    pub value: u7,
}

/// Select the program (instrument) of a channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ProgramChange {
    pub channel: u4,
    pub program: u7,
}

/// Channel-wide pressure, ie. aftertouch for the whole channel.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ChannelPressure {
    pub channel: u4,
    pub value: u7,
}

/// A pitch bend wheel position.
///
/// The value is kept exactly as transmitted: a 14-bit integer where `0` is the lowest bend,
/// `0x2000` (8192) is the center and `0x3FFF` is the highest bend.
/// Use [`centered`](#method.centered) for a signed offset from the center.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PitchBend {
    pub channel: u4,
    /// Raw bend, in the range `0 ..= 16383`.
    pub value: u14,
}
impl PitchBend {
    /// The raw value of a pitch wheel at rest.
    pub const CENTER: u16 = 0x2000;

    /// The bend as a signed offset from the center, in the range `-8192 ..= 8191`.
    #[inline]
    pub fn centered(&self) -> i16 {
        self.value.as_int() as i16 - Self::CENTER as i16
    }
}

/// A MIDI Time Code Quarter Frame message: one nibble of the current SMPTE time.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct MtcQuarterFrame {
    /// Which nibble of the time code this message carries.
    pub kind: MtcQuarterFrameMessage,
    /// The 4-bit nibble itself.
    pub value: u4,
}

/// The different kinds of info a Midi Time Code Quarter Frame message can carry.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum MtcQuarterFrameMessage {
    /// The low nibble of the frame count.
    FramesLow,
    /// The high nibble of the frame count.
    FramesHigh,
    /// The low nibble of the second count.
    SecondsLow,
    /// The high nibble of the second count.
    SecondsHigh,
    /// The low nibble of the minute count.
    MinutesLow,
    /// The high nibble of the minute count.
    MinutesHigh,
    /// The low nibble of the hour count.
    HoursLow,
    /// The high nibble of the hour count, along with the frame rate.
    HoursHigh,
}
impl MtcQuarterFrameMessage {
    /// The 3-bit message type code, in the range `0 ..= 7`.
    pub fn code(self) -> u8 {
        use MtcQuarterFrameMessage::*;
        match self {
            FramesLow => 0,
            FramesHigh => 1,
            SecondsLow => 2,
            SecondsHigh => 3,
            MinutesLow => 4,
            MinutesHigh => 5,
            HoursLow => 6,
            HoursHigh => 7,
        }
    }

    /// Get the message type out of the 3-bit type code.
    /// The upper bits are ignored.
    pub fn from_code(code: u8) -> MtcQuarterFrameMessage {
        use MtcQuarterFrameMessage::*;
        match code & 0x07 {
            0 => FramesLow,
            1 => FramesHigh,
            2 => SecondsLow,
            3 => SecondsHigh,
            4 => MinutesLow,
            5 => MinutesHigh,
            6 => HoursLow,
            _ => HoursHigh,
        }
    }
}

/// System Realtime messages are one-byte messages that only occur within live MIDI streams.
/// They are usually time-sensitive, get top priority and can even be transmitted in between the
/// bytes of other messages.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemRealtime {
    /// If sent, they should be sent 24 times per quarter note.
    TimingClock,
    /// Request the device to start playing at position 0.
    Start,
    /// Request the device to continue playing without resetting the position.
    Continue,
    /// Request the device to stop playing, but keep track of the position where it stopped.
    Stop,
    /// Once one of these messages is transmitted, a message should arrive every 300ms or else the
    /// connection is considered broken.
    ActiveSensing,
    /// Request the device to reset itself, usually to the same state as it was after turning on.
    Reset,
}
impl SystemRealtime {
    /// Identify a system realtime message from its status byte.
    ///
    /// Returns `None` for the reserved `0xF9` and `0xFD` bytes, and for anything outside the
    /// `0xF8 ..= 0xFF` range.
    #[inline]
    pub fn new(status: u8) -> Option<SystemRealtime> {
        use SystemRealtime::*;
        Some(match status {
            0xF8 => TimingClock,
            0xFA => Start,
            0xFB => Continue,
            0xFC => Stop,
            0xFE => ActiveSensing,
            0xFF => Reset,
            _ => return None,
        })
    }
}

/// Any message produced by the decoder.
///
/// The lifetime ties `SysEx` payloads to the decoder's sysex buffer: they are only valid for the
/// duration of the callback. Use [`to_static`](#method.to_static) to keep events around.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum LiveEvent<'a> {
    NoteOff(NoteMessage),
    NoteOn(NoteMessage),
    PolyPressure(PolyPressure),
    ControlChange(ControlChange),
    ProgramChange(ProgramChange),
    ChannelPressure(ChannelPressure),
    PitchBend(PitchBend),
    /// A complete system-exclusive message, without the leading `0xF0` nor the closing `0xF7`.
    SysEx(&'a [u8]),
    MtcQuarterFrame(MtcQuarterFrame),
    /// The number of MIDI beats (6 x MIDI clocks) that have elapsed since the start of the
    /// sequence.
    SongPosition(u14),
    SongSelect(u7),
    /// Request the device to tune itself.
    TuneRequest,
    Realtime(SystemRealtime),
}
impl LiveEvent<'_> {
    /// The channel of a channel message, `None` for system messages.
    pub fn channel(&self) -> Option<u4> {
        match self {
            LiveEvent::NoteOff(m) | LiveEvent::NoteOn(m) => Some(m.channel),
            LiveEvent::PolyPressure(m) => Some(m.channel),
            LiveEvent::ControlChange(m) => Some(m.channel),
            LiveEvent::ProgramChange(m) => Some(m.channel),
            LiveEvent::ChannelPressure(m) => Some(m.channel),
            LiveEvent::PitchBend(m) => Some(m.channel),
            _ => None,
        }
    }

    /// Remove any lifetimed data from this event to create a `LiveEvent` with `'static`
    /// lifetime that can be stored and moved everywhere.
    ///
    /// WARNING: SysEx payloads are replaced by an empty slice.
    pub fn to_static(&self) -> LiveEvent<'static> {
        match *self {
            LiveEvent::SysEx(_) => LiveEvent::SysEx(&[]),
            LiveEvent::NoteOff(m) => LiveEvent::NoteOff(m),
            LiveEvent::NoteOn(m) => LiveEvent::NoteOn(m),
            LiveEvent::PolyPressure(m) => LiveEvent::PolyPressure(m),
            LiveEvent::ControlChange(m) => LiveEvent::ControlChange(m),
            LiveEvent::ProgramChange(m) => LiveEvent::ProgramChange(m),
            LiveEvent::ChannelPressure(m) => LiveEvent::ChannelPressure(m),
            LiveEvent::PitchBend(m) => LiveEvent::PitchBend(m),
            LiveEvent::MtcQuarterFrame(m) => LiveEvent::MtcQuarterFrame(m),
            LiveEvent::SongPosition(pos) => LiveEvent::SongPosition(pos),
            LiveEvent::SongSelect(song) => LiveEvent::SongSelect(song),
            LiveEvent::TuneRequest => LiveEvent::TuneRequest,
            LiveEvent::Realtime(rt) => LiveEvent::Realtime(rt),
        }
    }
}

/// One line per event, in the style of a MIDI monitor.
///
/// Channels and values are decimal, keys, controllers and sysex bytes are hexadecimal.
impl fmt::Display for LiveEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LiveEvent::NoteOff(m) => {
                write!(f, "note off {} {:02x} {:02x}", m.channel, m.key, m.vel)
            }
            LiveEvent::NoteOn(m) => {
                write!(f, "note on {} {:02x} {:02x}", m.channel, m.key, m.vel)
            }
            LiveEvent::PolyPressure(m) => {
                write!(f, "poly pressure {} {:02x} {:02x}", m.channel, m.key, m.value)
            }
            LiveEvent::ControlChange(m) => {
                write!(f, "control change {} {:02x} {:02x}", m.channel, m.control, m.value)
            }
            LiveEvent::ProgramChange(m) => {
                write!(f, "program change {} {:02x}", m.channel, m.program)
            }
            LiveEvent::ChannelPressure(m) => {
                write!(f, "channel pressure {} {:02x}", m.channel, m.value)
            }
            LiveEvent::PitchBend(m) => write!(f, "pitch bend {} {}", m.channel, m.value),
            LiveEvent::SysEx(data) => {
                f.write_str("sysex [")?;
                for (i, byte) in data.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{:02x}", byte)?;
                }
                f.write_str("]")
            }
            LiveEvent::MtcQuarterFrame(m) => {
                write!(f, "mtc quarter frame {} {}", m.kind.code(), m.value)
            }
            LiveEvent::SongPosition(pos) => write!(f, "song position {}", pos),
            LiveEvent::SongSelect(song) => write!(f, "song select {}", song),
            LiveEvent::TuneRequest => f.write_str("tune request"),
            LiveEvent::Realtime(rt) => f.write_str(match rt {
                SystemRealtime::TimingClock => "clock",
                SystemRealtime::Start => "start",
                SystemRealtime::Continue => "continue",
                SystemRealtime::Stop => "stop",
                SystemRealtime::ActiveSensing => "active sensing",
                SystemRealtime::Reset => "reset",
            }),
        }
    }
}
