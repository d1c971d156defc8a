//! The callback table through which decoded messages leave the decoder.

use crate::{
    message::{
        ChannelPressure, ControlChange, LiveEvent, MtcQuarterFrame, NoteMessage, PitchBend,
        PolyPressure, ProgramChange, SystemRealtime,
    },
    prelude::*,
    DecodeError,
};

/// Receives messages from a [`Decoder`](struct.Decoder.html), one method per message kind.
///
/// Every method has an empty default implementation, so implementors only override the slots
/// they care about; any other message kind is decoded and silently dropped.
///
/// All methods receive the timestamp passed along with the byte that completed the message (or,
/// for `error`, the byte that caused the error). The decoder never inspects timestamps.
///
/// Handlers are owned (or mutably borrowed) by the decoder, so they cannot feed bytes back into
/// the decoder that is calling them.
///
/// ```rust
/// use midirx::{Decoder, Handler, HeapBuffer, NoteMessage};
///
/// #[derive(Default)]
/// struct Keys(Vec<u8>);
/// impl Handler for Keys {
///     type Timestamp = ();
///     fn note_on(&mut self, msg: NoteMessage, _ts: ()) {
///         self.0.push(msg.key.as_int());
///     }
/// }
///
/// let mut decoder = Decoder::new(HeapBuffer::default(), Keys::default()).unwrap();
/// decoder.feed_all(&[0x90, 60, 100, 64, 100], ());
/// assert_eq!(decoder.handler().unwrap().0, [60, 64]);
/// ```
#[allow(unused_variables)]
pub trait Handler {
    /// Opaque timestamp attached to every byte.
    /// Use `()` if the surrounding system has no notion of time.
    type Timestamp: Copy;

    fn note_off(&mut self, msg: NoteMessage, ts: Self::Timestamp) {}
    fn note_on(&mut self, msg: NoteMessage, ts: Self::Timestamp) {}
    fn poly_pressure(&mut self, msg: PolyPressure, ts: Self::Timestamp) {}
    fn control_change(&mut self, msg: ControlChange, ts: Self::Timestamp) {}
    fn program_change(&mut self, msg: ProgramChange, ts: Self::Timestamp) {}
    fn channel_pressure(&mut self, msg: ChannelPressure, ts: Self::Timestamp) {}
    fn pitch_bend(&mut self, msg: PitchBend, ts: Self::Timestamp) {}

    /// A complete system-exclusive message.
    ///
    /// `data` excludes the framing `0xF0` and `0xF7` bytes and borrows the decoder's sysex
    /// buffer, so it must be copied out to outlive the call.
    fn system_exclusive(&mut self, data: &[u8], ts: Self::Timestamp) {}
    fn mtc_quarter_frame(&mut self, msg: MtcQuarterFrame, ts: Self::Timestamp) {}
    fn song_position(&mut self, position: u14, ts: Self::Timestamp) {}
    fn song_select(&mut self, song: u7, ts: Self::Timestamp) {}
    fn tune_request(&mut self, ts: Self::Timestamp) {}

    fn timing_clock(&mut self, ts: Self::Timestamp) {}
    fn song_start(&mut self, ts: Self::Timestamp) {}
    fn song_continue(&mut self, ts: Self::Timestamp) {}
    fn song_stop(&mut self, ts: Self::Timestamp) {}
    fn active_sensing(&mut self, ts: Self::Timestamp) {}
    fn system_reset(&mut self, ts: Self::Timestamp) {}

    /// A stream anomaly. The decoder has already recovered by the time this is called.
    fn error(&mut self, err: DecodeError, ts: Self::Timestamp) {}
}

/// A handler that ignores everything.
impl Handler for () {
    type Timestamp = ();
}

impl<H: Handler + ?Sized> Handler for &mut H {
    type Timestamp = H::Timestamp;

    fn note_off(&mut self, msg: NoteMessage, ts: Self::Timestamp) {
        (**self).note_off(msg, ts)
    }
    fn note_on(&mut self, msg: NoteMessage, ts: Self::Timestamp) {
        (**self).note_on(msg, ts)
    }
    fn poly_pressure(&mut self, msg: PolyPressure, ts: Self::Timestamp) {
        (**self).poly_pressure(msg, ts)
    }
    fn control_change(&mut self, msg: ControlChange, ts: Self::Timestamp) {
        (**self).control_change(msg, ts)
    }
    fn program_change(&mut self, msg: ProgramChange, ts: Self::Timestamp) {
        (**self).program_change(msg, ts)
    }
    fn channel_pressure(&mut self, msg: ChannelPressure, ts: Self::Timestamp) {
        (**self).channel_pressure(msg, ts)
    }
    fn pitch_bend(&mut self, msg: PitchBend, ts: Self::Timestamp) {
        (**self).pitch_bend(msg, ts)
    }
    fn system_exclusive(&mut self, data: &[u8], ts: Self::Timestamp) {
        (**self).system_exclusive(data, ts)
    }
    fn mtc_quarter_frame(&mut self, msg: MtcQuarterFrame, ts: Self::Timestamp) {
        (**self).mtc_quarter_frame(msg, ts)
    }
    fn song_position(&mut self, position: u14, ts: Self::Timestamp) {
        (**self).song_position(position, ts)
    }
    fn song_select(&mut self, song: u7, ts: Self::Timestamp) {
        (**self).song_select(song, ts)
    }
    fn tune_request(&mut self, ts: Self::Timestamp) {
        (**self).tune_request(ts)
    }
    fn timing_clock(&mut self, ts: Self::Timestamp) {
        (**self).timing_clock(ts)
    }
    fn song_start(&mut self, ts: Self::Timestamp) {
        (**self).song_start(ts)
    }
    fn song_continue(&mut self, ts: Self::Timestamp) {
        (**self).song_continue(ts)
    }
    fn song_stop(&mut self, ts: Self::Timestamp) {
        (**self).song_stop(ts)
    }
    fn active_sensing(&mut self, ts: Self::Timestamp) {
        (**self).active_sensing(ts)
    }
    fn system_reset(&mut self, ts: Self::Timestamp) {
        (**self).system_reset(ts)
    }
    fn error(&mut self, err: DecodeError, ts: Self::Timestamp) {
        (**self).error(err, ts)
    }
}

/// A [`Handler`](trait.Handler.html) funneling every slot into a single closure.
///
/// Created through [`from_fn`](fn.from_fn.html).
pub struct FnHandler<F, T> {
    f: F,
    _ts: PhantomData<fn(T)>,
}

/// Handle every message kind and every error with one closure.
///
/// Decoded messages arrive as `Ok(LiveEvent)`, stream anomalies as `Err(DecodeError)`.
///
/// ```rust
/// use midirx::{handler, Decoder, HeapBuffer};
///
/// let mut log = Vec::new();
/// let mut decoder = Decoder::new(
///     HeapBuffer::with_capacity(64),
///     handler::from_fn(|ev, ts: u32| log.push((ts, ev.map(|ev| ev.to_static())))),
/// )
/// .unwrap();
/// decoder.feed(0xC3, 1);
/// decoder.feed(0x05, 2);
/// drop(decoder);
/// assert_eq!(log.len(), 1);
/// assert_eq!(log[0].0, 2);
/// ```
pub fn from_fn<T, F>(f: F) -> FnHandler<F, T>
where
    T: Copy,
    F: for<'a> FnMut(core::result::Result<LiveEvent<'a>, DecodeError>, T),
{
    FnHandler {
        f,
        _ts: PhantomData,
    }
}

impl<F, T> FnHandler<F, T> {
    /// Get the closure back.
    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<F, T> Handler for FnHandler<F, T>
where
    T: Copy,
    F: for<'a> FnMut(core::result::Result<LiveEvent<'a>, DecodeError>, T),
{
    type Timestamp = T;

    fn note_off(&mut self, msg: NoteMessage, ts: T) {
        (self.f)(Ok(LiveEvent::NoteOff(msg)), ts)
    }
    fn note_on(&mut self, msg: NoteMessage, ts: T) {
        (self.f)(Ok(LiveEvent::NoteOn(msg)), ts)
    }
    fn poly_pressure(&mut self, msg: PolyPressure, ts: T) {
        (self.f)(Ok(LiveEvent::PolyPressure(msg)), ts)
    }
    fn control_change(&mut self, msg: ControlChange, ts: T) {
        (self.f)(Ok(LiveEvent::ControlChange(msg)), ts)
    }
    fn program_change(&mut self, msg: ProgramChange, ts: T) {
        (self.f)(Ok(LiveEvent::ProgramChange(msg)), ts)
    }
    fn channel_pressure(&mut self, msg: ChannelPressure, ts: T) {
        (self.f)(Ok(LiveEvent::ChannelPressure(msg)), ts)
    }
    fn pitch_bend(&mut self, msg: PitchBend, ts: T) {
        (self.f)(Ok(LiveEvent::PitchBend(msg)), ts)
    }
    fn system_exclusive(&mut self, data: &[u8], ts: T) {
        (self.f)(Ok(LiveEvent::SysEx(data)), ts)
    }
    fn mtc_quarter_frame(&mut self, msg: MtcQuarterFrame, ts: T) {
        (self.f)(Ok(LiveEvent::MtcQuarterFrame(msg)), ts)
    }
    fn song_position(&mut self, position: u14, ts: T) {
        (self.f)(Ok(LiveEvent::SongPosition(position)), ts)
    }
    fn song_select(&mut self, song: u7, ts: T) {
        (self.f)(Ok(LiveEvent::SongSelect(song)), ts)
    }
    fn tune_request(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::TuneRequest), ts)
    }
    fn timing_clock(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::TimingClock)), ts)
    }
    fn song_start(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::Start)), ts)
    }
    fn song_continue(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::Continue)), ts)
    }
    fn song_stop(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::Stop)), ts)
    }
    fn active_sensing(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::ActiveSensing)), ts)
    }
    fn system_reset(&mut self, ts: T) {
        (self.f)(Ok(LiveEvent::Realtime(SystemRealtime::Reset)), ts)
    }
    fn error(&mut self, err: DecodeError, ts: T) {
        (self.f)(Err(err), ts)
    }
}
