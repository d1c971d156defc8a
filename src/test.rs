use crate::{
    handler,
    num::{u14, u4, u7},
    stack_buffer, Buffer, Callbacks, ChannelPressure, ControlChange, DecodeError, Decoder, Error,
    Handler, HeapBuffer, LiveEvent, MtcQuarterFrame, MtcQuarterFrameMessage, NoteMessage,
    PitchBend, PolyPressure, ProgramChange, SliceBuffer, SystemRealtime,
};
use proptest::prelude::*;
use std::{cell::RefCell, rc::Rc};

/// Everything a decoder produced, owned.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Rec {
    Event(LiveEvent<'static>),
    SysEx(Vec<u8>),
    Error(DecodeError),
}
impl Rec {
    fn from_decoded(ev: Result<LiveEvent, DecodeError>) -> Rec {
        match ev {
            Ok(LiveEvent::SysEx(data)) => Rec::SysEx(data.to_vec()),
            Ok(ev) => Rec::Event(ev.to_static()),
            Err(err) => Rec::Error(err),
        }
    }

    fn is_realtime(&self) -> bool {
        matches!(self, Rec::Event(LiveEvent::Realtime(_)))
    }
}

/// Decode a whole stream with a heap buffer of the given capacity.
fn decode(capacity: usize, bytes: &[u8]) -> Vec<Rec> {
    decode_stamped(capacity, bytes)
        .into_iter()
        .map(|(_ts, rec)| rec)
        .collect()
}

/// Decode a whole stream, using the byte index as timestamp.
fn decode_stamped(capacity: usize, bytes: &[u8]) -> Vec<(usize, Rec)> {
    let mut out = Vec::new();
    let mut decoder = Decoder::new(
        HeapBuffer::with_capacity(capacity),
        handler::from_fn(|ev, ts: usize| out.push((ts, Rec::from_decoded(ev)))),
    )
    .unwrap();
    for (ts, &byte) in bytes.iter().enumerate() {
        decoder.feed(byte, ts);
    }
    drop(decoder);
    out
}

fn note_on(channel: u8, key: u8, vel: u8) -> Rec {
    Rec::Event(LiveEvent::NoteOn(NoteMessage {
        channel: u4::new(channel),
        key: u7::new(key),
        vel: u7::new(vel),
    }))
}

fn note_off(channel: u8, key: u8, vel: u8) -> Rec {
    Rec::Event(LiveEvent::NoteOff(NoteMessage {
        channel: u4::new(channel),
        key: u7::new(key),
        vel: u7::new(vel),
    }))
}

fn program(channel: u8, program: u8) -> Rec {
    Rec::Event(LiveEvent::ProgramChange(ProgramChange {
        channel: u4::new(channel),
        program: u7::new(program),
    }))
}

fn bend(channel: u8, value: u16) -> Rec {
    Rec::Event(LiveEvent::PitchBend(PitchBend {
        channel: u4::new(channel),
        value: u14::new(value),
    }))
}

fn realtime(rt: SystemRealtime) -> Rec {
    Rec::Event(LiveEvent::Realtime(rt))
}

fn sysex(data: &[u8]) -> Rec {
    Rec::SysEx(data.to_vec())
}

const ABORTED: Rec = Rec::Error(DecodeError::MessageAborted);
const UNEXPECTED: Rec = Rec::Error(DecodeError::UnexpectedData);

/// Well-formed single messages, each producing exactly one event.
mod single {
    use super::*;

    #[test]
    fn channel_messages() {
        let cases: &[(&[u8], Rec)] = &[
            (&[0x80, 0x3C, 0x40], note_off(0, 0x3C, 0x40)),
            (&[0x9F, 0x7F, 0x01], note_on(15, 0x7F, 0x01)),
            (
                &[0xA3, 0x40, 0x22],
                Rec::Event(LiveEvent::PolyPressure(PolyPressure {
                    channel: u4::new(3),
                    key: u7::new(0x40),
                    value: u7::new(0x22),
                })),
            ),
            (
                &[0xB1, 0x07, 0x7F],
                Rec::Event(LiveEvent::ControlChange(ControlChange {
                    channel: u4::new(1),
                    control: u7::new(0x07),
                    value: u7::new(0x7F),
                })),
            ),
            (&[0xC9, 0x12], program(9, 0x12)),
            (
                &[0xDA, 0x45],
                Rec::Event(LiveEvent::ChannelPressure(ChannelPressure {
                    channel: u4::new(10),
                    value: u7::new(0x45),
                })),
            ),
            (&[0xE5, 0x00, 0x40], bend(5, 0x2000)),
        ];
        for (raw, expected) in cases {
            assert_eq!(decode(16, raw), [expected.clone()], "decoding {:02x?}", raw);
        }
    }

    #[test]
    fn system_common_messages() {
        let cases: &[(&[u8], Rec)] = &[
            (
                &[0xF1, 0x42],
                Rec::Event(LiveEvent::MtcQuarterFrame(MtcQuarterFrame {
                    kind: MtcQuarterFrameMessage::MinutesLow,
                    value: u4::new(2),
                })),
            ),
            (
                &[0xF1, 0x7F],
                Rec::Event(LiveEvent::MtcQuarterFrame(MtcQuarterFrame {
                    kind: MtcQuarterFrameMessage::HoursHigh,
                    value: u4::new(0xF),
                })),
            ),
            (
                &[0xF2, 0x00, 0x00],
                Rec::Event(LiveEvent::SongPosition(u14::new(0))),
            ),
            (
                &[0xF2, 0x7F, 0x7F],
                Rec::Event(LiveEvent::SongPosition(u14::new(16383))),
            ),
            (
                &[0xF2, 0x01, 0x02],
                Rec::Event(LiveEvent::SongPosition(u14::new(0x101))),
            ),
            (&[0xF3, 0x02], Rec::Event(LiveEvent::SongSelect(u7::new(2)))),
            (&[0xF6], Rec::Event(LiveEvent::TuneRequest)),
            (&[0xF0, 0x41, 0x10, 0x42, 0xF7], sysex(&[0x41, 0x10, 0x42])),
            (&[0xF0, 0xF7], sysex(&[])),
        ];
        for (raw, expected) in cases {
            assert_eq!(decode(16, raw), [expected.clone()], "decoding {:02x?}", raw);
        }
    }

    #[test]
    fn realtime_messages() {
        use SystemRealtime::*;
        let cases = [
            (0xF8, TimingClock),
            (0xFA, Start),
            (0xFB, Continue),
            (0xFC, Stop),
            (0xFE, ActiveSensing),
            (0xFF, Reset),
        ];
        for &(byte, rt) in cases.iter() {
            assert_eq!(decode(16, &[byte]), [realtime(rt)]);
        }
    }

    #[test]
    fn reserved_realtime_is_ignored() {
        assert!(decode(16, &[0xF9, 0xFD]).is_empty());
        assert_eq!(
            decode(16, &[0x90, 0xFD, 0x40, 0xF9, 0x7F]),
            [note_on(0, 0x40, 0x7F)]
        );
    }

    #[test]
    fn pitch_bend_is_raw() {
        assert_eq!(
            decode(16, &[0xE5, 0x00, 0x40, 0x00, 0x00, 0x7F, 0x7F]),
            [bend(5, 8192), bend(5, 0), bend(5, 16383)]
        );
        let at = |value| PitchBend {
            channel: u4::new(0),
            value: u14::new(value),
        };
        assert_eq!(at(8192).centered(), 0);
        assert_eq!(at(0).centered(), -8192);
        assert_eq!(at(16383).centered(), 8191);
    }
}

mod running_status {
    use super::*;

    #[test]
    fn note_on_repeats() {
        assert_eq!(
            decode(16, &[0x90, 0x3C, 0x64, 0x40, 0x00]),
            [note_on(0, 0x3C, 0x64), note_on(0, 0x40, 0x00)]
        );
    }

    #[test]
    fn single_byte_messages_repeat() {
        assert_eq!(
            decode(16, &[0xC0, 0x12, 0x13]),
            [program(0, 0x12), program(0, 0x13)]
        );
        let pressure = |value| {
            Rec::Event(LiveEvent::ChannelPressure(ChannelPressure {
                channel: u4::new(0),
                value: u7::new(value),
            }))
        };
        assert_eq!(
            decode(16, &[0xD0, 0x45, 0x46, 0x47]),
            [pressure(0x45), pressure(0x46), pressure(0x47)]
        );
    }

    #[test]
    fn tracks_last_channel_status() {
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(4), ()).unwrap();
        assert_eq!(decoder.running_status(), None);
        decoder.feed_all(&[0x93, 0x40], ());
        assert_eq!(decoder.running_status(), Some(0x93));
        decoder.feed_all(&[0x7F, 0xF8], ());
        assert_eq!(decoder.running_status(), Some(0x93));
        decoder.feed(0xF3, ());
        assert_eq!(decoder.running_status(), None);
    }

    #[test]
    fn system_common_clears_running_status() {
        assert_eq!(
            decode(16, &[0x90, 0x40, 0x7F, 0xF1, 0x12, 0x40, 0x7F]),
            [
                note_on(0, 0x40, 0x7F),
                Rec::Event(LiveEvent::MtcQuarterFrame(MtcQuarterFrame {
                    kind: MtcQuarterFrameMessage::FramesHigh,
                    value: u4::new(2),
                })),
                UNEXPECTED,
                UNEXPECTED,
            ]
        );
    }

    #[test]
    fn undefined_system_common_clears_running_status() {
        assert_eq!(
            decode(16, &[0x90, 0x40, 0x7F, 0xF4, 0x40, 0xF5, 0x7F]),
            [note_on(0, 0x40, 0x7F), UNEXPECTED, UNEXPECTED]
        );
    }

    #[test]
    fn new_status_discards_partial_message() {
        assert_eq!(
            decode(16, &[0x90, 0x40, 0x80, 0x41, 0x00]),
            [note_off(0, 0x41, 0x00)]
        );
    }
}

mod sysex {
    use super::*;

    #[test]
    fn overflow_is_reported_once() {
        assert_eq!(
            decode(2, &[0xF0, 0x01, 0x02, 0x03, 0xF7]),
            [Rec::Error(DecodeError::SysexTooLarge { capacity: 2 })]
        );
        assert_eq!(
            decode(2, &[0xF0, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xF7]),
            [Rec::Error(DecodeError::SysexTooLarge { capacity: 2 })]
        );
    }

    #[test]
    fn exactly_full_buffer_is_delivered() {
        assert_eq!(
            decode(3, &[0xF0, 0x01, 0x02, 0x03, 0xF7]),
            [sysex(&[0x01, 0x02, 0x03])]
        );
    }

    #[test]
    fn overflow_does_not_poison_the_next_message() {
        assert_eq!(
            decode(2, &[0xF0, 0x01, 0x02, 0x03, 0xF7, 0xF0, 0x04, 0xF7]),
            [
                Rec::Error(DecodeError::SysexTooLarge { capacity: 2 }),
                sysex(&[0x04]),
            ]
        );
    }

    #[test]
    fn new_start_discards_unterminated_message() {
        assert_eq!(
            decode(16, &[0xF0, 0x01, 0xF0, 0x02, 0xF7]),
            [sysex(&[0x02])]
        );
        // Also when the discarded message had overflowed
        assert_eq!(
            decode(1, &[0xF0, 0x01, 0x02, 0xF0, 0x03, 0xF7]),
            [
                Rec::Error(DecodeError::SysexTooLarge { capacity: 1 }),
                sysex(&[0x03]),
            ]
        );
    }

    #[test]
    fn channel_status_abandons_message() {
        assert_eq!(
            decode(16, &[0xF0, 0x01, 0x02, 0x90, 0x40, 0x7F, 0xF7, 0x10]),
            [note_on(0, 0x40, 0x7F), UNEXPECTED]
        );
    }

    #[test]
    fn realtime_does_not_interrupt() {
        assert_eq!(
            decode(16, &[0xF0, 0x01, 0xF8, 0x02, 0xFE, 0xF7]),
            [
                realtime(SystemRealtime::TimingClock),
                realtime(SystemRealtime::ActiveSensing),
                sysex(&[0x01, 0x02]),
            ]
        );
    }

    #[test]
    fn stray_end_is_ignored() {
        assert!(decode(16, &[0xF7]).is_empty());
        assert_eq!(decode(16, &[0xF7, 0x01]), [UNEXPECTED]);
    }

    #[test]
    fn progress_is_observable() {
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(1), ()).unwrap();
        assert!(!decoder.sysex_in_progress());
        decoder.feed_all(&[0xF0, 0x01, 0x02], ());
        assert!(decoder.sysex_in_progress());
        decoder.feed(0xF7, ());
        assert!(!decoder.sysex_in_progress());
    }
}

mod recovery {
    use super::*;

    #[test]
    fn data_on_fresh_stream_is_aborted() {
        assert_eq!(decode(16, &[0x40]), [ABORTED]);
        assert_eq!(
            decode(16, &[0x40, 0x7F, 0x90, 0x40, 0x7F]),
            [ABORTED, ABORTED, note_on(0, 0x40, 0x7F)]
        );
    }

    #[test]
    fn data_after_single_shot_messages_is_unexpected() {
        let single_shots: &[&[u8]] = &[
            &[0xF1, 0x00],
            &[0xF2, 0x00, 0x00],
            &[0xF3, 0x01],
            &[0xF6],
            &[0xF0, 0xF7],
        ];
        for raw in single_shots {
            let mut stream = raw.to_vec();
            stream.push(0x55);
            let recs = decode(16, &stream);
            assert_eq!(recs.len(), 2, "decoding {:02x?}", stream);
            assert_eq!(recs[1], UNEXPECTED, "decoding {:02x?}", stream);
        }
    }

    #[test]
    fn realtime_interleaving_keeps_channel_state() {
        assert_eq!(
            decode(16, &[0x90, 0xF8, 0x40, 0x7F]),
            [realtime(SystemRealtime::TimingClock), note_on(0, 0x40, 0x7F)]
        );
        assert_eq!(
            decode(16, &[0xB2, 0x07, 0xFA, 0x64, 0xFC]),
            [
                realtime(SystemRealtime::Start),
                Rec::Event(LiveEvent::ControlChange(ControlChange {
                    channel: u4::new(2),
                    control: u7::new(0x07),
                    value: u7::new(0x64),
                })),
                realtime(SystemRealtime::Stop),
            ]
        );
    }

    #[test]
    fn timestamps_pass_through() {
        let recs = decode_stamped(16, &[0x40, 0x90, 0x40, 0xF8, 0x7F, 0xF0, 0x01, 0xF7]);
        assert_eq!(
            recs,
            [
                (0, ABORTED),
                (3, realtime(SystemRealtime::TimingClock)),
                (4, note_on(0, 0x40, 0x7F)),
                (7, sysex(&[0x01])),
            ]
        );
    }

    #[test]
    fn independent_decoders() {
        let left = RefCell::new(Vec::new());
        let right = RefCell::new(Vec::new());
        let mut a = Decoder::new(
            HeapBuffer::with_capacity(8),
            handler::from_fn(|ev, _ts: ()| left.borrow_mut().push(Rec::from_decoded(ev))),
        )
        .unwrap();
        let mut b = Decoder::new(
            HeapBuffer::with_capacity(8),
            handler::from_fn(|ev, _ts: ()| right.borrow_mut().push(Rec::from_decoded(ev))),
        )
        .unwrap();
        let stream_a = [0x90, 0x40, 0x7F, 0x41, 0x7F];
        let stream_b = [0xF0, 0x01, 0x02, 0xF7, 0x45];
        for (&x, &y) in stream_a.iter().zip(stream_b.iter()) {
            a.feed(x, ());
            b.feed(y, ());
        }
        drop((a, b));
        assert_eq!(
            left.into_inner(),
            [note_on(0, 0x40, 0x7F), note_on(0, 0x41, 0x7F)]
        );
        assert_eq!(right.into_inner(), [sysex(&[0x01, 0x02]), UNEXPECTED]);
    }
}

mod lifecycle {
    use super::*;

    #[derive(Default)]
    struct Counter {
        notes: usize,
        errors: usize,
    }
    impl Handler for Counter {
        type Timestamp = ();
        fn note_on(&mut self, _msg: NoteMessage, _ts: ()) {
            self.notes += 1;
        }
        fn error(&mut self, _err: DecodeError, _ts: ()) {
            self.errors += 1;
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            Decoder::new(HeapBuffer::with_capacity(0), ()).err(),
            Some(Error::ZeroCapacity)
        );
        let mut storage = [0u8; 0];
        assert_eq!(
            Decoder::new(SliceBuffer::new(&mut storage), ()).err(),
            Some(Error::ZeroCapacity)
        );
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(4), Counter::default()).unwrap();
        decoder.feed_all(&[0x90, 0x40, 0x7F, 0x41], ());
        assert_eq!(decoder.handler().map(|c| c.notes), Some(1));

        let counter = decoder.teardown();
        assert_eq!(counter.map(|c| c.notes), Some(1));
        assert!(decoder.handler().is_none());
        assert_eq!(decoder.running_status(), None);

        assert!(decoder.teardown().is_none());
        assert!(decoder.handler().is_none());
        assert_eq!(decoder.running_status(), None);

        // Torn down decoders still accept bytes, delivering nothing
        decoder.feed_all(&[0x7F, 0x90, 0x40, 0x7F], ());
        assert!(decoder.handler().is_none());
    }

    #[test]
    fn teardown_discards_message_in_progress() {
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(4), Counter::default()).unwrap();
        decoder.feed_all(&[0x90, 0x40], ());
        decoder.teardown();
        assert!(decoder.attach(Counter::default()).is_none());
        decoder.feed(0x7F, ());
        let counter = decoder.handler().unwrap();
        assert_eq!((counter.notes, counter.errors), (0, 1));
    }

    #[test]
    fn reset_keeps_handler() {
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(4), Counter::default()).unwrap();
        decoder.feed_all(&[0xF0, 0x01, 0x02], ());
        decoder.reset();
        assert!(!decoder.sysex_in_progress());
        decoder.feed_all(&[0x03, 0x90, 0x40, 0x7F], ());
        let counter = decoder.handler().unwrap();
        assert_eq!((counter.notes, counter.errors), (1, 1));
    }

    #[test]
    fn borrowed_handler() {
        let mut counter = Counter::default();
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(4), &mut counter).unwrap();
        decoder.feed_all(&[0x99, 0x24, 0x7F, 0x26, 0x7F], ());
        drop(decoder);
        assert_eq!(counter.notes, 2);
    }
}

mod buffers {
    use super::*;

    #[test]
    fn caller_owned_storage() {
        let mut storage = [0u8; 4];
        let payloads = RefCell::new(Vec::new());
        let mut decoder = Decoder::new(
            SliceBuffer::new(&mut storage),
            handler::from_fn(|ev, _ts: ()| payloads.borrow_mut().push(Rec::from_decoded(ev))),
        )
        .unwrap();
        assert_eq!(decoder.capacity(), 4);
        decoder.feed_all(&[0xF0, 0x7D, 0x01, 0x02, 0x03, 0xF7], ());
        let (buffer, _) = decoder.into_parts();
        let storage = buffer.into_inner();
        assert_eq!(storage, &[0x7D, 0x01, 0x02, 0x03]);
        assert_eq!(
            payloads.into_inner(),
            [sysex(&[0x7D, 0x01, 0x02, 0x03])]
        );
    }

    #[test]
    fn stack_buffer() {
        stack_buffer! {
            struct Buf([u8; 3]);
        }
        let mut buf = Buf::new();
        buf.push(0x01).unwrap();
        buf.push(0x02).unwrap();
        buf.push(0x03).unwrap();
        assert!(buf.push(0x04).is_err());
        assert_eq!(buf.as_slice(), &[0x01, 0x02, 0x03]);
        assert_eq!(format!("{:?}", buf), "Buf[010203]");
        buf.clear();
        assert_eq!(buf.as_slice(), &[] as &[u8]);

        let mut decoder = Decoder::new(&mut buf, ()).unwrap();
        assert_eq!(decoder.capacity(), 3);
        decoder.feed_all(&[0xF0, 0x01, 0xF7], ());
    }

    #[test]
    fn heap_buffer_is_bounded() {
        let mut buf = HeapBuffer::with_capacity(2);
        buf.push(1).unwrap();
        buf.push(2).unwrap();
        assert!(buf.push(3).is_err());
        assert_eq!(buf.as_slice(), &[1, 2]);
        assert_eq!(format!("{:?}", buf), "HeapBuffer[0102]");
    }
}

mod callbacks {
    use super::*;

    #[test]
    fn unset_slots_are_skipped() {
        let notes = Rc::new(RefCell::new(Vec::new()));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = Callbacks::new();
        {
            let notes = Rc::clone(&notes);
            let errors = Rc::clone(&errors);
            callbacks
                .on_note_on(move |msg: NoteMessage, ts: u32| {
                    notes.borrow_mut().push((ts, msg.key.as_int()))
                })
                .on_error(move |err, ts| errors.borrow_mut().push((ts, err)));
        }
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(8), callbacks).unwrap();
        let stream = [0x10, 0xF8, 0x90, 0x3C, 0x64, 0xF0, 0x01, 0xF7, 0xC0, 0x05];
        for (ts, &byte) in stream.iter().enumerate() {
            decoder.feed(byte, ts as u32);
        }
        assert_eq!(*notes.borrow(), [(4, 0x3C)]);
        assert_eq!(*errors.borrow(), [(0, DecodeError::MessageAborted)]);

        decoder.handler_mut().unwrap().clear();
        decoder.feed_all(&[0x90, 0x3C, 0x64, 0x70], 99);
        assert_eq!(notes.borrow().len(), 1);
        assert_eq!(errors.borrow().len(), 1);
    }

    #[test]
    fn sysex_slot_borrows_buffer() {
        let mut seen = Vec::new();
        let mut callbacks = Callbacks::new();
        callbacks.on_system_exclusive(|data: &[u8], _ts: ()| seen.extend_from_slice(data));
        let mut decoder = Decoder::new(HeapBuffer::with_capacity(8), callbacks).unwrap();
        decoder.feed_all(&[0xF0, 0x43, 0x12, 0xF7, 0xF0, 0x44, 0xF7], ());
        drop(decoder);
        assert_eq!(seen, [0x43, 0x12, 0x44]);
    }
}

/// A monitor-style transcript of a stream covering every message kind and recovery path.
#[test]
fn demo_transcript() {
    #[rustfmt::skip]
    let stream = [
        0x90, 0x40, 0xF8, 0x7F, // clock in note on
        0x80, 0x40, 0x00, // note off
        0x90, 0x36, 0x20, 0x36, 0x00, // note on with running status
        0xA0, 0x40, 0x20, // poly pressure
        0x40, 0x22, 0x42, 0x23, // poly pressure running status
        0xB0, 0x07, 0x7F, // control change
        0x40, 0x00, // control change running status
        0xC0, 0x12, // program change
        0x13, // program change running status
        0xD0, 0x45, // channel pressure
        0x46, 0x47, // channel pressure running status
        0xE5, 0x00, 0x40, // pitch bend (center)
        0x00, 0x00, // pitch bend (min) with running status
        0x7F, 0x7F, // pitch bend (max) with running status
        0xFA, 0xFB, 0xFC, 0xFE, 0xFF, // start, continue, stop, active sensing, reset
        0xF0, 0x41, 0xF7,
        0xF0, 0x41, 0x10, 0x42, 0x12, 0x50, 0x50, 0x30, 0x23, 0xF7, // sysex
        0xF0, 0x41, 0x10, 0x42, 0x12, 0x50, 0x50, 0x30, 0x23, 0x10, 0x10, 0xF7, // too long
        0xF0, 0x12, 0x30, 0xF0, 0x32, 0x50, 0xF7, // new sysex discards the open one
        0xF1, 0x42, // mtc quarter frame
        0xF2, 0x00, 0x00, // song position (min)
        0xF2, 0x7F, 0x7F, // song position (max)
        0x45, // unexpected data
        0xF3, 0x02, // song select
        0xF6, // tune request
    ];
    let mut lines = Vec::new();
    let mut decoder = Decoder::new(
        HeapBuffer::with_capacity(8),
        handler::from_fn(|ev, ts: usize| {
            lines.push(match ev {
                Ok(ev) => format!("{:03} {}", ts + 1, ev),
                Err(err) => format!("{:03} error: {}", ts + 1, err),
            })
        }),
    )
    .unwrap();
    for (ts, &byte) in stream.iter().enumerate() {
        decoder.feed(byte, ts);
    }
    drop(decoder);
    insta::assert_snapshot!(lines.join("\n"), @r###"
    003 clock
    004 note on 0 40 7f
    007 note off 0 40 00
    010 note on 0 36 20
    012 note on 0 36 00
    015 poly pressure 0 40 20
    017 poly pressure 0 40 22
    019 poly pressure 0 42 23
    022 control change 0 07 7f
    024 control change 0 40 00
    026 program change 0 12
    027 program change 0 13
    029 channel pressure 0 45
    030 channel pressure 0 46
    031 channel pressure 0 47
    034 pitch bend 5 8192
    036 pitch bend 5 0
    038 pitch bend 5 16383
    039 start
    040 continue
    041 stop
    042 active sensing
    043 reset
    046 sysex [41]
    056 sysex [41 10 42 12 50 50 30 23]
    066 error: system exclusive message larger than the 8 byte buffer
    075 sysex [32 50]
    077 mtc quarter frame 4 2
    080 song position 0
    083 song position 16383
    084 error: unexpected data byte after a completed message
    086 song select 2
    087 tune request
    "###);
}

fn arb_stream() -> impl Strategy<Value = Vec<u8>> {
    // Bias towards the interesting bytes: status bytes are rare in uniform noise
    let byte = prop_oneof![
        4 => 0x00u8..0x80,
        2 => 0x80u8..0xF0,
        2 => 0xF0u8..0xF8,
        1 => 0xF8u8..=0xFF,
    ];
    prop::collection::vec(byte, 0..256)
}

proptest! {
    #[test]
    fn arbitrary_streams_stay_within_capacity(stream in arb_stream(), capacity in 1usize..16) {
        for (_ts, rec) in decode_stamped(capacity, &stream) {
            if let Rec::SysEx(data) = rec {
                prop_assert!(data.len() <= capacity);
            }
        }
    }

    #[test]
    fn realtime_bytes_are_transparent(
        stream in arb_stream(),
        inserts in prop::collection::vec((any::<prop::sample::Index>(), 0xF8u8..=0xFF), 0..16),
    ) {
        let stream: Vec<u8> = stream.into_iter().filter(|&b| b < 0xF8).collect();
        let mut interleaved = stream.clone();
        for (at, rt) in inserts {
            let at = at.index(interleaved.len() + 1);
            interleaved.insert(at, rt);
        }
        let plain = decode(8, &stream);
        let decoded = decode(8, &interleaved);
        let stripped: Vec<Rec> = decoded.into_iter().filter(|rec| !rec.is_realtime()).collect();
        prop_assert_eq!(plain, stripped);
    }

    #[test]
    fn overflow_reported_once_per_message(len in 0usize..64, capacity in 1usize..16) {
        let mut stream = vec![0xF0];
        stream.extend((0..len).map(|i| (i % 0x80) as u8));
        stream.push(0xF7);
        let recs = decode(capacity, &stream);
        if len > capacity {
            prop_assert_eq!(recs, vec![Rec::Error(DecodeError::SysexTooLarge { capacity })]);
        } else {
            prop_assert_eq!(recs.len(), 1);
            prop_assert_eq!(&recs[0], &Rec::SysEx(stream[1..=len].to_vec()));
        }
    }
}
