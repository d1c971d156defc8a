//! A [`Handler`](../trait.Handler.html) made of optional closures, registered one slot at a time.
//!
//! This type is only available with the `alloc` feature enabled.

use crate::{
    handler::Handler,
    message::{
        ChannelPressure, ControlChange, MtcQuarterFrame, NoteMessage, PitchBend, PolyPressure,
        ProgramChange,
    },
    prelude::*,
    DecodeError,
};
use alloc::boxed::Box;

macro_rules! callback_table {
    {$(
        $(#[$attr:meta])*
        $slot:ident => $register:ident ( $( $arg:ident : $ty:ty ),* );
    )*} => {
        /// A callback table: one optional closure per message kind, plus one for errors.
        ///
        /// Slots that were never registered are skipped, so registering is optional per kind.
        ///
        /// ```rust
        /// use midirx::{Callbacks, Decoder, HeapBuffer};
        ///
        /// let mut clocks = 0;
        /// let mut callbacks = Callbacks::new();
        /// callbacks
        ///     .on_timing_clock(|_ts: ()| clocks += 1)
        ///     .on_error(|err, _ts| eprintln!("noisy line: {}", err));
        ///
        /// let mut decoder = Decoder::new(HeapBuffer::with_capacity(128), callbacks).unwrap();
        /// decoder.feed_all(&[0xF8, 0x90, 0xF8, 0x40, 0x7F], ());
        /// drop(decoder);
        /// assert_eq!(clocks, 2);
        /// ```
        pub struct Callbacks<'a, T> {
            $( $slot: Option<Box<dyn FnMut($($ty,)* T) + 'a>>, )*
        }

        impl<'a, T> Callbacks<'a, T> {
            /// A table with every slot empty.
            pub fn new() -> Callbacks<'a, T> {
                Callbacks {
                    $( $slot: None, )*
                }
            }

            /// Empty every slot, turning them all into no-ops.
            pub fn clear(&mut self) {
                $( self.$slot = None; )*
            }

            $(
                $(#[$attr])*
                pub fn $register(&mut self, f: impl FnMut($($ty,)* T) + 'a) -> &mut Self {
                    self.$slot = Some(Box::new(f));
                    self
                }
            )*
        }

        impl<T: Copy> Handler for Callbacks<'_, T> {
            type Timestamp = T;

            $(
                #[inline]
                fn $slot(&mut self, $( $arg: $ty, )* ts: T) {
                    if let Some(f) = self.$slot.as_mut() {
                        f($( $arg, )* ts)
                    }
                }
            )*
        }

        impl<T> fmt::Debug for Callbacks<'_, T> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_struct("Callbacks")
                    $( .field(stringify!($slot), &self.$slot.is_some()) )*
                    .finish()
            }
        }
    };
}

callback_table! {
    note_off => on_note_off(msg: NoteMessage);
    note_on => on_note_on(msg: NoteMessage);
    poly_pressure => on_poly_pressure(msg: PolyPressure);
    control_change => on_control_change(msg: ControlChange);
    program_change => on_program_change(msg: ProgramChange);
    channel_pressure => on_channel_pressure(msg: ChannelPressure);
    pitch_bend => on_pitch_bend(msg: PitchBend);
    /// The payload excludes the framing `0xF0` and `0xF7` bytes.
    system_exclusive => on_system_exclusive(data: &[u8]);
    mtc_quarter_frame => on_mtc_quarter_frame(msg: MtcQuarterFrame);
    song_position => on_song_position(position: u14);
    song_select => on_song_select(song: u7);
    tune_request => on_tune_request();
    timing_clock => on_timing_clock();
    song_start => on_song_start();
    song_continue => on_song_continue();
    song_stop => on_song_stop();
    active_sensing => on_active_sensing();
    system_reset => on_system_reset();
    error => on_error(err: DecodeError);
}

impl<T> Default for Callbacks<'_, T> {
    fn default() -> Self {
        Callbacks::new()
    }
}
