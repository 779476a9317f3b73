//! Background music: a melody table and a non-blocking tone sequencer.
//!
//! Melodies are `(frequency, divider)` pairs. A divider of `N` is a 1/N
//! whole note, a negative divider is the dotted version (1.5× as long) and
//! frequency 0 is a rest. Each note sounds for 90% of its length followed by
//! 10% silence. A divider or tempo of 0 gives zero-length, silent notes.

use crate::timing::TickDuration;

/// Note frequencies in Hz.
pub mod notes {
    pub const REST: u16 = 0;
    pub const GS4: u16 = 415;
    pub const A4: u16 = 440;
    pub const B4: u16 = 494;
    pub const C5: u16 = 523;
    pub const D5: u16 = 587;
    pub const E5: u16 = 659;
    pub const F5: u16 = 698;
    pub const G5: u16 = 784;
    pub const GS5: u16 = 831;
    pub const A5: u16 = 880;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    pub frequency: u16,
    pub divider: i8,
}

const fn n(frequency: u16, divider: i8) -> Note {
    Note { frequency, divider }
}

#[derive(Clone, Copy, Debug)]
pub struct Melody {
    pub notes: &'static [Note],
    /// Beats (quarter notes) per minute.
    pub tempo: u32,
}

/// Korobeiniki, the Tetris theme.
pub const KOROBEINIKI: Melody = Melody {
    notes: &KOROBEINIKI_NOTES,
    tempo: 144,
};

#[rustfmt::skip]
const KOROBEINIKI_NOTES: [Note; 99] = {
    use notes::*;
    [
        n(E5, 4), n(B4, 8), n(C5, 8), n(D5, 4), n(C5, 8), n(B4, 8),
        n(A4, 4), n(A4, 8), n(C5, 8), n(E5, 4), n(D5, 8), n(C5, 8),
        n(B4, -4), n(C5, 8), n(D5, 4), n(E5, 4),
        n(C5, 4), n(A4, 4), n(A4, 8), n(A4, 4), n(B4, 8), n(C5, 8),

        n(D5, -4), n(F5, 8), n(A5, 4), n(G5, 8), n(F5, 8),
        n(E5, -4), n(C5, 8), n(E5, 4), n(D5, 8), n(C5, 8),
        n(B4, 4), n(B4, 8), n(C5, 8), n(D5, 4), n(E5, 4),
        n(C5, 4), n(A4, 4), n(A4, 4), n(REST, 4),

        n(E5, 4), n(B4, 8), n(C5, 8), n(D5, 4), n(C5, 8), n(B4, 8),
        n(A4, 4), n(A4, 8), n(C5, 8), n(E5, 4), n(D5, 8), n(C5, 8),
        n(B4, -4), n(C5, 8), n(D5, 4), n(E5, 4),
        n(C5, 4), n(A4, 4), n(A4, 8), n(A4, 4), n(B4, 8), n(C5, 8),

        n(D5, -4), n(F5, 8), n(A5, 4), n(G5, 8), n(F5, 8),
        n(E5, -4), n(C5, 8), n(E5, 4), n(D5, 8), n(C5, 8),
        n(B4, 4), n(B4, 8), n(C5, 8), n(D5, 4), n(E5, 4),
        n(C5, 4), n(A4, 4), n(A4, 4), n(REST, 4),

        n(E5, 2), n(C5, 2), n(D5, 2), n(B4, 2),
        n(C5, 2), n(A4, 2), n(GS4, 2), n(B4, 4), n(REST, 8),
        n(E5, 2), n(C5, 2), n(D5, 2), n(B4, 2),
        n(C5, 4), n(E5, 4), n(A5, 2), n(GS5, 2),
    ]
};

impl Melody {
    /// Length of a whole note (four beats) in milliseconds.
    pub const fn whole_note_ms(&self) -> u32 {
        match (60_000 * 4u32).checked_div(self.tempo) {
            Some(ms) => ms,
            None => 0,
        }
    }

    /// Time for one pass through the melody as played, gaps included.
    pub fn length_ms(&self) -> u32 {
        self.tones()
            .map(|tone| tone.sound.ticks() + tone.gap.ticks())
            .fold(0u32, u32::saturating_add)
    }

    pub fn tones(&self) -> impl Iterator<Item = Tone> + '_ {
        let whole = self.whole_note_ms();
        self.notes.iter().map(move |note| note.tone(whole))
    }
}

/// One note ready to play: how long it sounds, then how long it is silent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    /// `None` for a rest.
    pub frequency: Option<u16>,
    pub sound: TickDuration,
    pub gap: TickDuration,
}

impl Note {
    /// Full length of the note, gap included.
    pub const fn duration_ms(&self, whole_note_ms: u32) -> u32 {
        let base = match whole_note_ms.checked_div(self.divider.unsigned_abs() as u32) {
            Some(ms) => ms,
            None => return 0,
        };
        if self.divider < 0 { base * 3 / 2 } else { base }
    }

    pub const fn tone(&self, whole_note_ms: u32) -> Tone {
        let duration = self.duration_ms(whole_note_ms);
        Tone {
            frequency: if self.frequency == 0 || duration == 0 {
                None
            } else {
                Some(self.frequency)
            },
            sound: TickDuration::from_ticks(duration * 9 / 10),
            gap: TickDuration::from_ticks(duration / 10),
        }
    }
}

/// A square-wave tone generator (buzzer, PWM pin, LED visualiser…).
pub trait ToneOutput {
    fn start_tone(&mut self, frequency: u16);
    fn stop_tone(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Sound,
    Gap,
}

/// Plays a [`Melody`] on a [`ToneOutput`], advanced by elapsed time from the
/// frame loop rather than by sleeping.
#[derive(Clone, Debug)]
pub struct MelodyPlayer {
    melody: Melody,
    looping: bool,
    index: usize,
    phase: Phase,
    remaining: u32,
    playing: bool,
}

impl MelodyPlayer {
    pub const fn new(melody: Melody, looping: bool) -> Self {
        Self {
            melody,
            looping,
            index: 0,
            phase: Phase::Sound,
            remaining: 0,
            playing: false,
        }
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Index of the note currently sounding or resting.
    pub const fn position(&self) -> usize {
        self.index
    }

    /// Start from the first note.
    pub fn start<O: ToneOutput>(&mut self, out: &mut O) {
        self.index = 0;
        self.playing = !self.melody.notes.is_empty();
        if self.playing {
            self.begin_note(out);
        }
    }

    pub fn stop<O: ToneOutput>(&mut self, out: &mut O) {
        self.playing = false;
        out.stop_tone();
    }

    fn begin_note<O: ToneOutput>(&mut self, out: &mut O) {
        let tone = self.melody.notes[self.index].tone(self.melody.whole_note_ms());
        match tone.frequency {
            Some(frequency) => out.start_tone(frequency),
            None => out.stop_tone(),
        }
        self.phase = Phase::Sound;
        self.remaining = tone.sound.ticks();
    }

    /// Move the melody forward by `elapsed`, switching tones on `out` at
    /// every boundary crossed. A looping player skips whole passes, so any
    /// `elapsed` lands on the same note as the equivalent short step.
    pub fn advance<O: ToneOutput>(&mut self, elapsed: TickDuration, out: &mut O) {
        let mut left = elapsed.ticks();
        if self.looping {
            let pass = self.melody.length_ms();
            if pass > 0 {
                left %= pass;
            }
        }
        // Each iteration ends one phase. Less than one pass is left to play,
        // so this bound only stops a melody of zero-length notes spinning.
        let mut budget = 2 * self.melody.notes.len() + 2;
        while self.playing && left >= self.remaining && budget > 0 {
            budget -= 1;
            left -= self.remaining;
            match self.phase {
                Phase::Sound => {
                    out.stop_tone();
                    self.phase = Phase::Gap;
                    let whole = self.melody.whole_note_ms();
                    self.remaining = self.melody.notes[self.index].tone(whole).gap.ticks();
                }
                Phase::Gap => {
                    self.index += 1;
                    if self.index == self.melody.notes.len() {
                        if !self.looping {
                            self.playing = false;
                            return;
                        }
                        self.index = 0;
                    }
                    self.begin_note(out);
                }
            }
        }
        if self.playing {
            self.remaining = self.remaining.saturating_sub(left);
        }
    }
}
