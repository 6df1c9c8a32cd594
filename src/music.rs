//! Background music sequencing
//!
//! A slow four-chord progression under an eight-note lead line. The
//! sequencer only decides which pitches sound and when; the web audio layer
//! turns its steps into oscillator frequency changes.

/// Chord progression, in Hz. The bass plays an octave below the root and
/// the pad holds the third.
pub const CHORDS: [[f32; 3]; 4] = [
    [220.0, 262.0, 330.0],
    [175.0, 220.0, 262.0],
    [262.0, 330.0, 392.0],
    [196.0, 247.0, 294.0],
];

/// Lead line, in Hz
pub const MELODY: [f32; 8] = [440.0, 495.0, 523.0, 587.0, 659.0, 523.0, 495.0, 440.0];

/// Seconds per chord
pub const CHORD_SECS: f32 = 2.0;
/// Seconds per lead note
pub const NOTE_SECS: f32 = 0.5;

/// Lead filter cutoff center and swing
const FILTER_CENTER: f32 = 1200.0;
const FILTER_SWING: f32 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voicing {
    pub bass_hz: f32,
    pub pad_hz: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub lead_hz: f32,
    /// Lowpass cutoff for the lead
    pub filter_hz: f32,
}

/// Changes to apply this update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MusicStep {
    pub chord: Option<Voicing>,
    pub note: Option<Note>,
}

impl MusicStep {
    pub fn is_empty(&self) -> bool {
        self.chord.is_none() && self.note.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    chord_index: usize,
    note_index: usize,
    chord_clock: f32,
    note_clock: f32,
    started: bool,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. The first call sounds the opening chord and
    /// note; a long gap advances each part by one step only.
    pub fn advance(&mut self, dt: f32) -> MusicStep {
        if !self.started {
            self.started = true;
            return MusicStep {
                chord: Some(self.next_chord()),
                note: Some(self.next_note()),
            };
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.chord_clock += dt;
        self.note_clock += dt;

        let mut step = MusicStep::default();
        if self.chord_clock >= CHORD_SECS {
            self.chord_clock %= CHORD_SECS;
            step.chord = Some(self.next_chord());
        }
        if self.note_clock >= NOTE_SECS {
            self.note_clock %= NOTE_SECS;
            step.note = Some(self.next_note());
        }
        step
    }

    fn next_chord(&mut self) -> Voicing {
        let chord = CHORDS[self.chord_index];
        self.chord_index = (self.chord_index + 1) % CHORDS.len();
        Voicing {
            bass_hz: chord[0] / 2.0,
            pad_hz: chord[1],
        }
    }

    fn next_note(&mut self) -> Note {
        let i = self.note_index;
        self.note_index = (i + 1) % MELODY.len();
        Note {
            lead_hz: MELODY[i],
            filter_hz: FILTER_CENTER + (i as f32).sin() * FILTER_SWING,
        }
    }
}
