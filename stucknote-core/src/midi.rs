//! Raw MIDI message classification.
//!
//! The monitor only cares about note lifecycle, so classification is
//! deliberately narrow: Note On, Note Off, or nothing. Control change,
//! pitch bend, sysex and the rest are not modeled and fall through to
//! `None` without being an error.

/// The two message kinds the tracker reacts to, identified by note key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { key: u8 },
    NoteOff { key: u8 },
}

/// Classify a raw MIDI message by its status nibble.
///
/// Returns `None` for anything that is not a note message (or is too short
/// to carry a note number). The channel nibble is masked off: a stuck note
/// is stuck regardless of which channel it arrived on. Velocity is never
/// inspected; a Note On with velocity 0 still counts as a Note On, so
/// controllers that signal releases that way will show up as stuck notes.
pub fn classify(data: &[u8]) -> Option<MidiMessage> {
    if data.len() < 2 {
        return None;
    }

    match data[0] & 0xF0 {
        0x90 => Some(MidiMessage::NoteOn { key: data[1] }),
        0x80 => Some(MidiMessage::NoteOff { key: data[1] }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_note_on() {
        let data = [0x90, 60, 100];
        assert_eq!(classify(&data), Some(MidiMessage::NoteOn { key: 60 }));
    }

    #[test]
    fn test_classify_note_off() {
        let data = [0x80, 60, 0];
        assert_eq!(classify(&data), Some(MidiMessage::NoteOff { key: 60 }));
    }

    #[test]
    fn test_channel_nibble_is_masked() {
        // Note On channel 3, Note Off channel 15
        assert_eq!(
            classify(&[0x93, 72, 80]),
            Some(MidiMessage::NoteOn { key: 72 })
        );
        assert_eq!(
            classify(&[0x8F, 72, 0]),
            Some(MidiMessage::NoteOff { key: 72 })
        );
    }

    #[test]
    fn test_velocity_zero_is_still_note_on() {
        assert_eq!(
            classify(&[0x90, 60, 0]),
            Some(MidiMessage::NoteOn { key: 60 })
        );
    }

    #[test]
    fn test_other_status_bytes_ignored() {
        assert_eq!(classify(&[0xB0, 1, 64]), None); // control change
        assert_eq!(classify(&[0xE0, 0x00, 0x40]), None); // pitch bend
        assert_eq!(classify(&[0xC0, 5]), None); // program change
        assert_eq!(classify(&[0xF0, 0x01, 0xF7]), None); // sysex
    }

    #[test]
    fn test_short_messages_ignored() {
        assert_eq!(classify(&[]), None);
        assert_eq!(classify(&[0x90]), None);
    }
}
