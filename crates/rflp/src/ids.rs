//! Event kinds of the project format.

use rflp_event::kind::{BYTE, DATA, DWORD, TEXT, WORD};
use rflp_event::EventKind;

pub mod project {
    use super::*;

    pub const LOOP_ACTIVE: EventKind = EventKind(BYTE + 9);
    pub const SHOW_INFO: EventKind = EventKind(BYTE + 10);
    pub const MAIN_VOLUME: EventKind = EventKind(BYTE + 12);
    pub const PAN_LAW: EventKind = EventKind(BYTE + 23);
    pub const LICENSED: EventKind = EventKind(BYTE + 28);
    pub const TEMPO_COARSE: EventKind = EventKind(WORD + 2);
    pub const MAIN_PITCH: EventKind = EventKind(WORD + 16);
    pub const TEMPO_FINE: EventKind = EventKind(WORD + 29);
    pub const TEMPO: EventKind = EventKind(DWORD + 28);
    pub const BUILD: EventKind = EventKind(DWORD + 31);
    pub const TITLE: EventKind = EventKind(TEXT + 2);
    pub const COMMENTS: EventKind = EventKind(TEXT + 3);
    pub const URL: EventKind = EventKind(TEXT + 5);
    pub const RTF_COMMENTS: EventKind = EventKind(TEXT + 6);
    pub const VERSION: EventKind = EventKind(TEXT + 7);
    pub const DATA_PATH: EventKind = EventKind(TEXT + 10);
    pub const GENRE: EventKind = EventKind(TEXT + 14);
    pub const ARTISTS: EventKind = EventKind(TEXT + 15);
    pub const TIMESTAMP: EventKind = EventKind(DATA + 29);
}

pub mod channel {
    use super::*;

    pub const ENABLED: EventKind = EventKind(BYTE);
    pub const ZIPPED: EventKind = EventKind(BYTE + 15);
    pub const TYPE: EventKind = EventKind(BYTE + 21);
    pub const ROUTED_TO: EventKind = EventKind(BYTE + 22);
    pub const LOCKED: EventKind = EventKind(BYTE + 32);
    pub const NEW: EventKind = EventKind(WORD);
    pub const FX_FLAGS: EventKind = EventKind(WORD + 6);
    pub const COLOR: EventKind = EventKind(DWORD);
    pub const SAMPLER_FLAGS: EventKind = EventKind(DWORD + 15);
    pub const LAYER_FLAGS: EventKind = EventKind(DWORD + 16);
    pub const SAMPLE_PATH: EventKind = EventKind(TEXT + 4);
    pub const NAME: EventKind = EventKind(TEXT + 11);
    pub const LEVELS: EventKind = EventKind(DATA + 11);
}

pub mod plugin {
    use super::*;

    pub const WRAPPER: EventKind = EventKind(DATA + 4);
    pub const STATE: EventKind = EventKind(DATA + 5);
}

pub mod pattern {
    use super::*;

    pub const LOOPED: EventKind = EventKind(BYTE + 26);
    pub const NEW: EventKind = EventKind(WORD + 1);
    pub const COLOR: EventKind = EventKind(DWORD + 22);
    pub const LENGTH: EventKind = EventKind(DWORD + 36);
    pub const NAME: EventKind = EventKind(TEXT + 1);
}

pub mod arrangement {
    use super::*;

    pub const NEW: EventKind = EventKind(WORD + 35);
}

/// Mixer, insert and effect slot kinds. Any of them ends the channel rack.
pub mod mixer {
    use super::*;

    pub const APDC: EventKind = EventKind(BYTE + 29);
    pub const INSERT_ICON: EventKind = EventKind(WORD + 31);
    pub const SLOT_INDEX: EventKind = EventKind(WORD + 34);
    pub const INSERT_OUTPUT: EventKind = EventKind(DWORD + 19);
    pub const INSERT_COLOR: EventKind = EventKind(DWORD + 21);
    pub const INSERT_INPUT: EventKind = EventKind(DWORD + 26);
    pub const INSERT_NAME: EventKind = EventKind(TEXT + 12);
    pub const PARAMS: EventKind = EventKind(DATA + 17);
    pub const INSERT_ROUTING: EventKind = EventKind(DATA + 27);
    pub const INSERT_FLAGS: EventKind = EventKind(DATA + 28);
}

/// Sub-event kinds inside VST plugin data.
pub mod vst {
    pub const MIDI: u8 = 1;
    pub const FLAGS: u8 = 2;
    pub const IO: u8 = 30;
    pub const INPUTS: u8 = 31;
    pub const OUTPUTS: u8 = 32;
    pub const PLUGIN_INFO: u8 = 50;
    pub const FOUR_CC: u8 = 51;
    pub const GUID: u8 = 52;
    pub const STATE: u8 = 53;
    pub const NAME: u8 = 54;
    pub const PLUGIN_PATH: u8 = 55;
    pub const VENDOR: u8 = 56;
}
