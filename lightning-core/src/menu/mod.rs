//! Mode selection menu
//!
//! The mode table, the selection state machine, and the effects it emits.

pub mod effects;
pub mod machine;
pub mod options;

pub use effects::{Effect, Effects, HighlightStyle, MAX_EFFECTS};
pub use machine::{Direction, Menu, MenuState, DEFAULT_FLASH_MS};
pub use options::{
    Label, ModeId, ModeOption, ModeTable, ModeTableError, DEFAULT_MODES, MAX_LABEL_LEN, MAX_MODES,
};
