//! Mode table
//!
//! The ordered, immutable list of selectable modes. Position in the list is
//! the mode's identity; labels are unique and looked up through an index
//! built once when the table is created.

use heapless::{FnvIndexMap, String, Vec};

/// Maximum number of modes in a table
pub const MAX_MODES: usize = 16;

/// Maximum label length in bytes
pub const MAX_LABEL_LEN: usize = 16;

/// Mode identity: the position of the mode in the table
pub type ModeId = u8;

/// Bounded mode label
pub type Label = String<MAX_LABEL_LEN>;

/// Mode list shipped with the selector
pub const DEFAULT_MODES: [&str; 9] = [
    "ON",
    "OFF",
    "CLOUD",
    "ACID",
    "FADE",
    "BLUE",
    "RED",
    "GREEN",
    "PRPL_RAIN",
];

/// Errors raised while building a mode table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeTableError {
    /// No modes given
    Empty,
    /// More than `MAX_MODES` modes
    TooMany,
    /// A label is the empty string
    EmptyLabel,
    /// A label exceeds `MAX_LABEL_LEN`
    LabelTooLong,
    /// A label appears twice
    DuplicateLabel,
}

/// One selectable mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeOption {
    pub id: ModeId,
    pub label: Label,
}

/// Ordered list of modes with a label index
#[derive(Debug, Clone)]
pub struct ModeTable {
    options: Vec<ModeOption, MAX_MODES>,
    index: FnvIndexMap<Label, ModeId, MAX_MODES>,
}

impl ModeTable {
    /// Build a table from labels in display order
    pub fn new<'a, I>(labels: I) -> Result<Self, ModeTableError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = Self {
            options: Vec::new(),
            index: FnvIndexMap::new(),
        };

        for text in labels {
            table.push(text)?;
        }

        if table.options.is_empty() {
            return Err(ModeTableError::Empty);
        }
        Ok(table)
    }

    /// The shipped mode list
    pub fn reference() -> Result<Self, ModeTableError> {
        Self::new(DEFAULT_MODES)
    }

    fn push(&mut self, text: &str) -> Result<(), ModeTableError> {
        if text.is_empty() {
            return Err(ModeTableError::EmptyLabel);
        }
        let label = Label::try_from(text).map_err(|_| ModeTableError::LabelTooLong)?;
        if self.index.contains_key(&label) {
            return Err(ModeTableError::DuplicateLabel);
        }

        let id = self.options.len() as ModeId;
        self.options
            .push(ModeOption {
                id,
                label: label.clone(),
            })
            .map_err(|_| ModeTableError::TooMany)?;
        self.index
            .insert(label, id)
            .map_err(|_| ModeTableError::TooMany)?;
        Ok(())
    }

    /// Number of modes
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// All modes in display order
    pub fn options(&self) -> &[ModeOption] {
        &self.options
    }

    pub fn get(&self, id: ModeId) -> Option<&ModeOption> {
        self.options.get(id as usize)
    }

    pub fn label(&self, id: ModeId) -> Option<&str> {
        self.get(id).map(|option| option.label.as_str())
    }

    /// Find a mode by exact, case-sensitive label
    pub fn lookup(&self, label: &str) -> Option<ModeId> {
        let key = Label::try_from(label).ok()?;
        self.index.get(&key).copied()
    }
}
