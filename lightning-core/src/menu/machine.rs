//! Menu state machine
//!
//! Owns the current selection and reconciles the two ways it can change:
//! local button presses and remote commands from the message bus. Both end
//! in the same confirm sequence, so the display, the serial peer, and the
//! published state always agree on the active mode.

use super::effects::{extend, Effect, Effects, HighlightStyle};
use super::options::{ModeId, ModeTable};
use crate::input::ButtonAction;

/// Flash duration used by the shipped configuration
pub const DEFAULT_FLASH_MS: u32 = 500;

/// Direction of a cycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Prev,
    Next,
}

/// Current and prior selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuState {
    pub selection: ModeId,
    /// `None` until the selection first changes
    pub previous_selection: Option<ModeId>,
}

/// The mode selector menu
#[derive(Debug, Clone)]
pub struct Menu {
    table: ModeTable,
    state: MenuState,
    flash_ms: u32,
}

impl Menu {
    /// Create a menu with the first mode selected
    pub fn new(table: ModeTable, flash_ms: u32) -> Self {
        Self {
            table,
            state: MenuState {
                selection: 0,
                previous_selection: None,
            },
            flash_ms,
        }
    }

    pub fn table(&self) -> &ModeTable {
        &self.table
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn selection(&self) -> ModeId {
        self.state.selection
    }

    /// Label of the current selection
    pub fn selected_label(&self) -> &str {
        self.table.label(self.state.selection).unwrap_or_default()
    }

    /// Effects that paint the menu at startup
    pub fn initial_render(&self) -> Effects {
        let mut effects = Effects::new();
        extend(
            &mut effects,
            &[Effect::Redraw {
                highlighted: self.state.selection,
            }],
        );
        effects
    }

    /// Move the selection one step, wrapping at either end
    ///
    /// Nothing is sent or published; only the display changes.
    pub fn cycle(&mut self, direction: Direction) -> Effects {
        let count = self.table.len() as ModeId;
        let current = self.state.selection;
        let next = match direction {
            Direction::Next => (current + 1) % count,
            Direction::Prev => (current + count - 1) % count,
        };
        self.select(next)
    }

    /// Confirm the current selection
    ///
    /// Flashes the row, then sends and publishes the label. Every call
    /// yields one transmit and one publish, even for an unchanged
    /// selection. The menu is ready for input again as soon as this returns.
    pub fn confirm(&mut self) -> Effects {
        let id = self.state.selection;

        let mut effects = Effects::new();
        extend(
            &mut effects,
            &[
                Effect::Highlight {
                    id,
                    style: HighlightStyle::Flash,
                },
                Effect::Hold { ms: self.flash_ms },
                Effect::Highlight {
                    id,
                    style: HighlightStyle::Selected,
                },
                Effect::Transmit(id),
                Effect::Publish(id),
            ],
        );
        effects
    }

    /// Apply a mode requested over the message bus
    ///
    /// Unknown labels and the already-selected label are ignored. Otherwise
    /// the selection jumps to the requested mode and is confirmed exactly as
    /// if chosen locally.
    pub fn apply_remote(&mut self, label: &str) -> Effects {
        let Some(target) = self.table.lookup(label) else {
            return Effects::new();
        };
        if target == self.state.selection {
            return Effects::new();
        }

        let mut effects = self.select(target);
        let confirm = self.confirm();
        extend(&mut effects, &confirm);
        effects
    }

    /// Dispatch a button action from the panel
    pub fn handle_local_input(&mut self, action: Option<ButtonAction>) -> Effects {
        match action {
            Some(ButtonAction::Prev) => self.cycle(Direction::Prev),
            Some(ButtonAction::Next) => self.cycle(Direction::Next),
            Some(ButtonAction::Confirm) => self.confirm(),
            None => Effects::new(),
        }
    }

    fn select(&mut self, target: ModeId) -> Effects {
        let previous = self.state.selection;
        self.state.previous_selection = Some(previous);
        self.state.selection = target;

        let mut effects = Effects::new();
        extend(
            &mut effects,
            &[
                Effect::Redraw {
                    highlighted: target,
                },
                Effect::Highlight {
                    id: previous,
                    style: HighlightStyle::Normal,
                },
                Effect::Highlight {
                    id: target,
                    style: HighlightStyle::Selected,
                },
            ],
        );
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{DEFAULT_MODES, MAX_EFFECTS};
    use proptest::prelude::*;

    fn make_menu() -> Menu {
        Menu::new(ModeTable::reference().unwrap(), DEFAULT_FLASH_MS)
    }

    fn confirm_effects(id: ModeId) -> [Effect; 5] {
        [
            Effect::Highlight {
                id,
                style: HighlightStyle::Flash,
            },
            Effect::Hold { ms: 500 },
            Effect::Highlight {
                id,
                style: HighlightStyle::Selected,
            },
            Effect::Transmit(id),
            Effect::Publish(id),
        ]
    }

    #[test]
    fn test_initial_state() {
        let menu = make_menu();
        assert_eq!(menu.selection(), 0);
        assert_eq!(menu.state().previous_selection, None);
        assert_eq!(menu.selected_label(), "ON");
        assert_eq!(
            menu.initial_render().as_slice(),
            &[Effect::Redraw { highlighted: 0 }]
        );
    }

    #[test]
    fn test_cycle_next() {
        let mut menu = make_menu();
        let effects = menu.cycle(Direction::Next);

        assert_eq!(menu.selection(), 1);
        assert_eq!(menu.state().previous_selection, Some(0));
        assert_eq!(
            effects.as_slice(),
            &[
                Effect::Redraw { highlighted: 1 },
                Effect::Highlight {
                    id: 0,
                    style: HighlightStyle::Normal
                },
                Effect::Highlight {
                    id: 1,
                    style: HighlightStyle::Selected
                },
            ]
        );
        assert!(effects.iter().all(Effect::is_render));
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        let mut menu = make_menu();
        menu.cycle(Direction::Prev);
        assert_eq!(menu.selection(), 8);
        assert_eq!(menu.selected_label(), "PRPL_RAIN");

        menu.cycle(Direction::Next);
        assert_eq!(menu.selection(), 0);
        assert_eq!(menu.state().previous_selection, Some(8));
    }

    #[test]
    fn test_cycle_single_mode() {
        let mut menu = Menu::new(ModeTable::new(["ONLY"]).unwrap(), DEFAULT_FLASH_MS);
        menu.cycle(Direction::Next);
        assert_eq!(menu.selection(), 0);
        menu.cycle(Direction::Prev);
        assert_eq!(menu.selection(), 0);
    }

    #[test]
    fn test_confirm_sequence() {
        let mut menu = make_menu();
        menu.cycle(Direction::Next);
        menu.cycle(Direction::Next);

        let effects = menu.confirm();
        assert_eq!(effects.as_slice(), &confirm_effects(2));
        assert_eq!(menu.selection(), 2);
        assert_eq!(menu.state().previous_selection, Some(1));
    }

    #[test]
    fn test_flash_duration_is_configurable() {
        let mut menu = Menu::new(ModeTable::reference().unwrap(), 250);
        let effects = menu.confirm();
        assert_eq!(effects[1], Effect::Hold { ms: 250 });
    }

    #[test]
    fn test_back_to_back_confirms_each_send_and_publish() {
        let mut menu = make_menu();

        for _ in 0..2 {
            let effects = menu.confirm();
            assert_eq!(effects.as_slice(), &confirm_effects(0));
            let (transmits, publishes, published) = sent_and_published(&menu, &effects);
            assert_eq!((transmits, publishes, published), (1, 1, Some(0)));
        }
        assert_eq!(menu.selection(), 0);
    }

    #[test]
    fn test_input_accepted_right_after_confirm() {
        let mut menu = make_menu();
        menu.confirm();

        let effects = menu.apply_remote("RED");
        assert_eq!(menu.selected_label(), "RED");
        assert_eq!(effects.len(), MAX_EFFECTS);
        assert_eq!(&effects[3..], &confirm_effects(6));

        menu.confirm();
        assert_eq!(menu.cycle(Direction::Next).len(), 3);
        assert_eq!(menu.selected_label(), "GREEN");
    }

    #[test]
    fn test_apply_remote_known_label() {
        let mut menu = make_menu();
        let effects = menu.apply_remote("ACID");

        assert_eq!(menu.selection(), 3);
        assert_eq!(menu.state().previous_selection, Some(0));
        assert_eq!(effects.len(), MAX_EFFECTS);
        assert_eq!(
            &effects[..3],
            &[
                Effect::Redraw { highlighted: 3 },
                Effect::Highlight {
                    id: 0,
                    style: HighlightStyle::Normal
                },
                Effect::Highlight {
                    id: 3,
                    style: HighlightStyle::Selected
                },
            ]
        );
        assert_eq!(&effects[3..], &confirm_effects(3));

        let publishes = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Publish(_)))
            .count();
        assert_eq!(publishes, 1);
    }

    #[test]
    fn test_apply_remote_current_label_is_ignored() {
        let mut menu = make_menu();
        menu.apply_remote("RED");

        assert!(menu.apply_remote("RED").is_empty());
        assert_eq!(menu.selection(), 6);
        assert_eq!(menu.state().previous_selection, Some(0));
    }

    #[test]
    fn test_apply_remote_unknown_label_is_ignored() {
        let mut menu = make_menu();
        assert!(menu.apply_remote("PURPLE").is_empty());
        assert!(menu.apply_remote("red").is_empty());
        assert!(menu.apply_remote("").is_empty());
        assert_eq!(menu.selection(), 0);
        assert_eq!(menu.state().previous_selection, None);
    }

    #[test]
    fn test_handle_local_input() {
        let mut menu = make_menu();

        assert!(menu.handle_local_input(None).is_empty());

        menu.handle_local_input(Some(ButtonAction::Next));
        menu.handle_local_input(Some(ButtonAction::Next));
        menu.handle_local_input(Some(ButtonAction::Prev));
        assert_eq!(menu.selection(), 1);

        let effects = menu.handle_local_input(Some(ButtonAction::Confirm));
        assert_eq!(effects.as_slice(), &confirm_effects(1));
    }

    #[test]
    fn test_cycle_then_confirm_transmits_label() {
        let mut menu = make_menu();
        for _ in 0..4 {
            menu.cycle(Direction::Next);
        }
        let effects = menu.confirm();

        let sent = effects.iter().find_map(|effect| match effect {
            Effect::Transmit(id) => menu.table().label(*id),
            _ => None,
        });
        assert_eq!(sent, Some("FADE"));
    }

    fn sent_and_published(menu: &Menu, effects: &Effects) -> (usize, usize, Option<ModeId>) {
        let transmits = effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Transmit(_)))
            .count();
        let publishes: heapless::Vec<ModeId, MAX_EFFECTS> = effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Publish(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert!(publishes.iter().all(|id| menu.table().get(*id).is_some()));
        (transmits, publishes.len(), publishes.first().copied())
    }

    #[test]
    fn test_wrap_to_last_mode_then_confirm() {
        let mut menu = make_menu();
        menu.cycle(Direction::Next);
        assert_eq!(menu.selected_label(), "OFF");
        menu.cycle(Direction::Prev);
        menu.cycle(Direction::Prev);
        assert_eq!(menu.selection(), 8);

        let effects = menu.confirm();
        let (transmits, publishes, published) = sent_and_published(&menu, &effects);
        assert_eq!(transmits, 1);
        assert_eq!(publishes, 1);
        assert_eq!(published.and_then(|id| menu.table().label(id)), Some("PRPL_RAIN"));
    }

    #[test]
    fn test_remote_red_while_off() {
        let mut menu = make_menu();
        menu.cycle(Direction::Next);
        assert_eq!(menu.selected_label(), "OFF");

        let effects = menu.apply_remote("RED");
        assert_eq!(menu.selection(), 6);
        assert_eq!(menu.state().previous_selection, Some(1));

        let (transmits, publishes, published) = sent_and_published(&menu, &effects);
        assert_eq!(transmits, 1);
        assert_eq!(publishes, 1);
        assert_eq!(published, Some(6));
    }

    proptest! {
        #[test]
        fn prop_selection_stays_in_range(steps in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut menu = make_menu();
            let count = menu.table().len();
            let mut expected = 0usize;

            for forward in steps {
                if forward {
                    menu.cycle(Direction::Next);
                    expected = (expected + 1) % count;
                } else {
                    menu.cycle(Direction::Prev);
                    expected = (expected + count - 1) % count;
                }
                prop_assert!((menu.selection() as usize) < count);
            }
            prop_assert_eq!(menu.selection() as usize, expected);
        }

        #[test]
        fn prop_full_cycle_returns_home(start in 0usize..9) {
            let mut menu = make_menu();
            for _ in 0..start {
                menu.cycle(Direction::Next);
            }
            for _ in 0..menu.table().len() {
                menu.cycle(Direction::Next);
            }
            prop_assert_eq!(menu.selection() as usize, start);
        }

        #[test]
        fn prop_remote_label_becomes_selection(start in 0usize..9, target in 0usize..9) {
            let mut menu = make_menu();
            for _ in 0..start {
                menu.cycle(Direction::Next);
            }
            let label = DEFAULT_MODES[target];
            let effects = menu.apply_remote(label);

            prop_assert_eq!(menu.selected_label(), label);
            prop_assert_eq!(effects.is_empty(), start == target);
        }
    }
}
