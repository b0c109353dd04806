/// Banana Clicker — an incremental banana clicker game.

pub mod actions;
pub mod logic;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use state::{ClickerState, UpgradeId, View};

pub struct ClickerGame {
    pub state: ClickerState,
}

impl ClickerGame {
    pub fn new() -> Self {
        Self {
            state: ClickerState::new(),
        }
    }

    /// Restore meta and current progress from storage. Call once at startup;
    /// missing or unreadable records leave the fresh defaults in place.
    #[cfg(target_arch = "wasm32")]
    pub fn load_persisted(&mut self) {
        save::load_meta(&mut self.state);
        if save::load_progress(&mut self.state) {
            self.state.add_log("前回の続きから再開。", false);
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(action) => self.handle_action(*action),
        }
    }

    /// Advance animation by `delta_ticks` discrete ticks.
    pub fn tick(&mut self, delta_ticks: u32) {
        logic::tick(&mut self.state, delta_ticks);
    }

    /// Render the game into the given area.
    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, f, area, click_state);
    }

    fn set_view(&mut self, view: View) {
        self.state.view = view;
        // The save menu shows live previews of every slot record
        #[cfg(target_arch = "wasm32")]
        {
            if view == View::Slots {
                save::refresh_slot_previews(&mut self.state);
            }
        }
    }

    /// Meta record is rewritten on every change to diamonds or slot count.
    fn persist_meta(&mut self) {
        #[cfg(target_arch = "wasm32")]
        save::save_meta(&self.state);
    }

    fn save_to_slot(&mut self, index: usize) {
        if index >= self.state.slot_count as usize {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        save::save_slot(&mut self.state, index as u32 + 1);
    }

    fn load_from_slot(&mut self, index: usize) {
        if index >= self.state.slot_count as usize {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        let _ = save::load_slot(&mut self.state, index as u32 + 1);
    }

    fn buy_slot(&mut self) {
        if logic::buy_slot(&mut self.state).is_ok() {
            self.persist_meta();
            #[cfg(target_arch = "wasm32")]
            save::refresh_slot_previews(&mut self.state);
        }
    }

    fn exchange_diamonds(&mut self) {
        if logic::exchange_diamonds(&mut self.state).is_ok() {
            self.persist_meta();
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        // View-specific keys take priority over global tab switching
        match self.state.view {
            View::Main => {
                if key == 'c' {
                    logic::click(&mut self.state);
                    return true;
                }
            }
            View::Shop => {
                if let Some(id) = UpgradeId::all().iter().find(|u| u.key() == key) {
                    let _ = logic::buy_upgrade(&mut self.state, *id);
                    return true;
                }
            }
            View::Slots => match key {
                '1'..='9' => {
                    self.save_to_slot(key as usize - '1' as usize);
                    return true;
                }
                'A'..='I' => {
                    self.load_from_slot(key as usize - 'A' as usize);
                    return true;
                }
                'b' => {
                    self.buy_slot();
                    return true;
                }
                _ => {}
            },
            View::Diamonds => match key {
                'z' => {
                    let amount = self.state.diamond_buy_amount.saturating_sub(10);
                    logic::set_diamond_buy_amount(&mut self.state, amount);
                    return true;
                }
                'x' => {
                    let amount = self.state.diamond_buy_amount.saturating_sub(1);
                    logic::set_diamond_buy_amount(&mut self.state, amount);
                    return true;
                }
                'c' => {
                    let amount = self.state.diamond_buy_amount.saturating_add(1);
                    logic::set_diamond_buy_amount(&mut self.state, amount);
                    return true;
                }
                'v' => {
                    let amount = self.state.diamond_buy_amount.saturating_add(10);
                    logic::set_diamond_buy_amount(&mut self.state, amount);
                    return true;
                }
                'b' => {
                    let _ = logic::attempt_buy_diamonds(&mut self.state);
                    return true;
                }
                'e' => {
                    self.exchange_diamonds();
                    return true;
                }
                _ => {}
            },
        }

        match key {
            'q' => {
                self.set_view(View::Main);
                true
            }
            'u' => {
                self.set_view(View::Shop);
                true
            }
            'o' => {
                self.set_view(View::Slots);
                true
            }
            'p' => {
                self.set_view(View::Diamonds);
                true
            }
            _ => false,
        }
    }

    fn handle_action(&mut self, action: u16) -> bool {
        match action {
            actions::CLICK_BANANA => {
                logic::click(&mut self.state);
                true
            }
            actions::TAB_MAIN => {
                self.set_view(View::Main);
                true
            }
            actions::TAB_SHOP => {
                self.set_view(View::Shop);
                true
            }
            actions::TAB_SLOTS => {
                self.set_view(View::Slots);
                true
            }
            actions::TAB_DIAMONDS => {
                self.set_view(View::Diamonds);
                true
            }
            actions::BUY_SLOT => {
                self.buy_slot();
                true
            }
            actions::DIAMOND_AMOUNT_DEC10 | actions::DIAMOND_AMOUNT_DEC => {
                let step = if action == actions::DIAMOND_AMOUNT_DEC10 { 10 } else { 1 };
                let amount = self.state.diamond_buy_amount.saturating_sub(step);
                logic::set_diamond_buy_amount(&mut self.state, amount);
                true
            }
            actions::DIAMOND_AMOUNT_INC | actions::DIAMOND_AMOUNT_INC10 => {
                let step = if action == actions::DIAMOND_AMOUNT_INC10 { 10 } else { 1 };
                let amount = self.state.diamond_buy_amount.saturating_add(step);
                logic::set_diamond_buy_amount(&mut self.state, amount);
                true
            }
            actions::BUY_DIAMONDS => {
                let _ = logic::attempt_buy_diamonds(&mut self.state);
                true
            }
            actions::EXCHANGE_DIAMONDS => {
                self.exchange_diamonds();
                true
            }
            a if (actions::BUY_UPGRADE_BASE
                ..actions::BUY_UPGRADE_BASE + UpgradeId::all().len() as u16)
                .contains(&a) =>
            {
                let id = UpgradeId::all()[(a - actions::BUY_UPGRADE_BASE) as usize];
                let _ = logic::buy_upgrade(&mut self.state, id);
                true
            }
            a if (actions::SAVE_SLOT_BASE..actions::SAVE_SLOT_BASE + 99).contains(&a) => {
                self.save_to_slot((a - actions::SAVE_SLOT_BASE) as usize);
                true
            }
            a if (actions::LOAD_SLOT_BASE..actions::LOAD_SLOT_BASE + 99).contains(&a) => {
                self.load_from_slot((a - actions::LOAD_SLOT_BASE) as usize);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logic::ActionError;

    #[test]
    fn click_key_produces_bananas() {
        let mut game = ClickerGame::new();
        assert!(game.handle_input(&InputEvent::Key('c')));
        assert!((game.state.bananas - 1.0).abs() < 1e-9);
    }

    #[test]
    fn banana_click_action_produces_bananas() {
        let mut game = ClickerGame::new();
        assert!(game.handle_input(&InputEvent::Click(actions::CLICK_BANANA)));
        assert!((game.state.bananas - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tab_keys_switch_views() {
        let mut game = ClickerGame::new();
        game.handle_input(&InputEvent::Key('u'));
        assert_eq!(game.state.view, View::Shop);
        game.handle_input(&InputEvent::Key('o'));
        assert_eq!(game.state.view, View::Slots);
        game.handle_input(&InputEvent::Key('p'));
        assert_eq!(game.state.view, View::Diamonds);
        game.handle_input(&InputEvent::Key('q'));
        assert_eq!(game.state.view, View::Main);
    }

    #[test]
    fn buy_upgrade_via_shop_key() {
        let mut game = ClickerGame::new();
        game.state.bananas = 10.0;
        game.set_view(View::Shop);
        game.handle_input(&InputEvent::Key('1'));
        assert!(game.state.owns(UpgradeId::DoubleBanana));
    }

    #[test]
    fn buy_upgrade_via_click_action() {
        let mut game = ClickerGame::new();
        game.state.bananas = 100.0;
        game.handle_input(&InputEvent::Click(actions::BUY_UPGRADE_BASE + 1));
        assert!(game.state.owns(UpgradeId::Soup));
        assert!((game.state.bananas - 0.0).abs() < 1e-9);
    }

    #[test]
    fn click_key_ignored_outside_main_view() {
        let mut game = ClickerGame::new();
        game.set_view(View::Diamonds);
        // 'c' bumps the purchase amount here, it must not click the banana
        game.handle_input(&InputEvent::Key('c'));
        assert!((game.state.bananas - 0.0).abs() < 1e-9);
        assert_eq!(game.state.diamond_buy_amount, 2);
    }

    #[test]
    fn buy_slot_via_action_spends_diamond() {
        let mut game = ClickerGame::new();
        game.state.diamonds = 1;
        game.handle_input(&InputEvent::Click(actions::BUY_SLOT));
        assert_eq!(game.state.slot_count, 3);
        assert_eq!(game.state.diamonds, 0);
    }

    #[test]
    fn exchange_via_diamond_view_key() {
        let mut game = ClickerGame::new();
        game.state.diamonds = 1;
        game.set_view(View::Diamonds);
        game.handle_input(&InputEvent::Key('e'));
        assert_eq!(game.state.diamonds, 0);
        assert!((game.state.bananas - 200_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn diamond_purchase_stub_never_grants() {
        let mut game = ClickerGame::new();
        game.set_view(View::Diamonds);
        game.handle_input(&InputEvent::Key('v')); // amount 11
        game.handle_input(&InputEvent::Key('b'));
        assert_eq!(game.state.diamonds, 0);
        assert_eq!(game.state.diamond_buy_amount, 11);
    }

    #[test]
    fn amount_selector_clamps_at_bounds() {
        let mut game = ClickerGame::new();
        game.set_view(View::Diamonds);
        game.handle_input(&InputEvent::Key('z'));
        assert_eq!(game.state.diamond_buy_amount, 1);
        for _ in 0..200 {
            game.handle_input(&InputEvent::Key('v'));
        }
        assert_eq!(game.state.diamond_buy_amount, 1000);
    }

    #[test]
    fn slot_actions_out_of_range_are_noops() {
        let mut game = ClickerGame::new();
        // Only slots 1..=2 exist on a fresh state
        assert!(game.handle_input(&InputEvent::Click(actions::SAVE_SLOT_BASE + 5)));
        assert!(game.handle_input(&InputEvent::Click(actions::LOAD_SLOT_BASE + 5)));
        assert!((game.state.bananas - 0.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_inputs_not_consumed() {
        let mut game = ClickerGame::new();
        assert!(!game.handle_input(&InputEvent::Key('!')));
        assert!(!game.handle_input(&InputEvent::Click(9999)));
    }

    #[test]
    fn tick_only_animates() {
        let mut game = ClickerGame::new();
        game.state.bananas = 5.0;
        game.tick(100);
        assert!((game.state.bananas - 5.0).abs() < 1e-9);
        assert!(game.state.anim_frame >= 100);
    }

    #[test]
    fn full_session_scenario() {
        let mut game = ClickerGame::new();
        for _ in 0..10 {
            game.handle_input(&InputEvent::Key('c'));
        }
        game.handle_input(&InputEvent::Key('u'));
        game.handle_input(&InputEvent::Key('1'));
        assert!((game.state.bananas - 0.0).abs() < 1e-9);

        game.handle_input(&InputEvent::Key('q'));
        game.handle_input(&InputEvent::Key('c'));
        assert!((game.state.bananas - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_slot_error_has_message() {
        // The wasm load path surfaces EmptySlot through the log; here we just
        // pin the message mapping.
        assert!(!ActionError::EmptySlot.message().is_empty());
    }
}
