//! Banana Clicker engine logic — pure functions, fully testable.
//!
//! Every operation is a single atomic step: it either completes fully or
//! declines fully with an [`ActionError`], leaving the state untouched.

use super::state::{
    ClickerState, Particle, UpgradeId, DIAMOND_AMOUNT_MAX, EXCHANGE_RATE_BANANAS,
    SLOT_COST_DIAMONDS,
};

/// Why an engine operation declined. All variants are non-fatal and leave
/// the state unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionError {
    InsufficientFunds,
    AlreadyOwned,
    EmptySlot,
    FeatureUnavailable,
}

impl ActionError {
    /// User-facing log message.
    pub fn message(&self) -> &'static str {
        match self {
            ActionError::InsufficientFunds => "残高が足りない…",
            ActionError::AlreadyOwned => "すでに購入済み。",
            ActionError::EmptySlot => "このスロットは空です。",
            ActionError::FeatureUnavailable => "この機能は現在利用できません。",
        }
    }
}

/// Advance animation by `delta_ticks` ticks (at 10 ticks/sec).
///
/// Only presentation timers move here — banana and diamond balances are
/// strictly input-driven.
pub fn tick(state: &mut ClickerState, delta_ticks: u32) {
    if delta_ticks == 0 {
        return;
    }
    state.anim_frame = state.anim_frame.wrapping_add(delta_ticks);

    if state.click_flash > 0 {
        state.click_flash = state.click_flash.saturating_sub(delta_ticks);
    }
    if state.purchase_flash > 0 {
        state.purchase_flash = state.purchase_flash.saturating_sub(delta_ticks);
    }
    for p in &mut state.particles {
        p.life = p.life.saturating_sub(delta_ticks);
    }
    state.particles.retain(|p| p.life > 0);
}

/// The primary action: add `gain_per_click` bananas. Always succeeds.
pub fn click(state: &mut ClickerState) {
    let gain = state.gain_per_click();
    state.bananas += gain;
    state.click_flash = 3;

    // Particle spread: ±6 columns around the banana
    let offset = (state.next_random() % 13) as i16 - 6;
    state.particles.push(Particle {
        text: format!("+{}", format_number(gain)),
        col_offset: offset,
        life: 12,
        max_life: 12,
    });
    if state.particles.len() > 12 {
        state.particles.remove(0);
    }
}

/// Buy an upgrade from the catalog. Permanent, one-time, never double-charges.
pub fn buy_upgrade(state: &mut ClickerState, id: UpgradeId) -> Result<(), ActionError> {
    if state.owns(id) {
        state.add_log(&format!("「{}」はすでに購入済み。", id.name()), false);
        return Err(ActionError::AlreadyOwned);
    }
    if state.bananas < id.cost() {
        state.add_log(
            &format!("バナナが足りない…（{} 必要）", format_number(id.cost())),
            false,
        );
        return Err(ActionError::InsufficientFunds);
    }

    state.bananas -= id.cost();
    state.owned.push(id);
    state.purchase_flash = 5;
    state.add_log(&format!("「{}」を購入！{}", id.name(), id.description()), true);
    Ok(())
}

/// Spend one diamond on an additional save slot.
pub fn buy_slot(state: &mut ClickerState) -> Result<(), ActionError> {
    if state.diamonds < SLOT_COST_DIAMONDS {
        state.add_log("ダイヤが足りない…", false);
        return Err(ActionError::InsufficientFunds);
    }
    state.diamonds -= SLOT_COST_DIAMONDS;
    state.slot_count += 1;
    state.add_log(
        &format!("セーブスロットを増設！（スロット {} まで）", state.slot_count),
        true,
    );
    Ok(())
}

/// Exchange one diamond for a fixed lump of bananas.
pub fn exchange_diamonds(state: &mut ClickerState) -> Result<(), ActionError> {
    if state.diamonds < 1 {
        state.add_log("ダイヤが足りない…", false);
        return Err(ActionError::InsufficientFunds);
    }
    state.diamonds -= 1;
    state.bananas += EXCHANGE_RATE_BANANAS;
    state.purchase_flash = 5;
    state.add_log(
        &format!("ダイヤを換金！+{} バナナ", format_number(EXCHANGE_RATE_BANANAS)),
        true,
    );
    Ok(())
}

/// Real-money diamond purchase. Intentionally a disabled stub: always fails
/// and never touches the diamond balance. Do not "fix" this without a real
/// payment integration.
pub fn attempt_buy_diamonds(state: &mut ClickerState) -> Result<(), ActionError> {
    state.add_log("ダイヤ購入は準備中です。", false);
    Err(ActionError::FeatureUnavailable)
}

/// Set the amount selector of the diamond purchase flow, clamped to 1..=1000.
pub fn set_diamond_buy_amount(state: &mut ClickerState, amount: u32) {
    state.diamond_buy_amount = amount.clamp(1, DIAMOND_AMOUNT_MAX);
}

/// Format a banana amount for display: floored, with thousands separators.
pub fn format_number(n: f64) -> String {
    let negative = n < 0.0;
    let whole = n.abs().floor() as u64;
    let digits = whole.to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}
