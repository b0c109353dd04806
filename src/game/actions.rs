//! Semantic action IDs for Banana Clicker click targets.
//!
//! Each constant represents a distinct clickable action in the UI.
//! These IDs are registered during render and dispatched via `InputEvent::Click`.

// ── Core action ─────────────────────────────────────────────────
pub const CLICK_BANANA: u16 = 0;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_MAIN: u16 = 10;
pub const TAB_SHOP: u16 = 11;
pub const TAB_SLOTS: u16 = 12;
pub const TAB_DIAMONDS: u16 = 13;

// ── Upgrade purchase (base + catalog index 0..2) ────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Save slots (base + slot index, slot 1 = index 0) ────────────
pub const SAVE_SLOT_BASE: u16 = 200;
pub const LOAD_SLOT_BASE: u16 = 300;
pub const BUY_SLOT: u16 = 399;

// ── Diamond shop ────────────────────────────────────────────────
pub const DIAMOND_AMOUNT_DEC: u16 = 400;
pub const DIAMOND_AMOUNT_INC: u16 = 401;
pub const DIAMOND_AMOUNT_DEC10: u16 = 402;
pub const DIAMOND_AMOUNT_INC10: u16 = 403;
pub const BUY_DIAMONDS: u16 = 410;
pub const EXCHANGE_DIAMONDS: u16 = 411;
