/// Banana Clicker game state definitions.

/// Starting number of save slots. Slot count never drops below this.
pub const START_SLOT_COUNT: u32 = 2;

/// Diamonds needed to buy one additional save slot.
pub const SLOT_COST_DIAMONDS: u32 = 1;

/// Bananas received for exchanging one diamond. Fixed rate, no market model.
pub const EXCHANGE_RATE_BANANAS: f64 = 200_000_000.0;

/// Upper bound of the diamond purchase amount selector.
pub const DIAMOND_AMOUNT_MAX: u32 = 1000;

/// How an upgrade alters the per-click gain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpgradeEffect {
    /// Multiplies the whole per-click gain.
    Multiplier(f64),
    /// Flat addition to the per-click base.
    Bonus(f64),
}

/// The fixed upgrade catalog. Defined at process start, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    DoubleBanana,
    Soup,
    Plus1488,
}

impl UpgradeId {
    /// All upgrades in display order.
    pub fn all() -> &'static [UpgradeId] {
        &[UpgradeId::DoubleBanana, UpgradeId::Soup, UpgradeId::Plus1488]
    }

    /// Stable string key used in persisted records.
    pub fn storage_id(&self) -> &'static str {
        match self {
            UpgradeId::DoubleBanana => "double_banana",
            UpgradeId::Soup => "soup",
            UpgradeId::Plus1488 => "plus_1488",
        }
    }

    /// Inverse of [`storage_id`](UpgradeId::storage_id). Unknown keys map to
    /// `None` so stale save data degrades instead of failing.
    pub fn from_storage_id(id: &str) -> Option<UpgradeId> {
        UpgradeId::all().iter().copied().find(|u| u.storage_id() == id)
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            UpgradeId::DoubleBanana => "ダブルバナナ",
            UpgradeId::Soup => "バナナスープ",
            UpgradeId::Plus1488 => "スーパーブースター",
        }
    }

    /// Display description of the effect.
    pub fn description(&self) -> &str {
        match self {
            UpgradeId::DoubleBanana => "クリック獲得 2倍",
            UpgradeId::Soup => "クリック獲得 +5",
            UpgradeId::Plus1488 => "クリック獲得 +1488",
        }
    }

    /// Price in bananas.
    pub fn cost(&self) -> f64 {
        match self {
            UpgradeId::DoubleBanana => 10.0,
            UpgradeId::Soup => 100.0,
            UpgradeId::Plus1488 => 5242.0,
        }
    }

    /// Effect descriptor. New upgrades are additive data here — the gain
    /// computation never branches on specific ids.
    pub fn effect(&self) -> UpgradeEffect {
        match self {
            UpgradeId::DoubleBanana => UpgradeEffect::Multiplier(2.0),
            UpgradeId::Soup => UpgradeEffect::Bonus(5.0),
            UpgradeId::Plus1488 => UpgradeEffect::Bonus(1488.0),
        }
    }

    /// Shop shortcut key.
    pub fn key(&self) -> char {
        match self {
            UpgradeId::DoubleBanana => '1',
            UpgradeId::Soup => '2',
            UpgradeId::Plus1488 => '3',
        }
    }
}

/// Which screen is showing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum View {
    Main,
    Shop,
    Slots,
    Diamonds,
}

/// A floating text particle (e.g. "+2" rising from the banana).
#[derive(Clone, Debug)]
pub struct Particle {
    pub text: String,
    /// Column offset from the center of the banana display.
    pub col_offset: i16,
    /// Remaining lifetime in ticks (counts down).
    pub life: u32,
    /// Maximum lifetime (for computing vertical position).
    pub max_life: u32,
}

/// Message log entry.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Read-only summary of a persisted slot, for the save-menu view.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotPreview {
    pub bananas: f64,
    pub upgrade_count: usize,
    pub saved_at: String,
}

/// Full state of a Banana Clicker session.
///
/// One live instance, owned by `ClickerGame` and passed explicitly into the
/// `logic` functions — nothing here is reachable through globals, so tests
/// construct isolated instances without touching real storage.
pub struct ClickerState {
    /// Banana balance. Fractional values possible; displayed floored.
    pub bananas: f64,
    /// Owned upgrades, insertion-ordered, duplicate-free. Never shrinks.
    pub owned: Vec<UpgradeId>,
    /// Diamond balance.
    pub diamonds: u32,
    /// Number of save slots, starts at [`START_SLOT_COUNT`], never decreases.
    pub slot_count: u32,
    /// Selected amount in the (disabled) diamond purchase flow, 1..=1000.
    pub diamond_buy_amount: u32,
    /// Current screen.
    pub view: View,
    /// Slot previews shown in the save menu, refreshed when the menu opens.
    /// `None` entries are empty slots. Index 0 = slot 1.
    pub slot_previews: Vec<Option<SlotPreview>>,
    /// Message log.
    pub log: Vec<LogEntry>,
    /// Animation frame counter (incremented every tick).
    pub anim_frame: u32,
    /// Recent click flash timer (ticks remaining for visual feedback).
    pub click_flash: u32,
    /// Purchase celebration flash timer.
    pub purchase_flash: u32,
    /// Active floating particles.
    pub particles: Vec<Particle>,
    /// Simple RNG state for particle spread.
    pub rng_state: u32,
}

impl ClickerState {
    pub fn new() -> Self {
        Self {
            bananas: 0.0,
            owned: Vec::new(),
            diamonds: 0,
            slot_count: START_SLOT_COUNT,
            diamond_buy_amount: 1,
            view: View::Main,
            slot_previews: Vec::new(),
            log: vec![LogEntry {
                text: "バナナクリッカーへようこそ！".into(),
                is_important: true,
            }],
            anim_frame: 0,
            click_flash: 0,
            purchase_flash: 0,
            particles: Vec::new(),
            rng_state: 42,
        }
    }

    /// Whether an upgrade has been purchased.
    pub fn owns(&self, id: UpgradeId) -> bool {
        self.owned.contains(&id)
    }

    /// Bananas gained per click. Pure function of `owned`, recomputed on
    /// every read so it can never go stale.
    pub fn gain_per_click(&self) -> f64 {
        let mut bonus = 0.0;
        let mut multiplier = 1.0;
        for id in &self.owned {
            match id.effect() {
                UpgradeEffect::Bonus(amount) => bonus += amount,
                UpgradeEffect::Multiplier(factor) => multiplier *= factor,
            }
        }
        (1.0 + bonus) * multiplier
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > 50 {
            self.log.remove(0);
        }
    }

    /// xorshift32 step for particle spread.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }
}
