//! Banana Clicker セーブ/ロード機能。
//!
//! ## レコード構成
//!
//! localStorage 上に 3 系統のレコードを持つ（すべて JSON、単一ライター前提）:
//!
//! - `banana_clicker_meta` — ダイヤ残高とスロット数。どちらかが変化するたびに
//!   全体を上書きする。
//! - `banana_clicker_progress` — 現在のバナナ残高と購入済みアップグレード。
//!   オートセーブ（[`AUTOSAVE_INTERVAL`] tick ごと）で書き、起動時に一度読む。
//! - `banana_clicker_slot_<N>` — 明示的なスロットセーブのスナップショット。
//!   ダイヤ・スロット数は含まない（meta 側のスコープ）。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   破壊的変更を行った場合のみインクリメントする。
//!
//! 壊れたレコード・互換性のないレコードはエンジンに伝播させず、
//! デフォルト値（スロットの場合は「空」）に縮退する。

#[cfg(any(target_arch = "wasm32", test))]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[cfg(any(target_arch = "wasm32", test))]
use super::logic::ActionError;
#[cfg(any(target_arch = "wasm32", test))]
use super::state::{ClickerState, SlotPreview, UpgradeId, START_SLOT_COUNT};

/// セーブデータのフォーマットバージョン。フィールド追加時にインクリメントすること。
#[cfg(any(target_arch = "wasm32", test))]
const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
#[cfg(any(target_arch = "wasm32", test))]
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage のキー。
#[cfg(target_arch = "wasm32")]
const META_KEY: &str = "banana_clicker_meta";
#[cfg(target_arch = "wasm32")]
const PROGRESS_KEY: &str = "banana_clicker_progress";

/// オートセーブの間隔 (tick数)。10 ticks/sec × 30秒 = 300 ticks。
pub const AUTOSAVE_INTERVAL: u32 = 300;

/// スロット N のキー (N は 1 始まり)。
#[cfg(any(target_arch = "wasm32", test))]
fn slot_key(slot: u32) -> String {
    format!("banana_clicker_slot_{}", slot)
}

/// バージョン付きレコードの共通インターフェース。
#[cfg(any(target_arch = "wasm32", test))]
trait Versioned {
    fn version(&self) -> u32;
}

/// アカウント横断の状態。スロットには含まれない。
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Serialize, Deserialize)]
pub struct MetaRecord {
    version: u32,
    #[serde(default)]
    diamonds: u32,
    #[serde(default = "default_slot_count")]
    slot_count: u32,
}

#[cfg(any(target_arch = "wasm32", test))]
fn default_slot_count() -> u32 {
    START_SLOT_COUNT
}

/// 現在進行中のセッションのスナップショット。
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Serialize, Deserialize)]
pub struct ProgressRecord {
    version: u32,
    #[serde(default)]
    bananas: f64,
    /// 購入済みアップグレードの storage_id。未知の id は復元時に捨てる。
    #[serde(default)]
    owned: Vec<String>,
}

/// 明示的セーブによるスロットのスナップショット。
#[cfg(any(target_arch = "wasm32", test))]
#[derive(Serialize, Deserialize)]
pub struct SlotRecord {
    version: u32,
    #[serde(default)]
    bananas: f64,
    #[serde(default)]
    owned: Vec<String>,
    /// 人間可読の保存時刻。
    #[serde(default)]
    saved_at: String,
}

#[cfg(any(target_arch = "wasm32", test))]
impl Versioned for MetaRecord {
    fn version(&self) -> u32 {
        self.version
    }
}
#[cfg(any(target_arch = "wasm32", test))]
impl Versioned for ProgressRecord {
    fn version(&self) -> u32 {
        self.version
    }
}
#[cfg(any(target_arch = "wasm32", test))]
impl Versioned for SlotRecord {
    fn version(&self) -> u32 {
        self.version
    }
}

/// JSON をレコードにデコードする。パース失敗・互換性のないバージョンは `None`
/// （呼び出し側はデフォルトに縮退する）。
#[cfg(any(target_arch = "wasm32", test))]
fn decode<T: DeserializeOwned + Versioned>(json: &str) -> Option<T> {
    let record: T = serde_json::from_str(json).ok()?;
    if record.version() < MIN_COMPATIBLE_VERSION {
        return None;
    }
    Some(record)
}

// ── 抽出 / 復元（純粋・ホストでテスト可能） ──────────────────────

#[cfg(any(target_arch = "wasm32", test))]
fn owned_ids(state: &ClickerState) -> Vec<String> {
    state.owned.iter().map(|u| u.storage_id().to_string()).collect()
}

/// storage_id のリストを所有セットに復元する。未知の id と重複は捨てる。
#[cfg(any(target_arch = "wasm32", test))]
fn restore_owned(ids: &[String]) -> Vec<UpgradeId> {
    let mut owned = Vec::new();
    for id in ids {
        if let Some(u) = UpgradeId::from_storage_id(id) {
            if !owned.contains(&u) {
                owned.push(u);
            }
        }
    }
    owned
}

#[cfg(any(target_arch = "wasm32", test))]
pub fn extract_meta(state: &ClickerState) -> MetaRecord {
    MetaRecord {
        version: SAVE_VERSION,
        diamonds: state.diamonds,
        slot_count: state.slot_count,
    }
}

#[cfg(any(target_arch = "wasm32", test))]
pub fn apply_meta(state: &mut ClickerState, record: &MetaRecord) {
    state.diamonds = record.diamonds;
    state.slot_count = record.slot_count.max(START_SLOT_COUNT);
}

#[cfg(any(target_arch = "wasm32", test))]
pub fn extract_progress(state: &ClickerState) -> ProgressRecord {
    ProgressRecord {
        version: SAVE_VERSION,
        bananas: state.bananas,
        owned: owned_ids(state),
    }
}

#[cfg(any(target_arch = "wasm32", test))]
pub fn apply_progress(state: &mut ClickerState, record: &ProgressRecord) {
    state.bananas = record.bananas.max(0.0);
    state.owned = restore_owned(&record.owned);
}

#[cfg(any(target_arch = "wasm32", test))]
pub fn extract_slot(state: &ClickerState, saved_at: String) -> SlotRecord {
    SlotRecord {
        version: SAVE_VERSION,
        bananas: state.bananas,
        owned: owned_ids(state),
        saved_at,
    }
}

/// スロットのスナップショットを現在のセッションに復元する。
/// `None`（空スロット）は状態を一切変えず [`ActionError::EmptySlot`] を返す。
#[cfg(any(target_arch = "wasm32", test))]
pub fn restore_slot(
    state: &mut ClickerState,
    record: Option<&SlotRecord>,
) -> Result<(), ActionError> {
    let record = record.ok_or(ActionError::EmptySlot)?;
    state.bananas = record.bananas.max(0.0);
    state.owned = restore_owned(&record.owned);
    Ok(())
}

#[cfg(any(target_arch = "wasm32", test))]
fn slot_preview(record: &SlotRecord) -> SlotPreview {
    SlotPreview {
        bananas: record.bananas,
        upgrade_count: restore_owned(&record.owned).len(),
        saved_at: record.saved_at.clone(),
    }
}

// ── localStorage アクセス（WASM 環境のみ） ──────────────────────

#[cfg(target_arch = "wasm32")]
fn get_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// JSON 化して書き込む。失敗時はサイレントに無視（コンソールにログ出力）。
#[cfg(target_arch = "wasm32")]
fn write_record<T: Serialize>(key: &str, record: &T) {
    let json = match serde_json::to_string(record) {
        Ok(j) => j,
        Err(e) => {
            web_sys::console::warn_1(
                &format!("Banana Clicker: セーブのシリアライズに失敗: {e}").into(),
            );
            return;
        }
    };
    if let Some(storage) = get_storage() {
        if let Err(e) = storage.set_item(key, &json) {
            web_sys::console::warn_1(
                &format!("Banana Clicker: localStorage への保存に失敗: {e:?}").into(),
            );
        }
    }
}

/// キーを読んでデコードする。壊れたレコードは警告を出して削除し `None`。
#[cfg(target_arch = "wasm32")]
fn read_record<T: DeserializeOwned + Versioned>(key: &str) -> Option<T> {
    let storage = get_storage()?;
    let json = storage.get_item(key).ok()??;
    match decode(&json) {
        Some(record) => Some(record),
        None => {
            web_sys::console::warn_1(
                &format!("Banana Clicker: レコード {key} が読めないため破棄します").into(),
            );
            let _ = storage.remove_item(key);
            None
        }
    }
}

/// meta レコードを書く。ダイヤかスロット数が変化するたびに呼ぶこと。
#[cfg(target_arch = "wasm32")]
pub fn save_meta(state: &ClickerState) {
    write_record(META_KEY, &extract_meta(state));
}

/// 起動時: meta レコードを読む。欠損・破損はデフォルトのまま。
#[cfg(target_arch = "wasm32")]
pub fn load_meta(state: &mut ClickerState) -> bool {
    match read_record::<MetaRecord>(META_KEY) {
        Some(record) => {
            apply_meta(state, &record);
            true
        }
        None => false,
    }
}

/// 現在進行中の状態をオートセーブする。
#[cfg(target_arch = "wasm32")]
pub fn save_progress(state: &ClickerState) {
    write_record(PROGRESS_KEY, &extract_progress(state));
}

/// 起動時: 進行中レコードを読む。欠損・破損は新規セッションのまま。
#[cfg(target_arch = "wasm32")]
pub fn load_progress(state: &mut ClickerState) -> bool {
    match read_record::<ProgressRecord>(PROGRESS_KEY) {
        Some(record) => {
            apply_progress(state, &record);
            true
        }
        None => false,
    }
}

/// 現在の進行をスロット N に明示的にセーブする。
#[cfg(target_arch = "wasm32")]
pub fn save_slot(state: &mut ClickerState, slot: u32) {
    let saved_at: String = js_sys::Date::new_0().to_string().into();
    let record = extract_slot(state, saved_at);
    write_record(&slot_key(slot), &record);
    state.add_log(&format!("スロット {} にセーブした。", slot), true);
    refresh_slot_previews(state);
}

/// スロット N からロードする。空（欠損・破損含む）なら状態は変わらない。
#[cfg(target_arch = "wasm32")]
pub fn load_slot(state: &mut ClickerState, slot: u32) -> Result<(), ActionError> {
    let record = read_record::<SlotRecord>(&slot_key(slot));
    match restore_slot(state, record.as_ref()) {
        Ok(()) => {
            state.add_log(&format!("スロット {} からロードした。", slot), true);
            Ok(())
        }
        Err(e) => {
            state.add_log(e.message(), false);
            Err(e)
        }
    }
}

/// セーブメニュー表示用に全スロットのプレビューを読み直す（読み取り専用）。
#[cfg(target_arch = "wasm32")]
pub fn refresh_slot_previews(state: &mut ClickerState) {
    state.slot_previews = (1..=state.slot_count)
        .map(|n| read_record::<SlotRecord>(&slot_key(n)).map(|r| slot_preview(&r)))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_keys_are_one_based() {
        assert_eq!(slot_key(1), "banana_clicker_slot_1");
        assert_eq!(slot_key(7), "banana_clicker_slot_7");
    }

    // ── meta ───────────────────────────────────────────────────────

    #[test]
    fn meta_roundtrip() {
        let mut original = ClickerState::new();
        original.diamonds = 9;
        original.slot_count = 5;

        let json = serde_json::to_string(&extract_meta(&original)).unwrap();
        let record: MetaRecord = decode(&json).unwrap();

        let mut restored = ClickerState::new();
        apply_meta(&mut restored, &record);
        assert_eq!(restored.diamonds, 9);
        assert_eq!(restored.slot_count, 5);
    }

    #[test]
    fn meta_missing_fields_default() {
        let record: MetaRecord = decode(r#"{"version": 1}"#).unwrap();
        let mut state = ClickerState::new();
        apply_meta(&mut state, &record);
        assert_eq!(state.diamonds, 0);
        assert_eq!(state.slot_count, START_SLOT_COUNT);
    }

    #[test]
    fn meta_slot_count_clamped_to_minimum() {
        let record: MetaRecord =
            decode(r#"{"version": 1, "diamonds": 3, "slot_count": 0}"#).unwrap();
        let mut state = ClickerState::new();
        apply_meta(&mut state, &record);
        assert_eq!(state.slot_count, START_SLOT_COUNT);
        assert_eq!(state.diamonds, 3);
    }

    // ── progress ───────────────────────────────────────────────────

    #[test]
    fn progress_roundtrip() {
        let mut original = ClickerState::new();
        original.bananas = 12345.6;
        original.owned = vec![UpgradeId::DoubleBanana, UpgradeId::Soup];

        let json = serde_json::to_string(&extract_progress(&original)).unwrap();
        let record: ProgressRecord = decode(&json).unwrap();

        let mut restored = ClickerState::new();
        apply_progress(&mut restored, &record);
        assert!((restored.bananas - 12345.6).abs() < 1e-9);
        assert_eq!(restored.owned, vec![UpgradeId::DoubleBanana, UpgradeId::Soup]);
    }

    #[test]
    fn progress_unknown_upgrade_ids_dropped() {
        let record: ProgressRecord = decode(
            r#"{"version": 1, "bananas": 50.0, "owned": ["soup", "golden_banana", "soup"]}"#,
        )
        .unwrap();
        let mut state = ClickerState::new();
        apply_progress(&mut state, &record);
        // Unknown id dropped, duplicate collapsed
        assert_eq!(state.owned, vec![UpgradeId::Soup]);
    }

    #[test]
    fn progress_negative_balance_clamped() {
        let record: ProgressRecord =
            decode(r#"{"version": 1, "bananas": -10.0, "owned": []}"#).unwrap();
        let mut state = ClickerState::new();
        apply_progress(&mut state, &record);
        assert!(state.bananas >= 0.0);
    }

    // ── slots ──────────────────────────────────────────────────────

    #[test]
    fn slot_roundtrip_restores_captured_fields() {
        let mut original = ClickerState::new();
        original.bananas = 777.25;
        original.owned = vec![UpgradeId::Plus1488];

        let record = extract_slot(&original, "2026-08-25 12:00".into());
        let json = serde_json::to_string(&record).unwrap();
        let loaded: SlotRecord = decode(&json).unwrap();

        let mut restored = ClickerState::new();
        restore_slot(&mut restored, Some(&loaded)).unwrap();
        assert!((restored.bananas - 777.25).abs() < 1e-9);
        assert_eq!(restored.owned, vec![UpgradeId::Plus1488]);
    }

    #[test]
    fn slot_excludes_meta_scoped_fields() {
        let mut original = ClickerState::new();
        original.diamonds = 9;
        original.slot_count = 6;
        original.bananas = 1.0;

        let record = extract_slot(&original, "now".into());
        let json = serde_json::to_string(&record).unwrap();
        // Diamonds and slot count are meta-scoped, never slot-scoped
        assert!(!json.contains("diamonds"));
        assert!(!json.contains("slot_count"));

        let loaded: SlotRecord = decode(&json).unwrap();
        let mut restored = ClickerState::new();
        restored.diamonds = 3;
        restored.slot_count = 4;
        restore_slot(&mut restored, Some(&loaded)).unwrap();
        assert_eq!(restored.diamonds, 3);
        assert_eq!(restored.slot_count, 4);
    }

    #[test]
    fn empty_slot_load_is_noop() {
        let mut state = ClickerState::new();
        state.bananas = 42.0;
        state.owned = vec![UpgradeId::Soup];
        state.diamonds = 2;

        let result = restore_slot(&mut state, None);
        assert_eq!(result, Err(ActionError::EmptySlot));
        assert!((state.bananas - 42.0).abs() < 1e-9);
        assert_eq!(state.owned, vec![UpgradeId::Soup]);
        assert_eq!(state.diamonds, 2);
    }

    #[test]
    fn slot_preview_summarizes_record() {
        let mut state = ClickerState::new();
        state.bananas = 100.0;
        state.owned = vec![UpgradeId::DoubleBanana, UpgradeId::Soup];

        let record = extract_slot(&state, "昨日".into());
        let preview = slot_preview(&record);
        assert!((preview.bananas - 100.0).abs() < 1e-9);
        assert_eq!(preview.upgrade_count, 2);
        assert_eq!(preview.saved_at, "昨日");
    }

    // ── corrupt / incompatible records ─────────────────────────────

    #[test]
    fn malformed_json_degrades_to_none() {
        assert!(decode::<MetaRecord>("{not json").is_none());
        assert!(decode::<ProgressRecord>("").is_none());
        assert!(decode::<SlotRecord>(r#"{"bananas": "lots"}"#).is_none());
    }

    #[test]
    fn wrong_shape_degrades_to_none() {
        // Valid JSON, wrong type for a typed field
        assert!(decode::<ProgressRecord>(r#"{"version": 1, "owned": 5}"#).is_none());
    }

    #[test]
    fn incompatible_version_rejected() {
        assert!(decode::<MetaRecord>(r#"{"version": 0, "diamonds": 99}"#).is_none());
    }

    #[test]
    fn unknown_fields_ignored() {
        let record: MetaRecord =
            decode(r#"{"version": 1, "diamonds": 2, "slot_count": 3, "future": true}"#)
                .unwrap();
        let mut state = ClickerState::new();
        apply_meta(&mut state, &record);
        assert_eq!(state.diamonds, 2);
        assert_eq!(state.slot_count, 3);
    }

    // ── reachable-state round-trip law ─────────────────────────────

    mod proptests {
        use super::*;
        use crate::game::logic;
        use proptest::prelude::*;

        /// Drive a fresh state through random engine operations so round-trip
        /// coverage is over *reachable* states, not arbitrary field soup.
        fn reachable_state(ops: &[u8]) -> ClickerState {
            let mut state = ClickerState::new();
            for op in ops {
                match op % 5 {
                    0 | 1 => logic::click(&mut state),
                    2 => {
                        let _ = logic::buy_upgrade(&mut state, UpgradeId::DoubleBanana);
                    }
                    3 => {
                        let _ = logic::buy_upgrade(&mut state, UpgradeId::Soup);
                    }
                    _ => {
                        let _ = logic::buy_upgrade(&mut state, UpgradeId::Plus1488);
                    }
                }
            }
            state
        }

        proptest! {
            #[test]
            fn prop_slot_roundtrip_law(ops in proptest::collection::vec(any::<u8>(), 0..200)) {
                let state = reachable_state(&ops);

                let json =
                    serde_json::to_string(&extract_slot(&state, "t".into())).unwrap();
                let loaded: SlotRecord = decode(&json).unwrap();

                let mut restored = ClickerState::new();
                restore_slot(&mut restored, Some(&loaded)).unwrap();

                prop_assert!((restored.bananas - state.bananas).abs() < 1e-6);
                prop_assert_eq!(restored.owned, state.owned);
            }

            #[test]
            fn prop_progress_roundtrip_law(ops in proptest::collection::vec(any::<u8>(), 0..200)) {
                let state = reachable_state(&ops);

                let json = serde_json::to_string(&extract_progress(&state)).unwrap();
                let loaded: ProgressRecord = decode(&json).unwrap();

                let mut restored = ClickerState::new();
                apply_progress(&mut restored, &loaded);

                prop_assert!((restored.bananas - state.bananas).abs() < 1e-6);
                prop_assert_eq!(restored.owned, state.owned);
            }
        }
    }
}
