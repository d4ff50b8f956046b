use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::billing::BillingPolicy;
use super::{BicycleId, ChargeId, CyclistId, DockId, RentalId};

// ============================================================================
// 型安全な状態パターン
// ============================================================================

/// Rental集約の共通フィールド
///
/// 進行中（Open）と完了済み（Closed）の両状態で共有されるコアデータ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalCore {
    // 識別子
    pub rental_id: RentalId,

    // 他コンテキストへの参照（IDのみ）
    pub cyclist_id: CyclistId,
    pub bicycle_id: BicycleId,
    pub start_dock_id: DockId,

    // レンタル管理の責務
    pub started_at: DateTime<Utc>,

    /// 課金トランザクション参照。開始時は初期料金の課金ID。
    /// 返却時に超過課金が成功した場合のみ上書きされる。
    pub charge_id: ChargeId,
}

/// 進行中のレンタル
///
/// ビジネスルール：
/// - 返却時刻・返却ドックを持たない（型で保証）
/// - 同一サイクリストにつき同時に1件まで
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRental {
    #[serde(flatten)]
    pub core: RentalCore,
}

impl std::ops::Deref for OpenRental {
    type Target = RentalCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

/// 完了済みのレンタル
///
/// ビジネスルール：
/// - ended_at / end_dock_id / extra_charge が必須（型で保証）
/// - 以後は読み取り専用の履歴レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedRental {
    #[serde(flatten)]
    pub core: RentalCore,
    pub end_dock_id: DockId,
    pub ended_at: DateTime<Utc>,
    pub extra_charge: Decimal,
}

impl std::ops::Deref for ClosedRental {
    type Target = RentalCore;

    fn deref(&self) -> &Self::Target {
        &self.core
    }
}

impl ClosedRental {
    /// 開始から返却までの経過時間（切り捨ての整数分）
    pub fn elapsed_minutes(&self) -> i64 {
        elapsed_whole_minutes(self.started_at, self.ended_at)
    }

    /// 超過課金成功時に課金トランザクション参照を上書きする
    pub fn record_charge(&mut self, charge_id: ChargeId) {
        self.core.charge_id = charge_id;
    }
}

/// Rental集約の統合型
///
/// 「end-time がnullなら進行中」という番兵値の代わりに、
/// 状態を明示的なバリアントで表現する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Rental {
    Open(OpenRental),
    Closed(ClosedRental),
}

impl Rental {
    /// 進行中判定（このpredicateを唯一の判定箇所とする）
    pub fn is_open(&self) -> bool {
        matches!(self, Rental::Open(_))
    }

    pub fn rental_id(&self) -> RentalId {
        match self {
            Rental::Open(open) => open.rental_id,
            Rental::Closed(closed) => closed.rental_id,
        }
    }

    pub fn cyclist_id(&self) -> CyclistId {
        match self {
            Rental::Open(open) => open.cyclist_id,
            Rental::Closed(closed) => closed.cyclist_id,
        }
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：2時刻間の経過時間を整数分で返す（端数切り捨て）
pub fn elapsed_whole_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_minutes()
}

/// 純粋関数：レンタルを開始する
///
/// ビジネスルール：
/// - 初期料金の課金が成功した後にのみ呼ばれる（charge_idは常に存在）
/// - 返却系フィールドを持たないOpenRentalを返す
///
/// 副作用なし。新しいOpenRentalを返す。
pub fn open_rental(
    cyclist_id: CyclistId,
    bicycle_id: BicycleId,
    start_dock_id: DockId,
    started_at: DateTime<Utc>,
    charge_id: ChargeId,
) -> OpenRental {
    OpenRental {
        core: RentalCore {
            rental_id: RentalId::new(),
            cyclist_id,
            bicycle_id,
            start_dock_id,
            started_at,
            charge_id,
        },
    }
}

/// 純粋関数：レンタルを完了する
///
/// ビジネスルール：
/// - OpenRentalのみ受け付ける（型で保証。完了済みの再返却は表現不能）
/// - 超過料金は経過分とポリシーから計算される
/// - 課金の成否はここでは扱わない（アプリケーション層の責務）
///
/// 副作用なし。ClosedRentalを返す。
pub fn close_rental(
    rental: OpenRental,
    end_dock_id: DockId,
    ended_at: DateTime<Utc>,
    policy: &BillingPolicy,
) -> ClosedRental {
    let elapsed = elapsed_whole_minutes(rental.started_at, ended_at);
    let extra_charge = policy.overage_fee(elapsed);

    ClosedRental {
        core: rental.core,
        end_dock_id,
        ended_at,
        extra_charge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn sample_open(started_at: DateTime<Utc>) -> OpenRental {
        open_rental(
            CyclistId::new(),
            BicycleId::new(100),
            DockId::new(10),
            started_at,
            ChargeId::new(501),
        )
    }

    // TDD: open_rental() のテスト
    #[test]
    fn test_open_rental_sets_all_core_fields() {
        let cyclist_id = CyclistId::new();
        let charge_id = ChargeId::new(42);
        let started_at = Utc::now();

        let rental = open_rental(
            cyclist_id,
            BicycleId::new(100),
            DockId::new(10),
            started_at,
            charge_id,
        );

        assert_eq!(rental.cyclist_id, cyclist_id);
        assert_eq!(rental.bicycle_id, BicycleId::new(100));
        assert_eq!(rental.start_dock_id, DockId::new(10));
        assert_eq!(rental.started_at, started_at);
        assert_eq!(rental.charge_id, charge_id);
    }

    #[test]
    fn test_open_rental_mints_distinct_ids() {
        let now = Utc::now();
        let a = sample_open(now);
        let b = sample_open(now);
        assert_ne!(a.rental_id, b.rental_id);
    }

    // TDD: close_rental() のテスト
    #[test]
    fn test_close_rental_within_free_window_has_no_extra_charge() {
        let started_at = Utc::now();
        let rental = sample_open(started_at);
        let ended_at = started_at + Duration::minutes(120);

        let closed = close_rental(rental, DockId::new(20), ended_at, &BillingPolicy::default());

        assert_eq!(closed.extra_charge, dec!(0.00));
        assert_eq!(closed.end_dock_id, DockId::new(20));
        assert_eq!(closed.ended_at, ended_at);
    }

    #[test]
    fn test_close_rental_one_minute_over_charges_one_block() {
        let started_at = Utc::now();
        let rental = sample_open(started_at);
        let ended_at = started_at + Duration::minutes(121);

        let closed = close_rental(rental, DockId::new(20), ended_at, &BillingPolicy::default());

        assert_eq!(closed.extra_charge, dec!(5.00));
        assert_eq!(closed.elapsed_minutes(), 121);
    }

    #[test]
    fn test_close_rental_preserves_identity_and_start_fields() {
        let started_at = Utc::now();
        let rental = sample_open(started_at);
        let rental_id = rental.rental_id;
        let cyclist_id = rental.cyclist_id;
        let charge_id = rental.charge_id;

        let closed = close_rental(
            rental,
            DockId::new(20),
            started_at + Duration::minutes(30),
            &BillingPolicy::default(),
        );

        assert_eq!(closed.rental_id, rental_id);
        assert_eq!(closed.cyclist_id, cyclist_id);
        assert_eq!(closed.start_dock_id, DockId::new(10));
        // 超過なしなら初期課金の参照がそのまま残る
        assert_eq!(closed.charge_id, charge_id);
    }

    #[test]
    fn test_elapsed_minutes_truncates_partial_minute() {
        let started_at = Utc::now();
        let rental = sample_open(started_at);
        // 121分30秒 → 121分として扱う
        let ended_at = started_at + Duration::minutes(121) + Duration::seconds(30);

        let closed = close_rental(rental, DockId::new(20), ended_at, &BillingPolicy::default());

        assert_eq!(closed.elapsed_minutes(), 121);
        assert_eq!(closed.extra_charge, dec!(5.00));
    }

    #[test]
    fn test_record_charge_overwrites_initial_reference() {
        let started_at = Utc::now();
        let rental = sample_open(started_at);
        let initial_charge = rental.charge_id;

        let mut closed = close_rental(
            rental,
            DockId::new(20),
            started_at + Duration::minutes(151),
            &BillingPolicy::default(),
        );
        let overage_charge = ChargeId::new(502);
        closed.record_charge(overage_charge);

        assert_ne!(closed.charge_id, initial_charge);
        assert_eq!(closed.charge_id, overage_charge);
    }

    // Rental統合型のテスト
    #[test]
    fn test_rental_is_open_predicate() {
        let started_at = Utc::now();
        let open = sample_open(started_at);
        let closed = close_rental(
            open.clone(),
            DockId::new(20),
            started_at + Duration::minutes(10),
            &BillingPolicy::default(),
        );

        assert!(Rental::Open(open).is_open());
        assert!(!Rental::Closed(closed).is_open());
    }

    #[test]
    fn test_rental_accessors_cover_both_states() {
        let started_at = Utc::now();
        let open = sample_open(started_at);
        let rental_id = open.rental_id;
        let cyclist_id = open.cyclist_id;

        let rental = Rental::Open(open.clone());
        assert_eq!(rental.rental_id(), rental_id);
        assert_eq!(rental.cyclist_id(), cyclist_id);

        let closed = Rental::Closed(close_rental(
            open,
            DockId::new(20),
            started_at + Duration::minutes(10),
            &BillingPolicy::default(),
        ));
        assert_eq!(closed.rental_id(), rental_id);
        assert_eq!(closed.cyclist_id(), cyclist_id);
    }
}
