use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cyclist::CreditCard;
use crate::domain::value_objects::{ChargeId, CyclistId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 課金結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    /// 決済側が発行した課金トランザクションID
    pub charge_id: ChargeId,
}

/// 決済ゲートウェイポート
///
/// レンタルコンテキストと決済コンテキストの境界。
/// 金額は常に正確な10進数（Decimal）で受け渡す。
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// サイクリストに即時課金する
    async fn charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<ChargeReceipt>;

    /// 後日請求キューに積む
    ///
    /// 即時課金が失敗した場合のフォールバック経路。
    async fn enqueue_charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<()>;

    /// クレジットカードの有効性を外部バリデータで確認する
    ///
    /// Ok(false) はカードが拒否されたことを表す（ゲートウェイ障害とは区別）。
    async fn validate_card(&self, card: &CreditCard) -> Result<bool>;
}
