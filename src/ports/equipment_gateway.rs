use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BicycleId, BicycleStatus, DockId};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// トランカ（ドック）の現在状態
///
/// 設備管理コンテキストが保持する情報のスナップショット。
/// statusは設備側の語彙であり、レンタルコンテキストは解釈しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockSnapshot {
    pub dock_id: DockId,
    /// 現在格納されている自転車。空のドックならNone。
    pub bicycle_id: Option<BicycleId>,
    pub status: String,
}

/// 自転車の現在状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BicycleSnapshot {
    pub bicycle_id: BicycleId,
    pub status: BicycleStatus,
}

/// 設備ゲートウェイポート
///
/// レンタルコンテキストと設備管理コンテキスト（トランカ・自転車）の境界。
/// 物理的な施錠・解錠は設備側の責務で、ここでは指示のみを送る。
#[async_trait]
pub trait EquipmentGateway: Send + Sync {
    /// ドックの状態を照会する
    async fn get_dock(&self, dock_id: DockId) -> Result<DockSnapshot>;

    /// 自転車の状態を照会する
    async fn get_bicycle(&self, bicycle_id: BicycleId) -> Result<BicycleSnapshot>;

    /// ドックを解錠して自転車を取り出す
    ///
    /// Ok(false) は設備側が解錠を拒否したことを表す（エラーとは区別）。
    async fn unlock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool>;

    /// ドックを施錠して自転車を格納する
    ///
    /// 自転車IDを明示する2引数形式が正となる。
    async fn lock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool>;

    /// 自転車のステータスを変更する
    async fn set_bicycle_status(&self, bicycle_id: BicycleId, status: BicycleStatus) -> Result<()>;
}
