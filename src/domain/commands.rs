use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::cyclist::{CreditCard, CyclistPatch, IdentityDocument};
use super::{CyclistId, DockId, EmailAddress};

/// コマンド：自転車を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentBicycle {
    pub cyclist_id: CyclistId,
    pub start_dock_id: DockId,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：自転車を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBicycle {
    pub cyclist_id: CyclistId,
    pub end_dock_id: DockId,
    /// 故障報告あり（trueなら自転車は修理中になる）
    pub defect_reported: bool,
    pub returned_at: DateTime<Utc>,
}

/// コマンド：サイクリストを登録する
///
/// 構造検証済みの値のみを運ぶ（検証はAPI層で完了している）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCyclist {
    pub name: String,
    pub birth_date: NaiveDate,
    pub document: IdentityDocument,
    pub email: EmailAddress,
    pub password: String,
    pub document_photo_url: Option<String>,
    pub card: CreditCard,
}

/// コマンド：サイクリストを有効化する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateCyclist {
    pub cyclist_id: CyclistId,
    pub confirmed_at: DateTime<Utc>,
}

/// コマンド：サイクリストを部分更新する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCyclist {
    pub cyclist_id: CyclistId,
    pub patch: CyclistPatch,
}

/// コマンド：支払いカードを差し替える
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceCard {
    pub cyclist_id: CyclistId,
    pub card: CreditCard,
}
