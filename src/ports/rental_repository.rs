use async_trait::async_trait;
use thiserror::Error;

use crate::domain::rental::{ClosedRental, OpenRental};
use crate::domain::value_objects::CyclistId;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 進行中レンタル登録のエラー
///
/// 「1サイクリストにつき進行中レンタルは1件まで」の不変条件違反を
/// 基盤エラーと区別して扱うための専用型。
#[derive(Debug, Error)]
pub enum InsertOpenError {
    /// 同一サイクリストに進行中のレンタルが既に存在する
    #[error("cyclist already has an open rental")]
    AlreadyOpen,

    /// 永続化基盤のエラー
    #[error("rental store error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// レンタルリポジトリポート
///
/// Rental集約の永続化境界。
#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// 進行中レンタルを登録する
    ///
    /// 不変条件: 同一サイクリストの進行中レンタルは同時に1件まで。
    /// 存在チェックと挿入はレンタル単位でアトミックであること。
    async fn insert_open(&self, rental: &OpenRental) -> std::result::Result<(), InsertOpenError>;

    /// サイクリストの進行中レンタルを検索する
    async fn find_open_by_cyclist(&self, cyclist_id: CyclistId) -> Result<Option<OpenRental>>;

    /// レンタルを完了済みとして保存する
    async fn complete(&self, rental: &ClosedRental) -> Result<()>;

    /// 全レンタルを削除する（テスト環境リセット用）
    async fn delete_all(&self) -> Result<()>;
}
