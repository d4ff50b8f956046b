use async_trait::async_trait;

use crate::domain::cyclist::Cyclist;
use crate::domain::value_objects::{Cpf, CyclistId, EmailAddress};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// サイクリストリポジトリポート
///
/// サイクリスト集約の永続化境界。一意性チェック用の検索も提供する。
#[async_trait]
pub trait CyclistRepository: Send + Sync {
    /// 新規サイクリストを保存する
    async fn insert(&self, cyclist: &Cyclist) -> Result<()>;

    /// 既存サイクリストを更新する（有効化・部分更新・カード差し替え）
    async fn update(&self, cyclist: &Cyclist) -> Result<()>;

    /// IDで検索する
    async fn find_by_id(&self, cyclist_id: CyclistId) -> Result<Option<Cyclist>>;

    /// メールアドレスで検索する
    ///
    /// ビジネスルール: メールアドレスはシステム全体で一意。
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Cyclist>>;

    /// CPFで検索する
    ///
    /// ビジネスルール: CPFはシステム全体で一意。
    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cyclist>>;

    /// 全サイクリストを削除する（テスト環境リセット用）
    async fn delete_all(&self) -> Result<()>;
}
