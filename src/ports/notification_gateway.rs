use async_trait::async_trait;

use crate::domain::value_objects::EmailAddress;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知ゲートウェイポート
///
/// サイクリストへのメール通知の境界。
/// 通知はすべてベストエフォートで、失敗しても業務フローを止めない
/// （失敗時の扱いは呼び出し側アプリケーション層が決める）。
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// メールを送信する
    async fn send(&self, email: &EmailAddress, subject: &str, body: &str) -> Result<()>;
}
