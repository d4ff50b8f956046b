mod cyclist_service;
mod errors;
mod rental_service;

pub use cyclist_service::{
    activate, email_exists, get_card, get_cyclist, register, replace_card, update,
};
pub use errors::{ApplicationError, Result};
pub use rental_service::{can_rent, current_rental, rent_bicycle, reset_all, return_bicycle};

use std::sync::Arc;

use crate::domain::billing::BillingPolicy;
use crate::domain::value_objects::EmailAddress;
use crate::ports::{
    CyclistRepository, EquipmentGateway, NotificationGateway, PaymentGateway, RentalRepository,
};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// このパターンにより：
/// - すべての依存が明示的
/// - データと振る舞いの分離
/// - テストが明確
#[derive(Clone)]
pub struct ServiceDependencies {
    pub cyclists: Arc<dyn CyclistRepository>,
    pub rentals: Arc<dyn RentalRepository>,
    pub equipment: Arc<dyn EquipmentGateway>,
    pub payment: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn NotificationGateway>,
    /// 料金ポリシー（初期料金・無料時間・超過ブロック）
    pub billing: BillingPolicy,
}

/// ベストエフォート通知ヘルパー
///
/// ビジネスルール: 通知の失敗は業務フローを止めない。
/// 失敗は警告ログに残すのみで、エラーは呼び出し元に伝播しない。
pub(crate) async fn notify(
    deps: &ServiceDependencies,
    email: &EmailAddress,
    subject: &str,
    body: &str,
) {
    if let Err(error) = deps.notifier.send(email, subject, body).await {
        tracing::warn!("Failed to send notification '{}': {:?}", subject, error);
    }
}
