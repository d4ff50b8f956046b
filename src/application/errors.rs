use thiserror::Error;

/// アプリケーション層のエラー
///
/// HTTPステータスへの対応：
/// - 参照先が存在しない系 → 404
/// - ビジネスルール違反・構造検証違反 → 422
/// - 基盤・外部サービス障害 → 500
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// サイクリストが存在しない
    #[error("Cyclist not found")]
    CyclistNotFound,

    /// 進行中のレンタルが存在しない
    #[error("No open rental found for cyclist")]
    OpenRentalNotFound,

    /// ドックが存在しない、または設備サービスに到達できない
    #[error("Dock not found")]
    DockNotFound,

    /// 登録が有効化されていない
    #[error("Cyclist registration is not active")]
    RegistrationNotActive,

    /// 既に進行中のレンタルがある
    #[error("Cyclist already has an active rental")]
    DuplicateOpenRental,

    /// ドックに自転車がない
    #[error("No bicycle at the dock")]
    EmptyDock,

    /// 自転車が修理中
    #[error("Bicycle is under repair")]
    BicycleUnderRepair,

    /// 課金が拒否された
    #[error("Payment was rejected")]
    PaymentRejected(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// クレジットカードが外部バリデータに拒否された
    #[error("Credit card was rejected")]
    CardRejected,

    /// ドックの解錠に失敗した
    #[error("Failed to unlock the dock")]
    UnlockFailed,

    /// ドックの施錠に失敗した
    #[error("Failed to lock the dock")]
    LockFailed,

    /// 自転車ステータスの変更が受け付けられなかった
    #[error("Failed to update bicycle status")]
    BicycleStatusRejected,

    /// 既に有効化済み
    #[error("Cyclist is already activated")]
    AlreadyActivated,

    /// メールアドレスが登録済み
    #[error("Email is already registered")]
    DuplicateEmail,

    /// CPFが登録済み
    #[error("CPF is already registered")]
    DuplicateCpf,

    /// メールアドレスの形式が不正
    #[error("Email format is invalid")]
    InvalidEmail,

    /// 構造検証違反（最初に違反した制約のメッセージ）
    #[error("{0}")]
    Validation(String),

    /// リポジトリのエラー
    #[error("Repository error")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 外部サービスのエラー
    #[error("External service error")]
    ExternalService(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
