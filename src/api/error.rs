use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::ApplicationError;
use crate::domain::validation::ValidationError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(ApplicationError::Validation(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, codigo, mensagem) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            ApplicationError::CyclistNotFound => (
                StatusCode::NOT_FOUND,
                "CICLISTA_NAO_ENCONTRADO",
                "Cyclist not found",
            ),
            ApplicationError::OpenRentalNotFound => (
                StatusCode::NOT_FOUND,
                "ALUGUEL_NAO_ENCONTRADO",
                "No open rental found for cyclist",
            ),
            ApplicationError::DockNotFound => (
                StatusCode::NOT_FOUND,
                "TRANCA_NAO_ENCONTRADA",
                "Dock not found",
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            ApplicationError::RegistrationNotActive => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CADASTRO_NAO_ATIVO",
                "Cyclist registration is not active",
            ),
            ApplicationError::DuplicateOpenRental => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ALUGUEL_EM_ANDAMENTO",
                "Cyclist already has an active rental",
            ),
            ApplicationError::EmptyDock => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TRANCA_VAZIA",
                "No bicycle at the dock",
            ),
            ApplicationError::BicycleUnderRepair => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BICICLETA_EM_REPARO",
                "Bicycle is under repair",
            ),
            ApplicationError::PaymentRejected(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PAGAMENTO_RECUSADO",
                "Payment was rejected",
            ),
            ApplicationError::CardRejected => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CARTAO_RECUSADO",
                "Credit card was rejected",
            ),
            ApplicationError::UnlockFailed => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FALHA_AO_DESTRANCAR",
                "Failed to unlock the dock",
            ),
            ApplicationError::LockFailed => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FALHA_AO_TRANCAR",
                "Failed to lock the dock",
            ),
            ApplicationError::BicycleStatusRejected => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FALHA_STATUS_BICICLETA",
                "Failed to update bicycle status",
            ),
            ApplicationError::AlreadyActivated => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CADASTRO_JA_ATIVO",
                "Cyclist is already activated",
            ),
            ApplicationError::DuplicateEmail => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMAIL_JA_CADASTRADO",
                "Email is already registered",
            ),
            ApplicationError::DuplicateCpf => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CPF_JA_CADASTRADO",
                "CPF is already registered",
            ),
            ApplicationError::InvalidEmail => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMAIL_INVALIDO",
                "Email format is invalid",
            ),
            ApplicationError::Validation(ref msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "DADOS_INVALIDOS",
                msg.as_str(),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::Repository(ref e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ERRO_INTERNO",
                    "An unexpected error occurred",
                )
            }
            ApplicationError::ExternalService(ref e) => {
                tracing::error!("External service error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ERRO_SERVICO_EXTERNO",
                    "External service error",
                )
            }
        };

        let body = Json(ErrorResponse::new(codigo, mensagem));
        (status, body).into_response()
    }
}
