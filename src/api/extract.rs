use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::types::ErrorResponse;

/// {codigo, mensagem} 形式でリジェクトするJSONエクストラクタ
///
/// axum標準のリジェクションはプレーンテキストのボディを返すため、
/// エラーレスポンスの形式を揃えるべくここでラップする。
#[derive(Debug)]
pub struct Json<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Json(value)),
            Err(rejection) => Err(reject(rejection)),
        }
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// JSONとしては読めるが値が契約に合わない → 422、
/// 壊れたJSONやContent-Type違反 → 400
fn reject(rejection: JsonRejection) -> Response {
    let (status, codigo) = match &rejection {
        JsonRejection::JsonDataError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "DADOS_INVALIDOS"),
        _ => (StatusCode::BAD_REQUEST, "REQUISICAO_MAL_FORMADA"),
    };
    let body = axum::Json(ErrorResponse::new(codigo, rejection.body_text()));
    (status, body).into_response()
}
