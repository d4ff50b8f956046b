use crate::application::{
    ServiceDependencies, activate as execute_activate, can_rent as execute_can_rent,
    current_rental as execute_current_rental, email_exists as execute_email_exists,
    get_card as execute_get_card, get_cyclist as execute_get_cyclist,
    register as execute_register, rent_bicycle as execute_rent_bicycle,
    replace_card as execute_replace_card, reset_all as execute_reset_all,
    return_bicycle as execute_return_bicycle, update as execute_update,
};
use crate::domain::value_objects::CyclistId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    extract::Json,
    types::{
        BicycleResponse, CardBody, CardResponse, CyclistResponse, RegisterCyclistRequest,
        RentRequest, RentalResponse, ReturnRequest, UpdateCyclistRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Cyclist handlers
// ============================================================================

/// POST /ciclista - サイクリストを登録
///
/// 登録はAGUARDANDO_CONFIRMACAO状態で作成され、確認メールが送信される。
///
/// 強制されるビジネスルール:
/// - メールアドレス・CPFが未登録であること
/// - 国籍に応じた身分証明書（CPFまたはパスポート）が揃っていること
/// - クレジットカードが外部バリデータに承認されること
pub async fn register_cyclist(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterCyclistRequest>,
) -> Result<(StatusCode, Json<CyclistResponse>), ApiError> {
    let cmd = req.validate(chrono::Utc::now().date_naive())?;

    let cyclist = execute_register(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(CyclistResponse::from(cyclist))))
}

/// POST /ciclista/:id/ativar - 登録を有効化
///
/// 確認メールのリンクから呼ばれ、登録をATIVOに遷移させる。
///
/// 強制されるビジネスルール:
/// - サイクリストが存在すること
/// - まだ有効化されていないこと
pub async fn activate_cyclist(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CyclistResponse>), ApiError> {
    let cmd = crate::domain::commands::ActivateCyclist {
        cyclist_id: CyclistId::from_uuid(cyclist_id),
        confirmed_at: chrono::Utc::now(),
    };

    let cyclist = execute_activate(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(CyclistResponse::from(cyclist))))
}

/// PUT /ciclista/:id - 登録情報を部分更新
///
/// 指定されたフィールドのみ上書きし、更新通知メールを送信する。
/// 国籍を切り替える場合は新しい国籍の身分証明書が必須。
pub async fn update_cyclist(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
    Json(req): Json<UpdateCyclistRequest>,
) -> Result<(StatusCode, Json<CyclistResponse>), ApiError> {
    let patch = req.validate()?;

    let cmd = crate::domain::commands::UpdateCyclist {
        cyclist_id: CyclistId::from_uuid(cyclist_id),
        patch,
    };

    let cyclist = execute_update(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(CyclistResponse::from(cyclist))))
}

/// GET /ciclista/:id - サイクリストをIDで取得
///
/// 見つかった場合は登録情報を返し、見つからない場合は404を返す。
pub async fn get_cyclist(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
) -> Result<Json<CyclistResponse>, ApiError> {
    let cyclist = execute_get_cyclist(&state.service_deps, CyclistId::from_uuid(cyclist_id)).await?;

    Ok(Json(CyclistResponse::from(cyclist)))
}

/// GET /ciclista/existeEmail/:email - メールアドレスの登録有無を確認
///
/// 形式が不正なメールアドレスは検索せず422を返す。
pub async fn email_exists(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<bool>, ApiError> {
    let exists = execute_email_exists(&state.service_deps, &email).await?;

    Ok(Json(exists))
}

// ============================================================================
// Credit card handlers
// ============================================================================

/// GET /cartaoDeCredito/:id - 登録済みカードを取得
pub async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
) -> Result<Json<CardResponse>, ApiError> {
    let card = execute_get_card(&state.service_deps, CyclistId::from_uuid(cyclist_id)).await?;

    Ok(Json(CardResponse::from(card)))
}

/// PUT /cartaoDeCredito/:id - 支払い方法を差し替え
///
/// 強制されるビジネスルール:
/// - サイクリストが存在すること
/// - 新しいカードが外部バリデータに承認されること
pub async fn replace_card(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
    Json(req): Json<CardBody>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    let card = req.to_card(chrono::Utc::now().date_naive())?;

    let cmd = crate::domain::commands::ReplaceCard {
        cyclist_id: CyclistId::from_uuid(cyclist_id),
        card,
    };

    let card = execute_replace_card(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(CardResponse::from(card))))
}

// ============================================================================
// Rental handlers
// ============================================================================

/// POST /aluguel - レンタルを開始
///
/// 初期料金を課金し、ドックを解錠して自転車を引き渡す。
///
/// 強制されるビジネスルール:
/// - 登録がATIVOであること
/// - 進行中のレンタルがないこと（違反時は通知のみ送り拒否）
/// - ドックに利用可能な自転車があること（修理中は貸し出さない）
/// - 初期料金の課金が成功すること（失敗時は解錠しない）
pub async fn rent_bicycle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RentRequest>,
) -> Result<(StatusCode, Json<RentalResponse>), ApiError> {
    let (cyclist_id, start_dock_id) = req.validate()?;

    let cmd = crate::domain::commands::RentBicycle {
        cyclist_id,
        start_dock_id,
        requested_at: chrono::Utc::now(),
    };

    let rental = execute_rent_bicycle(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(RentalResponse::from(rental))))
}

/// POST /devolucao - 自転車を返却
///
/// 超過料金を精算し、ドックを施錠してレンタルを完了する。
///
/// 強制されるビジネスルール:
/// - サイクリストに進行中のレンタルがあること
/// - 返却先ドックが存在すること
/// - 超過料金の課金に失敗しても返却自体は完了する（後日課金キューへ）
/// - 故障報告があれば自転車をEM_REPAROにする
pub async fn return_bicycle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnRequest>,
) -> Result<(StatusCode, Json<RentalResponse>), ApiError> {
    let (cyclist_id, end_dock_id) = req.validate()?;

    let cmd = crate::domain::commands::ReturnBicycle {
        cyclist_id,
        end_dock_id,
        defect_reported: req.defeito,
        returned_at: chrono::Utc::now(),
    };

    let rental = execute_return_bicycle(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(RentalResponse::from(rental))))
}

/// GET /ciclista/:id/permiteAluguel - レンタル可否を確認
///
/// 登録がATIVOで進行中のレンタルがない場合にtrueを返す。
pub async fn can_rent(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
) -> Result<Json<bool>, ApiError> {
    let allowed = execute_can_rent(&state.service_deps, CyclistId::from_uuid(cyclist_id)).await?;

    Ok(Json(allowed))
}

/// GET /ciclista/:id/bicicletaAlugada - 使用中の自転車を取得
///
/// 進行中のレンタルがない場合はnullを返す（エラーにしない）。
pub async fn current_rental(
    State(state): State<Arc<AppState>>,
    Path(cyclist_id): Path<Uuid>,
) -> Result<Json<Option<BicycleResponse>>, ApiError> {
    let bicycle =
        execute_current_rental(&state.service_deps, CyclistId::from_uuid(cyclist_id)).await?;

    Ok(Json(bicycle.map(BicycleResponse::from)))
}

// ============================================================================
// Maintenance handlers
// ============================================================================

/// GET /restaurarBanco - データベースを初期状態へ戻す
///
/// 受け入れテスト用。全レンタルと全サイクリストを削除する。
pub async fn reset_database(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    execute_reset_all(&state.service_deps).await?;

    Ok(StatusCode::OK)
}
