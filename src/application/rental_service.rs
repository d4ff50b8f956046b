use rust_decimal::Decimal;

use crate::domain::commands::{RentBicycle, ReturnBicycle};
use crate::domain::rental::{self, ClosedRental, OpenRental};
use crate::domain::value_objects::{BicycleStatus, CyclistId};
use crate::ports::{BicycleSnapshot, InsertOpenError};

use super::errors::{ApplicationError, Result};
use super::{ServiceDependencies, notify};

/// 自転車を借りる
///
/// ビジネスルール：
/// - サイクリストが存在し、有効化済みであること
/// - 進行中のレンタルがないこと（違反時は通知のうえ拒否）
/// - ドックに自転車があり、修理中でないこと
/// - 初期料金の課金が成功するまで、解錠も保存も行わない
///
/// 手順は厳密に順序付けられ、各ステップの失敗は以降のステップを中止する。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - レンタル開始コマンド
///
/// # 戻り値
/// 成功時は作成された進行中レンタル
pub async fn rent_bicycle(deps: &ServiceDependencies, cmd: RentBicycle) -> Result<OpenRental> {
    // 1. サイクリストの存在確認
    let cyclist = deps
        .cyclists
        .find_by_id(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    // 2. 有効化済みであることを確認
    if !cyclist.is_active() {
        return Err(ApplicationError::RegistrationNotActive);
    }

    // 3. 進行中レンタルがないことを確認（違反時は通知してから拒否）
    let existing = deps
        .rentals
        .find_open_by_cyclist(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?;

    if existing.is_some() {
        notify(
            deps,
            &cyclist.email,
            "Rental not allowed",
            "You already have an active rental. Return the bicycle before renting another one.",
        )
        .await;
        return Err(ApplicationError::DuplicateOpenRental);
    }

    // 4. ドックと自転車の状態確認
    let dock = match deps.equipment.get_dock(cmd.start_dock_id).await {
        Ok(dock) => dock,
        Err(error) => {
            tracing::warn!(
                "Failed to fetch dock {}: {:?}",
                cmd.start_dock_id.value(),
                error
            );
            return Err(ApplicationError::DockNotFound);
        }
    };

    let bicycle_id = dock.bicycle_id.ok_or(ApplicationError::EmptyDock)?;

    let bicycle = deps
        .equipment
        .get_bicycle(bicycle_id)
        .await
        .map_err(ApplicationError::ExternalService)?;

    if bicycle.status == BicycleStatus::UnderRepair {
        return Err(ApplicationError::BicycleUnderRepair);
    }

    // 5. 初期料金を課金（失敗したら何も解錠・保存されない）
    let receipt = deps
        .payment
        .charge(cmd.cyclist_id, deps.billing.initial_fee)
        .await
        .map_err(ApplicationError::PaymentRejected)?;

    // 6. ドックを解錠
    let unlocked = match deps.equipment.unlock(cmd.start_dock_id, bicycle_id).await {
        Ok(unlocked) => unlocked,
        Err(error) => {
            tracing::warn!(
                "Failed to unlock dock {}: {:?}",
                cmd.start_dock_id.value(),
                error
            );
            false
        }
    };

    if !unlocked {
        return Err(ApplicationError::UnlockFailed);
    }

    // 7. 進行中レンタルを保存
    //    単一進行中レンタルの不変条件はリポジトリがアトミックに守る
    let rental = rental::open_rental(
        cmd.cyclist_id,
        bicycle_id,
        cmd.start_dock_id,
        cmd.requested_at,
        receipt.charge_id,
    );

    match deps.rentals.insert_open(&rental).await {
        Ok(()) => {}
        Err(InsertOpenError::AlreadyOpen) => return Err(ApplicationError::DuplicateOpenRental),
        Err(InsertOpenError::Backend(error)) => return Err(ApplicationError::Repository(error)),
    }

    // 8. 開始通知（ベストエフォート）
    let body = format!(
        "Rental started at dock {} with bicycle {}. Initial fee: {}.",
        cmd.start_dock_id.value(),
        bicycle_id.value(),
        deps.billing.initial_fee,
    );
    notify(deps, &cyclist.email, "Rental started", &body).await;

    Ok(rental)
}

/// 自転車を返却する
///
/// ビジネスルール：
/// - 進行中のレンタルが存在すること
/// - 超過料金は「無料時間を超えた分を課金ブロック単位で切り上げ」
/// - 超過課金の失敗は返却を中断しない（後日請求キューへフォールバック、
///   キューも失敗したらクリティカルログのみ）
/// - 故障報告があれば自転車は修理中、なければ利用可能になる
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 返却コマンド
///
/// # 戻り値
/// 成功時は完了済みレンタル
pub async fn return_bicycle(deps: &ServiceDependencies, cmd: ReturnBicycle) -> Result<ClosedRental> {
    // 1. 進行中レンタルの取得
    let open = deps
        .rentals
        .find_open_by_cyclist(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::OpenRentalNotFound)?;

    // 2. ドメイン層の純粋関数で返却を確定（経過時間と超過料金の計算を含む）
    let mut closed = rental::close_rental(open, cmd.end_dock_id, cmd.returned_at, &deps.billing);

    // 3. 超過料金の課金。成功時のみ課金参照を上書きし、失敗しても返却は続行する
    if closed.extra_charge > Decimal::ZERO {
        match deps.payment.charge(cmd.cyclist_id, closed.extra_charge).await {
            Ok(receipt) => closed.record_charge(receipt.charge_id),
            Err(charge_error) => {
                tracing::warn!(
                    "Overage charge failed, falling back to billing queue: {:?}",
                    charge_error
                );
                if let Err(queue_error) = deps
                    .payment
                    .enqueue_charge(cmd.cyclist_id, closed.extra_charge)
                    .await
                {
                    tracing::error!(
                        "Critical: overage charge and queue fallback both failed for rental {}: {:?}",
                        closed.rental_id.value(),
                        queue_error
                    );
                }
            }
        }
    }

    // 4. 自転車の新ステータスを設備側に反映
    let new_status = if cmd.defect_reported {
        BicycleStatus::UnderRepair
    } else {
        BicycleStatus::Available
    };

    if let Err(error) = deps
        .equipment
        .set_bicycle_status(closed.bicycle_id, new_status)
        .await
    {
        tracing::warn!(
            "Failed to update status of bicycle {}: {:?}",
            closed.bicycle_id.value(),
            error
        );
        return Err(ApplicationError::BicycleStatusRejected);
    }

    // 5. 返却先ドックを施錠
    let locked = match deps.equipment.lock(cmd.end_dock_id, closed.bicycle_id).await {
        Ok(locked) => locked,
        Err(error) => {
            tracing::warn!(
                "Failed to lock dock {}: {:?}",
                cmd.end_dock_id.value(),
                error
            );
            false
        }
    };

    if !locked {
        return Err(ApplicationError::LockFailed);
    }

    // 6. 完了済みレンタルを保存
    deps.rentals
        .complete(&closed)
        .await
        .map_err(ApplicationError::Repository)?;

    // 7. 返却通知（ベストエフォート）
    if let Ok(Some(cyclist)) = deps.cyclists.find_by_id(cmd.cyclist_id).await {
        let body = format!(
            "Bicycle {} returned at dock {} after {} minutes. Extra charge: {}. New bicycle status: {}.",
            closed.bicycle_id.value(),
            cmd.end_dock_id.value(),
            closed.elapsed_minutes(),
            closed.extra_charge,
            new_status.as_str(),
        );
        notify(deps, &cyclist.email, "Rental finished", &body).await;
    }

    Ok(closed)
}

/// レンタル可否を判定する
///
/// ビジネスルール: 有効化済みかつ進行中レンタルなしの場合のみ許可。
pub async fn can_rent(deps: &ServiceDependencies, cyclist_id: CyclistId) -> Result<bool> {
    let cyclist = deps
        .cyclists
        .find_by_id(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    if !cyclist.is_active() {
        return Ok(false);
    }

    let open = deps
        .rentals
        .find_open_by_cyclist(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?;

    Ok(open.is_none())
}

/// 現在レンタル中の自転車を取得する
///
/// 進行中レンタルがなければNone（「何も借りていない」は正常な回答）。
pub async fn current_rental(
    deps: &ServiceDependencies,
    cyclist_id: CyclistId,
) -> Result<Option<BicycleSnapshot>> {
    deps.cyclists
        .find_by_id(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    let open = deps
        .rentals
        .find_open_by_cyclist(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?;

    Ok(open.map(|rental| BicycleSnapshot {
        bicycle_id: rental.bicycle_id,
        status: BicycleStatus::InUse,
    }))
}

/// 全データを削除する（テスト環境リセット用）
pub async fn reset_all(deps: &ServiceDependencies) -> Result<()> {
    // 参照整合性のため、レンタルを先に削除する
    deps.rentals
        .delete_all()
        .await
        .map_err(ApplicationError::Repository)?;

    deps.cyclists
        .delete_all()
        .await
        .map_err(ApplicationError::Repository)?;

    Ok(())
}
