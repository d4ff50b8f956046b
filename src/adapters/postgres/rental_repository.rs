use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::rental::{ClosedRental, OpenRental, RentalCore};
use crate::domain::value_objects::{BicycleId, ChargeId, CyclistId, DockId, RentalId};
use crate::ports::rental_repository::{
    InsertOpenError, RentalRepository as RentalRepositoryTrait, Result,
};

/// PostgreSQLの行データを進行中レンタルに変換する
///
/// ended_at がNULLの行のみが対象。
fn map_row_to_open_rental(row: &PgRow) -> OpenRental {
    OpenRental {
        core: RentalCore {
            rental_id: RentalId::from_uuid(row.get("rental_id")),
            cyclist_id: CyclistId::from_uuid(row.get("cyclist_id")),
            bicycle_id: BicycleId::new(row.get("bicycle_id")),
            start_dock_id: DockId::new(row.get("start_dock_id")),
            started_at: row.get("started_at"),
            charge_id: ChargeId::new(row.get("charge_id")),
        },
    }
}

/// RentalRepositoryのPostgreSQL実装
///
/// 単一進行中レンタルの不変条件は部分一意インデックス
/// （cyclist_id WHERE ended_at IS NULL）が担保する。
pub struct RentalRepository {
    pool: PgPool,
}

impl RentalRepository {
    /// PostgreSQLコネクションプールから新しいRentalRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RentalRepositoryTrait for RentalRepository {
    /// 進行中レンタルを登録する
    ///
    /// 一意制約違反はAlreadyOpenとして返し、その他の失敗はBackendに包む。
    /// 存在チェックと挿入を分けないことで競合状態を避ける。
    async fn insert_open(&self, rental: &OpenRental) -> std::result::Result<(), InsertOpenError> {
        let result = sqlx::query(
            r#"
            INSERT INTO rentals (
                rental_id,
                cyclist_id,
                bicycle_id,
                start_dock_id,
                started_at,
                charge_id
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(rental.rental_id.value())
        .bind(rental.cyclist_id.value())
        .bind(rental.bicycle_id.value())
        .bind(rental.start_dock_id.value())
        .bind(rental.started_at)
        .bind(rental.charge_id.value())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(InsertOpenError::AlreadyOpen)
            }
            Err(error) => Err(InsertOpenError::Backend(Box::new(error))),
        }
    }

    async fn find_open_by_cyclist(&self, cyclist_id: CyclistId) -> Result<Option<OpenRental>> {
        let row = sqlx::query(
            r#"
            SELECT
                rental_id,
                cyclist_id,
                bicycle_id,
                start_dock_id,
                started_at,
                charge_id
            FROM rentals
            WHERE cyclist_id = $1 AND ended_at IS NULL
            "#,
        )
        .bind(cyclist_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_open_rental))
    }

    /// レンタルを完了済みとして保存する
    ///
    /// 返却系の列を埋めることで行は進行中の集合から外れ、
    /// 部分一意インデックスが次のレンタルを受け入れるようになる。
    async fn complete(&self, rental: &ClosedRental) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE rentals SET
                end_dock_id = $2,
                ended_at = $3,
                extra_charge = $4,
                charge_id = $5,
                updated_at = NOW()
            WHERE rental_id = $1
            "#,
        )
        .bind(rental.rental_id.value())
        .bind(rental.end_dock_id.value())
        .bind(rental.ended_at)
        .bind(rental.extra_charge)
        .bind(rental.charge_id.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM rentals").execute(&self.pool).await?;
        Ok(())
    }
}
