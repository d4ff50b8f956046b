use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::domain::cyclist::{CreditCard, Cyclist, IdentityDocument, Passport};
use crate::domain::value_objects::{Cpf, CyclistId, CyclistStatus, EmailAddress};
use crate::ports::cyclist_repository::{CyclistRepository as CyclistRepositoryTrait, Result};

/// 行データの不整合をボックス化されたエラーに変換する
fn data_error(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

/// PostgreSQLの行データをCyclistに変換する
///
/// 国籍列に応じてCPF列またはパスポート列から身分証明書を復元する。
/// 片方しか値を持たない不変条件はスキーマではなくここで検査する。
fn map_row_to_cyclist(row: &PgRow) -> Result<Cyclist> {
    let nationality: String = row.get("nationality");
    let document = match nationality.as_str() {
        "BRASILEIRO" => {
            let cpf: Option<String> = row.get("cpf");
            let cpf = cpf.ok_or_else(|| {
                data_error("cyclist row has nationality BRASILEIRO but no cpf".to_string())
            })?;
            IdentityDocument::NationalId(
                Cpf::parse(cpf).map_err(|e| data_error(e.to_string()))?,
            )
        }
        "ESTRANGEIRO" => {
            let number: Option<String> = row.get("passport_number");
            let country: Option<String> = row.get("passport_country");
            let expires_on: Option<NaiveDate> = row.get("passport_expires_on");
            match (number, country, expires_on) {
                (Some(number), Some(country), Some(expires_on)) => {
                    IdentityDocument::Passport(Passport {
                        number,
                        country,
                        expires_on,
                    })
                }
                _ => {
                    return Err(data_error(
                        "cyclist row has nationality ESTRANGEIRO but an incomplete passport"
                            .to_string(),
                    ));
                }
            }
        }
        other => return Err(data_error(format!("unknown nationality: {}", other))),
    };

    let status_str: String = row.get("status");
    let status = CyclistStatus::from_str(&status_str).map_err(data_error)?;

    let email: String = row.get("email");
    let email = EmailAddress::parse(email).map_err(|e| data_error(e.to_string()))?;

    Ok(Cyclist {
        cyclist_id: CyclistId::from_uuid(row.get("cyclist_id")),
        name: row.get("name"),
        birth_date: row.get("birth_date"),
        document,
        email,
        password: row.get("password"),
        document_photo_url: row.get("document_photo_url"),
        status,
        confirmed_at: row.get("confirmed_at"),
        card: CreditCard {
            holder_name: row.get("card_holder_name"),
            number: row.get("card_number"),
            expires_on: row.get("card_expires_on"),
            cvv: row.get("card_cvv"),
        },
    })
}

const CYCLIST_COLUMNS: &str = r#"
    cyclist_id,
    name,
    birth_date,
    nationality,
    cpf,
    passport_number,
    passport_country,
    passport_expires_on,
    email,
    password,
    document_photo_url,
    status,
    confirmed_at,
    card_holder_name,
    card_number,
    card_expires_on,
    card_cvv
"#;

/// CyclistRepositoryのPostgreSQL実装
pub struct CyclistRepository {
    pool: PgPool,
}

impl CyclistRepository {
    /// PostgreSQLコネクションプールから新しいCyclistRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CyclistRepositoryTrait for CyclistRepository {
    async fn insert(&self, cyclist: &Cyclist) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO cyclists (
                cyclist_id,
                name,
                birth_date,
                nationality,
                cpf,
                passport_number,
                passport_country,
                passport_expires_on,
                email,
                password,
                document_photo_url,
                status,
                confirmed_at,
                card_holder_name,
                card_number,
                card_expires_on,
                card_cvv
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(cyclist.cyclist_id.value())
        .bind(&cyclist.name)
        .bind(cyclist.birth_date)
        .bind(cyclist.nationality().as_str())
        .bind(cyclist.document.cpf().map(Cpf::as_str))
        .bind(cyclist.document.passport().map(|p| p.number.as_str()))
        .bind(cyclist.document.passport().map(|p| p.country.as_str()))
        .bind(cyclist.document.passport().map(|p| p.expires_on))
        .bind(cyclist.email.as_str())
        .bind(&cyclist.password)
        .bind(cyclist.document_photo_url.as_deref())
        .bind(cyclist.status.as_str())
        .bind(cyclist.confirmed_at)
        .bind(&cyclist.card.holder_name)
        .bind(&cyclist.card.number)
        .bind(cyclist.card.expires_on)
        .bind(&cyclist.card.cvv)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, cyclist: &Cyclist) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE cyclists SET
                name = $2,
                birth_date = $3,
                nationality = $4,
                cpf = $5,
                passport_number = $6,
                passport_country = $7,
                passport_expires_on = $8,
                email = $9,
                password = $10,
                document_photo_url = $11,
                status = $12,
                confirmed_at = $13,
                card_holder_name = $14,
                card_number = $15,
                card_expires_on = $16,
                card_cvv = $17,
                updated_at = NOW()
            WHERE cyclist_id = $1
            "#,
        )
        .bind(cyclist.cyclist_id.value())
        .bind(&cyclist.name)
        .bind(cyclist.birth_date)
        .bind(cyclist.nationality().as_str())
        .bind(cyclist.document.cpf().map(Cpf::as_str))
        .bind(cyclist.document.passport().map(|p| p.number.as_str()))
        .bind(cyclist.document.passport().map(|p| p.country.as_str()))
        .bind(cyclist.document.passport().map(|p| p.expires_on))
        .bind(cyclist.email.as_str())
        .bind(&cyclist.password)
        .bind(cyclist.document_photo_url.as_deref())
        .bind(cyclist.status.as_str())
        .bind(cyclist.confirmed_at)
        .bind(&cyclist.card.holder_name)
        .bind(&cyclist.card.number)
        .bind(cyclist.card.expires_on)
        .bind(&cyclist.card.cvv)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, cyclist_id: CyclistId) -> Result<Option<Cyclist>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cyclists WHERE cyclist_id = $1",
            CYCLIST_COLUMNS
        ))
        .bind(cyclist_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_cyclist).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Cyclist>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cyclists WHERE email = $1",
            CYCLIST_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_cyclist).transpose()
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cyclist>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cyclists WHERE cpf = $1",
            CYCLIST_COLUMNS
        ))
        .bind(cpf.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_cyclist).transpose()
    }

    async fn delete_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM cyclists").execute(&self.pool).await?;
        Ok(())
    }
}
