use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::commands::RegisterCyclist;
use crate::domain::cyclist::{
    CreditCard, Cyclist, CyclistPatch, IdentityDocument, Passport, PassportPatch,
};
use crate::domain::rental::{ClosedRental, OpenRental};
use crate::domain::validation::{
    HasNationalityDocs, HasPasswordPair, ValidationError, check_optional_password_pair,
    require_identity_documents, require_non_blank, require_password_pair,
    validate_card_details, validate_document_patterns,
};
use crate::domain::value_objects::{
    Cpf, CyclistId, CyclistStatus, DockId, EmailAddress, Nationality,
};
use crate::ports::equipment_gateway::BicycleSnapshot;

// ============================================================================
// 共通
// ============================================================================

/// エラーレスポンス
///
/// すべてのエラーは {codigo, mensagem} 形式で返す。
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub codigo: String,
    pub mensagem: String,
}

impl ErrorResponse {
    pub fn new(codigo: impl Into<String>, mensagem: impl Into<String>) -> Self {
        Self {
            codigo: codigo.into(),
            mensagem: mensagem.into(),
        }
    }
}

/// 金額をワイヤ表現に揃える（小数点以下2桁固定）
fn money(value: Decimal) -> Decimal {
    let mut normalized = value;
    normalized.rescale(2);
    normalized
}

// ============================================================================
// リクエスト型
// ============================================================================

/// パスポートのリクエストボディ
///
/// 部分更新でも使うため全フィールドが任意。完全性の要求は
/// 検証関数とドメイン層が文脈に応じて判断する。
#[derive(Debug, Clone, Deserialize)]
pub struct PassportBody {
    pub numero: Option<String>,
    pub pais: Option<String>,
    pub validade: Option<NaiveDate>,
}

impl PassportBody {
    /// 3フィールドすべてが揃っている場合のみ完全なパスポートを構築する
    fn complete(&self) -> Option<Passport> {
        Some(Passport {
            number: self.numero.clone()?,
            country: self.pais.clone()?,
            expires_on: self.validade?,
        })
    }

    fn into_patch(self) -> PassportPatch {
        PassportPatch {
            number: self.numero,
            country: self.pais,
            expires_on: self.validade,
        }
    }
}

/// クレジットカードのリクエストボディ
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBody {
    pub nome_titular: Option<String>,
    pub numero: Option<String>,
    pub validade: Option<NaiveDate>,
    pub cvv: Option<String>,
}

impl CardBody {
    /// 構造検証を通してドメインのカードに変換する
    pub fn to_card(&self, today: NaiveDate) -> Result<CreditCard, ValidationError> {
        let holder_name = self
            .nome_titular
            .as_deref()
            .ok_or_else(|| ValidationError::new("meioDePagamento.nomeTitular is required"))?;
        let number = self
            .numero
            .as_deref()
            .ok_or_else(|| ValidationError::new("meioDePagamento.numero is required"))?;
        let expires_on = self
            .validade
            .ok_or_else(|| ValidationError::new("meioDePagamento.validade is required"))?;
        let cvv = self
            .cvv
            .as_deref()
            .ok_or_else(|| ValidationError::new("meioDePagamento.cvv is required"))?;

        validate_card_details(holder_name, number, expires_on, cvv, today)?;

        Ok(CreditCard {
            holder_name: holder_name.to_string(),
            number: number.to_string(),
            expires_on,
            cvv: cvv.to_string(),
        })
    }
}

/// サイクリスト登録リクエスト（POST /ciclista）
///
/// フィールドはすべて任意で受け、validate() が必須性・形式・
/// 国籍と身分証明書の整合を検査して最初の違反を返す。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCyclistRequest {
    pub nome: Option<String>,
    pub nascimento: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub passaporte: Option<PassportBody>,
    pub nacionalidade: Option<Nationality>,
    pub email: Option<String>,
    pub senha: Option<String>,
    pub confirmacao_senha: Option<String>,
    pub url_foto_documento: Option<String>,
    pub meio_de_pagamento: Option<CardBody>,
}

impl HasPasswordPair for RegisterCyclistRequest {
    fn password(&self) -> Option<&str> {
        self.senha.as_deref()
    }

    fn password_confirmation(&self) -> Option<&str> {
        self.confirmacao_senha.as_deref()
    }
}

impl HasNationalityDocs for RegisterCyclistRequest {
    fn nationality(&self) -> Option<Nationality> {
        self.nacionalidade
    }

    fn cpf(&self) -> Option<&str> {
        self.cpf.as_deref()
    }

    fn passport_number(&self) -> Option<&str> {
        self.passaporte.as_ref().and_then(|p| p.numero.as_deref())
    }

    fn passport_country(&self) -> Option<&str> {
        self.passaporte.as_ref().and_then(|p| p.pais.as_deref())
    }

    fn passport_expiry(&self) -> Option<NaiveDate> {
        self.passaporte.as_ref().and_then(|p| p.validade)
    }
}

impl RegisterCyclistRequest {
    /// 構造検証を通して登録コマンドに変換する
    pub fn validate(self, today: NaiveDate) -> Result<RegisterCyclist, ValidationError> {
        let name = self
            .nome
            .as_deref()
            .ok_or_else(|| ValidationError::new("nome is required"))?;
        require_non_blank(name, "nome must not be blank")?;
        let birth_date = self
            .nascimento
            .ok_or_else(|| ValidationError::new("nascimento is required"))?;
        let raw_email = self
            .email
            .as_deref()
            .ok_or_else(|| ValidationError::new("email is required"))?;
        let email = EmailAddress::parse(raw_email)
            .map_err(|_| ValidationError::new("email format is invalid"))?;

        require_password_pair(&self)?;
        require_identity_documents(&self)?;
        validate_document_patterns(&self)?;
        let document = self.identity_document()?;

        let card = self
            .meio_de_pagamento
            .as_ref()
            .ok_or_else(|| ValidationError::new("meioDePagamento is required"))?
            .to_card(today)?;

        Ok(RegisterCyclist {
            name: name.to_string(),
            birth_date,
            document,
            email,
            password: self.senha.unwrap_or_default(),
            document_photo_url: self.url_foto_documento,
            card,
        })
    }

    /// 国籍に対応する身分証明書を構築する
    ///
    /// require_identity_documents が通った後に呼ばれる前提だが、
    /// 欠落時も同じメッセージで違反として返す。
    fn identity_document(&self) -> Result<IdentityDocument, ValidationError> {
        match self.nacionalidade {
            Some(Nationality::Brazilian) => {
                let cpf = self.cpf.as_deref().ok_or_else(|| {
                    ValidationError::new("cpf is required for nacionalidade BRASILEIRO")
                })?;
                let cpf = Cpf::parse(cpf).map_err(|e| ValidationError::new(e.to_string()))?;
                Ok(IdentityDocument::NationalId(cpf))
            }
            Some(Nationality::Foreign) => {
                let passport = self
                    .passaporte
                    .as_ref()
                    .and_then(PassportBody::complete)
                    .ok_or_else(|| {
                        ValidationError::new(
                            "a complete passaporte is required for nacionalidade ESTRANGEIRO",
                        )
                    })?;
                Ok(IdentityDocument::Passport(passport))
            }
            None => Err(ValidationError::new("nacionalidade is required")),
        }
    }
}

/// サイクリスト部分更新リクエスト（PUT /ciclista/{id}）
///
/// 登録リクエストからメールアドレスとカードを除いたもの。
/// 国籍切り替えの完全性はドメイン層のパッチ適用が検査する。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCyclistRequest {
    pub nome: Option<String>,
    pub nascimento: Option<NaiveDate>,
    pub cpf: Option<String>,
    pub passaporte: Option<PassportBody>,
    pub nacionalidade: Option<Nationality>,
    pub senha: Option<String>,
    pub confirmacao_senha: Option<String>,
    pub url_foto_documento: Option<String>,
}

impl HasPasswordPair for UpdateCyclistRequest {
    fn password(&self) -> Option<&str> {
        self.senha.as_deref()
    }

    fn password_confirmation(&self) -> Option<&str> {
        self.confirmacao_senha.as_deref()
    }
}

impl HasNationalityDocs for UpdateCyclistRequest {
    fn nationality(&self) -> Option<Nationality> {
        self.nacionalidade
    }

    fn cpf(&self) -> Option<&str> {
        self.cpf.as_deref()
    }

    fn passport_number(&self) -> Option<&str> {
        self.passaporte.as_ref().and_then(|p| p.numero.as_deref())
    }

    fn passport_country(&self) -> Option<&str> {
        self.passaporte.as_ref().and_then(|p| p.pais.as_deref())
    }

    fn passport_expiry(&self) -> Option<NaiveDate> {
        self.passaporte.as_ref().and_then(|p| p.validade)
    }
}

impl UpdateCyclistRequest {
    /// 構造検証を通してパッチに変換する
    pub fn validate(self) -> Result<CyclistPatch, ValidationError> {
        if let Some(nome) = &self.nome {
            require_non_blank(nome, "nome must not be blank")?;
        }
        check_optional_password_pair(&self)?;
        validate_document_patterns(&self)?;

        let cpf = self
            .cpf
            .map(Cpf::parse)
            .transpose()
            .map_err(|e| ValidationError::new(e.to_string()))?;

        Ok(CyclistPatch {
            name: self.nome,
            birth_date: self.nascimento,
            nationality: self.nacionalidade,
            cpf,
            passport: self.passaporte.map(PassportBody::into_patch),
            document_photo_url: self.url_foto_documento,
            password: self.senha,
        })
    }
}

/// レンタル開始リクエスト（POST /aluguel）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRequest {
    pub ciclista_id: Option<Uuid>,
    pub tranca_inicio_id: Option<i64>,
}

impl RentRequest {
    pub fn validate(&self) -> Result<(CyclistId, DockId), ValidationError> {
        let cyclist_id = self
            .ciclista_id
            .ok_or_else(|| ValidationError::new("ciclistaId is required"))?;
        let dock_id = self
            .tranca_inicio_id
            .ok_or_else(|| ValidationError::new("trancaInicioId is required"))?;
        Ok((CyclistId::from_uuid(cyclist_id), DockId::new(dock_id)))
    }
}

/// 返却リクエスト（POST /devolucao）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub ciclista_id: Option<Uuid>,
    pub tranca_fim_id: Option<i64>,
    /// 故障報告（省略時はfalse）
    #[serde(default)]
    pub defeito: bool,
}

impl ReturnRequest {
    pub fn validate(&self) -> Result<(CyclistId, DockId), ValidationError> {
        let cyclist_id = self
            .ciclista_id
            .ok_or_else(|| ValidationError::new("ciclistaId is required"))?;
        let dock_id = self
            .tranca_fim_id
            .ok_or_else(|| ValidationError::new("trancaFimId is required"))?;
        Ok((CyclistId::from_uuid(cyclist_id), DockId::new(dock_id)))
    }
}

// ============================================================================
// レスポンス型
// ============================================================================

/// パスポートのレスポンス表現
#[derive(Debug, Serialize, Deserialize)]
pub struct PassportView {
    pub numero: String,
    pub pais: String,
    pub validade: NaiveDate,
}

impl From<&Passport> for PassportView {
    fn from(passport: &Passport) -> Self {
        Self {
            numero: passport.number.clone(),
            pais: passport.country.clone(),
            validade: passport.expires_on,
        }
    }
}

/// サイクリストレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclistResponse {
    pub id: Uuid,
    pub nome: String,
    pub nascimento: NaiveDate,
    pub nacionalidade: Nationality,
    pub cpf: Option<String>,
    pub passaporte: Option<PassportView>,
    pub url_foto_documento: Option<String>,
    pub email: String,
    pub status: CyclistStatus,
}

impl From<Cyclist> for CyclistResponse {
    fn from(cyclist: Cyclist) -> Self {
        Self {
            id: cyclist.cyclist_id.value(),
            nome: cyclist.name.clone(),
            nascimento: cyclist.birth_date,
            nacionalidade: cyclist.nationality(),
            cpf: cyclist.document.cpf().map(|cpf| cpf.as_str().to_string()),
            passaporte: cyclist.document.passport().map(PassportView::from),
            url_foto_documento: cyclist.document_photo_url.clone(),
            email: cyclist.email.as_str().to_string(),
            status: cyclist.status,
        }
    }
}

/// クレジットカードレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    pub nome_titular: String,
    pub numero: String,
    pub validade: NaiveDate,
    pub cvv: String,
}

impl From<CreditCard> for CardResponse {
    fn from(card: CreditCard) -> Self {
        Self {
            nome_titular: card.holder_name,
            numero: card.number,
            validade: card.expires_on,
            cvv: card.cvv,
        }
    }
}

/// レンタルレスポンス（POST /aluguel と POST /devolucao）
///
/// 進行中は返却系フィールドがnull、valorExtraは0.00。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalResponse {
    pub id: Uuid,
    pub ciclista_id: Uuid,
    pub bicicleta_id: i64,
    pub tranca_inicio_id: i64,
    pub tranca_fim_id: Option<i64>,
    pub data_hora_inicio: DateTime<Utc>,
    pub data_hora_fim: Option<DateTime<Utc>>,
    pub cobranca_id: i64,
    pub valor_extra: Decimal,
}

impl From<OpenRental> for RentalResponse {
    fn from(rental: OpenRental) -> Self {
        Self {
            id: rental.rental_id.value(),
            ciclista_id: rental.cyclist_id.value(),
            bicicleta_id: rental.bicycle_id.value(),
            tranca_inicio_id: rental.start_dock_id.value(),
            tranca_fim_id: None,
            data_hora_inicio: rental.started_at,
            data_hora_fim: None,
            cobranca_id: rental.charge_id.value(),
            valor_extra: money(Decimal::ZERO),
        }
    }
}

impl From<ClosedRental> for RentalResponse {
    fn from(rental: ClosedRental) -> Self {
        Self {
            id: rental.rental_id.value(),
            ciclista_id: rental.cyclist_id.value(),
            bicicleta_id: rental.bicycle_id.value(),
            tranca_inicio_id: rental.start_dock_id.value(),
            tranca_fim_id: Some(rental.end_dock_id.value()),
            data_hora_inicio: rental.started_at,
            data_hora_fim: Some(rental.ended_at),
            cobranca_id: rental.charge_id.value(),
            valor_extra: money(rental.extra_charge),
        }
    }
}

/// 自転車レスポンス（GET /ciclista/{id}/bicicletaAlugada）
#[derive(Debug, Serialize, Deserialize)]
pub struct BicycleResponse {
    pub id: i64,
    pub status: String,
}

impl From<BicycleSnapshot> for BicycleResponse {
    fn from(snapshot: BicycleSnapshot) -> Self {
        Self {
            id: snapshot.bicycle_id.value(),
            status: snapshot.status.as_str().to_string(),
        }
    }
}
