use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cyclist::CreditCard;
use crate::domain::value_objects::{ChargeId, CyclistId, EmailAddress};
use crate::ports::notification_gateway::NotificationGateway as NotificationGatewayTrait;
use crate::ports::payment_gateway::{
    ChargeReceipt, PaymentGateway as PaymentGatewayTrait, Result,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 課金リクエストのワイヤ表現
#[derive(Debug, Serialize)]
struct ChargeRequest {
    valor: f64,
    ciclista: Uuid,
}

/// 課金レスポンスのワイヤ表現
///
/// 決済サービスはstatus/horaSolicitacao等も返すが、
/// コアが保持するのはトランザクションIDのみ。
#[derive(Debug, Deserialize)]
struct ChargeResponse {
    id: i64,
}

/// カード検証リクエストのワイヤ表現
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardPayload<'a> {
    nome_titular: &'a str,
    numero: &'a str,
    validade: NaiveDate,
    cvv: &'a str,
}

/// メール送信リクエストのワイヤ表現
#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    email: &'a str,
    assunto: &'a str,
    mensagem: &'a str,
}

/// 金額をワイヤ表現（倍精度）に変換する
fn amount_to_wire(amount: Decimal) -> Result<f64> {
    amount
        .to_f64()
        .ok_or_else(|| "amount not representable on the wire".into())
}

/// PaymentGatewayとNotificationGatewayのHTTP実装
///
/// 課金・課金キュー・カード検証・メール送信はすべて同一の
/// 外部サービスが提供するため、1つのクライアントで両ポートを実装する。
pub struct ExternalClient {
    client: Client,
    base_url: String,
}

impl ExternalClient {
    /// ベースURLから新しいExternalClientを作成
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGatewayTrait for ExternalClient {
    async fn charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<ChargeReceipt> {
        let url = format!("{}/cobranca", self.base_url);
        let request = ChargeRequest {
            valor: amount_to_wire(amount)?,
            ciclista: cyclist_id.value(),
        };
        let payload: ChargeResponse = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ChargeReceipt {
            charge_id: ChargeId::new(payload.id),
        })
    }

    async fn enqueue_charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<()> {
        let url = format!("{}/filaCobranca", self.base_url);
        let request = ChargeRequest {
            valor: amount_to_wire(amount)?,
            ciclista: cyclist_id.value(),
        };
        self.client
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// カードを外部バリデータで検証する
    ///
    /// 422はカードの拒否として扱い、Ok(false)を返す。
    async fn validate_card(&self, card: &CreditCard) -> Result<bool> {
        let url = format!("{}/validaCartaoDeCredito", self.base_url);
        let payload = CardPayload {
            nome_titular: &card.holder_name,
            numero: &card.number,
            validade: card.expires_on,
            cvv: &card.cvv,
        };
        let response = self.client.post(&url).json(&payload).send().await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }
}

#[async_trait]
impl NotificationGatewayTrait for ExternalClient {
    async fn send(&self, email: &EmailAddress, subject: &str, body: &str) -> Result<()> {
        let url = format!("{}/enviarEmail", self.base_url);
        let payload = EmailPayload {
            email: email.as_str(),
            assunto: subject,
            mensagem: body,
        };
        self.client
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
