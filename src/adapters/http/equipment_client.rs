use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::value_objects::{BicycleId, BicycleStatus, DockId};
use crate::ports::equipment_gateway::{
    BicycleSnapshot, DockSnapshot, EquipmentGateway as EquipmentGatewayTrait, Result,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// トランカ照会のワイヤ表現
///
/// 設備サービスはこの他にnumero/localizacao等も返すが、
/// レンタルコンテキストが必要とするフィールドのみ取り込む。
#[derive(Debug, Deserialize)]
struct DockPayload {
    id: i64,
    bicicleta: Option<i64>,
    status: String,
}

/// 自転車照会のワイヤ表現
#[derive(Debug, Deserialize)]
struct BicyclePayload {
    id: i64,
    status: String,
}

/// EquipmentGatewayのHTTP実装
///
/// 設備管理サービス（トランカ・自転車）のREST APIを呼び出す。
/// 施錠・解錠は対象の自転車IDをボディで明示する。
pub struct EquipmentClient {
    client: Client,
    base_url: String,
}

impl EquipmentClient {
    /// ベースURLから新しいEquipmentClientを作成
    pub fn new(base_url: impl Into<String>) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EquipmentGatewayTrait for EquipmentClient {
    async fn get_dock(&self, dock_id: DockId) -> Result<DockSnapshot> {
        let url = format!("{}/tranca/{}", self.base_url, dock_id.value());
        let payload: DockPayload = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(DockSnapshot {
            dock_id: DockId::new(payload.id),
            bicycle_id: payload.bicicleta.map(BicycleId::new),
            status: payload.status,
        })
    }

    async fn get_bicycle(&self, bicycle_id: BicycleId) -> Result<BicycleSnapshot> {
        let url = format!("{}/bicicleta/{}", self.base_url, bicycle_id.value());
        let payload: BicyclePayload = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(BicycleSnapshot {
            bicycle_id: BicycleId::new(payload.id),
            status: payload.status.parse()?,
        })
    }

    /// ドックを解錠する
    ///
    /// 422は設備側の拒否として扱い、Ok(false)を返す。
    async fn unlock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool> {
        let url = format!("{}/tranca/{}/destrancar", self.base_url, dock_id.value());
        let response = self
            .client
            .post(&url)
            .json(&bicycle_id.value())
            .send()
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    /// ドックを施錠する
    ///
    /// 422は設備側の拒否として扱い、Ok(false)を返す。
    async fn lock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool> {
        let url = format!("{}/tranca/{}/trancar", self.base_url, dock_id.value());
        let response = self
            .client
            .post(&url)
            .json(&bicycle_id.value())
            .send()
            .await?;

        if response.status() == StatusCode::UNPROCESSABLE_ENTITY {
            return Ok(false);
        }
        response.error_for_status()?;
        Ok(true)
    }

    async fn set_bicycle_status(&self, bicycle_id: BicycleId, status: BicycleStatus) -> Result<()> {
        let url = format!(
            "{}/bicicleta/{}/status/{}",
            self.base_url,
            bicycle_id.value(),
            status.as_str()
        );
        self.client.post(&url).send().await?.error_for_status()?;
        Ok(())
    }
}
