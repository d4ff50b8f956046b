use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// サイクリストID - 利用者管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CyclistId(Uuid);

impl CyclistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for CyclistId {
    fn default() -> Self {
        Self::new()
    }
}

/// レンタルID - レンタル管理コンテキストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RentalId(Uuid);

impl RentalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for RentalId {
    fn default() -> Self {
        Self::new()
    }
}

/// 課金トランザクションID - 決済コンテキストが採番する整数ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChargeId(i64);

impl ChargeId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 自転車ID - 設備管理サービスが採番する整数ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BicycleId(i64);

impl BicycleId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// トランカ（ドック）ID - 設備管理サービスが採番する整数ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DockId(i64);

impl DockId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// メールアドレスの形式エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidEmailFormat;

impl fmt::Display for InvalidEmailFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid email format")
    }
}

impl std::error::Error for InvalidEmailFormat {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$")
            .unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
    })
}

/// メールアドレス
///
/// 不変条件：`local@domain.tld` 形式の厳密な正規表現を満たすこと。
/// コンストラクタでのみ検証するため、保持中の値は常に正しい形式である。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// 形式を検証してメールアドレスを生成する
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidEmailFormat> {
        let raw = raw.into();
        if email_regex().is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(InvalidEmailFormat)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = InvalidEmailFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CPF（ブラジルの個人納税者番号）の形式エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCpf;

impl fmt::Display for InvalidCpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CPF must be exactly 11 digits")
    }
}

impl std::error::Error for InvalidCpf {}

/// CPF - 国内サイクリストの身分証明番号
///
/// 不変条件：数字ちょうど11桁。チェックディジットの検証は上流サービスの
/// 責務のため行わない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// 桁数と数字のみであることを検証してCPFを生成する
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidCpf> {
        let raw = raw.into();
        if raw.len() == 11 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(InvalidCpf)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cpf {
    type Error = InvalidCpf;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 国籍区分
///
/// ワイヤ表現は上流のブラジル側サービスに合わせる（BRASILEIRO / ESTRANGEIRO）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nationality {
    #[serde(rename = "BRASILEIRO")]
    Brazilian,
    #[serde(rename = "ESTRANGEIRO")]
    Foreign,
}

impl Nationality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nationality::Brazilian => "BRASILEIRO",
            Nationality::Foreign => "ESTRANGEIRO",
        }
    }
}

/// サイクリストの登録状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclistStatus {
    /// 登録済みだがメール確認待ち
    #[serde(rename = "AGUARDANDO_CONFIRMACAO")]
    PendingConfirmation,
    /// 有効化済み（レンタル可能）
    #[serde(rename = "ATIVO")]
    Active,
}

impl CyclistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclistStatus::PendingConfirmation => "AGUARDANDO_CONFIRMACAO",
            CyclistStatus::Active => "ATIVO",
        }
    }
}

impl FromStr for CyclistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AGUARDANDO_CONFIRMACAO" => Ok(CyclistStatus::PendingConfirmation),
            "ATIVO" => Ok(CyclistStatus::Active),
            other => Err(format!("unknown cyclist status: {other}")),
        }
    }
}

/// 自転車の状態
///
/// 状態は設備管理サービスが保持する。コアは返却時の遷移先
/// （故障報告あり→EM_REPARO、なし→DISPONIVEL）だけを決定する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BicycleStatus {
    #[serde(rename = "DISPONIVEL")]
    Available,
    #[serde(rename = "EM_USO")]
    InUse,
    #[serde(rename = "EM_REPARO")]
    UnderRepair,
}

impl BicycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BicycleStatus::Available => "DISPONIVEL",
            BicycleStatus::InUse => "EM_USO",
            BicycleStatus::UnderRepair => "EM_REPARO",
        }
    }
}

impl FromStr for BicycleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISPONIVEL" => Ok(BicycleStatus::Available),
            "EM_USO" => Ok(BicycleStatus::InUse),
            "EM_REPARO" => Ok(BicycleStatus::UnderRepair),
            other => Err(format!("unknown bicycle status: {other}")),
        }
    }
}
