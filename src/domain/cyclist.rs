use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ActivateError, PatchError};
use super::{Cpf, CyclistId, CyclistStatus, EmailAddress, Nationality};

// ============================================================================
// 値オブジェクト（サイクリスト固有）
// ============================================================================

/// パスポート（外国籍サイクリストの身分証明書）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passport {
    pub number: String,
    pub country: String,
    pub expires_on: NaiveDate,
}

/// 身分証明書
///
/// ビジネスルール：
/// - CPFとパスポートのどちらか一方のみを保持する（型で保証）
/// - 国籍は身分証明書の種別から導出される
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityDocument {
    NationalId(Cpf),
    Passport(Passport),
}

impl IdentityDocument {
    pub fn nationality(&self) -> Nationality {
        match self {
            IdentityDocument::NationalId(_) => Nationality::Brazilian,
            IdentityDocument::Passport(_) => Nationality::Foreign,
        }
    }

    pub fn cpf(&self) -> Option<&Cpf> {
        match self {
            IdentityDocument::NationalId(cpf) => Some(cpf),
            IdentityDocument::Passport(_) => None,
        }
    }

    pub fn passport(&self) -> Option<&Passport> {
        match self {
            IdentityDocument::NationalId(_) => None,
            IdentityDocument::Passport(passport) => Some(passport),
        }
    }
}

/// クレジットカード（支払い手段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub holder_name: String,
    pub number: String,
    pub expires_on: NaiveDate,
    pub cvv: String,
}

// ============================================================================
// サイクリスト集約
// ============================================================================

/// サイクリスト
///
/// ビジネスルール：
/// - 登録直後は確認待ち（PendingConfirmation）
/// - 有効化（Active）されるまでレンタル不可
/// - メールアドレスとCPFはシステム全体で一意
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cyclist {
    pub cyclist_id: CyclistId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub document: IdentityDocument,
    pub email: EmailAddress,
    pub password: String,
    pub document_photo_url: Option<String>,
    pub status: CyclistStatus,
    /// 有効化された時刻。確認待ちの間はNone。
    pub confirmed_at: Option<DateTime<Utc>>,
    pub card: CreditCard,
}

impl Cyclist {
    pub fn nationality(&self) -> Nationality {
        self.document.nationality()
    }

    pub fn is_active(&self) -> bool {
        self.status == CyclistStatus::Active
    }
}

// ============================================================================
// 部分更新（パッチ）
// ============================================================================

/// パスポートの部分更新
///
/// Noneのフィールドは現在値を維持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportPatch {
    pub number: Option<String>,
    pub country: Option<String>,
    pub expires_on: Option<NaiveDate>,
}

impl PassportPatch {
    /// 3フィールドすべてが揃っている場合のみ完全なパスポートを構築する
    pub fn complete(&self) -> Option<Passport> {
        Some(Passport {
            number: self.number.clone()?,
            country: self.country.clone()?,
            expires_on: self.expires_on?,
        })
    }
}

/// サイクリストの部分更新
///
/// ビジネスルール：
/// - Noneのフィールドは現在値を維持する（明示的パッチ構造）
/// - 国籍の切り替えには新しい種別の身分証明書が必須
/// - 国籍指定なしの身分証明書フィールドは、現在の種別と一致する場合のみ適用
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclistPatch {
    pub name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub nationality: Option<Nationality>,
    pub cpf: Option<Cpf>,
    pub passport: Option<PassportPatch>,
    pub document_photo_url: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：サイクリストを登録する
///
/// ビジネスルール：
/// - 初期状態は確認待ち（PendingConfirmation）
/// - 有効化されるまで confirmed_at はNone
///
/// 一意性チェックとカード検証はアプリケーション層の責務。
/// 副作用なし。新しいCyclistを返す。
pub fn register_cyclist(
    name: String,
    birth_date: NaiveDate,
    document: IdentityDocument,
    email: EmailAddress,
    password: String,
    document_photo_url: Option<String>,
    card: CreditCard,
) -> Cyclist {
    Cyclist {
        cyclist_id: CyclistId::new(),
        name,
        birth_date,
        document,
        email,
        password,
        document_photo_url,
        status: CyclistStatus::PendingConfirmation,
        confirmed_at: None,
        card,
    }
}

/// 純粋関数：サイクリストを有効化する
///
/// ビジネスルール：
/// - 確認待ち（PendingConfirmation）のサイクリストのみ有効化できる
/// - 有効化時刻を記録する
///
/// 副作用なし。更新されたCyclistを返す。
pub fn activate_cyclist(
    cyclist: Cyclist,
    confirmed_at: DateTime<Utc>,
) -> Result<Cyclist, ActivateError> {
    if cyclist.status != CyclistStatus::PendingConfirmation {
        return Err(ActivateError::AlreadyActive);
    }

    Ok(Cyclist {
        status: CyclistStatus::Active,
        confirmed_at: Some(confirmed_at),
        ..cyclist
    })
}

/// 純粋関数：部分更新を適用する
///
/// ビジネスルール：
/// - ブラジル国籍への切り替えにはCPFが必須。パスポートは破棄される
/// - 外国籍への切り替えには完全なパスポート（番号・国・有効期限）が必須。
///   CPFは破棄される
/// - 国籍指定がない場合、現在の証明書種別のフィールドのみ更新される
///   （パスポートはフィールド単位で個別更新可能）
///
/// 副作用なし。更新されたCyclistを返す。
pub fn apply_patch(cyclist: Cyclist, patch: CyclistPatch) -> Result<Cyclist, PatchError> {
    let document = patch_document(cyclist.document, &patch)?;

    Ok(Cyclist {
        name: patch.name.unwrap_or(cyclist.name),
        birth_date: patch.birth_date.unwrap_or(cyclist.birth_date),
        document,
        document_photo_url: patch.document_photo_url.or(cyclist.document_photo_url),
        password: patch.password.unwrap_or(cyclist.password),
        ..cyclist
    })
}

/// 身分証明書へのパッチ適用
fn patch_document(
    current: IdentityDocument,
    patch: &CyclistPatch,
) -> Result<IdentityDocument, PatchError> {
    match (patch.nationality, current) {
        // ブラジル国籍への切り替え：新しいCPFが必須
        (Some(Nationality::Brazilian), IdentityDocument::Passport(_)) => match &patch.cpf {
            Some(cpf) => Ok(IdentityDocument::NationalId(cpf.clone())),
            None => Err(PatchError::MissingNationalId),
        },
        // 外国籍への切り替え：完全なパスポートが必須
        (Some(Nationality::Foreign), IdentityDocument::NationalId(_)) => {
            let complete = patch.passport.as_ref().and_then(PassportPatch::complete);
            match complete {
                Some(passport) => Ok(IdentityDocument::Passport(passport)),
                None => Err(PatchError::IncompletePassport),
            }
        }
        // 国籍維持（指定なし含む）：現在の種別のフィールドのみ更新
        (_, IdentityDocument::NationalId(cpf)) => Ok(IdentityDocument::NationalId(
            patch.cpf.clone().unwrap_or(cpf),
        )),
        (_, IdentityDocument::Passport(passport)) => {
            let merged = match &patch.passport {
                Some(fields) => Passport {
                    number: fields.number.clone().unwrap_or(passport.number),
                    country: fields.country.clone().unwrap_or(passport.country),
                    expires_on: fields.expires_on.unwrap_or(passport.expires_on),
                },
                None => passport,
            };
            Ok(IdentityDocument::Passport(merged))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brazilian_document() -> IdentityDocument {
        IdentityDocument::NationalId(Cpf::parse("12345678901").unwrap())
    }

    fn foreign_document() -> IdentityDocument {
        IdentityDocument::Passport(Passport {
            number: "AB123456".to_string(),
            country: "AR".to_string(),
            expires_on: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        })
    }

    fn sample_card() -> CreditCard {
        CreditCard {
            holder_name: "Maria Silva".to_string(),
            number: "4111111111111111".to_string(),
            expires_on: NaiveDate::from_ymd_opt(2030, 12, 1).unwrap(),
            cvv: "123".to_string(),
        }
    }

    fn sample_cyclist(document: IdentityDocument) -> Cyclist {
        register_cyclist(
            "Maria Silva".to_string(),
            NaiveDate::from_ymd_opt(1995, 3, 10).unwrap(),
            document,
            EmailAddress::parse("maria@example.com").unwrap(),
            "s3nha-forte".to_string(),
            None,
            sample_card(),
        )
    }

    // TDD: register_cyclist() のテスト
    #[test]
    fn test_register_starts_pending_confirmation() {
        let cyclist = sample_cyclist(brazilian_document());

        assert_eq!(cyclist.status, CyclistStatus::PendingConfirmation);
        assert_eq!(cyclist.confirmed_at, None);
        assert!(!cyclist.is_active());
    }

    #[test]
    fn test_register_derives_nationality_from_document() {
        let brazilian = sample_cyclist(brazilian_document());
        let foreign = sample_cyclist(foreign_document());

        assert_eq!(brazilian.nationality(), Nationality::Brazilian);
        assert_eq!(foreign.nationality(), Nationality::Foreign);
    }

    // TDD: activate_cyclist() のテスト
    #[test]
    fn test_activate_pending_cyclist() {
        let cyclist = sample_cyclist(brazilian_document());
        let confirmed_at = Utc::now();

        let activated = activate_cyclist(cyclist, confirmed_at).unwrap();

        assert_eq!(activated.status, CyclistStatus::Active);
        assert_eq!(activated.confirmed_at, Some(confirmed_at));
        assert!(activated.is_active());
    }

    #[test]
    fn test_activate_already_active_fails() {
        let cyclist = sample_cyclist(brazilian_document());
        let activated = activate_cyclist(cyclist, Utc::now()).unwrap();

        let result = activate_cyclist(activated, Utc::now());

        assert_eq!(result.unwrap_err(), ActivateError::AlreadyActive);
    }

    // TDD: apply_patch() のテスト
    #[test]
    fn test_patch_name_only_keeps_other_fields() {
        let cyclist = sample_cyclist(brazilian_document());
        let email = cyclist.email.clone();
        let patch = CyclistPatch {
            name: Some("Maria Souza".to_string()),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.name, "Maria Souza");
        assert_eq!(updated.email, email);
        assert_eq!(updated.nationality(), Nationality::Brazilian);
    }

    #[test]
    fn test_patch_updates_cpf_for_brazilian_without_switch() {
        let cyclist = sample_cyclist(brazilian_document());
        let patch = CyclistPatch {
            cpf: Some(Cpf::parse("98765432109").unwrap()),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.document.cpf().unwrap().as_str(), "98765432109");
    }

    #[test]
    fn test_patch_ignores_cpf_for_foreigner_without_switch() {
        let cyclist = sample_cyclist(foreign_document());
        let patch = CyclistPatch {
            cpf: Some(Cpf::parse("98765432109").unwrap()),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.nationality(), Nationality::Foreign);
        assert_eq!(updated.document.cpf(), None);
    }

    #[test]
    fn test_patch_updates_single_passport_field() {
        let cyclist = sample_cyclist(foreign_document());
        let patch = CyclistPatch {
            passport: Some(PassportPatch {
                country: Some("CL".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        let passport = updated.document.passport().unwrap();
        assert_eq!(passport.country, "CL");
        // 他のパスポートフィールドは維持される
        assert_eq!(passport.number, "AB123456");
    }

    #[test]
    fn test_switch_to_foreign_requires_complete_passport() {
        let cyclist = sample_cyclist(brazilian_document());
        let patch = CyclistPatch {
            nationality: Some(Nationality::Foreign),
            passport: Some(PassportPatch {
                number: Some("XY999".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let result = apply_patch(cyclist, patch);

        assert_eq!(result.unwrap_err(), PatchError::IncompletePassport);
    }

    #[test]
    fn test_switch_to_foreign_replaces_document() {
        let cyclist = sample_cyclist(brazilian_document());
        let patch = CyclistPatch {
            nationality: Some(Nationality::Foreign),
            passport: Some(PassportPatch {
                number: Some("XY999".to_string()),
                country: Some("UY".to_string()),
                expires_on: NaiveDate::from_ymd_opt(2031, 6, 1),
            }),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.nationality(), Nationality::Foreign);
        assert_eq!(updated.document.cpf(), None);
        assert_eq!(updated.document.passport().unwrap().number, "XY999");
    }

    #[test]
    fn test_switch_to_brazilian_requires_cpf() {
        let cyclist = sample_cyclist(foreign_document());
        let patch = CyclistPatch {
            nationality: Some(Nationality::Brazilian),
            ..Default::default()
        };

        let result = apply_patch(cyclist, patch);

        assert_eq!(result.unwrap_err(), PatchError::MissingNationalId);
    }

    #[test]
    fn test_switch_to_brazilian_clears_passport() {
        let cyclist = sample_cyclist(foreign_document());
        let patch = CyclistPatch {
            nationality: Some(Nationality::Brazilian),
            cpf: Some(Cpf::parse("12345678901").unwrap()),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.nationality(), Nationality::Brazilian);
        assert_eq!(updated.document.passport(), None);
    }

    #[test]
    fn test_patch_password_and_photo_url() {
        let cyclist = sample_cyclist(brazilian_document());
        let patch = CyclistPatch {
            password: Some("nova-senha".to_string()),
            document_photo_url: Some("https://fotos.example.com/doc.png".to_string()),
            ..Default::default()
        };

        let updated = apply_patch(cyclist, patch).unwrap();

        assert_eq!(updated.password, "nova-senha");
        assert_eq!(
            updated.document_photo_url.as_deref(),
            Some("https://fotos.example.com/doc.png")
        );
    }
}
