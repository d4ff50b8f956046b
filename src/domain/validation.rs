use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::Nationality;

// ============================================================================
// 構造検証（リクエスト型に共通のルール）
// ============================================================================

/// 構造検証のエラー
///
/// 最初に違反した制約のメッセージをそのまま保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

static CPF_RE: OnceLock<Regex> = OnceLock::new();
static CARD_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
static CVV_RE: OnceLock<Regex> = OnceLock::new();

fn cpf_regex() -> &'static Regex {
    CPF_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{11}$").unwrap_or_else(|e| panic!("invalid CPF pattern: {e}"))
    })
}

fn card_number_regex() -> &'static Regex {
    CARD_NUMBER_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{16}$").unwrap_or_else(|e| panic!("invalid card number pattern: {e}"))
    })
}

fn cvv_regex() -> &'static Regex {
    CVV_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{3,4}$").unwrap_or_else(|e| panic!("invalid CVV pattern: {e}"))
    })
}

// ============================================================================
// ケイパビリティトレイト
// ============================================================================

/// パスワードと確認入力を持つリクエスト
///
/// 登録（必須）と部分更新（任意）のリクエスト型が共通で実装する。
pub trait HasPasswordPair {
    fn password(&self) -> Option<&str>;
    fn password_confirmation(&self) -> Option<&str>;
}

/// 国籍と身分証明書フィールドを持つリクエスト
pub trait HasNationalityDocs {
    fn nationality(&self) -> Option<Nationality>;
    fn cpf(&self) -> Option<&str>;
    fn passport_number(&self) -> Option<&str>;
    fn passport_country(&self) -> Option<&str>;
    fn passport_expiry(&self) -> Option<NaiveDate>;
}

// ============================================================================
// 純粋関数：検証ルール
// ============================================================================

/// 純粋関数：必須フィールドが空白でないことを検証する
pub fn require_non_blank(value: &str, message: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(message));
    }
    Ok(())
}

/// 純粋関数：パスワードと確認入力の両方が存在し、一致することを検証する
///
/// 登録リクエスト用。
pub fn require_password_pair(subject: &impl HasPasswordPair) -> Result<(), ValidationError> {
    let password = subject
        .password()
        .ok_or_else(|| ValidationError::new("senha is required"))?;
    require_non_blank(password, "senha must not be blank")?;
    match subject.password_confirmation() {
        Some(confirmation) if confirmation == password => Ok(()),
        Some(_) => Err(ValidationError::new(
            "senha and confirmacaoSenha do not match",
        )),
        None => Err(ValidationError::new("confirmacaoSenha is required")),
    }
}

/// 純粋関数：パスワードが指定された場合のみ、確認入力との一致を検証する
///
/// 部分更新リクエスト用。パスワード変更なしなら何も要求しない。
pub fn check_optional_password_pair(subject: &impl HasPasswordPair) -> Result<(), ValidationError> {
    match subject.password() {
        Some(password) => {
            require_non_blank(password, "senha must not be blank")?;
            match subject.password_confirmation() {
                Some(confirmation) if confirmation == password => Ok(()),
                Some(_) => Err(ValidationError::new(
                    "senha and confirmacaoSenha do not match",
                )),
                None => Err(ValidationError::new("confirmacaoSenha is required")),
            }
        }
        None => Ok(()),
    }
}

/// 純粋関数：身分証明書フィールドの形式を検証する
///
/// 存在するフィールドのみ検証する（部分更新でも共用）。
pub fn validate_document_patterns(
    subject: &impl HasNationalityDocs,
) -> Result<(), ValidationError> {
    if let Some(cpf) = subject.cpf() {
        if !cpf_regex().is_match(cpf) {
            return Err(ValidationError::new("cpf must be exactly 11 digits"));
        }
    }
    if let Some(number) = subject.passport_number() {
        require_non_blank(number, "passaporte.numero must not be blank")?;
    }
    if let Some(country) = subject.passport_country() {
        require_non_blank(country, "passaporte.pais must not be blank")?;
    }
    Ok(())
}

/// 純粋関数：国籍に応じた身分証明書の完全性を検証する
///
/// ビジネスルール：
/// - 国籍は必須
/// - ブラジル国籍（BRASILEIRO）ならCPFが必須
/// - 外国籍（ESTRANGEIRO）ならパスポートの全フィールドが必須
///
/// 登録リクエスト用。形式の検証は validate_document_patterns が担う。
pub fn require_identity_documents(
    subject: &impl HasNationalityDocs,
) -> Result<(), ValidationError> {
    let nationality = subject
        .nationality()
        .ok_or_else(|| ValidationError::new("nacionalidade is required"))?;

    match nationality {
        Nationality::Brazilian => {
            if subject.cpf().is_none() {
                return Err(ValidationError::new(
                    "cpf is required for nacionalidade BRASILEIRO",
                ));
            }
        }
        Nationality::Foreign => {
            let complete = subject.passport_number().is_some()
                && subject.passport_country().is_some()
                && subject.passport_expiry().is_some();
            if !complete {
                return Err(ValidationError::new(
                    "a complete passaporte is required for nacionalidade ESTRANGEIRO",
                ));
            }
        }
    }
    Ok(())
}

/// 純粋関数：クレジットカードの構造を検証する
///
/// ビジネスルール：
/// - カード番号は数字16桁
/// - CVVは数字3〜4桁
/// - 有効期限は基準日より後（期限切れカードは受け付けない）
///
/// 外部バリデータによる与信チェックはアプリケーション層の責務。
pub fn validate_card_details(
    holder_name: &str,
    number: &str,
    expires_on: NaiveDate,
    cvv: &str,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    require_non_blank(holder_name, "meioDePagamento.nomeTitular must not be blank")?;
    if !card_number_regex().is_match(number) {
        return Err(ValidationError::new(
            "meioDePagamento.numero must be exactly 16 digits",
        ));
    }
    if !cvv_regex().is_match(cvv) {
        return Err(ValidationError::new(
            "meioDePagamento.cvv must be 3 or 4 digits",
        ));
    }
    if expires_on <= today {
        return Err(ValidationError::new("meioDePagamento.validade has expired"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRequest {
        password: Option<String>,
        confirmation: Option<String>,
        nationality: Option<Nationality>,
        cpf: Option<String>,
        passport_number: Option<String>,
        passport_country: Option<String>,
        passport_expiry: Option<NaiveDate>,
    }

    impl FakeRequest {
        fn empty() -> Self {
            Self {
                password: None,
                confirmation: None,
                nationality: None,
                cpf: None,
                passport_number: None,
                passport_country: None,
                passport_expiry: None,
            }
        }
    }

    impl HasPasswordPair for FakeRequest {
        fn password(&self) -> Option<&str> {
            self.password.as_deref()
        }

        fn password_confirmation(&self) -> Option<&str> {
            self.confirmation.as_deref()
        }
    }

    impl HasNationalityDocs for FakeRequest {
        fn nationality(&self) -> Option<Nationality> {
            self.nationality
        }

        fn cpf(&self) -> Option<&str> {
            self.cpf.as_deref()
        }

        fn passport_number(&self) -> Option<&str> {
            self.passport_number.as_deref()
        }

        fn passport_country(&self) -> Option<&str> {
            self.passport_country.as_deref()
        }

        fn passport_expiry(&self) -> Option<NaiveDate> {
            self.passport_expiry
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    // TDD: require_password_pair() のテスト
    #[test]
    fn test_password_pair_matching_passes() {
        let request = FakeRequest {
            password: Some("segredo".to_string()),
            confirmation: Some("segredo".to_string()),
            ..FakeRequest::empty()
        };

        assert!(require_password_pair(&request).is_ok());
    }

    #[test]
    fn test_password_pair_mismatch_fails() {
        let request = FakeRequest {
            password: Some("segredo".to_string()),
            confirmation: Some("outra".to_string()),
            ..FakeRequest::empty()
        };

        let err = require_password_pair(&request).unwrap_err();
        assert_eq!(err.message, "senha and confirmacaoSenha do not match");
    }

    #[test]
    fn test_password_pair_missing_confirmation_fails() {
        let request = FakeRequest {
            password: Some("segredo".to_string()),
            ..FakeRequest::empty()
        };

        let err = require_password_pair(&request).unwrap_err();
        assert_eq!(err.message, "confirmacaoSenha is required");
    }

    // TDD: check_optional_password_pair() のテスト
    #[test]
    fn test_optional_password_absent_is_ok() {
        let request = FakeRequest::empty();

        assert!(check_optional_password_pair(&request).is_ok());
    }

    #[test]
    fn test_optional_password_present_must_match() {
        let request = FakeRequest {
            password: Some("nova".to_string()),
            confirmation: Some("errada".to_string()),
            ..FakeRequest::empty()
        };

        assert!(check_optional_password_pair(&request).is_err());
    }

    // TDD: require_identity_documents() のテスト
    #[test]
    fn test_brazilian_requires_cpf() {
        let request = FakeRequest {
            nationality: Some(Nationality::Brazilian),
            ..FakeRequest::empty()
        };

        let err = require_identity_documents(&request).unwrap_err();
        assert_eq!(err.message, "cpf is required for nacionalidade BRASILEIRO");
    }

    #[test]
    fn test_foreign_requires_complete_passport() {
        let request = FakeRequest {
            nationality: Some(Nationality::Foreign),
            passport_number: Some("AB123".to_string()),
            // pais と validade が欠けている
            ..FakeRequest::empty()
        };

        assert!(require_identity_documents(&request).is_err());
    }

    #[test]
    fn test_foreign_with_full_passport_passes() {
        let request = FakeRequest {
            nationality: Some(Nationality::Foreign),
            passport_number: Some("AB123".to_string()),
            passport_country: Some("AR".to_string()),
            passport_expiry: Some(today()),
            ..FakeRequest::empty()
        };

        assert!(require_identity_documents(&request).is_ok());
    }

    #[test]
    fn test_missing_nationality_fails() {
        let request = FakeRequest {
            cpf: Some("12345678901".to_string()),
            ..FakeRequest::empty()
        };

        let err = require_identity_documents(&request).unwrap_err();
        assert_eq!(err.message, "nacionalidade is required");
    }

    // TDD: validate_document_patterns() のテスト
    #[test]
    fn test_cpf_with_wrong_length_fails() {
        let request = FakeRequest {
            cpf: Some("123".to_string()),
            ..FakeRequest::empty()
        };

        let err = validate_document_patterns(&request).unwrap_err();
        assert_eq!(err.message, "cpf must be exactly 11 digits");
    }

    #[test]
    fn test_cpf_with_letters_fails() {
        let request = FakeRequest {
            cpf: Some("1234567890a".to_string()),
            ..FakeRequest::empty()
        };

        assert!(validate_document_patterns(&request).is_err());
    }

    #[test]
    fn test_absent_documents_pass_pattern_check() {
        assert!(validate_document_patterns(&FakeRequest::empty()).is_ok());
    }

    // TDD: validate_card_details() のテスト
    #[test]
    fn test_valid_card_passes() {
        let result = validate_card_details(
            "Maria Silva",
            "4111111111111111",
            NaiveDate::from_ymd_opt(2030, 12, 1).unwrap(),
            "123",
            today(),
        );

        assert!(result.is_ok());
    }

    #[test]
    fn test_card_number_must_be_16_digits() {
        let result = validate_card_details(
            "Maria Silva",
            "41111111",
            NaiveDate::from_ymd_opt(2030, 12, 1).unwrap(),
            "123",
            today(),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_cvv_accepts_three_or_four_digits() {
        let expires = NaiveDate::from_ymd_opt(2030, 12, 1).unwrap();

        assert!(validate_card_details("M", "4111111111111111", expires, "123", today()).is_ok());
        assert!(validate_card_details("M", "4111111111111111", expires, "1234", today()).is_ok());
        assert!(validate_card_details("M", "4111111111111111", expires, "12", today()).is_err());
        assert!(validate_card_details("M", "4111111111111111", expires, "12345", today()).is_err());
    }

    #[test]
    fn test_expired_card_fails() {
        let result = validate_card_details(
            "Maria Silva",
            "4111111111111111",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "123",
            today(),
        );

        let err = result.unwrap_err();
        assert_eq!(err.message, "meioDePagamento.validade has expired");
    }

    #[test]
    fn test_card_expiring_today_is_rejected() {
        let result = validate_card_details("Maria Silva", "4111111111111111", today(), "123", today());

        assert!(result.is_err());
    }

    #[test]
    fn test_blank_holder_name_fails() {
        let result = validate_card_details(
            "  ",
            "4111111111111111",
            NaiveDate::from_ymd_opt(2030, 12, 1).unwrap(),
            "123",
            today(),
        );

        assert!(result.is_err());
    }
}
