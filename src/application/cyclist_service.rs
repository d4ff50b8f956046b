use crate::domain::commands::{ActivateCyclist, RegisterCyclist, ReplaceCard, UpdateCyclist};
use crate::domain::cyclist::{self, CreditCard, Cyclist, IdentityDocument};
use crate::domain::errors::{ActivateError, PatchError};
use crate::domain::value_objects::{CyclistId, EmailAddress};

use super::errors::{ApplicationError, Result};
use super::{ServiceDependencies, notify};

/// サイクリストを登録する
///
/// ビジネスルール：
/// - メールアドレスとCPFはシステム全体で一意
/// - クレジットカードは外部バリデータの承認が必須
/// - 登録直後は確認待ち状態で、確認依頼メールを送る
///
/// 構造検証はAPI層で完了している前提。
///
/// # 引数
/// * `deps` - サービスの依存関係
/// * `cmd` - 登録コマンド
///
/// # 戻り値
/// 成功時は作成されたサイクリスト
pub async fn register(deps: &ServiceDependencies, cmd: RegisterCyclist) -> Result<Cyclist> {
    // 1. メールアドレスの一意性確認
    let by_email = deps
        .cyclists
        .find_by_email(&cmd.email)
        .await
        .map_err(ApplicationError::Repository)?;

    if by_email.is_some() {
        return Err(ApplicationError::DuplicateEmail);
    }

    // 2. CPFの一意性確認（ブラジル国籍の場合のみ）
    if let IdentityDocument::NationalId(cpf) = &cmd.document {
        let by_cpf = deps
            .cyclists
            .find_by_cpf(cpf)
            .await
            .map_err(ApplicationError::Repository)?;

        if by_cpf.is_some() {
            return Err(ApplicationError::DuplicateCpf);
        }
    }

    // 3. カードの外部検証
    let card_accepted = deps
        .payment
        .validate_card(&cmd.card)
        .await
        .map_err(ApplicationError::ExternalService)?;

    if !card_accepted {
        return Err(ApplicationError::CardRejected);
    }

    // 4. ドメイン層の純粋関数で登録
    let cyclist = cyclist::register_cyclist(
        cmd.name,
        cmd.birth_date,
        cmd.document,
        cmd.email,
        cmd.password,
        cmd.document_photo_url,
        cmd.card,
    );

    // 5. 保存
    deps.cyclists
        .insert(&cyclist)
        .await
        .map_err(ApplicationError::Repository)?;

    // 6. 確認依頼の通知（ベストエフォート）
    notify(
        deps,
        &cyclist.email,
        "Confirm your registration",
        "Welcome! Confirm your registration to start renting bicycles.",
    )
    .await;

    Ok(cyclist)
}

/// サイクリストを有効化する
///
/// ビジネスルール: 確認待ち状態のサイクリストのみ有効化できる。
pub async fn activate(deps: &ServiceDependencies, cmd: ActivateCyclist) -> Result<Cyclist> {
    // 1. サイクリストの取得
    let cyclist = deps
        .cyclists
        .find_by_id(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    // 2. ドメイン層の純粋関数で有効化
    let activated = cyclist::activate_cyclist(cyclist, cmd.confirmed_at).map_err(|error| {
        match error {
            ActivateError::AlreadyActive => ApplicationError::AlreadyActivated,
        }
    })?;

    // 3. 保存
    deps.cyclists
        .update(&activated)
        .await
        .map_err(ApplicationError::Repository)?;

    Ok(activated)
}

/// サイクリストを取得する
pub async fn get_cyclist(deps: &ServiceDependencies, cyclist_id: CyclistId) -> Result<Cyclist> {
    deps.cyclists
        .find_by_id(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)
}

/// メールアドレスの登録有無を確認する
///
/// ビジネスルール: 形式が不正な場合はリポジトリに問い合わせず拒否する。
pub async fn email_exists(deps: &ServiceDependencies, raw_email: &str) -> Result<bool> {
    let email = EmailAddress::parse(raw_email).map_err(|_| ApplicationError::InvalidEmail)?;

    let found = deps
        .cyclists
        .find_by_email(&email)
        .await
        .map_err(ApplicationError::Repository)?;

    Ok(found.is_some())
}

/// サイクリストを部分更新する
///
/// ビジネスルール：
/// - 指定されたフィールドのみ更新する
/// - 国籍の切り替えには新しい種別の身分証明書が必須
/// - 成功時は更新通知を送る（ベストエフォート）
pub async fn update(deps: &ServiceDependencies, cmd: UpdateCyclist) -> Result<Cyclist> {
    // 1. サイクリストの取得
    let cyclist = deps
        .cyclists
        .find_by_id(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    // 2. ドメイン層の純粋関数でパッチ適用
    let updated = cyclist::apply_patch(cyclist, cmd.patch).map_err(|error| match error {
        PatchError::MissingNationalId => ApplicationError::Validation(
            "cpf is required for nacionalidade BRASILEIRO".to_string(),
        ),
        PatchError::IncompletePassport => ApplicationError::Validation(
            "a complete passaporte is required for nacionalidade ESTRANGEIRO".to_string(),
        ),
    })?;

    // 3. 保存
    deps.cyclists
        .update(&updated)
        .await
        .map_err(ApplicationError::Repository)?;

    // 4. 更新通知（ベストエフォート）
    notify(
        deps,
        &updated.email,
        "Registration updated",
        "Your registration data was updated.",
    )
    .await;

    Ok(updated)
}

/// 支払いカードを取得する
pub async fn get_card(deps: &ServiceDependencies, cyclist_id: CyclistId) -> Result<CreditCard> {
    let cyclist = deps
        .cyclists
        .find_by_id(cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    Ok(cyclist.card)
}

/// 支払いカードを差し替える
///
/// ビジネスルール: 新しいカードは外部バリデータの承認が必須。
pub async fn replace_card(deps: &ServiceDependencies, cmd: ReplaceCard) -> Result<CreditCard> {
    // 1. サイクリストの取得
    let mut cyclist = deps
        .cyclists
        .find_by_id(cmd.cyclist_id)
        .await
        .map_err(ApplicationError::Repository)?
        .ok_or(ApplicationError::CyclistNotFound)?;

    // 2. カードの外部検証
    let card_accepted = deps
        .payment
        .validate_card(&cmd.card)
        .await
        .map_err(ApplicationError::ExternalService)?;

    if !card_accepted {
        return Err(ApplicationError::CardRejected);
    }

    // 3. 差し替えて保存
    cyclist.card = cmd.card;
    deps.cyclists
        .update(&cyclist)
        .await
        .map_err(ApplicationError::Repository)?;

    // 4. 通知（ベストエフォート）
    notify(
        deps,
        &cyclist.email,
        "Payment method updated",
        "Your payment method was updated.",
    )
    .await;

    Ok(cyclist.card)
}
