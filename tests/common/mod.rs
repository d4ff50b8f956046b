use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use rusty_bikeshare_ddd::adapters::mock::{
    CyclistRepository, EquipmentGateway, NotificationGateway, PaymentGateway, RentalRepository,
};
use rusty_bikeshare_ddd::application::ServiceDependencies;
use rusty_bikeshare_ddd::domain::billing::BillingPolicy;
use rusty_bikeshare_ddd::domain::cyclist::{self, CreditCard, IdentityDocument};
use rusty_bikeshare_ddd::domain::value_objects::{
    BicycleId, BicycleStatus, Cpf, CyclistId, DockId, EmailAddress,
};
use rusty_bikeshare_ddd::ports::CyclistRepository as _;

/// テスト用の依存一式
///
/// ServiceDependenciesはポートのtraitオブジェクト越しにアダプタを持つため、
/// 記録アクセサや失敗スイッチに触れられるよう具象モックへの参照も併せて保持する。
pub struct TestContext {
    pub deps: ServiceDependencies,
    pub cyclists: Arc<CyclistRepository>,
    pub rentals: Arc<RentalRepository>,
    pub equipment: Arc<EquipmentGateway>,
    pub payment: Arc<PaymentGateway>,
    pub notifier: Arc<NotificationGateway>,
}

/// インメモリアダプタ一式でServiceDependenciesを組み立てる
///
/// 本番と同じBillingPolicy::default()（初期料金10.00、無料120分、
/// 30分ブロック5.00）を使用する。
pub fn test_context() -> TestContext {
    let cyclists = Arc::new(CyclistRepository::new());
    let rentals = Arc::new(RentalRepository::new());
    let equipment = Arc::new(EquipmentGateway::new());
    let payment = Arc::new(PaymentGateway::new());
    let notifier = Arc::new(NotificationGateway::new());

    let deps = ServiceDependencies {
        cyclists: cyclists.clone(),
        rentals: rentals.clone(),
        equipment: equipment.clone(),
        payment: payment.clone(),
        notifier: notifier.clone(),
        billing: BillingPolicy::default(),
    };

    TestContext {
        deps,
        cyclists,
        rentals,
        equipment,
        payment,
        notifier,
    }
}

/// 有効期限が十分先の有効なカード
pub fn sample_card() -> CreditCard {
    CreditCard {
        holder_name: "MARIA SOUZA".to_string(),
        number: "4111111111111111".to_string(),
        expires_on: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap(),
        cvv: "123".to_string(),
    }
}

/// ブラジル国籍のサイクリストをリポジトリへ直接登録する
///
/// `active`がtrueなら有効化済み、falseなら確認待ちの状態で保存する。
pub async fn seed_cyclist(ctx: &TestContext, email: &str, cpf: &str, active: bool) -> CyclistId {
    let cyclist = cyclist::register_cyclist(
        "Maria Souza".to_string(),
        NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
        IdentityDocument::NationalId(Cpf::parse(cpf).unwrap()),
        EmailAddress::parse(email).unwrap(),
        "segredo123".to_string(),
        None,
        sample_card(),
    );

    let cyclist = if active {
        cyclist::activate_cyclist(cyclist, Utc::now()).unwrap()
    } else {
        cyclist
    };

    ctx.cyclists.insert(&cyclist).await.unwrap();
    cyclist.cyclist_id
}

/// 利用可能な自転車入りのトランカを設備モックへ登録する
pub fn seed_dock_with_bicycle(
    ctx: &TestContext,
    dock_id: i64,
    bicycle_id: i64,
) -> (DockId, BicycleId) {
    let dock = DockId::new(dock_id);
    let bicycle = BicycleId::new(bicycle_id);
    ctx.equipment.add_bicycle(bicycle, BicycleStatus::Available);
    ctx.equipment.add_dock(dock, Some(bicycle));
    (dock, bicycle)
}
