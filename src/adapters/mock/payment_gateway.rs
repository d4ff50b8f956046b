use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::cyclist::CreditCard;
use crate::domain::value_objects::{ChargeId, CyclistId};
use crate::ports::payment_gateway::{
    ChargeReceipt, PaymentGateway as PaymentGatewayTrait, Result,
};

/// PaymentGatewayのモック実装
///
/// 即時課金とキュー投入をすべて記録し、テストから課金の有無と金額を
/// 検証できるようにする。失敗スイッチでフォールバック経路を再現可能。
pub struct PaymentGateway {
    charges: Mutex<Vec<(CyclistId, Decimal)>>,
    queued: Mutex<Vec<(CyclistId, Decimal)>>,
    next_charge_id: AtomicI64,
    fail_charges: AtomicBool,
    fail_enqueue: AtomicBool,
    reject_cards: AtomicBool,
}

impl PaymentGateway {
    pub fn new() -> Self {
        Self {
            charges: Mutex::new(Vec::new()),
            queued: Mutex::new(Vec::new()),
            next_charge_id: AtomicI64::new(1),
            fail_charges: AtomicBool::new(false),
            fail_enqueue: AtomicBool::new(false),
            reject_cards: AtomicBool::new(false),
        }
    }

    /// 即時課金を失敗させる
    pub fn set_charge_failure(&self, fail: bool) {
        self.fail_charges.store(fail, Ordering::SeqCst);
    }

    /// 後日請求キューも失敗させる
    pub fn set_enqueue_failure(&self, fail: bool) {
        self.fail_enqueue.store(fail, Ordering::SeqCst);
    }

    /// カードバリデータにすべてのカードを拒否させる
    pub fn set_card_rejection(&self, reject: bool) {
        self.reject_cards.store(reject, Ordering::SeqCst);
    }

    /// テスト用に記録された即時課金の一覧
    pub fn charges(&self) -> Vec<(CyclistId, Decimal)> {
        self.charges.lock().unwrap().clone()
    }

    /// テスト用に記録されたキュー投入の一覧
    pub fn queued(&self) -> Vec<(CyclistId, Decimal)> {
        self.queued.lock().unwrap().clone()
    }
}

impl Default for PaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGatewayTrait for PaymentGateway {
    /// 課金を記録し、連番の課金IDを発行する
    async fn charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<ChargeReceipt> {
        if self.fail_charges.load(Ordering::SeqCst) {
            return Err("payment service refused the charge".into());
        }
        self.charges.lock().unwrap().push((cyclist_id, amount));
        Ok(ChargeReceipt {
            charge_id: ChargeId::new(self.next_charge_id.fetch_add(1, Ordering::SeqCst)),
        })
    }

    async fn enqueue_charge(&self, cyclist_id: CyclistId, amount: Decimal) -> Result<()> {
        if self.fail_enqueue.load(Ordering::SeqCst) {
            return Err("billing queue unavailable".into());
        }
        self.queued.lock().unwrap().push((cyclist_id, amount));
        Ok(())
    }

    /// 拒否スイッチが立っていなければ常に有効と判定する
    async fn validate_card(&self, _card: &CreditCard) -> Result<bool> {
        Ok(!self.reject_cards.load(Ordering::SeqCst))
    }
}
