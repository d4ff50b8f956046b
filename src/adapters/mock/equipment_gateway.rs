use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::value_objects::{BicycleId, BicycleStatus, DockId};
use crate::ports::equipment_gateway::{
    BicycleSnapshot, DockSnapshot, EquipmentGateway as EquipmentGatewayTrait, Result,
};

/// EquipmentGatewayのモック実装
///
/// トランカ/自転車の制御装置を模倣する。解錠はトランカを空にし、
/// 施錠は自転車を戻し、ステータス送信は自転車マップを更新する。
/// 失敗スイッチで部分失敗の経路をテストから再現できる。
pub struct EquipmentGateway {
    docks: Mutex<HashMap<DockId, DockSnapshot>>,
    bicycles: Mutex<HashMap<BicycleId, BicycleSnapshot>>,
    unlocked: Mutex<Vec<(DockId, BicycleId)>>,
    locked: Mutex<Vec<(DockId, BicycleId)>>,
    status_changes: Mutex<Vec<(BicycleId, BicycleStatus)>>,
    fail_dock_lookup: AtomicBool,
    fail_unlock: AtomicBool,
    refuse_unlock: AtomicBool,
    refuse_lock: AtomicBool,
    fail_status_push: AtomicBool,
}

impl EquipmentGateway {
    pub fn new() -> Self {
        Self {
            docks: Mutex::new(HashMap::new()),
            bicycles: Mutex::new(HashMap::new()),
            unlocked: Mutex::new(Vec::new()),
            locked: Mutex::new(Vec::new()),
            status_changes: Mutex::new(Vec::new()),
            fail_dock_lookup: AtomicBool::new(false),
            fail_unlock: AtomicBool::new(false),
            refuse_unlock: AtomicBool::new(false),
            refuse_lock: AtomicBool::new(false),
            fail_status_push: AtomicBool::new(false),
        }
    }

    /// テスト用にトランカを登録する（自転車入りも可）
    pub fn add_dock(&self, dock_id: DockId, bicycle_id: Option<BicycleId>) {
        let status = if bicycle_id.is_some() {
            "OCUPADA"
        } else {
            "LIVRE"
        };
        self.docks.lock().unwrap().insert(
            dock_id,
            DockSnapshot {
                dock_id,
                bicycle_id,
                status: status.to_string(),
            },
        );
    }

    /// テスト用に自転車を登録する
    pub fn add_bicycle(&self, bicycle_id: BicycleId, status: BicycleStatus) {
        self.bicycles.lock().unwrap().insert(
            bicycle_id,
            BicycleSnapshot {
                bicycle_id,
                status,
            },
        );
    }

    /// トランカ照会を失敗させる（設備サービス停止を模倣）
    pub fn set_dock_lookup_failure(&self, fail: bool) {
        self.fail_dock_lookup.store(fail, Ordering::SeqCst);
    }

    /// 解錠呼び出しをエラーにする
    pub fn set_unlock_failure(&self, fail: bool) {
        self.fail_unlock.store(fail, Ordering::SeqCst);
    }

    /// 解錠呼び出しにfalseを返させる（制御装置が開錠を拒否）
    pub fn set_unlock_refusal(&self, refuse: bool) {
        self.refuse_unlock.store(refuse, Ordering::SeqCst);
    }

    /// 施錠呼び出しにfalseを返させる（制御装置が施錠を拒否）
    pub fn set_lock_refusal(&self, refuse: bool) {
        self.refuse_lock.store(refuse, Ordering::SeqCst);
    }

    /// 自転車ステータス送信を失敗させる
    pub fn set_status_push_failure(&self, fail: bool) {
        self.fail_status_push.store(fail, Ordering::SeqCst);
    }

    /// テスト用に記録された解錠呼び出しの一覧
    pub fn unlocked(&self) -> Vec<(DockId, BicycleId)> {
        self.unlocked.lock().unwrap().clone()
    }

    /// テスト用に記録された施錠呼び出しの一覧
    pub fn locked(&self) -> Vec<(DockId, BicycleId)> {
        self.locked.lock().unwrap().clone()
    }

    /// テスト用に記録されたステータス送信の一覧
    pub fn status_changes(&self) -> Vec<(BicycleId, BicycleStatus)> {
        self.status_changes.lock().unwrap().clone()
    }
}

impl Default for EquipmentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EquipmentGatewayTrait for EquipmentGateway {
    async fn get_dock(&self, dock_id: DockId) -> Result<DockSnapshot> {
        if self.fail_dock_lookup.load(Ordering::SeqCst) {
            return Err("equipment service unavailable".into());
        }
        self.docks
            .lock()
            .unwrap()
            .get(&dock_id)
            .cloned()
            .ok_or_else(|| format!("dock {} not found", dock_id.value()).into())
    }

    async fn get_bicycle(&self, bicycle_id: BicycleId) -> Result<BicycleSnapshot> {
        self.bicycles
            .lock()
            .unwrap()
            .get(&bicycle_id)
            .cloned()
            .ok_or_else(|| format!("bicycle {} not found", bicycle_id.value()).into())
    }

    async fn unlock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool> {
        if self.fail_unlock.load(Ordering::SeqCst) {
            return Err("equipment service unavailable".into());
        }
        if self.refuse_unlock.load(Ordering::SeqCst) {
            return Ok(false);
        }
        if let Some(dock) = self.docks.lock().unwrap().get_mut(&dock_id) {
            dock.bicycle_id = None;
            dock.status = "LIVRE".to_string();
        }
        self.unlocked.lock().unwrap().push((dock_id, bicycle_id));
        Ok(true)
    }

    async fn lock(&self, dock_id: DockId, bicycle_id: BicycleId) -> Result<bool> {
        if self.refuse_lock.load(Ordering::SeqCst) {
            return Ok(false);
        }
        if let Some(dock) = self.docks.lock().unwrap().get_mut(&dock_id) {
            dock.bicycle_id = Some(bicycle_id);
            dock.status = "OCUPADA".to_string();
        }
        self.locked.lock().unwrap().push((dock_id, bicycle_id));
        Ok(true)
    }

    async fn set_bicycle_status(&self, bicycle_id: BicycleId, status: BicycleStatus) -> Result<()> {
        if self.fail_status_push.load(Ordering::SeqCst) {
            return Err("equipment service unavailable".into());
        }
        self.bicycles.lock().unwrap().insert(
            bicycle_id,
            BicycleSnapshot {
                bicycle_id,
                status,
            },
        );
        self.status_changes.lock().unwrap().push((bicycle_id, status));
        Ok(())
    }
}
