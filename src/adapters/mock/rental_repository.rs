use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::rental::{ClosedRental, OpenRental};
use crate::domain::value_objects::CyclistId;
use crate::ports::rental_repository::{
    InsertOpenError, RentalRepository as RentalRepositoryTrait, Result,
};

/// RentalRepositoryのモック実装
///
/// 進行中レンタルをサイクリストIDをキーに保持する。insert_openの
/// 存在チェックと挿入は同じミューテックスガード内で行われるため、
/// 「進行中レンタルは1件まで」の不変条件がここでも原子的に守られる。
pub struct RentalRepository {
    open_rentals: Mutex<HashMap<CyclistId, OpenRental>>,
    closed_rentals: Mutex<Vec<ClosedRental>>,
}

impl RentalRepository {
    pub fn new() -> Self {
        Self {
            open_rentals: Mutex::new(HashMap::new()),
            closed_rentals: Mutex::new(Vec::new()),
        }
    }

    /// テスト用に記録された完了済みレンタルの一覧
    pub fn closed_rentals(&self) -> Vec<ClosedRental> {
        self.closed_rentals.lock().unwrap().clone()
    }

    /// テスト用：現在進行中のレンタル件数
    pub fn open_count(&self) -> usize {
        self.open_rentals.lock().unwrap().len()
    }
}

impl Default for RentalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RentalRepositoryTrait for RentalRepository {
    async fn insert_open(&self, rental: &OpenRental) -> std::result::Result<(), InsertOpenError> {
        let mut open = self.open_rentals.lock().unwrap();
        if open.contains_key(&rental.cyclist_id) {
            return Err(InsertOpenError::AlreadyOpen);
        }
        open.insert(rental.cyclist_id, rental.clone());
        Ok(())
    }

    async fn find_open_by_cyclist(&self, cyclist_id: CyclistId) -> Result<Option<OpenRental>> {
        Ok(self.open_rentals.lock().unwrap().get(&cyclist_id).cloned())
    }

    async fn complete(&self, rental: &ClosedRental) -> Result<()> {
        self.open_rentals.lock().unwrap().remove(&rental.cyclist_id);
        self.closed_rentals.lock().unwrap().push(rental.clone());
        Ok(())
    }

    async fn delete_all(&self) -> Result<()> {
        self.open_rentals.lock().unwrap().clear();
        self.closed_rentals.lock().unwrap().clear();
        Ok(())
    }
}
