use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::cyclist::Cyclist;
use crate::domain::value_objects::{Cpf, CyclistId, EmailAddress};
use crate::ports::cyclist_repository::{CyclistRepository as CyclistRepositoryTrait, Result};

/// CyclistRepositoryのモック実装
///
/// スタンドアロンモードとテストスイートを支えるインメモリ実装。
/// すべての検索は単一のミューテックスで保護されたマップ上で行う。
pub struct CyclistRepository {
    cyclists: Mutex<HashMap<CyclistId, Cyclist>>,
    email_lookups: AtomicUsize,
}

impl CyclistRepository {
    pub fn new() -> Self {
        Self {
            cyclists: Mutex::new(HashMap::new()),
            email_lookups: AtomicUsize::new(0),
        }
    }

    /// テスト用：メールアドレス検索が呼ばれた回数
    pub fn email_lookups(&self) -> usize {
        self.email_lookups.load(Ordering::SeqCst)
    }
}

impl Default for CyclistRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CyclistRepositoryTrait for CyclistRepository {
    async fn insert(&self, cyclist: &Cyclist) -> Result<()> {
        self.cyclists
            .lock()
            .unwrap()
            .insert(cyclist.cyclist_id, cyclist.clone());
        Ok(())
    }

    async fn update(&self, cyclist: &Cyclist) -> Result<()> {
        self.cyclists
            .lock()
            .unwrap()
            .insert(cyclist.cyclist_id, cyclist.clone());
        Ok(())
    }

    async fn find_by_id(&self, cyclist_id: CyclistId) -> Result<Option<Cyclist>> {
        Ok(self.cyclists.lock().unwrap().get(&cyclist_id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Cyclist>> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .cyclists
            .lock()
            .unwrap()
            .values()
            .find(|cyclist| cyclist.email == *email)
            .cloned())
    }

    async fn find_by_cpf(&self, cpf: &Cpf) -> Result<Option<Cyclist>> {
        Ok(self
            .cyclists
            .lock()
            .unwrap()
            .values()
            .find(|cyclist| cyclist.document.cpf() == Some(cpf))
            .cloned())
    }

    async fn delete_all(&self) -> Result<()> {
        self.cyclists.lock().unwrap().clear();
        Ok(())
    }
}
