use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::domain::value_objects::EmailAddress;
use crate::ports::notification_gateway::{NotificationGateway as NotificationGatewayTrait, Result};

/// モックが捕捉したメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// NotificationGatewayのモック実装
///
/// 実際の送信は行わず、すべてのメッセージを捕捉する。
/// ベストエフォート通知の有無をテストから検証できる。
pub struct NotificationGateway {
    sent: Mutex<Vec<SentMessage>>,
    fail_sends: AtomicBool,
}

impl NotificationGateway {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// すべての送信を失敗させる
    pub fn set_send_failure(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// テスト用に捕捉されたメッセージの一覧
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for NotificationGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationGatewayTrait for NotificationGateway {
    async fn send(&self, email: &EmailAddress, subject: &str, body: &str) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err("notification service unavailable".into());
        }
        self.sent.lock().unwrap().push(SentMessage {
            email: email.as_str().to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
