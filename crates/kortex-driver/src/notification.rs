//! 通知投递接口
//!
//! 设备通过通知流推送动作事件。回调由投递方（通常是传输层的独立线程）调用，
//! 调用时机不受调用方控制。
//!
//! # 回调要求
//!
//! - **非阻塞**: 回调只允许做轻量工作（记录日志、触发信号）
//! - **不可重入**: 禁止在回调中再次调用 `subscribe`/`unsubscribe`
//!
//! # 示例
//!
//! ```rust
//! use kortex_driver::ActionCallback;
//! use kortex_protocol::{ActionEvent, ActionNotification};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let terminal = Arc::new(AtomicUsize::new(0));
//! let counter = terminal.clone();
//! let callback = move |n: &ActionNotification| {
//!     if n.action_event.is_terminal() {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!     }
//! };
//!
//! callback.on_action_event(&ActionNotification::new(ActionEvent::End));
//! assert_eq!(terminal.load(Ordering::Relaxed), 1);
//! ```

use crate::Result;
use kortex_protocol::{ActionNotification, NotificationOptions};
use std::sync::Arc;

/// 动作事件回调
pub trait ActionCallback: Send + Sync {
    /// 收到一条动作通知时调用
    fn on_action_event(&self, notification: &ActionNotification);
}

impl<F> ActionCallback for F
where
    F: Fn(&ActionNotification) + Send + Sync,
{
    fn on_action_event(&self, notification: &ActionNotification) {
        self(notification)
    }
}

/// 订阅句柄（不透明）
///
/// 不实现 `Clone`/`Copy`：`unsubscribe` 按值消费句柄，同一次订阅无法被取消两次。
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NotificationHandle(u32);

impl NotificationHandle {
    /// 由传输层分配的订阅编号构造句柄
    pub fn new(identifier: u32) -> Self {
        Self(identifier)
    }

    /// 订阅编号
    pub fn identifier(&self) -> u32 {
        self.0
    }
}

/// 通知投递（动作事件主题）
///
/// 大多数调用方应使用 [`Subscription`](crate::Subscription) 守卫，
/// 而不是直接调用这两个方法。
pub trait NotificationBus {
    /// 订阅动作事件主题
    fn subscribe(
        &self,
        callback: Arc<dyn ActionCallback>,
        options: NotificationOptions,
    ) -> Result<NotificationHandle>;

    /// 取消订阅
    ///
    /// 返回后不再有新的回调投递。即使从未收到过事件，取消也是安全的。
    fn unsubscribe(&self, handle: NotificationHandle) -> Result<()>;
}
