//! 订阅守卫
//!
//! 持有 [`NotificationHandle`] 的 RAII 类型：无论正常返回、超时还是 `?` 提前返回，
//! 订阅都会且只会被取消一次。
//!
//! # 示例
//!
//! ```rust,ignore
//! use kortex_driver::Subscription;
//! use kortex_driver::mock::MockDevice;
//! use kortex_protocol::{ActionNotification, NotificationOptions};
//! use std::sync::Arc;
//!
//! let device = MockDevice::new();
//! {
//!     let _sub = Subscription::subscribe(
//!         &device,
//!         Arc::new(|_n: &ActionNotification| {}),
//!         NotificationOptions::default(),
//!     )
//!     .unwrap();
//!     assert_eq!(device.active_subscriptions(), 1);
//! } // Drop 时自动取消订阅
//! assert_eq!(device.active_subscriptions(), 0);
//! ```

use crate::notification::{ActionCallback, NotificationBus, NotificationHandle};
use crate::Result;
use kortex_protocol::NotificationOptions;
use std::sync::Arc;
use tracing::{debug, warn};

/// 动作事件订阅守卫
pub struct Subscription<'a, B: NotificationBus + ?Sized> {
    bus: &'a B,
    /// `None` 表示已经取消
    handle: Option<NotificationHandle>,
}

impl<'a, B: NotificationBus + ?Sized> Subscription<'a, B> {
    /// 订阅并返回守卫
    ///
    /// 订阅失败时不产生守卫，也就没有需要取消的句柄。
    pub fn subscribe(
        bus: &'a B,
        callback: Arc<dyn ActionCallback>,
        options: NotificationOptions,
    ) -> Result<Self> {
        let handle = bus.subscribe(callback, options)?;
        debug!(subscription = handle.identifier(), "Subscribed to action topic");
        Ok(Self {
            bus,
            handle: Some(handle),
        })
    }

    /// 订阅编号
    pub fn identifier(&self) -> Option<u32> {
        self.handle.as_ref().map(NotificationHandle::identifier)
    }

    /// 显式取消订阅，并返回取消结果
    ///
    /// 与 Drop 的区别仅在于错误会返回给调用方，而不是只记录日志。
    pub fn unsubscribe(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => release(self.bus, handle),
            None => Ok(()),
        }
    }
}

impl<B: NotificationBus + ?Sized> Drop for Subscription<'_, B> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take()
            && let Err(e) = release(self.bus, handle)
        {
            warn!("Failed to unsubscribe from action topic: {}", e);
        }
    }
}

fn release<B: NotificationBus + ?Sized>(bus: &B, handle: NotificationHandle) -> Result<()> {
    let identifier = handle.identifier();
    bus.unsubscribe(handle)?;
    debug!(subscription = identifier, "Unsubscribed from action topic");
    Ok(())
}
