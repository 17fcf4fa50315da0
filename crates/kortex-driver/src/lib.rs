//! 驱动层模块
//!
//! 本模块定义与设备交互的接缝（trait），以及动作同步所需的基础设施：
//! - 设备命令通道（[`CommandChannel`]）：同步请求/响应调用
//! - 周期性反馈（[`FeedbackSource`]）
//! - 通知投递（[`NotificationBus`]）：设备推送的动作事件
//! - 订阅守卫（[`Subscription`]）：保证每次订阅恰好取消一次
//! - 完成门（[`CompletionGate`]）：通知回调与等待线程之间的单次信号
//!
//! 传输层（TCP/UDP 会话、心跳）不在本 crate 范围内，由实现上述 trait 的外部类型提供。
//! 启用 `mock` feature 后可使用 [`mock::MockDevice`] 进行无硬件测试。

pub mod channel;
mod error;
pub mod gate;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod notification;
pub mod subscription;

pub use channel::{BaseDevice, CommandChannel, FeedbackSource};
pub use error::DriverError;
pub use gate::{CompletionGate, GateSignal};
pub use notification::{ActionCallback, NotificationBus, NotificationHandle};
pub use subscription::Subscription;

/// 驱动层 Result 类型
pub type Result<T> = std::result::Result<T, DriverError>;
