//! 设备命令通道
//!
//! 所有方法都是同步的请求/响应调用，失败时返回传输错误。
//! 注意：`send_action` 只负责下发动作，不报告动作是否完成；
//! 完成情况通过 [`NotificationBus`](crate::NotificationBus) 推送。

use crate::Result;
use kortex_protocol::{
    ActionDescriptor, ActionType, BaseFeedback, GripperCommand, GripperMeasurement, GripperRequest,
    ServoingMode, StoredAction,
};

/// 设备命令通道（Base 服务）
pub trait CommandChannel {
    /// 下发动作（按引用或内联），立即返回
    fn send_action(&self, descriptor: &ActionDescriptor) -> Result<()>;

    /// 下发夹爪指令
    fn send_gripper_command(&self, command: &GripperCommand) -> Result<()>;

    /// 查询夹爪测量值
    fn get_gripper_measurement(&self, request: &GripperRequest) -> Result<GripperMeasurement>;

    /// 设置伺服模式
    fn set_servoing_mode(&self, mode: ServoingMode) -> Result<()>;

    /// 列出设备上指定类型的预存动作
    fn list_stored_actions(&self, filter: ActionType) -> Result<Vec<StoredAction>>;
}

/// 周期性反馈源（BaseCyclic 服务）
pub trait FeedbackSource {
    /// 获取最新反馈快照
    fn refresh_feedback(&self) -> Result<BaseFeedback>;
}

/// 完整的 Base 设备：命令通道 + 通知投递 + 周期性反馈
///
/// 对同时实现三个 trait 的类型自动实现，便于以 `&dyn BaseDevice` 传递。
pub trait BaseDevice: CommandChannel + crate::NotificationBus + FeedbackSource {}

impl<T> BaseDevice for T where T: CommandChannel + crate::NotificationBus + FeedbackSource + ?Sized {}
