//! # Kortex Protocol
//!
//! 机械臂 Base 服务的消息定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `action`: 动作描述（引用预存动作 / 内联目标位姿）
//! - `notification`: 动作事件通知
//! - `gripper`: 夹爪指令与测量反馈
//! - `servoing`: 伺服模式
//! - `feedback`: 周期性反馈（工具位姿）
//!
//! ## 单位
//!
//! 位置使用米（m），姿态角使用度（°），与设备侧保持一致。
//! 夹爪数值为归一化值：位置 `[0.0, 1.0]`（0 = 张开，1 = 闭合），速度 `[-1.0, 1.0]`。

pub mod action;
pub mod feedback;
pub mod gripper;
pub mod notification;
pub mod servoing;

// 重新导出常用类型
pub use action::*;
pub use feedback::*;
pub use gripper::*;
pub use notification::*;
pub use servoing::*;

/// 协议层错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Value out of range for {field}: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// 检查数值是否落在闭区间内（NaN 视为越界）
pub(crate) fn check_range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<f32, ProtocolError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ProtocolError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
