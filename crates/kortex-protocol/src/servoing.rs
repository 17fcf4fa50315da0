//! 伺服模式
//!
//! 伺服模式决定设备如何解释运动指令。高层动作（`ExecuteAction`）
//! 需要设备处于单级伺服模式（Single Level Servoing）。

/// 伺服模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
pub enum ServoingMode {
    #[default]
    Unspecified = 0,
    /// 单级伺服：由 Base 统一规划并执行高层动作
    SingleLevel = 2,
    /// 低级伺服：由客户端直接发送周期性关节指令
    LowLevel = 3,
    Bypass = 4,
}
