//! 夹爪指令与测量反馈
//!
//! 夹爪固件不会为连续指令推送完成事件，因此夹爪的控制只依赖
//! "下发指令 + 查询测量值" 两个同步调用。

use crate::{ProtocolError, check_range};

/// 夹爪控制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
pub enum GripperMode {
    #[default]
    Unspecified = 0,
    Force = 1,
    /// 速度模式：数值为带符号速度，负值表示闭合方向
    Speed = 2,
    /// 位置模式：0 = 完全张开，1 = 完全闭合
    Position = 3,
    Current = 4,
}

impl GripperMode {
    /// 该模式下手指数值的合法区间
    pub fn value_range(self) -> (f32, f32) {
        match self {
            GripperMode::Position => (0.0, 1.0),
            _ => (-1.0, 1.0),
        }
    }
}

/// 单个手指的数值
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Finger {
    pub finger_identifier: u32,
    pub value: f32,
}

/// 夹爪指令
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GripperCommand {
    pub mode: GripperMode,
    pub fingers: Vec<Finger>,
}

impl GripperCommand {
    /// 创建空指令（尚无手指）
    pub fn new(mode: GripperMode) -> Self {
        Self {
            mode,
            fingers: Vec::new(),
        }
    }

    /// 创建位置指令（单手指）
    pub fn position(finger_identifier: u32, value: f32) -> Result<Self, ProtocolError> {
        Self::new(GripperMode::Position).with_finger(finger_identifier, value)
    }

    /// 创建速度指令（单手指）
    pub fn speed(finger_identifier: u32, value: f32) -> Result<Self, ProtocolError> {
        Self::new(GripperMode::Speed).with_finger(finger_identifier, value)
    }

    /// 设置手指目标值
    ///
    /// 同一手指重复设置时覆盖旧值。
    ///
    /// # 错误
    ///
    /// - `ProtocolError::OutOfRange`: 数值超出当前模式的合法区间
    pub fn with_finger(mut self, finger_identifier: u32, value: f32) -> Result<Self, ProtocolError> {
        let (min, max) = self.mode.value_range();
        let value = check_range("finger.value", value, min, max)?;

        match self.fingers.iter_mut().find(|f| f.finger_identifier == finger_identifier) {
            Some(finger) => finger.value = value,
            None => self.fingers.push(Finger {
                finger_identifier,
                value,
            }),
        }
        Ok(self)
    }

    /// 查询某个手指的目标值
    pub fn finger(&self, finger_identifier: u32) -> Option<f32> {
        self.fingers
            .iter()
            .find(|f| f.finger_identifier == finger_identifier)
            .map(|f| f.value)
    }
}

/// 夹爪测量请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GripperRequest {
    /// 需要测量的量（通常为位置）
    pub mode: GripperMode,
}

impl GripperRequest {
    pub fn position() -> Self {
        Self {
            mode: GripperMode::Position,
        }
    }
}

/// 夹爪测量反馈
///
/// 设备不报告手指状态时 `fingers` 为空。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GripperMeasurement {
    pub fingers: Vec<Finger>,
}

impl GripperMeasurement {
    /// 单手指测量值
    pub fn single(value: f32) -> Self {
        Self {
            fingers: vec![Finger {
                finger_identifier: 0,
                value,
            }],
        }
    }

    /// 无手指数据
    pub fn empty() -> Self {
        Self::default()
    }

    /// 第一个手指的测量值
    pub fn first(&self) -> Option<f32> {
        self.fingers.first().map(|f| f.value)
    }
}
