//! 周期性反馈
//!
//! 只保留运动序列需要的部分：当前工具位姿。

use crate::action::CartesianPose;

/// Base 周期性反馈快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseFeedback {
    /// 当前工具位姿（米 / 度）
    pub tool_pose: CartesianPose,
}

impl BaseFeedback {
    pub fn new(tool_pose: CartesianPose) -> Self {
        Self { tool_pose }
    }
}
