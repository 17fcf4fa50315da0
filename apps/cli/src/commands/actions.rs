//! actions 命令
//!
//! 列出设备上的预存动作

use crate::session::Session;
use anyhow::Result;
use clap::{Args, ValueEnum};
use kortex_driver::CommandChannel;
use kortex_protocol::ActionType;

/// 可查询的动作类别
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionKind {
    /// 关节空间动作
    #[default]
    Joints,
    /// 笛卡尔位姿动作
    Pose,
    /// 夹爪动作
    Gripper,
}

impl From<ActionKind> for ActionType {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Joints => ActionType::ReachJointAngles,
            ActionKind::Pose => ActionType::ReachPose,
            ActionKind::Gripper => ActionType::SendGripperCommand,
        }
    }
}

/// 列出预存动作
#[derive(Args, Debug, Default)]
pub struct ActionsCommand {
    /// 动作类别
    #[arg(long, value_enum, default_value_t = ActionKind::Joints)]
    pub kind: ActionKind,
}

impl ActionsCommand {
    pub fn execute(&self, session: &Session) -> Result<bool> {
        let action_type = ActionType::from(self.kind);
        let actions = session.device.list_stored_actions(action_type)?;

        println!("📋 预存动作（{:?}）: {} 个", action_type, actions.len());
        for action in &actions {
            println!("  #{:<4} {}", action.handle.identifier, action.name);
        }
        Ok(true)
    }
}
