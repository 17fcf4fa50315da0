//! home 命令
//!
//! 切换到配置的伺服模式，然后执行预存的安全位置动作。

use crate::session::Session;
use anyhow::Result;
use clap::Args;
use kortex_client::MotionSequenceRunner;
use kortex_protocol::ActionType;

/// 回到安全位置
#[derive(Args, Debug, Default)]
pub struct HomeCommand {
    /// 预存动作名称（覆盖配置中的 home_action）
    #[arg(long)]
    pub action: Option<String>,
}

impl HomeCommand {
    pub fn execute(&self, session: &Session) -> Result<bool> {
        let name = self
            .action
            .as_deref()
            .unwrap_or(&session.config.home_action);

        println!("🏠 移动到安全位置 '{}'...", name);
        let runner = MotionSequenceRunner::from_config(&session.device, &session.config);
        let finished = runner.move_to_stored(name, ActionType::ReachJointAngles)?;

        if finished {
            println!("✅ 已到达安全位置");
        } else {
            println!("❌ 无法到达安全位置");
        }
        Ok(finished)
    }
}
