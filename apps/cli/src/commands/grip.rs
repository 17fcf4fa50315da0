//! grip 命令
//!
//! 位置斜坡张开夹爪，然后用速度指令闭合并轮询确认。

use crate::session::Session;
use anyhow::Result;
use clap::Args;
use kortex_client::{CloseOutcome, GripperSequencer};

/// 夹爪张开 + 闭合
#[derive(Args, Debug, Default)]
pub struct GripCommand {
    /// 斜坡每步之后的等待（毫秒，覆盖配置）
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// 闭合确认阈值（覆盖配置）
    #[arg(long)]
    pub threshold: Option<f32>,

    /// 只闭合，不执行张开斜坡
    #[arg(long)]
    pub close_only: bool,
}

impl GripCommand {
    pub fn execute(&self, session: &Session) -> Result<bool> {
        let mut config = session.config.gripper.clone();
        if let Some(delay) = self.step_delay_ms {
            config.step_delay_ms = delay;
        }
        if let Some(threshold) = self.threshold {
            config.closed_threshold = threshold;
        }
        let sequencer = GripperSequencer::new(&session.device, config)?;

        if !self.close_only {
            let positions = sequencer.open_ramp()?;
            println!("🖐️  张开完成（{} 步）", positions.len());
        }

        match sequencer.close_until_grasped()? {
            CloseOutcome::Grasped { position, polls } => {
                println!("✊ 夹爪已闭合: {:.3}（{} 次测量）", position, polls);
            },
            CloseOutcome::Unmeasurable { polls } => {
                println!("⚠️  夹爪没有返回手指数据，停止轮询（{} 次测量）", polls);
            },
        }
        Ok(true)
    }
}
