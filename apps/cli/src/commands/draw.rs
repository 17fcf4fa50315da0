//! draw 命令
//!
//! 回到安全位置，移动到绘图起点，然后依次经过多边形各顶点。

use crate::session::Session;
use anyhow::Result;
use clap::Args;
use kortex_client::DrawingRoutine;

/// 绘制多边形
#[derive(Args, Debug, Default)]
pub struct DrawCommand {
    /// 只打印路径，不执行
    #[arg(long)]
    pub dry_run: bool,
}

impl DrawCommand {
    pub fn execute(&self, session: &Session) -> Result<bool> {
        let routine = DrawingRoutine::new(&session.device, &session.config);
        let plan = routine.plan();

        println!("✏️  绘图计划:");
        let [dx, dy, dz] = plan.approach_offset;
        println!("  起点偏移: ({:+.3}, {:+.3}, {:+.3})", dx, dy, dz);
        for (i, [cx, cy]) in plan.corners.iter().enumerate() {
            println!("  顶点 {}: ({:+.3}, {:+.3})", i + 1, cx, cy);
        }

        if self.dry_run {
            return Ok(true);
        }

        let finished = routine.run()?;
        if finished {
            let [x, y, z] = session.device.tool_pose().position();
            println!("✅ 绘图完成，当前位置 ({:.3}, {:.3}, {:.3})", x, y, z);
        } else {
            println!("❌ 绘图未完成");
        }
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConnectionArgs;

    #[test]
    fn test_draw_runs_full_path() {
        let session = Session::open(&ConnectionArgs::default()).unwrap();
        assert!(DrawCommand::default().execute(&session).unwrap());
        assert_eq!(session.device.sent_actions().len(), 6);
    }

    #[test]
    fn test_dry_run_sends_nothing() {
        let session = Session::open(&ConnectionArgs::default()).unwrap();
        let cmd = DrawCommand { dry_run: true };
        assert!(cmd.execute(&session).unwrap());
        assert!(session.device.sent_actions().is_empty());
    }
}
