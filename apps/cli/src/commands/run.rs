//! run 命令
//!
//! 执行 JSON 脚本文件

use crate::script::{ScriptExecutor, load_script};
use crate::session::Session;
use anyhow::Result;
use clap::Args;
use kortex_client::MotionSequenceRunner;
use std::path::PathBuf;

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    pub script: PathBuf,
}

impl RunCommand {
    pub fn execute(&self, session: &Session) -> Result<bool> {
        println!("📜 加载脚本: {}", self.script.display());
        let script = load_script(&self.script)?;

        println!("📋 脚本: {}", script.name);
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!("    {} 个步骤", script.steps.len());
        println!();

        let runner = MotionSequenceRunner::from_config(&session.device, &session.config);
        let executor = ScriptExecutor::new(&session.device, runner, &session.config.home_action);
        let result = executor.execute(&script)?;

        println!();
        println!("📊 执行结果:");
        println!("  总步骤数: {}", result.total_steps);
        println!("  完成: {}", result.completed);
        println!("  耗时: {:.2} 秒", result.duration.as_secs_f64());
        if let Some(index) = result.failed_at {
            println!("❌ 步骤 {} 未完成，脚本终止", index + 1);
        }

        Ok(result.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConnectionArgs;
    use std::io::Write;

    #[test]
    fn test_run_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "name": "t", "steps": [ {{ "type": "home" }}, {{ "type": "move_relative", "dz": -0.1 }} ] }}"#
        )
        .unwrap();

        let session = Session::open(&ConnectionArgs::default()).unwrap();
        let cmd = RunCommand {
            script: file.path().to_path_buf(),
        };
        assert!(cmd.execute(&session).unwrap());
        assert_eq!(session.device.sent_actions().len(), 2);
    }

    #[test]
    fn test_missing_script_file() {
        let session = Session::open(&ConnectionArgs::default()).unwrap();
        let cmd = RunCommand {
            script: PathBuf::from("/nonexistent/script.json"),
        };
        assert!(cmd.execute(&session).is_err());
    }
}
