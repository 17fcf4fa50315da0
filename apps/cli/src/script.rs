//! 脚本系统
//!
//! JSON 脚本按顺序执行运动步骤，第一个失败的步骤会终止脚本。
//!
//! ```json
//! {
//!   "name": "square",
//!   "steps": [
//!     { "type": "home" },
//!     { "type": "move_relative", "dx": 0.05, "dy": 0.0, "dz": 0.0 },
//!     { "type": "move", "x": 0.5, "y": 0.1, "z": 0.3 },
//!     { "type": "stored", "name": "Retract", "action_type": "reach_pose" },
//!     { "type": "wait", "duration_ms": 500 }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use kortex_client::MotionSequenceRunner;
use kortex_client::path::{CARTESIAN_ACTION_NAME, cartesian_action};
use kortex_driver::BaseDevice;
use kortex_protocol::ActionType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 脚本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 步骤序列
    pub steps: Vec<ScriptStep>,
}

/// 脚本步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    /// 回到安全位置（配置中的 `home_action`）
    Home,

    /// 移动到绝对位置（米），姿态保持当前值
    Move { x: f32, y: f32, z: f32 },

    /// 相对当前位置移动（米）
    MoveRelative {
        #[serde(default)]
        dx: f32,
        #[serde(default)]
        dy: f32,
        #[serde(default)]
        dz: f32,
    },

    /// 执行预存动作
    Stored {
        name: String,
        #[serde(default = "default_stored_type")]
        action_type: ActionType,
    },

    /// 等待
    Wait { duration_ms: u64 },
}

fn default_stored_type() -> ActionType {
    ActionType::ReachJointAngles
}

impl ScriptStep {
    fn describe(&self) -> String {
        match self {
            ScriptStep::Home => "home".to_string(),
            ScriptStep::Move { x, y, z } => format!("move to ({:.3}, {:.3}, {:.3})", x, y, z),
            ScriptStep::MoveRelative { dx, dy, dz } => {
                format!("move by ({:+.3}, {:+.3}, {:+.3})", dx, dy, dz)
            },
            ScriptStep::Stored { name, action_type } => {
                format!("stored '{}' ({:?})", name, action_type)
            },
            ScriptStep::Wait { duration_ms } => format!("wait {} ms", duration_ms),
        }
    }
}

/// 加载脚本文件
pub fn load_script<P: AsRef<Path>>(path: P) -> Result<Script> {
    let content = fs::read_to_string(path).context("读取脚本文件失败")?;
    let script: Script = serde_json::from_str(&content).context("解析脚本 JSON 失败")?;
    Ok(script)
}

/// 脚本执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptResult {
    pub total_steps: usize,
    pub completed: usize,
    /// 第一个未完成步骤的序号（从 0 开始）
    pub failed_at: Option<usize>,
    pub duration: Duration,
}

impl ScriptResult {
    pub fn success(&self) -> bool {
        self.failed_at.is_none()
    }
}

/// 脚本执行器
pub struct ScriptExecutor<'a, D: BaseDevice + ?Sized> {
    device: &'a D,
    runner: MotionSequenceRunner<'a, D>,
    home_action: String,
}

impl<'a, D: BaseDevice + ?Sized> ScriptExecutor<'a, D> {
    pub fn new(
        device: &'a D,
        runner: MotionSequenceRunner<'a, D>,
        home_action: impl Into<String>,
    ) -> Self {
        Self {
            device,
            runner,
            home_action: home_action.into(),
        }
    }

    /// 执行脚本（遇到第一个未完成的步骤即停止）
    pub fn execute(&self, script: &Script) -> Result<ScriptResult> {
        info!("Running script '{}' ({} steps)", script.name, script.steps.len());
        let start = Instant::now();
        self.runner.ensure_servoing_mode()?;

        let mut completed = 0;
        let mut failed_at = None;
        for (index, step) in script.steps.iter().enumerate() {
            info!("Step {}/{}: {}", index + 1, script.steps.len(), step.describe());
            if self.execute_step(step)? {
                completed += 1;
            } else {
                warn!("Step {} did not complete, aborting script", index + 1);
                failed_at = Some(index);
                break;
            }
        }

        Ok(ScriptResult {
            total_steps: script.steps.len(),
            completed,
            failed_at,
            duration: start.elapsed(),
        })
    }

    fn execute_step(&self, step: &ScriptStep) -> Result<bool> {
        let finished = match step {
            ScriptStep::Home => self
                .runner
                .move_to_stored(&self.home_action, ActionType::ReachJointAngles)?,
            ScriptStep::Move { x, y, z } => {
                let orientation = self.device.refresh_feedback()?.tool_pose.orientation();
                let action = cartesian_action(CARTESIAN_ACTION_NAME, *x, *y, *z, orientation);
                self.runner.run_step(&action)?
            },
            ScriptStep::MoveRelative { dx, dy, dz } => {
                let pose = self.device.refresh_feedback()?.tool_pose;
                let [x, y, z] = pose.translated(*dx, *dy, *dz).position();
                let action = cartesian_action(CARTESIAN_ACTION_NAME, x, y, z, pose.orientation());
                self.runner.run_step(&action)?
            },
            ScriptStep::Stored { name, action_type } => {
                self.runner.move_to_stored(name, *action_type)?
            },
            ScriptStep::Wait { duration_ms } => {
                std::thread::sleep(Duration::from_millis(*duration_ms));
                true
            },
        };
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kortex_driver::mock::{ActionBehavior, MockConfig, MockDevice};
    use kortex_protocol::{ActionHandle, ServoingMode};
    use std::io::Write;

    const SQUARE: &str = r#"{
        "name": "square",
        "steps": [
            { "type": "home" },
            { "type": "move_relative", "dx": 0.05 },
            { "type": "move", "x": 0.5, "y": 0.1, "z": 0.3 },
            { "type": "wait", "duration_ms": 1 }
        ]
    }"#;

    fn executor(device: &MockDevice) -> ScriptExecutor<'_, MockDevice> {
        let runner = MotionSequenceRunner::new(device, Duration::from_secs(2));
        ScriptExecutor::new(device, runner, "Home")
    }

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(SQUARE).unwrap();
        assert_eq!(script.name, "square");
        assert!(script.description.is_empty());
        assert_eq!(script.steps.len(), 4);
        assert_eq!(
            script.steps[1],
            ScriptStep::MoveRelative {
                dx: 0.05,
                dy: 0.0,
                dz: 0.0
            }
        );
    }

    #[test]
    fn test_stored_step_default_type() {
        let step: ScriptStep =
            serde_json::from_str(r#"{ "type": "stored", "name": "Home" }"#).unwrap();
        assert_eq!(
            step,
            ScriptStep::Stored {
                name: "Home".to_string(),
                action_type: ActionType::ReachJointAngles
            }
        );
    }

    #[test]
    fn test_unknown_step_rejected() {
        let result: std::result::Result<ScriptStep, _> =
            serde_json::from_str(r#"{ "type": "dance" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_script_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SQUARE.as_bytes()).unwrap();
        let script = load_script(file.path()).unwrap();
        assert_eq!(script.steps.len(), 4);
    }

    #[test]
    fn test_execute_script() {
        let device = MockDevice::new();
        let script: Script = serde_json::from_str(SQUARE).unwrap();

        let result = executor(&device).execute(&script).unwrap();

        assert!(result.success());
        assert_eq!(result.completed, 4);
        assert_eq!(device.sent_actions().len(), 3);
        assert_eq!(device.servoing_modes(), vec![ServoingMode::SingleLevel]);
        assert_eq!(device.tool_pose().position(), [0.5, 0.1, 0.3]);
    }

    #[test]
    fn test_move_relative_from_current_pose() {
        let device = MockDevice::new();
        let script = Script {
            name: "nudge".to_string(),
            description: String::new(),
            steps: vec![ScriptStep::MoveRelative {
                dx: 0.0,
                dy: 0.0,
                dz: 0.1,
            }],
        };

        executor(&device).execute(&script).unwrap();

        let initial = MockConfig::default().initial_pose;
        let pose = device.tool_pose();
        assert!((pose.z - (initial.z + 0.1)).abs() < 1e-6);
        assert_eq!(pose.orientation(), initial.orientation());
    }

    #[test]
    fn test_script_stops_at_first_timeout() {
        let device = MockDevice::new();
        device.script_actions([ActionBehavior::Complete, ActionBehavior::Silent]);
        let runner = MotionSequenceRunner::new(&device, Duration::from_millis(30));
        let executor = ScriptExecutor::new(&device, runner, "Home");
        let script: Script = serde_json::from_str(SQUARE).unwrap();

        let result = executor.execute(&script).unwrap();

        assert!(!result.success());
        assert_eq!(result.completed, 1);
        assert_eq!(result.failed_at, Some(1));
        assert_eq!(device.sent_actions().len(), 2);
    }

    #[test]
    fn test_missing_stored_action_fails_step() {
        let device = MockDevice::new();
        device.add_stored_action("Retract", ActionHandle::new(7, ActionType::ReachPose));
        let script: Script = serde_json::from_str(
            r#"{ "name": "s", "steps": [
                { "type": "stored", "name": "Retract", "action_type": "reach_pose" },
                { "type": "stored", "name": "Missing" }
            ] }"#,
        )
        .unwrap();

        let result = executor(&device).execute(&script).unwrap();
        assert_eq!(result.completed, 1);
        assert_eq!(result.failed_at, Some(1));
    }
}
