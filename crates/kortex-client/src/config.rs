//! 客户端配置
//!
//! 所有时序常量集中在这里，由调用方构造后传入各组件，不使用全局状态。
//! 配置文件为 TOML 格式，缺省字段取默认值。
//!
//! ```toml
//! action_timeout_ms = 20000
//! home_action = "Home"
//!
//! [gripper]
//! open_step = 0.2
//! step_delay_ms = 1000
//! closed_threshold = 0.86
//!
//! [connection]
//! ip = "192.168.1.10"
//! ```

use crate::error::{ClientError, Result};
use kortex_protocol::ServoingMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 客户端配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 等待动作终止事件的最长时间（毫秒）
    pub action_timeout_ms: u64,
    /// 执行动作序列前设置的伺服模式
    pub servoing_mode: ServoingMode,
    /// 安全位置对应的预存动作名称
    pub home_action: String,
    pub gripper: GripperConfig,
    pub drawing: DrawingConfig,
    pub connection: ConnectionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            action_timeout_ms: 20_000,
            servoing_mode: ServoingMode::SingleLevel,
            home_action: "Home".to_string(),
            gripper: GripperConfig::default(),
            drawing: DrawingConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }
}

impl ClientConfig {
    /// 从 TOML 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存为 TOML 文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 动作超时
    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.action_timeout_ms == 0 {
            return Err(ClientError::Config(
                "action_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.home_action.trim().is_empty() {
            return Err(ClientError::Config("home_action must not be empty".to_string()));
        }
        self.gripper.validate()
    }
}

/// 夹爪时序配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GripperConfig {
    /// 控制的手指编号
    pub finger_id: u32,
    /// 张开斜坡的起始位置（1.0 = 完全闭合）
    pub open_start: f32,
    /// 张开斜坡每步减少量
    pub open_step: f32,
    /// 每条位置指令之后的等待（毫秒），对应夹爪的物理动作时间
    pub step_delay_ms: u64,
    /// 闭合速度（负值 = 闭合方向）
    pub close_speed: f32,
    /// 闭合确认阈值（严格大于）
    pub closed_threshold: f32,
    /// 两次测量查询之间的间隔（毫秒），0 表示连续查询
    pub poll_interval_ms: u64,
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self {
            finger_id: 0,
            open_start: 1.0,
            open_step: 0.2,
            step_delay_ms: 1000,
            close_speed: -0.1,
            closed_threshold: 0.86,
            poll_interval_ms: 0,
        }
    }
}

impl GripperConfig {
    /// 最小斜坡步长，避免产生过长的指令序列
    pub const MIN_OPEN_STEP: f32 = 0.001;

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.open_start) {
            return Err(ClientError::Config(format!(
                "gripper.open_start must be in [0.0, 1.0], got {}",
                self.open_start
            )));
        }
        if !(Self::MIN_OPEN_STEP..=1.0).contains(&self.open_step) {
            return Err(ClientError::Config(format!(
                "gripper.open_step must be in [{}, 1.0], got {}",
                Self::MIN_OPEN_STEP,
                self.open_step
            )));
        }
        if !(-1.0..0.0).contains(&self.close_speed) {
            return Err(ClientError::Config(format!(
                "gripper.close_speed must be in [-1.0, 0.0), got {}",
                self.close_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.closed_threshold) {
            return Err(ClientError::Config(format!(
                "gripper.closed_threshold must be in [0.0, 1.0], got {}",
                self.closed_threshold
            )));
        }
        Ok(())
    }
}

/// 绘图路径配置
///
/// 偏移量均相对于执行该段路径前的工具位姿（米）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// 从安全位置到绘图起点的偏移 `[dx, dy, dz]`
    pub approach_offset: [f32; 3],
    /// 各顶点相对于起点的偏移 `[dx, dy]`（高度保持不变）
    pub corners: Vec<[f32; 2]>,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            approach_offset: [0.2, 0.1, -0.37],
            corners: vec![[0.05, 0.0], [0.05, 0.05], [-0.05, 0.05], [-0.05, -0.05]],
        }
    }
}

/// 连接配置
///
/// 由传输层实现使用；本 crate 只负责携带。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub ip: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// 会话空闲超时（毫秒）
    pub session_timeout_ms: u64,
    /// 连接空闲超时（毫秒）
    pub connection_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ip: "192.168.1.10".to_string(),
            port: 10000,
            username: "admin".to_string(),
            password: "admin".to_string(),
            session_timeout_ms: 60_000,
            connection_timeout_ms: 2_000,
        }
    }
}
