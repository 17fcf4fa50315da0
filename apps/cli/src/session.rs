//! 连接会话
//!
//! 把命令行参数和配置文件合并成 [`ClientConfig`]，并建立设备连接。
//! 当前只有模拟设备；连接参数仍然完整携带，供真实传输层使用。

use anyhow::{Context, Result};
use clap::Args;
use kortex_client::{ClientConfig, ConnectionConfig};
use kortex_driver::mock::MockDevice;
use std::path::PathBuf;
use tracing::info;

/// 全局连接参数
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// 设备 IP 地址
    #[arg(long, global = true)]
    pub ip: Option<String>,

    /// 设备端口
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// 登录用户名
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// 登录密码
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// 配置文件（TOML）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 每个动作等待结束的最长时间（毫秒）
    #[arg(long, global = true)]
    pub action_timeout_ms: Option<u64>,
}

impl ConnectionArgs {
    /// 合并配置文件与命令行参数（命令行优先）
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => ClientConfig::default(),
        };

        let connection = &mut config.connection;
        if let Some(ip) = &self.ip {
            connection.ip = ip.clone();
        }
        if let Some(port) = self.port {
            connection.port = port;
        }
        if let Some(username) = &self.username {
            connection.username = username.clone();
        }
        if let Some(password) = &self.password {
            connection.password = password.clone();
        }
        if let Some(timeout) = self.action_timeout_ms {
            config.action_timeout_ms = timeout;
        }

        config.validate().context("配置校验失败")?;
        Ok(config)
    }
}

/// 已建立的会话
pub struct Session {
    pub config: ClientConfig,
    pub device: MockDevice,
}

impl Session {
    /// 建立会话
    pub fn open(args: &ConnectionArgs) -> Result<Self> {
        let config = args.resolve()?;
        let device = connect(&config.connection);
        Ok(Self { config, device })
    }
}

fn connect(connection: &ConnectionConfig) -> MockDevice {
    info!(
        "Connecting to {}:{} as '{}' (simulated device, session timeout {} ms, connection timeout {} ms)",
        connection.ip,
        connection.port,
        connection.username,
        connection.session_timeout_ms,
        connection.connection_timeout_ms
    );
    MockDevice::new()
}
