//! 客户端错误类型
//!
//! 注意：动作超时不是错误，而是 [`DispatchResult::TimedOut`](crate::DispatchResult)；
//! 夹爪无测量数据也不是错误，而是 [`CloseOutcome::Unmeasurable`](crate::CloseOutcome)。
//! 这里只包含需要向上传播的失败。

use kortex_driver::DriverError;
use kortex_protocol::ProtocolError;
use thiserror::Error;

/// 客户端错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// 驱动层错误（传输失败等，本层不处理）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 协议错误（指令数值越界）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),

    /// 配置文件读取失败
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// 是否为传输层错误
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Driver(DriverError::Transport(_) | DriverError::ChannelClosed)
        )
    }
}

/// 客户端 Result 类型
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transport() {
        let err: ClientError = DriverError::Transport("reset".to_string()).into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("reset"));

        let err = ClientError::Config("bad step".to_string());
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Configuration error: bad step");
    }
}
