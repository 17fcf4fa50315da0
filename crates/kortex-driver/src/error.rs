//! 驱动层错误类型定义

use kortex_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// RPC 调用失败（传输层错误，本层不处理，直接向上传播）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 连接已关闭
    #[error("Connection closed")]
    ChannelClosed,

    /// 取消订阅时句柄未注册（重复取消或句柄来自其他连接）
    #[error("Unknown notification subscription: {0}")]
    UnknownSubscription(u32),

    /// 协议错误（如指令数值越界）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::DriverError;
    use kortex_protocol::ProtocolError;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::Transport("connection reset by peer".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Transport") && msg.contains("connection reset"));

        let err = DriverError::ChannelClosed;
        assert_eq!(format!("{}", err), "Connection closed");

        let err = DriverError::UnknownSubscription(7);
        assert_eq!(format!("{}", err), "Unknown notification subscription: 7");
    }

    #[test]
    fn test_from_protocol_error() {
        let protocol_error = ProtocolError::InvalidValue {
            field: "mode".to_string(),
            value: "9".to_string(),
        };
        let driver_error: DriverError = protocol_error.into();
        match driver_error {
            DriverError::Protocol(ProtocolError::InvalidValue { field, .. }) => {
                assert_eq!(field, "mode")
            },
            other => panic!("Expected Protocol variant, got {:?}", other),
        }
    }
}
