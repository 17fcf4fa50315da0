//! 客户端接口模块
//!
//! 本模块在驱动层之上提供动作级的控制流程：
//! - 动作分发（[`ActionDispatcher`]）：下发单个动作，通过通知等待其结束（带超时）
//! - 运动序列（[`MotionSequenceRunner`]）：按顺序执行多个动作，遇到超时立即停止
//! - 夹爪时序（[`GripperSequencer`]）：开环位置斜坡张开 + 闭环速度闭合
//! - 路径构造（[`path`]）：基于当前工具位姿生成相对运动
//!
//! # 使用场景
//!
//! 所有流程都是**阻塞的**，在调用线程上执行；通知回调在传输层的投递线程上执行。
//! 每次只有一个动作在执行中，不做流水线。

pub mod config;
pub mod dispatcher;
mod error;
pub mod gripper;
pub mod path;
pub mod sequence;

// 重新导出常用类型
pub use config::{ClientConfig, ConnectionConfig, DrawingConfig, GripperConfig};
pub use dispatcher::{ActionDispatcher, DispatchResult};
pub use error::{ClientError, Result};
pub use gripper::{CloseOutcome, GripperSequencer, ramp_positions};
pub use path::{DrawingPlan, DrawingRoutine};
pub use sequence::MotionSequenceRunner;

pub use kortex_driver as driver;
pub use kortex_protocol as protocol;
