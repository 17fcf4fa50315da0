//! 夹爪时序
//!
//! 夹爪固件不会为连续指令发送动作事件，因此这里直接使用指令/测量接口，不经过通知：
//!
//! - **张开**：开环位置斜坡，从 `open_start` 起每步减少 `open_step`，
//!   每条指令之后等待 `step_delay`，位置到达 0 时停止（0 本身不下发）
//! - **闭合**：下发一次负速度指令，然后轮询测量值，直到位置**严格大于**
//!   `closed_threshold`；若测量中没有任何手指数据，立即停止轮询（不视为错误）
//!
//! # 已知限制
//!
//! 闭合轮询没有次数或时间上限。夹爪卡住且位置始终不超过阈值时会一直轮询，
//! 调用方需要自行决定是否在外层加看门狗。

use crate::config::GripperConfig;
use crate::error::Result;
use kortex_driver::CommandChannel;
use kortex_protocol::{GripperCommand, GripperRequest};
use std::thread;
use tracing::{debug, info, warn};

/// 斜坡步数计算的容差，吸收浮点累积误差
const RAMP_EPSILON: f32 = 1e-4;

/// 闭合结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CloseOutcome {
    /// 位置超过阈值
    Grasped {
        /// 最后一次测量到的位置
        position: f32,
        /// 测量查询次数
        polls: usize,
    },
    /// 测量中没有手指数据，提前结束
    Unmeasurable { polls: usize },
}

impl CloseOutcome {
    pub fn polls(&self) -> usize {
        match *self {
            CloseOutcome::Grasped { polls, .. } | CloseOutcome::Unmeasurable { polls } => polls,
        }
    }

    pub fn is_grasped(&self) -> bool {
        matches!(self, CloseOutcome::Grasped { .. })
    }
}

/// 计算张开斜坡的位置序列
///
/// 位置按 `start - i * step` 计算（而不是逐步累减），步数由整数计数决定，
/// 因此不会因为浮点误差多发一个接近 0 的位置。
///
/// # 示例
///
/// ```
/// use kortex_client::ramp_positions;
///
/// let positions = ramp_positions(1.0, 0.2);
/// assert_eq!(positions.len(), 5);
/// assert!((positions[4] - 0.2).abs() < 1e-6);
/// ```
pub fn ramp_positions(start: f32, step: f32) -> Vec<f32> {
    if step.is_nan() || start.is_nan() || step <= 0.0 || start <= 0.0 {
        return Vec::new();
    }
    let count = ((start / step) - RAMP_EPSILON).ceil().max(0.0) as usize;
    (0..count)
        .map(|i| (f64::from(start) - i as f64 * f64::from(step)) as f32)
        .collect()
}

/// 夹爪时序控制器
pub struct GripperSequencer<'a, C: CommandChannel + ?Sized> {
    channel: &'a C,
    config: GripperConfig,
}

impl<'a, C: CommandChannel + ?Sized> GripperSequencer<'a, C> {
    /// 创建控制器
    ///
    /// # 错误
    ///
    /// 配置不合法时返回 `ClientError::Config`。
    pub fn new(channel: &'a C, config: GripperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { channel, config })
    }

    pub fn config(&self) -> &GripperConfig {
        &self.config
    }

    /// 开环张开
    ///
    /// 返回实际下发的位置序列。此方法会阻塞 `步数 × step_delay`。
    pub fn open_ramp(&self) -> Result<Vec<f32>> {
        info!("Performing gripper test in position...");
        let positions = ramp_positions(self.config.open_start, self.config.open_step);
        let delay = self.config.step_delay();

        for &position in &positions {
            info!("Going to position {:.2}...", position);
            let command = GripperCommand::position(self.config.finger_id, position)?;
            self.channel.send_gripper_command(&command)?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
        Ok(positions)
    }

    /// 闭环闭合
    ///
    /// 下发速度指令后持续轮询，直到位置严格大于阈值或测量中没有手指数据。
    ///
    /// # 错误
    ///
    /// 指令或测量查询的传输错误直接返回。
    pub fn close_until_grasped(&self) -> Result<CloseOutcome> {
        info!("Closing gripper using speed command...");
        let command = GripperCommand::speed(self.config.finger_id, self.config.close_speed)?;
        self.channel.send_gripper_command(&command)?;

        let request = GripperRequest::position();
        let interval = self.config.poll_interval();
        let mut polls = 0usize;

        loop {
            let measurement = self.channel.get_gripper_measurement(&request)?;
            polls += 1;

            let Some(position) = measurement.first() else {
                warn!("No finger present in gripper measurement, stop polling");
                return Ok(CloseOutcome::Unmeasurable { polls });
            };

            debug!("Current position is : {}", position);
            if position > self.config.closed_threshold {
                info!("Gripper closed at {:.3} after {} poll(s)", position, polls);
                return Ok(CloseOutcome::Grasped { position, polls });
            }

            if !interval.is_zero() {
                thread::sleep(interval);
            }
        }
    }

    /// 张开后闭合（完整的抓取流程）
    pub fn cycle(&self) -> Result<CloseOutcome> {
        self.open_ramp()?;
        self.close_until_grasped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_positions(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_default_ramp() {
        assert_positions(&ramp_positions(1.0, 0.2), &[1.0, 0.8, 0.6, 0.4, 0.2]);
    }

    #[test]
    fn test_ramp_not_multiple_of_step() {
        assert_positions(&ramp_positions(0.5, 0.2), &[0.5, 0.3, 0.1]);
    }

    #[test]
    fn test_ramp_degenerate_inputs() {
        assert!(ramp_positions(0.0, 0.2).is_empty());
        assert!(ramp_positions(1.0, 0.0).is_empty());
        assert!(ramp_positions(1.0, -0.2).is_empty());
        assert!(ramp_positions(1.0, f32::NAN).is_empty());
        assert_positions(&ramp_positions(0.2, 0.2), &[0.2]);
    }

    #[test]
    fn test_close_outcome_accessors() {
        let grasped = CloseOutcome::Grasped {
            position: 0.9,
            polls: 4,
        };
        assert!(grasped.is_grasped());
        assert_eq!(grasped.polls(), 4);

        let unmeasurable = CloseOutcome::Unmeasurable { polls: 1 };
        assert!(!unmeasurable.is_grasped());
        assert_eq!(unmeasurable.polls(), 1);
    }
}
