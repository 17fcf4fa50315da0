//! 运动序列
//!
//! 按顺序执行多个动作，第一个超时的动作会让整个序列立即失败（fail-fast）。
//! 已经完成的物理运动无法撤销，因此不做回滚。
//!
//! 执行序列前需要将设备切换到已知的伺服模式，这是一次性的前置调用，
//! 不属于序列本身；[`MotionSequenceRunner::ensure_servoing_mode`] 在同一个
//! runner 上只会真正下发一次。

use crate::config::ClientConfig;
use crate::dispatcher::{ActionDispatcher, DispatchResult};
use crate::error::Result;
use kortex_driver::{CommandChannel, NotificationBus};
use kortex_protocol::{ActionDescriptor, ActionHandle, ActionType, ServoingMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 运动序列执行器
pub struct MotionSequenceRunner<'a, D: CommandChannel + NotificationBus + ?Sized> {
    dispatcher: ActionDispatcher<'a, D>,
    timeout: Duration,
    servoing_mode: ServoingMode,
    servoing_ready: AtomicBool,
}

impl<'a, D: CommandChannel + NotificationBus + ?Sized> MotionSequenceRunner<'a, D> {
    /// 创建执行器（单级伺服模式）
    ///
    /// # 参数
    ///
    /// - `device`: 设备
    /// - `timeout`: 每个动作等待终止事件的最长时间
    pub fn new(device: &'a D, timeout: Duration) -> Self {
        Self {
            dispatcher: ActionDispatcher::new(device),
            timeout,
            servoing_mode: ServoingMode::SingleLevel,
            servoing_ready: AtomicBool::new(false),
        }
    }

    /// 从客户端配置创建
    pub fn from_config(device: &'a D, config: &ClientConfig) -> Self {
        Self::new(device, config.action_timeout()).with_servoing_mode(config.servoing_mode)
    }

    /// 设置执行序列前要求的伺服模式
    pub fn with_servoing_mode(mut self, mode: ServoingMode) -> Self {
        self.servoing_mode = mode;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn dispatcher(&self) -> &ActionDispatcher<'a, D> {
        &self.dispatcher
    }

    /// 确保设备处于要求的伺服模式
    ///
    /// 只在第一次成功时下发；下发失败不会标记为已就绪，下次调用会重试。
    pub fn ensure_servoing_mode(&self) -> Result<()> {
        if self.servoing_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        self.dispatcher
            .device()
            .set_servoing_mode(self.servoing_mode)?;
        self.servoing_ready.store(true, Ordering::Release);
        debug!("Servoing mode set to {:?}", self.servoing_mode);
        Ok(())
    }

    /// 顺序执行动作
    ///
    /// # 返回
    ///
    /// - `Ok(true)`: 所有动作都收到终止事件
    /// - `Ok(false)`: 某个动作超时，其后的动作不会下发
    ///
    /// # 错误
    ///
    /// 传输错误直接返回，同样不再下发后续动作。
    pub fn run(&self, steps: &[ActionDescriptor]) -> Result<bool> {
        self.ensure_servoing_mode()?;

        for (index, step) in steps.iter().enumerate() {
            if !self.run_step(step)? {
                warn!(
                    "Sequence stopped at step {}/{}: {}",
                    index + 1,
                    steps.len(),
                    step.label()
                );
                return Ok(false);
            }
        }
        info!("Sequence of {} step(s) completed", steps.len());
        Ok(true)
    }

    /// 执行单个动作，返回是否完成
    pub fn run_step(&self, step: &ActionDescriptor) -> Result<bool> {
        let result = self.dispatcher.dispatch(step, self.timeout)?;
        Ok(result == DispatchResult::Completed)
    }

    /// 按名称查找预存动作
    pub fn find_stored_action(
        &self,
        name: &str,
        action_type: ActionType,
    ) -> Result<Option<ActionHandle>> {
        let actions = self.dispatcher.device().list_stored_actions(action_type)?;
        Ok(actions
            .into_iter()
            .find(|action| action.name == name)
            .map(|action| action.handle))
    }

    /// 移动到预存动作（例如安全位置 "Home"）
    ///
    /// 找不到对应动作时记录日志并返回 `Ok(false)`，不视为错误。
    pub fn move_to_stored(&self, name: &str, action_type: ActionType) -> Result<bool> {
        self.ensure_servoing_mode()?;

        info!("Moving the arm to stored action '{}'", name);
        let Some(handle) = self.find_stored_action(name, action_type)? else {
            warn!("Stored action '{}' not found, can't reach it", name);
            return Ok(false);
        };

        let finished = self.run_step(&ActionDescriptor::Reference(handle))?;
        if finished {
            info!("Stored action '{}' reached", name);
        }
        Ok(finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kortex_driver::mock::{ActionBehavior, MockDevice};
    use kortex_protocol::{Action, CartesianPose};

    fn pose_step(x: f32) -> ActionDescriptor {
        Action::reach_pose("step", CartesianPose::new([x, 0.0, 0.3], [90.0, 0.0, 90.0])).into()
    }

    #[test]
    fn test_empty_sequence_succeeds() {
        let device = MockDevice::new();
        let runner = MotionSequenceRunner::new(&device, Duration::from_secs(1));
        assert!(runner.run(&[]).unwrap());
        assert_eq!(device.servoing_modes(), vec![ServoingMode::SingleLevel]);
    }

    #[test]
    fn test_servoing_mode_set_once() {
        let device = MockDevice::new();
        let runner = MotionSequenceRunner::new(&device, Duration::from_secs(1))
            .with_servoing_mode(ServoingMode::LowLevel);

        runner.ensure_servoing_mode().unwrap();
        assert!(runner.run(&[pose_step(0.1)]).unwrap());
        assert!(runner.run(&[pose_step(0.2)]).unwrap());
        assert_eq!(device.servoing_modes(), vec![ServoingMode::LowLevel]);
    }

    #[test]
    fn test_servoing_failure_is_retried() {
        let device = MockDevice::new();
        let runner = MotionSequenceRunner::new(&device, Duration::from_secs(1));

        device.set_disconnected(true);
        assert!(runner.ensure_servoing_mode().is_err());
        device.set_disconnected(false);
        runner.ensure_servoing_mode().unwrap();
        assert_eq!(device.servoing_modes().len(), 1);
    }

    #[test]
    fn test_stops_at_first_timeout() {
        let device = MockDevice::new();
        device.script_actions([
            ActionBehavior::Complete,
            ActionBehavior::Silent,
            ActionBehavior::Complete,
        ]);
        let runner = MotionSequenceRunner::new(&device, Duration::from_millis(50));

        let steps = [pose_step(0.1), pose_step(0.2), pose_step(0.3)];
        assert!(!runner.run(&steps).unwrap());
        assert_eq!(device.sent_actions().len(), 2);
        assert_eq!(device.active_subscriptions(), 0);
    }

    #[test]
    fn test_find_stored_action() {
        let device = MockDevice::new();
        let runner = MotionSequenceRunner::new(&device, Duration::from_secs(1));

        let home = runner
            .find_stored_action("Home", ActionType::ReachJointAngles)
            .unwrap();
        assert!(home.is_some());
        assert!(
            runner
                .find_stored_action("Home", ActionType::ReachPose)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_move_to_missing_stored_action() {
        let device = MockDevice::new();
        device.clear_stored_actions();
        let runner = MotionSequenceRunner::new(&device, Duration::from_secs(1));

        assert!(
            !runner
                .move_to_stored("Home", ActionType::ReachJointAngles)
                .unwrap()
        );
        assert!(device.sent_actions().is_empty());
        assert_eq!(device.subscribe_calls(), 0);
    }
}
