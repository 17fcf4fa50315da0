//! 动作分发
//!
//! 下发单个动作，并通过动作事件通知等待其结束。
//!
//! # 流程
//!
//! 1. 创建完成门
//! 2. 订阅动作事件主题，回调在收到 `End` 或 `Abort` 时触发完成门
//! 3. 下发动作（不等待，设备不会在该调用中报告完成）
//! 4. 带超时等待完成门
//! 5. 无论结果如何都取消订阅
//!
//! # 已知限制
//!
//! `End` 与 `Abort` 都视为终止事件，本层不区分成功与中止（中止会以 `warn` 级别记录）。
//! 分发过程中不做重试，由调用方决定重试还是终止序列。

use crate::error::Result;
use kortex_driver::{
    ActionCallback, CommandChannel, CompletionGate, GateSignal, NotificationBus, Subscription,
};
use kortex_protocol::{
    Action, ActionDescriptor, ActionEvent, ActionHandle, ActionNotification, NotificationOptions,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 分发结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// 在超时前收到终止事件（`End` 或 `Abort`）
    Completed,
    /// 超时未收到终止事件
    TimedOut,
}

impl DispatchResult {
    pub fn is_completed(self) -> bool {
        self == DispatchResult::Completed
    }
}

/// 终止事件回调：记录每个事件，遇到 `End`/`Abort` 时触发完成门
struct TerminalEventCallback {
    signal: GateSignal,
}

impl ActionCallback for TerminalEventCallback {
    fn on_action_event(&self, notification: &ActionNotification) {
        debug!("EVENT : {}", notification.action_event);
        match notification.action_event {
            ActionEvent::End => {
                self.signal.signal();
            },
            ActionEvent::Abort => {
                warn!(
                    details = notification.abort_details.as_deref().unwrap_or("-"),
                    "Action aborted by device, treating as terminal"
                );
                self.signal.signal();
            },
            _ => {},
        }
    }
}

/// 动作分发器
///
/// 同一时刻只分发一个动作；每次分发使用独立的完成门和订阅。
pub struct ActionDispatcher<'a, D: CommandChannel + NotificationBus + ?Sized> {
    device: &'a D,
    options: NotificationOptions,
}

impl<'a, D: CommandChannel + NotificationBus + ?Sized> ActionDispatcher<'a, D> {
    /// 创建分发器
    pub fn new(device: &'a D) -> Self {
        Self {
            device,
            options: NotificationOptions::default(),
        }
    }

    /// 设置订阅选项
    pub fn with_options(mut self, options: NotificationOptions) -> Self {
        self.options = options;
        self
    }

    /// 底层设备
    pub fn device(&self) -> &'a D {
        self.device
    }

    /// 下发动作并等待其结束
    ///
    /// # 错误
    ///
    /// - 订阅、下发或取消订阅失败时返回传输错误；订阅已建立时仍保证取消
    ///
    /// # 阻塞行为
    ///
    /// 此方法会阻塞当前线程，最长 `timeout`。
    pub fn dispatch(
        &self,
        descriptor: &ActionDescriptor,
        timeout: Duration,
    ) -> Result<DispatchResult> {
        let gate = CompletionGate::new();
        let callback = Arc::new(TerminalEventCallback {
            signal: gate.signaller(),
        });

        // 守卫在任何提前返回路径上都会取消订阅
        let subscription = Subscription::subscribe(self.device, callback, self.options)?;

        info!("Executing {}", descriptor.label());
        let start = Instant::now();
        self.device.send_action(descriptor)?;

        debug!("Waiting for movement to finish (timeout {:?})", timeout);
        let finished = gate.wait(timeout);
        subscription.unsubscribe()?;

        if finished {
            info!(
                "Action {} finished in {:?}",
                descriptor.label(),
                start.elapsed()
            );
            Ok(DispatchResult::Completed)
        } else {
            warn!(
                "Timeout on action notification wait for {} after {:?}",
                descriptor.label(),
                timeout
            );
            Ok(DispatchResult::TimedOut)
        }
    }

    /// 按引用执行预存动作
    pub fn execute_by_reference(
        &self,
        handle: ActionHandle,
        timeout: Duration,
    ) -> Result<DispatchResult> {
        self.dispatch(&ActionDescriptor::Reference(handle), timeout)
    }

    /// 内联执行目标位姿
    pub fn execute_inline(&self, action: Action, timeout: Duration) -> Result<DispatchResult> {
        self.dispatch(&ActionDescriptor::Inline(action), timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_signals_only_on_terminal_events() {
        let gate = CompletionGate::new();
        let callback = TerminalEventCallback {
            signal: gate.signaller(),
        };

        for event in [ActionEvent::Start, ActionEvent::Feedback, ActionEvent::Pause] {
            callback.on_action_event(&ActionNotification::new(event));
        }
        assert!(!gate.is_signaled());

        callback.on_action_event(&ActionNotification::new(ActionEvent::End));
        assert!(gate.is_signaled());
    }

    #[test]
    fn test_callback_treats_abort_as_terminal() {
        let gate = CompletionGate::new();
        let callback = TerminalEventCallback {
            signal: gate.signaller(),
        };
        callback.on_action_event(
            &ActionNotification::new(ActionEvent::Abort).with_abort_details("joint limit"),
        );
        assert!(gate.wait(Duration::ZERO));
    }

    #[test]
    fn test_dispatch_result_is_completed() {
        assert!(DispatchResult::Completed.is_completed());
        assert!(!DispatchResult::TimedOut.is_completed());
    }
}
