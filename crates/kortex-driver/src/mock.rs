//! 模拟设备
//!
//! 无硬件依赖的 Base 设备实现，用于测试和 CLI 演示。
//!
//! # 行为
//!
//! - 通知由独立的投递线程推送（与真实传输层一致，回调不在调用方线程执行）
//! - 每次 `send_action` 消费一条脚本化的 [`ActionBehavior`]，脚本为空时使用默认行为
//! - 夹爪测量优先返回脚本化的测量值，脚本为空时按简单物理模型推演
//! - 所有指令都会被记录，便于测试断言
//!
//! # 投递语义
//!
//! 回调在订阅表锁内执行，因此 `unsubscribe` 返回后不会再有任何投递。
//! 回调中禁止调用 `subscribe`/`unsubscribe`（会死锁）。

use crate::channel::{CommandChannel, FeedbackSource};
use crate::error::DriverError;
use crate::notification::{ActionCallback, NotificationBus, NotificationHandle};
use crate::Result;
use crossbeam_channel::{Receiver, Sender};
use kortex_protocol::{
    ActionDescriptor, ActionEvent, ActionHandle, ActionNotification, ActionType, BaseFeedback,
    CartesianPose, GripperCommand, GripperMeasurement, GripperMode, GripperRequest,
    NotificationOptions, ServoingMode, StoredAction,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{debug, error, trace};

/// 预存 "Home" 动作的编号
pub const HOME_ACTION_ID: u32 = 1;

/// 模拟设备对一次 `send_action` 的响应方式
#[derive(Debug, Clone, PartialEq)]
pub enum ActionBehavior {
    /// 推送 Start，随后推送 End
    Complete,
    /// 推送 Start，随后推送 Abort
    Abort,
    /// 只推送 Start，永远不结束
    Silent,
    /// 推送 Start，经过指定时间后推送 End
    CompleteAfter(Duration),
    /// `send_action` 直接返回传输错误
    TransportFailure,
}

/// 模拟设备配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Start 与终止事件之间的间隔（模拟运动时间）
    pub motion_time: Duration,
    /// 脚本为空时的默认行为
    pub default_behavior: ActionBehavior,
    /// 初始工具位姿
    pub initial_pose: CartesianPose,
    /// "Home" 动作对应的位姿
    pub home_pose: CartesianPose,
    /// 夹爪初始位置（0 = 张开，1 = 闭合）
    pub initial_gripper_position: f32,
    /// 速度模式下每次测量查询推进的位移系数
    pub gripper_step_per_query: f32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            motion_time: Duration::from_millis(5),
            default_behavior: ActionBehavior::Complete,
            initial_pose: CartesianPose::new([0.3, 0.0, 0.4], [90.0, 0.0, 90.0]),
            home_pose: CartesianPose::new([0.576, 0.0013, 0.434], [90.0, 0.0, 90.0]),
            initial_gripper_position: 0.0,
            gripper_step_per_query: 0.5,
        }
    }
}

/// 投递线程任务
struct DeliveryJob {
    delay: Duration,
    notification: ActionNotification,
    /// 投递前应用的位姿变化（动作完成时机械臂已到位）
    arrive_at: Option<CartesianPose>,
}

/// 订阅表
#[derive(Default)]
struct Registry {
    next_id: u32,
    callbacks: HashMap<u32, Arc<dyn ActionCallback>>,
}

/// 投递线程与设备共享的状态
#[derive(Default)]
struct Shared {
    registry: Mutex<Registry>,
    tool_pose: Mutex<CartesianPose>,
    /// 成功投递给回调的次数（按回调计）
    delivered: AtomicUsize,
    /// 因无订阅者而丢弃的事件数
    dropped: AtomicUsize,
    /// 已处理（投递或丢弃）的任务数
    processed: AtomicUsize,
}

impl Shared {
    fn deliver(&self, job: DeliveryJob) {
        if let Some(pose) = job.arrive_at {
            *self.tool_pose.lock() = pose;
        }

        let registry = self.registry.lock();
        if registry.callbacks.is_empty() {
            trace!("No subscriber for {}, dropping", job.notification.action_event);
            self.dropped.fetch_add(1, Ordering::Relaxed);
        } else {
            for callback in registry.callbacks.values() {
                callback.on_action_event(&job.notification);
                self.delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
        drop(registry);
        self.processed.fetch_add(1, Ordering::Release);
    }
}

/// 夹爪物理模型
#[derive(Debug, Clone, Copy)]
struct GripperModel {
    position: f32,
    speed: f32,
}

/// 模拟 Base 设备
pub struct MockDevice {
    config: MockConfig,
    shared: Arc<Shared>,
    /// 投递任务发送端
    ///
    /// Drop 时必须先关闭通道再 join 投递线程，否则线程收不到 `Disconnected`。
    delivery_tx: ManuallyDrop<Sender<DeliveryJob>>,
    delivery_thread: Option<JoinHandle<()>>,
    is_running: Arc<AtomicBool>,
    /// 为 true 时所有 RPC 返回传输错误
    disconnected: AtomicBool,

    behaviors: Mutex<VecDeque<ActionBehavior>>,
    sent_actions: Mutex<Vec<ActionDescriptor>>,
    scheduled_jobs: AtomicUsize,
    stored_actions: Mutex<Vec<StoredAction>>,

    gripper: Mutex<GripperModel>,
    gripper_commands: Mutex<Vec<GripperCommand>>,
    measurement_script: Mutex<VecDeque<GripperMeasurement>>,
    measurement_queries: AtomicUsize,

    servoing_modes: Mutex<Vec<ServoingMode>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
}

impl MockDevice {
    /// 使用默认配置创建
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用指定配置创建
    pub fn with_config(config: MockConfig) -> Self {
        let shared = Arc::new(Shared::default());
        *shared.tool_pose.lock() = config.initial_pose;

        let (delivery_tx, delivery_rx) = crossbeam_channel::unbounded();
        let is_running = Arc::new(AtomicBool::new(true));

        let shared_clone = shared.clone();
        let is_running_clone = is_running.clone();
        let delivery_thread = spawn(move || {
            delivery_loop(delivery_rx, shared_clone, is_running_clone);
        });

        let stored_actions = vec![StoredAction {
            name: "Home".to_string(),
            handle: ActionHandle::new(HOME_ACTION_ID, ActionType::ReachJointAngles),
        }];

        let gripper = GripperModel {
            position: config.initial_gripper_position,
            speed: 0.0,
        };

        Self {
            config,
            shared,
            delivery_tx: ManuallyDrop::new(delivery_tx),
            delivery_thread: Some(delivery_thread),
            is_running,
            disconnected: AtomicBool::new(false),
            behaviors: Mutex::new(VecDeque::new()),
            sent_actions: Mutex::new(Vec::new()),
            scheduled_jobs: AtomicUsize::new(0),
            stored_actions: Mutex::new(stored_actions),
            gripper: Mutex::new(gripper),
            gripper_commands: Mutex::new(Vec::new()),
            measurement_script: Mutex::new(VecDeque::new()),
            measurement_queries: AtomicUsize::new(0),
            servoing_modes: Mutex::new(Vec::new()),
            subscribe_calls: AtomicUsize::new(0),
            unsubscribe_calls: AtomicUsize::new(0),
        }
    }

    // ==================== 脚本 ====================

    /// 追加后续 `send_action` 的响应方式（按顺序消费）
    pub fn script_actions(&self, behaviors: impl IntoIterator<Item = ActionBehavior>) {
        self.behaviors.lock().extend(behaviors);
    }

    /// 追加夹爪测量值（按顺序消费，耗尽后回落到物理模型）
    pub fn script_measurements(&self, measurements: impl IntoIterator<Item = GripperMeasurement>) {
        self.measurement_script.lock().extend(measurements);
    }

    /// 添加预存动作
    pub fn add_stored_action(&self, name: impl Into<String>, handle: ActionHandle) {
        self.stored_actions.lock().push(StoredAction {
            name: name.into(),
            handle,
        });
    }

    /// 清空预存动作
    pub fn clear_stored_actions(&self) {
        self.stored_actions.lock().clear();
    }

    /// 模拟断线：之后所有 RPC 返回传输错误
    pub fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.store(disconnected, Ordering::Relaxed);
    }

    /// 从投递线程推送任意通知（不经过 `send_action`）
    pub fn push_notification(&self, notification: ActionNotification, delay: Duration) {
        self.schedule(DeliveryJob {
            delay,
            notification,
            arrive_at: None,
        });
    }

    // ==================== 观测 ====================

    /// 已下发的动作
    pub fn sent_actions(&self) -> Vec<ActionDescriptor> {
        self.sent_actions.lock().clone()
    }

    /// 已下发的夹爪指令
    pub fn gripper_commands(&self) -> Vec<GripperCommand> {
        self.gripper_commands.lock().clone()
    }

    /// 夹爪测量查询次数
    pub fn measurement_queries(&self) -> usize {
        self.measurement_queries.load(Ordering::Relaxed)
    }

    /// 设置过的伺服模式（按调用顺序）
    pub fn servoing_modes(&self) -> Vec<ServoingMode> {
        self.servoing_modes.lock().clone()
    }

    /// 当前活跃订阅数
    pub fn active_subscriptions(&self) -> usize {
        self.shared.registry.lock().callbacks.len()
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::Relaxed)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::Relaxed)
    }

    /// 投递给回调的通知数
    pub fn delivered_notifications(&self) -> usize {
        self.shared.delivered.load(Ordering::Relaxed)
    }

    /// 因无订阅者而丢弃的通知数
    pub fn dropped_notifications(&self) -> usize {
        self.shared.dropped.load(Ordering::Relaxed)
    }

    /// 阻塞直到所有已排队的通知处理完毕或超时
    ///
    /// 返回 `true` 表示队列已清空。
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        loop {
            let scheduled = self.scheduled_jobs.load(Ordering::Acquire);
            if self.shared.processed.load(Ordering::Acquire) >= scheduled {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// 当前工具位姿
    pub fn tool_pose(&self) -> CartesianPose {
        *self.shared.tool_pose.lock()
    }

    /// 夹爪当前位置（物理模型）
    pub fn gripper_position(&self) -> f32 {
        self.gripper.lock().position
    }

    // ==================== 内部 ====================

    fn check_connected(&self) -> Result<()> {
        if self.disconnected.load(Ordering::Relaxed) {
            Err(DriverError::Transport("simulated link is down".to_string()))
        } else {
            Ok(())
        }
    }

    fn schedule(&self, job: DeliveryJob) {
        self.scheduled_jobs.fetch_add(1, Ordering::AcqRel);
        if self.delivery_tx.send(job).is_err() {
            error!("Delivery thread exited, notification lost");
            self.shared.processed.fetch_add(1, Ordering::Release);
        }
    }

    /// 动作完成后机械臂到达的位姿
    fn target_pose(&self, descriptor: &ActionDescriptor) -> Option<CartesianPose> {
        match descriptor {
            ActionDescriptor::Inline(action) => Some(action.target),
            ActionDescriptor::Reference(handle) if handle.identifier == HOME_ACTION_ID => {
                Some(self.config.home_pose)
            },
            ActionDescriptor::Reference(_) => None,
        }
    }

    fn notification_for(descriptor: &ActionDescriptor, event: ActionEvent) -> ActionNotification {
        let notification = ActionNotification::new(event);
        match descriptor {
            ActionDescriptor::Reference(handle) => notification.with_handle(*handle),
            ActionDescriptor::Inline(_) => notification,
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn delivery_loop(rx: Receiver<DeliveryJob>, shared: Arc<Shared>, is_running: Arc<AtomicBool>) {
    while let Ok(job) = rx.recv() {
        if !is_running.load(Ordering::Acquire) {
            shared.processed.fetch_add(1, Ordering::Release);
            continue;
        }
        if !job.delay.is_zero() {
            std::thread::sleep(job.delay);
        }
        shared.deliver(job);
    }
    trace!("Mock delivery thread exiting");
}

impl CommandChannel for MockDevice {
    fn send_action(&self, descriptor: &ActionDescriptor) -> Result<()> {
        self.check_connected()?;

        let behavior = self
            .behaviors
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.config.default_behavior.clone());
        debug!("Mock device executing {} ({:?})", descriptor.label(), behavior);

        if behavior == ActionBehavior::TransportFailure {
            return Err(DriverError::Transport("simulated RPC failure".to_string()));
        }
        self.sent_actions.lock().push(descriptor.clone());

        self.schedule(DeliveryJob {
            delay: Duration::ZERO,
            notification: Self::notification_for(descriptor, ActionEvent::Start),
            arrive_at: None,
        });

        let motion_time = self.config.motion_time;
        let terminal = match behavior {
            ActionBehavior::Complete => Some((ActionEvent::End, motion_time)),
            ActionBehavior::Abort => Some((ActionEvent::Abort, motion_time)),
            ActionBehavior::CompleteAfter(delay) => Some((ActionEvent::End, delay)),
            ActionBehavior::Silent | ActionBehavior::TransportFailure => None,
        };

        if let Some((event, delay)) = terminal {
            let notification = Self::notification_for(descriptor, event);
            let (notification, arrive_at) = if event == ActionEvent::Abort {
                (notification.with_abort_details("simulated abort"), None)
            } else {
                (notification, self.target_pose(descriptor))
            };
            self.schedule(DeliveryJob {
                delay,
                notification,
                arrive_at,
            });
        }
        Ok(())
    }

    fn send_gripper_command(&self, command: &GripperCommand) -> Result<()> {
        self.check_connected()?;
        self.gripper_commands.lock().push(command.clone());

        let value = command.fingers.first().map(|f| f.value).unwrap_or(0.0);
        let mut gripper = self.gripper.lock();
        match command.mode {
            GripperMode::Position => {
                gripper.position = value.clamp(0.0, 1.0);
                gripper.speed = 0.0;
            },
            GripperMode::Speed => gripper.speed = value,
            _ => {},
        }
        Ok(())
    }

    fn get_gripper_measurement(&self, _request: &GripperRequest) -> Result<GripperMeasurement> {
        self.check_connected()?;
        self.measurement_queries.fetch_add(1, Ordering::Relaxed);

        if let Some(scripted) = self.measurement_script.lock().pop_front() {
            return Ok(scripted);
        }

        // 速度为负表示闭合方向，位置值增大
        let mut gripper = self.gripper.lock();
        let step = -gripper.speed * self.config.gripper_step_per_query;
        gripper.position = (gripper.position + step).clamp(0.0, 1.0);
        Ok(GripperMeasurement::single(gripper.position))
    }

    fn set_servoing_mode(&self, mode: ServoingMode) -> Result<()> {
        self.check_connected()?;
        self.servoing_modes.lock().push(mode);
        Ok(())
    }

    fn list_stored_actions(&self, filter: ActionType) -> Result<Vec<StoredAction>> {
        self.check_connected()?;
        Ok(self
            .stored_actions
            .lock()
            .iter()
            .filter(|a| a.handle.action_type == filter)
            .cloned()
            .collect())
    }
}

impl FeedbackSource for MockDevice {
    fn refresh_feedback(&self) -> Result<BaseFeedback> {
        self.check_connected()?;
        Ok(BaseFeedback::new(self.tool_pose()))
    }
}

impl NotificationBus for MockDevice {
    fn subscribe(
        &self,
        callback: Arc<dyn ActionCallback>,
        _options: NotificationOptions,
    ) -> Result<NotificationHandle> {
        self.check_connected()?;
        self.subscribe_calls.fetch_add(1, Ordering::Relaxed);

        let mut registry = self.shared.registry.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.callbacks.insert(id, callback);
        Ok(NotificationHandle::new(id))
    }

    fn unsubscribe(&self, handle: NotificationHandle) -> Result<()> {
        self.unsubscribe_calls.fetch_add(1, Ordering::Relaxed);
        let id = handle.identifier();
        match self.shared.registry.lock().callbacks.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DriverError::UnknownSubscription(id)),
        }
    }
}

impl Drop for MockDevice {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::Release);

        // 关键：必须在 join 线程之前真正 drop 掉 Sender，否则接收端不会 Disconnected。
        unsafe {
            ManuallyDrop::drop(&mut self.delivery_tx);
        }

        if let Some(handle) = self.delivery_thread.take()
            && handle.join().is_err()
        {
            error!("Mock delivery thread panicked");
        }
    }
}
