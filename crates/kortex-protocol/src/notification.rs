//! 动作事件通知
//!
//! 设备在执行动作期间通过通知流推送生命周期事件。
//! 对于等待动作完成的一方，只有 `End` 和 `Abort` 是终止事件。

use crate::action::ActionHandle;

/// 动作事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
pub enum ActionEvent {
    /// 未指定（未知编码也解析为此值）
    #[default]
    Unspecified = 0,
    /// 动作结束
    End = 1,
    /// 动作中止
    Abort = 2,
    /// 动作暂停
    Pause = 3,
    /// 动作开始
    Start = 4,
    /// 动作执行中的反馈
    Feedback = 5,
    PreprocessStart = 6,
    PreprocessEnd = 7,
    PreprocessAbort = 8,
}

impl ActionEvent {
    /// 是否为终止事件（`End` 或 `Abort`）
    ///
    /// 注意：这里不区分正常结束与中止，两者都意味着"不必再等待"。
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionEvent::End | ActionEvent::Abort)
    }

    /// 设备侧名称（用于日志）
    pub fn name(self) -> &'static str {
        match self {
            ActionEvent::Unspecified => "UNSPECIFIED_ACTION_EVENT",
            ActionEvent::End => "ACTION_END",
            ActionEvent::Abort => "ACTION_ABORT",
            ActionEvent::Pause => "ACTION_PAUSE",
            ActionEvent::Start => "ACTION_START",
            ActionEvent::Feedback => "ACTION_FEEDBACK",
            ActionEvent::PreprocessStart => "ACTION_PREPROCESS_START",
            ActionEvent::PreprocessEnd => "ACTION_PREPROCESS_END",
            ActionEvent::PreprocessAbort => "ACTION_PREPROCESS_ABORT",
        }
    }
}

impl std::fmt::Display for ActionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 动作通知
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionNotification {
    pub action_event: ActionEvent,
    /// 触发事件的动作（设备可能不填）
    pub handle: Option<ActionHandle>,
    /// 中止原因（仅 `Abort` 时可能存在）
    pub abort_details: Option<String>,
}

impl ActionNotification {
    pub fn new(action_event: ActionEvent) -> Self {
        Self {
            action_event,
            handle: None,
            abort_details: None,
        }
    }

    pub fn with_handle(mut self, handle: ActionHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn with_abort_details(mut self, details: impl Into<String>) -> Self {
        self.abort_details = Some(details.into());
        self
    }
}

/// 订阅投递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NotificationKind {
    /// 持续投递，直到取消订阅
    #[default]
    Later,
    /// 只投递一次
    Once,
}

/// 订阅选项
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NotificationOptions {
    pub kind: NotificationKind,
    /// 投递频率上限（Hz），`None` 表示由设备决定
    pub rate_hz: Option<f32>,
}
