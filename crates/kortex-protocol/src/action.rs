//! 动作描述
//!
//! 设备执行的离散动作有两种来源：
//! - 设备上预先存储的动作（通过 [`ActionHandle`] 引用）
//! - 调用方内联给出的目标位姿（[`Action`]）

/// 动作类型
///
/// 既用于标记预存动作的类别，也用作 `list_stored_actions` 的过滤条件。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, num_enum::FromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u32)]
pub enum ActionType {
    /// 未指定（未知编码也解析为此值）
    #[default]
    Unspecified = 0,
    SendTwistCommand = 1,
    SendJointSpeeds = 3,
    /// 关节空间到达目标角度
    ReachJointAngles = 4,
    /// 笛卡尔空间到达目标位姿
    ReachPose = 5,
    Snapshot = 7,
    TimeDelay = 16,
    ExecuteAction = 17,
    SendGripperCommand = 18,
    StopAction = 20,
}

/// 预存动作句柄（不透明）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionHandle {
    /// 设备侧动作编号
    pub identifier: u32,
    /// 动作类型
    pub action_type: ActionType,
    /// 权限位
    pub permission: u32,
}

impl ActionHandle {
    pub fn new(identifier: u32, action_type: ActionType) -> Self {
        Self {
            identifier,
            action_type,
            permission: 0,
        }
    }
}

/// 设备返回的预存动作条目
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoredAction {
    pub name: String,
    pub handle: ActionHandle,
}

/// 笛卡尔位姿
///
/// - `x`/`y`/`z`: 位置（米）
/// - `theta_x`/`theta_y`/`theta_z`: 姿态角（度）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianPose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub theta_x: f32,
    pub theta_y: f32,
    pub theta_z: f32,
}

impl CartesianPose {
    /// 由位置和姿态角构造
    pub fn new(position: [f32; 3], orientation: [f32; 3]) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            theta_x: orientation[0],
            theta_y: orientation[1],
            theta_z: orientation[2],
        }
    }

    /// 位置分量
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// 姿态分量
    pub fn orientation(&self) -> [f32; 3] {
        [self.theta_x, self.theta_y, self.theta_z]
    }

    /// 平移（姿态保持不变）
    pub fn translated(&self, dx: f32, dy: f32, dz: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            ..*self
        }
    }
}

/// 内联动作：到达目标位姿
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    /// 动作名称（仅用于日志和设备侧显示）
    pub name: String,
    /// 应用自定义数据
    pub application_data: String,
    /// 目标位姿
    pub target: CartesianPose,
}

impl Action {
    /// 创建到达位姿的动作
    pub fn reach_pose(name: impl Into<String>, target: CartesianPose) -> Self {
        Self {
            name: name.into(),
            application_data: String::new(),
            target,
        }
    }
}

/// 动作描述（下发后不可变）
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ActionDescriptor {
    /// 按引用执行预存动作
    Reference(ActionHandle),
    /// 内联执行目标位姿
    Inline(Action),
}

impl ActionDescriptor {
    /// 用于日志的简短描述
    pub fn label(&self) -> String {
        match self {
            ActionDescriptor::Reference(handle) => {
                format!("stored#{} ({:?})", handle.identifier, handle.action_type)
            },
            ActionDescriptor::Inline(action) => format!("inline '{}'", action.name),
        }
    }
}

impl From<ActionHandle> for ActionDescriptor {
    fn from(handle: ActionHandle) -> Self {
        ActionDescriptor::Reference(handle)
    }
}

impl From<Action> for ActionDescriptor {
    fn from(action: Action) -> Self {
        ActionDescriptor::Inline(action)
    }
}
