//! 路径构造
//!
//! 基于当前工具位姿生成笛卡尔目标动作。所有偏移都相对于读取反馈时的工具位姿，
//! 姿态角沿用反馈中的值。

use crate::config::{ClientConfig, DrawingConfig};
use crate::error::Result;
use crate::sequence::MotionSequenceRunner;
use kortex_driver::BaseDevice;
use kortex_protocol::{Action, ActionDescriptor, ActionType, CartesianPose};
use tracing::info;

/// 内联笛卡尔动作的名称
pub const CARTESIAN_ACTION_NAME: &str = "Example Cartesian action movement";

/// 构造内联笛卡尔动作
///
/// # 参数
///
/// - `x`, `y`, `z`: 目标位置（米）
/// - `orientation`: 姿态角 `[theta_x, theta_y, theta_z]`（度），通常取自当前反馈
pub fn cartesian_action(
    name: impl Into<String>,
    x: f32,
    y: f32,
    z: f32,
    orientation: [f32; 3],
) -> ActionDescriptor {
    Action::reach_pose(name, CartesianPose::new([x, y, z], orientation)).into()
}

/// 以 `origin` 为基准生成平面多边形顶点动作
///
/// 每个偏移 `[dx, dy]` 都相对于 `origin`（不是上一个顶点），高度保持 `origin.z`。
pub fn relative_polygon(origin: &CartesianPose, offsets: &[[f32; 2]]) -> Vec<ActionDescriptor> {
    offsets
        .iter()
        .map(|[dx, dy]| {
            let target = origin.translated(*dx, *dy, 0.0);
            Action::reach_pose(CARTESIAN_ACTION_NAME, target).into()
        })
        .collect()
}

/// 绘图计划：接近偏移 + 多边形顶点
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPlan {
    pub approach_offset: [f32; 3],
    pub corners: Vec<[f32; 2]>,
}

impl Default for DrawingPlan {
    fn default() -> Self {
        Self::from(&DrawingConfig::default())
    }
}

impl From<&DrawingConfig> for DrawingPlan {
    fn from(config: &DrawingConfig) -> Self {
        Self {
            approach_offset: config.approach_offset,
            corners: config.corners.clone(),
        }
    }
}

impl DrawingPlan {
    /// 从当前位姿到绘图起点的动作
    pub fn approach(&self, current: &CartesianPose) -> ActionDescriptor {
        let [dx, dy, dz] = self.approach_offset;
        Action::reach_pose(CARTESIAN_ACTION_NAME, current.translated(dx, dy, dz)).into()
    }

    /// 以绘图起点为基准的顶点动作
    pub fn polygon(&self, origin: &CartesianPose) -> Vec<ActionDescriptor> {
        relative_polygon(origin, &self.corners)
    }
}

/// 绘图流程：回到安全位置 → 移动到绘图起点 → 依次经过各顶点
///
/// 每一段开始前都会重新读取工具位姿，偏移基于机械臂实际到达的位置。
pub struct DrawingRoutine<'a, D: BaseDevice + ?Sized> {
    device: &'a D,
    runner: MotionSequenceRunner<'a, D>,
    plan: DrawingPlan,
    home_action: String,
}

impl<'a, D: BaseDevice + ?Sized> DrawingRoutine<'a, D> {
    pub fn new(device: &'a D, config: &ClientConfig) -> Self {
        Self {
            device,
            runner: MotionSequenceRunner::from_config(device, config),
            plan: DrawingPlan::from(&config.drawing),
            home_action: config.home_action.clone(),
        }
    }

    pub fn plan(&self) -> &DrawingPlan {
        &self.plan
    }

    /// 执行绘图
    ///
    /// 返回 `Ok(false)` 表示某一段超时或安全位置动作不存在，后续段不再执行。
    pub fn run(&self) -> Result<bool> {
        if !self
            .runner
            .move_to_stored(&self.home_action, ActionType::ReachJointAngles)?
        {
            return Ok(false);
        }

        let feedback = self.device.refresh_feedback()?;
        info!("Starting Cartesian action movement ...");
        if !self.runner.run_step(&self.plan.approach(&feedback.tool_pose))? {
            return Ok(false);
        }

        let origin = self.device.refresh_feedback()?.tool_pose;
        let [x, y, z] = origin.position();
        info!("Drawing from ({:.3}, {:.3}, {:.3})", x, y, z);
        self.runner.run(&self.plan.polygon(&origin))
    }
}
