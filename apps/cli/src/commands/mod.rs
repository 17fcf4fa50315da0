//! 命令定义和实现
//!
//! 每个命令的 `execute` 返回 `Ok(true)` 表示所有动作都已完成。

pub mod actions;
pub mod draw;
pub mod grip;
pub mod home;
pub mod run;

pub use actions::ActionsCommand;
pub use draw::DrawCommand;
pub use grip::GripCommand;
pub use home::HomeCommand;
pub use run::RunCommand;
