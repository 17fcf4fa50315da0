//! 完成门（Completion Gate）
//!
//! 单次触发的同步原语：通知回调（投递线程）触发信号，控制线程带超时等待。
//!
//! # 设计
//!
//! - [`CompletionGate`] 是等待端，`wait` 按值消费自身，一个门最多被观察一次
//! - [`GateSignal`] 是触发端，可以移动到回调中；多次触发等价于一次
//! - 等待端超时返回后再触发是安全的，不会影响已经返回的结果
//!
//! # 示例
//!
//! ```rust
//! use kortex_driver::CompletionGate;
//! use std::time::Duration;
//!
//! let gate = CompletionGate::new();
//! let signal = gate.signaller();
//!
//! std::thread::spawn(move || {
//!     signal.signal();
//! });
//!
//! assert!(gate.wait(Duration::from_secs(5)));
//! ```

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Default)]
struct GateState {
    signaled: Mutex<bool>,
    cond: Condvar,
}

/// 完成门（等待端）
#[derive(Debug, Default)]
pub struct CompletionGate {
    state: Arc<GateState>,
}

/// 完成门（触发端）
#[derive(Debug, Clone)]
pub struct GateSignal {
    state: Arc<GateState>,
}

impl CompletionGate {
    /// 创建未触发的门
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取触发端
    pub fn signaller(&self) -> GateSignal {
        GateSignal {
            state: Arc::clone(&self.state),
        }
    }

    /// 是否已触发（不阻塞）
    pub fn is_signaled(&self) -> bool {
        *self.state.signaled.lock()
    }

    /// 阻塞等待，直到触发或超时
    ///
    /// # 返回
    ///
    /// - `true`: 在超时前已触发（若等待前已触发则立即返回）
    /// - `false`: 超时
    ///
    /// # 阻塞行为
    ///
    /// 此方法是**阻塞的 (Blocking)**，请不要在 `async` 上下文中直接调用。
    pub fn wait(self, timeout: Duration) -> bool {
        // 超大超时值（如 Duration::MAX）按无限等待处理
        let deadline = Instant::now().checked_add(timeout);
        let mut signaled = self.state.signaled.lock();

        while !*signaled {
            match deadline {
                Some(deadline) => {
                    if self.state.cond.wait_until(&mut signaled, deadline).timed_out() {
                        trace!("Completion gate timed out after {:?}", timeout);
                        return *signaled;
                    }
                },
                None => self.state.cond.wait(&mut signaled),
            }
        }
        true
    }
}

impl GateSignal {
    /// 触发门（幂等）
    ///
    /// 返回 `true` 表示本次调用是第一次触发。
    pub fn signal(&self) -> bool {
        let mut signaled = self.state.signaled.lock();
        if *signaled {
            return false;
        }
        *signaled = true;
        self.state.cond.notify_all();
        trace!("Completion gate signaled");
        true
    }
}
