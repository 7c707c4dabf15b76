//! 时钟
//!
//! TOTP 引擎通过 [`Clock`] 获取当前 Unix 时间戳（秒），便于注入固定时间。

use chrono::Utc;

/// 时间来源
pub trait Clock: Send + Sync {
    /// 当前 Unix 时间戳（秒）
    fn now(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// 固定时钟，始终返回构造时给定的时间戳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> i64 {
        (**self).now()
    }
}
