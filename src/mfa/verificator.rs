//! TOTP 滑动窗口验证
//!
//! 在目标计数器两侧各 `window` 个时间步内按升序查找匹配的验证码。
//! 传入上次接受的计数器时启用防重放：查找从 `max(t - window, previous + 1)` 开始，
//! 匹配后返回命中的计数器，由调用方持久化作为新的下限。
//!
//! ## 示例
//!
//! ```rust
//! use otprs::mfa::verificator::{TotpVerificator, VerificatorConfig, VerifyOutcome};
//!
//! let verificator = TotpVerificator::new(VerificatorConfig::default().with_window(2)).unwrap();
//!
//! let outcome = verificator
//!     .verify("424074", "ADUMJO5634NPDEKW", Some(26213400), None)
//!     .unwrap();
//! assert_eq!(outcome, VerifyOutcome::Valid);
//!
//! // 防重放：同一个码不能被再次接受
//! let outcome = verificator
//!     .verify("424074", "ADUMJO5634NPDEKW", Some(26213400), Some(26213400))
//!     .unwrap();
//! assert_eq!(outcome, VerifyOutcome::Matched(26213402));
//!
//! let outcome = verificator
//!     .verify("424074", "ADUMJO5634NPDEKW", Some(26213400), Some(26213402))
//!     .unwrap();
//! assert_eq!(outcome, VerifyOutcome::Invalid);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::mfa::hotp::{HotpConfig, HotpGenerator};
use crate::mfa::totp::validate_period;
use crate::random::constant_time_compare_str;
use crate::secret::{SecretValidator, Validator};

/// 验证器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificatorConfig {
    /// 密钥更新周期（秒），用于从当前时间推导计数器，默认 30 秒
    pub key_regeneration: u64,

    /// 目标计数器两侧各检查的时间步数，默认 1
    pub window: u64,

    /// 验证码生成参数
    pub hotp: HotpConfig,
}

impl Default for VerificatorConfig {
    fn default() -> Self {
        Self {
            key_regeneration: 30,
            window: 1,
            hotp: HotpConfig::default(),
        }
    }
}

impl VerificatorConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置密钥更新周期
    pub fn with_key_regeneration(mut self, seconds: u64) -> Self {
        self.key_regeneration = seconds;
        self
    }

    /// 设置窗口大小
    pub fn with_window(mut self, window: u64) -> Self {
        self.window = window;
        self
    }

    /// 设置验证码生成参数
    pub fn with_hotp(mut self, hotp: HotpConfig) -> Self {
        self.hotp = hotp;
        self
    }

    /// 检查配置是否有效
    pub fn validate(&self) -> Result<()> {
        self.hotp.validate()?;
        validate_period("key_regeneration", self.key_regeneration)
    }
}

/// 验证结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// 匹配成功（未启用防重放）
    Valid,
    /// 匹配成功，附带命中的计数器（启用了防重放）
    Matched(u64),
    /// 窗口内没有匹配
    Invalid,
}

impl VerifyOutcome {
    /// 是否验证成功
    pub fn is_valid(&self) -> bool {
        !matches!(self, VerifyOutcome::Invalid)
    }

    /// 命中的计数器（仅防重放模式）
    pub fn matched_counter(&self) -> Option<u64> {
        match self {
            VerifyOutcome::Matched(counter) => Some(*counter),
            _ => None,
        }
    }
}

/// TOTP 滑动窗口验证器
#[derive(Debug, Clone)]
pub struct TotpVerificator<V = SecretValidator, C = SystemClock> {
    generator: HotpGenerator<V>,
    config: VerificatorConfig,
    clock: C,
}

impl TotpVerificator {
    /// 使用默认校验器和系统时钟创建验证器
    pub fn new(config: VerificatorConfig) -> Result<Self> {
        Self::with_parts(config, SecretValidator, SystemClock)
    }
}

impl<V: Validator, C: Clock> TotpVerificator<V, C> {
    /// 使用指定校验器和时钟创建验证器
    pub fn with_parts(config: VerificatorConfig, validator: V, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator: HotpGenerator::with_validator(config.hotp, validator)?,
            config,
            clock,
        })
    }

    /// 验证用户输入的验证码
    ///
    /// # 参数
    ///
    /// * `key` - 用户输入的验证码
    /// * `secret` - base32 密钥文本
    /// * `timestamp` - 目标计数器，`None` 表示 `floor(now / key_regeneration)`
    /// * `previous` - 上次接受的计数器；给出时启用防重放
    pub fn verify(
        &self,
        key: &str,
        secret: &str,
        timestamp: Option<i64>,
        previous: Option<u64>,
    ) -> Result<VerifyOutcome> {
        let target = timestamp.unwrap_or_else(|| self.current_counter());
        let target = u64::try_from(target).map_err(|_| Error::InvalidTimestamp(target))?;

        let secret = self.generator.decode_secret(secret)?;
        let hotp = self.generator.config();

        let mut counter = self.starting_counter(target, previous);
        let last = target.saturating_add(self.config.window);

        while counter <= last {
            let expected = super::hotp(hotp.algorithm, &secret, counter, hotp.digits)?;
            if constant_time_compare_str(&expected, key) {
                trace!(counter, "one-time password accepted");
                return Ok(match previous {
                    Some(_) => VerifyOutcome::Matched(counter),
                    None => VerifyOutcome::Valid,
                });
            }

            if counter == u64::MAX {
                break;
            }
            counter += 1;
        }

        debug!(
            target,
            window = self.config.window,
            replay_protected = previous.is_some(),
            "no matching one-time password in window"
        );
        Ok(VerifyOutcome::Invalid)
    }

    /// 不启用防重放的验证
    pub fn verify_key(&self, key: &str, secret: &str, timestamp: Option<i64>) -> Result<bool> {
        Ok(self.verify(key, secret, timestamp, None)?.is_valid())
    }

    /// 启用防重放的验证，返回命中的计数器
    pub fn verify_with_replay_protection(
        &self,
        key: &str,
        secret: &str,
        timestamp: Option<i64>,
        previous: u64,
    ) -> Result<Option<u64>> {
        Ok(self
            .verify(key, secret, timestamp, Some(previous))?
            .matched_counter())
    }

    /// 当前时间对应的计数器
    pub fn current_counter(&self) -> i64 {
        self.clock
            .now()
            .div_euclid(self.config.key_regeneration as i64)
    }

    /// 获取配置
    pub fn config(&self) -> &VerificatorConfig {
        &self.config
    }

    // ========================================================================
    // 内部方法
    // ========================================================================

    fn starting_counter(&self, target: u64, previous: Option<u64>) -> u64 {
        let start = target.saturating_sub(self.config.window);
        match previous {
            Some(previous) => start.max(previous.saturating_add(1)),
            None => start,
        }
    }
}
