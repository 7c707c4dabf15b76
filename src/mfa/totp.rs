//! TOTP (基于时间的一次性密码) 实现模块
//!
//! 兼容 Google Authenticator、Authy 等应用。
//!
//! ## 特性
//!
//! - 符合 RFC 6238 标准
//! - 支持自定义起始时间 (epoch)、周期和位数
//! - 支持对称时间容差 (leeway) 验证
//! - 生成 otpauth:// URI
//!
//! ## 示例
//!
//! ```rust
//! use otprs::mfa::totp::{Totp, TotpConfig};
//! use otprs::secret::SecretKey;
//!
//! let totp = Totp::new(TotpConfig::default()).unwrap();
//! let secret = SecretKey::generate(32).unwrap();
//!
//! // 生成当前 TOTP 码
//! let code = totp.now(&secret).unwrap();
//!
//! // 验证用户输入的码，允许 10 秒的时钟偏差
//! let is_valid = totp.verify(&secret, &code, None, Some(10)).unwrap();
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::mfa::{Algorithm, hotp, validate_digits};
use crate::random::constant_time_compare_str;
use crate::secret::SecretKey;

/// TOTP 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// 哈希算法，默认 SHA512
    pub algorithm: Algorithm,

    /// 验证码位数，默认 6 位
    pub digits: u32,

    /// 计数起始时间（Unix 秒），默认 0
    pub epoch: i64,

    /// 时间步长（秒），默认 30 秒
    pub period: u64,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::SHA512,
            digits: 6,
            epoch: 0,
            period: 30,
        }
    }
}

impl TotpConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置哈希算法
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 设置验证码位数
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 设置计数起始时间
    pub fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = epoch;
        self
    }

    /// 设置时间步长
    pub fn with_period(mut self, seconds: u64) -> Self {
        self.period = seconds;
        self
    }

    /// 创建 Google Authenticator 兼容配置
    pub fn google_authenticator() -> Self {
        Self {
            algorithm: Algorithm::SHA1,
            digits: 6,
            epoch: 0,
            period: 30,
        }
    }

    /// 创建高安全性配置
    pub fn high_security() -> Self {
        Self {
            algorithm: Algorithm::SHA512,
            digits: 8,
            epoch: 0,
            period: 30,
        }
    }

    /// 检查配置是否有效
    pub fn validate(&self) -> Result<()> {
        validate_digits(self.digits)?;
        validate_period("period", self.period)
    }
}

/// 周期必须为正，且能无损转换为 i64
pub(crate) fn validate_period(key: &str, period: u64) -> Result<()> {
    if period == 0 || period > i64::MAX as u64 {
        return Err(Error::invalid_config(key, "must be a positive number of seconds"));
    }
    Ok(())
}

/// TOTP 引擎
#[derive(Debug, Clone)]
pub struct Totp<C = SystemClock> {
    config: TotpConfig,
    clock: C,
}

impl Totp {
    /// 使用系统时钟创建 TOTP 引擎
    pub fn new(config: TotpConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Totp<C> {
    /// 使用指定时钟创建 TOTP 引擎
    pub fn with_clock(config: TotpConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, clock })
    }

    /// 时间戳 → 计数器：`floor((timestamp - epoch) / period)`
    pub fn timecode(&self, timestamp: i64) -> Result<u64> {
        let elapsed = timestamp
            .checked_sub(self.config.epoch)
            .ok_or(Error::InvalidTimestamp(timestamp))?;
        let counter = elapsed.div_euclid(self.config.period as i64);

        u64::try_from(counter).map_err(|_| {
            debug!(timestamp, epoch = self.config.epoch, "timestamp precedes TOTP epoch");
            Error::InvalidTimestamp(timestamp)
        })
    }

    /// 生成指定计数器的验证码
    pub fn generate(&self, secret: &SecretKey, counter: u64) -> Result<String> {
        let key = secret.decode()?;
        hotp(self.config.algorithm, &key, counter, self.config.digits)
    }

    /// 生成指定时间的验证码
    pub fn at(&self, secret: &SecretKey, timestamp: i64) -> Result<String> {
        let counter = self.timecode(timestamp)?;
        self.generate(secret, counter)
    }

    /// 生成当前时间的验证码
    pub fn now(&self, secret: &SecretKey) -> Result<String> {
        self.at(secret, self.clock.now())
    }

    /// 验证 TOTP 验证码
    ///
    /// # 参数
    ///
    /// * `secret` - 密钥
    /// * `code` - 用户输入的验证码
    /// * `timestamp` - 验证时间，`None` 表示当前时间
    /// * `leeway` - 时间容差（秒），绝对值必须小于周期；给出时依次检查
    ///   `timestamp - leeway`、`timestamp`、`timestamp + leeway`
    pub fn verify(
        &self,
        secret: &SecretKey,
        code: &str,
        timestamp: Option<i64>,
        leeway: Option<i64>,
    ) -> Result<bool> {
        let timestamp = timestamp.unwrap_or_else(|| self.clock.now());
        if timestamp < 0 {
            debug!(timestamp, "negative verification timestamp rejected");
            return Err(Error::InvalidTimestamp(timestamp));
        }

        let Some(leeway) = leeway else {
            return self.compare_at(secret, code, timestamp);
        };

        let magnitude = leeway.unsigned_abs();
        if magnitude >= self.config.period {
            debug!(leeway, period = self.config.period, "leeway rejected");
            return Err(Error::InvalidLeeway {
                leeway,
                period: self.config.period,
            });
        }

        // period 不超过 i64::MAX，所以 magnitude 可以无损转换
        let magnitude = magnitude as i64;
        let before = timestamp - magnitude;
        let after = timestamp
            .checked_add(magnitude)
            .ok_or(Error::InvalidTimestamp(timestamp))?;

        Ok(self.compare_at(secret, code, before)?
            || self.compare_at(secret, code, timestamp)?
            || self.compare_at(secret, code, after)?)
    }

    /// 当前验证码的剩余有效时间（秒）
    pub fn time_remaining(&self) -> u64 {
        let period = self.config.period as i64;
        let elapsed = self.clock.now().saturating_sub(self.config.epoch);
        (period - elapsed.rem_euclid(period)) as u64
    }

    /// 生成 otpauth:// URI
    ///
    /// 此 URI 可用于生成二维码，供认证器应用扫描
    ///
    /// 格式: otpauth://totp/Issuer:account?...
    pub fn provisioning_uri(
        &self,
        secret: &SecretKey,
        account: &str,
        issuer: Option<&str>,
    ) -> String {
        let label = match issuer {
            Some(issuer) => format!("{}:{}", issuer, account),
            None => account.to_string(),
        };

        let mut uri = format!(
            "otpauth://totp/{}?secret={}&digits={}&period={}&algorithm={}",
            urlencoding::encode(&label),
            secret.as_str(),
            self.config.digits,
            self.config.period,
            self.config.algorithm.as_str()
        );

        if let Some(issuer) = issuer {
            uri.push_str(&format!("&issuer={}", urlencoding::encode(issuer)));
        }

        uri
    }

    /// 获取配置
    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    /// 获取时钟
    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ========================================================================
    // 内部方法
    // ========================================================================

    fn compare_at(&self, secret: &SecretKey, code: &str, timestamp: i64) -> Result<bool> {
        let expected = Zeroizing::new(self.at(secret, timestamp)?);
        Ok(constant_time_compare_str(&expected, code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const SECRET: &str = "ADUMJO5634NPDEKW";
    const RFC_SHA1_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn secret() -> SecretKey {
        SecretKey::new(SECRET).unwrap()
    }

    fn fixed(timestamp: i64) -> Totp<FixedClock> {
        Totp::with_clock(TotpConfig::default(), FixedClock(timestamp)).unwrap()
    }

    #[test]
    fn test_totp_config_default() {
        let config = TotpConfig::default();
        assert_eq!(config.period, 30);
        assert_eq!(config.epoch, 0);
        assert_eq!(config.digits, 6);
        assert_eq!(config.algorithm, Algorithm::SHA512);
    }

    #[test]
    fn test_totp_config_builder() {
        let config = TotpConfig::new()
            .with_period(60)
            .with_digits(8)
            .with_epoch(100)
            .with_algorithm(Algorithm::SHA256);

        assert_eq!(config.period, 60);
        assert_eq!(config.digits, 8);
        assert_eq!(config.epoch, 100);
        assert_eq!(config.algorithm, Algorithm::SHA256);
    }

    #[test]
    fn test_config_presets() {
        let google = TotpConfig::google_authenticator();
        assert_eq!(google.digits, 6);
        assert_eq!(google.period, 30);
        assert_eq!(google.algorithm, Algorithm::SHA1);

        let high_sec = TotpConfig::high_security();
        assert_eq!(high_sec.digits, 8);
        assert_eq!(high_sec.algorithm, Algorithm::SHA512);
    }

    #[test]
    fn test_config_rejects_zero_period() {
        let err = Totp::new(TotpConfig::new().with_period(0)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(Totp::new(TotpConfig::new().with_period(u64::MAX)).is_err());
    }

    #[test]
    fn test_config_serde_roundtrip_with_defaults() {
        let config: TotpConfig =
            serde_json::from_str(r#"{"algorithm": "SHA1", "period": 60}"#).unwrap();
        assert_eq!(config.algorithm, Algorithm::SHA1);
        assert_eq!(config.period, 60);
        assert_eq!(config.digits, 6);
        assert_eq!(config.epoch, 0);
    }

    #[test]
    fn test_timecode() {
        let totp = fixed(0);
        assert_eq!(totp.timecode(0).unwrap(), 0);
        assert_eq!(totp.timecode(29).unwrap(), 0);
        assert_eq!(totp.timecode(30).unwrap(), 1);
        assert_eq!(totp.timecode(1_700_000_000).unwrap(), 56_666_666);
    }

    #[test]
    fn test_timecode_with_epoch() {
        let config = TotpConfig::new().with_epoch(30).with_period(1);
        let totp = Totp::with_clock(config, FixedClock(0)).unwrap();

        assert_eq!(totp.timecode(30).unwrap(), 0);
        assert_eq!(totp.timecode(45).unwrap(), 15);
        assert!(matches!(totp.timecode(29), Err(Error::InvalidTimestamp(29))));
    }

    #[test]
    fn test_timecode_rejects_negative() {
        let totp = fixed(0);
        assert!(matches!(totp.timecode(-1), Err(Error::InvalidTimestamp(_))));
        assert!(matches!(
            totp.at(&secret(), -1),
            Err(Error::InvalidTimestamp(_))
        ));
        assert!(matches!(
            totp.timecode(i64::MIN),
            Err(Error::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_timecode_error_reports_timestamp() {
        let totp = fixed(0);
        let err = totp.timecode(-100).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(-100)));
        assert_eq!(err.to_string(), "Invalid timestamp: -100 must be at least 0");
    }

    #[test]
    fn test_generate_matches_hotp() {
        let totp = fixed(0);
        assert_eq!(totp.generate(&secret(), 123456).unwrap(), "485723");
    }

    #[test]
    fn test_at_is_constant_within_tick() {
        let totp = fixed(0);
        let secret = secret();

        let start = totp.at(&secret, 1_699_999_980).unwrap();
        assert_eq!(start, "869012");
        assert_eq!(totp.at(&secret, 1_700_000_000).unwrap(), start);
        assert_eq!(totp.at(&secret, 1_700_000_009).unwrap(), start);

        let next = totp.at(&secret, 1_700_000_010).unwrap();
        assert_eq!(next, "587407");
        assert_ne!(next, start);
    }

    #[test]
    fn test_now_uses_clock() {
        let totp = fixed(1_700_000_000);
        assert_eq!(totp.now(&secret()).unwrap(), "869012");
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let totp = fixed(1_700_000_000);
        let secret = secret();

        assert!(totp.verify(&secret, "869012", Some(1_700_000_000), None).unwrap());
        assert!(totp.verify(&secret, "869012", None, None).unwrap());
        assert!(!totp.verify(&secret, "123456", Some(1_700_000_000), None).unwrap());
        assert!(!totp.verify(&secret, "587407", Some(1_700_000_000), None).unwrap());
    }

    #[test]
    fn test_verify_rejects_negative_timestamp() {
        let totp = fixed(0);
        let err = totp.verify(&secret(), "869012", Some(-1), None).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(-1)));
    }

    #[test]
    fn test_verify_with_leeway() {
        let totp = fixed(0);
        let secret = secret();

        // 1700000005 位于第 56666666 步，+5 秒后进入下一步
        assert!(totp.verify(&secret, "869012", Some(1_700_000_005), Some(5)).unwrap());
        assert!(totp.verify(&secret, "587407", Some(1_700_000_005), Some(5)).unwrap());
        assert!(!totp.verify(&secret, "587407", Some(1_700_000_005), Some(4)).unwrap());

        // 负的容差按绝对值处理
        assert!(totp.verify(&secret, "587407", Some(1_700_000_005), Some(-5)).unwrap());
    }

    #[test]
    fn test_verify_rejects_large_leeway() {
        let totp = fixed(0);
        let secret = secret();

        for leeway in [30, -30, 31, i64::MIN] {
            let err = totp
                .verify(&secret, "869012", Some(1_700_000_000), Some(leeway))
                .unwrap_err();
            assert!(matches!(err, Error::InvalidLeeway { period: 30, .. }));
        }
        assert!(totp.verify(&secret, "869012", Some(1_700_000_000), Some(29)).is_ok());
    }

    #[test]
    fn test_verify_leeway_before_epoch_fails() {
        let totp = fixed(0);
        let err = totp.verify(&secret(), "000000", Some(3), Some(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp(_)));
    }

    #[test]
    fn test_rfc6238_sha1() {
        let config = TotpConfig::google_authenticator().with_digits(8);
        let totp = Totp::with_clock(config, FixedClock(0)).unwrap();
        let secret = SecretKey::new(RFC_SHA1_SECRET).unwrap();

        assert_eq!(totp.at(&secret, 59).unwrap(), "94287082");
        assert_eq!(totp.at(&secret, 1111111109).unwrap(), "07081804");
        assert_eq!(totp.at(&secret, 1234567890).unwrap(), "89005924");
        assert_eq!(totp.at(&secret, 2000000000).unwrap(), "69279037");
    }

    #[test]
    fn test_time_remaining() {
        assert_eq!(fixed(1_700_000_000).time_remaining(), 10);
        assert_eq!(fixed(1_700_000_010).time_remaining(), 30);
        assert_eq!(fixed(1_700_000_039).time_remaining(), 1);

        let remaining = Totp::new(TotpConfig::default()).unwrap().time_remaining();
        assert!(remaining > 0);
        assert!(remaining <= 30);
    }

    #[test]
    fn test_provisioning_uri() {
        let totp = fixed(0);
        let uri = totp.provisioning_uri(&secret(), "user@example.com", None);

        assert!(uri.starts_with("otpauth://totp/user%40example.com?"));
        assert!(uri.contains("secret=ADUMJO5634NPDEKW"));
        assert!(uri.contains("digits=6"));
        assert!(uri.contains("period=30"));
        assert!(uri.contains("algorithm=SHA512"));
        assert!(!uri.contains("issuer="));
    }

    #[test]
    fn test_provisioning_uri_with_issuer() {
        let totp = fixed(0);
        let uri = totp.provisioning_uri(&secret(), "user@example.com", Some("My App"));

        assert!(uri.contains("My%20App%3Auser%40example.com"));
        assert!(uri.ends_with("&issuer=My%20App"));
    }
}
