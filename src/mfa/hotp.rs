//! HOTP (基于计数器的一次性密码) 实现模块
//!
//! 接受 base32 文本密钥：先转为大写，经注入的校验器校验，再解码并计算 HOTP。
//!
//! ## 示例
//!
//! ```rust
//! use otprs::mfa::hotp::{HotpConfig, HotpGenerator};
//!
//! let generator = HotpGenerator::new(HotpConfig::default()).unwrap();
//!
//! let code = generator.generate("ADUMJO5634NPDEKW", 123456).unwrap();
//! assert_eq!(code, "485723");
//! assert!(generator.verify("ADUMJO5634NPDEKW", &code, 123456).unwrap());
//! ```

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Error, Result, SecretKeyError};
use crate::mfa::{Algorithm, hotp, validate_digits};
use crate::random::constant_time_compare_str;
use crate::secret::{Alphabet, SecretKey, SecretValidator, Validator, decode_upper};

/// 生成验证码时接受的最短密钥字符数
const MIN_SECRET_CHARS: usize = 8;

/// HOTP 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotpConfig {
    /// 哈希算法，默认 SHA512
    pub algorithm: Algorithm,

    /// 验证码位数，默认 6 位
    pub digits: u32,
}

impl Default for HotpConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::SHA512,
            digits: 6,
        }
    }
}

impl HotpConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置验证码位数
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// 设置哈希算法
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// 检查配置是否有效
    pub fn validate(&self) -> Result<()> {
        validate_digits(self.digits)
    }
}

/// HOTP 生成器
#[derive(Debug, Clone)]
pub struct HotpGenerator<V = SecretValidator> {
    config: HotpConfig,
    validator: V,
}

impl HotpGenerator {
    /// 使用默认校验器创建 HOTP 生成器
    pub fn new(config: HotpConfig) -> Result<Self> {
        Self::with_validator(config, SecretValidator)
    }

    /// 使用默认配置创建生成器
    pub fn default_generator() -> Self {
        Self {
            config: HotpConfig::default(),
            validator: SecretValidator,
        }
    }
}

impl<V: Validator> HotpGenerator<V> {
    /// 使用指定校验器创建 HOTP 生成器
    pub fn with_validator(config: HotpConfig, validator: V) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, validator })
    }

    /// 生成 HOTP 验证码
    ///
    /// # 参数
    ///
    /// * `secret` - base32 密钥文本（大小写均可）
    /// * `counter` - 计数器值
    pub fn generate(&self, secret: &str, counter: u64) -> Result<String> {
        let key = self.decode_secret(secret)?;
        hotp(self.config.algorithm, &key, counter, self.config.digits)
    }

    /// 使用已校验的密钥生成 HOTP 验证码
    pub fn generate_with_key(&self, secret: &SecretKey, counter: u64) -> Result<String> {
        let key = secret.decode()?;
        hotp(self.config.algorithm, &key, counter, self.config.digits)
    }

    /// 常量时间比较指定计数器的验证码
    pub fn verify(&self, secret: &str, code: &str, counter: u64) -> Result<bool> {
        let expected = Zeroizing::new(self.generate(secret, counter)?);
        Ok(constant_time_compare_str(&expected, code))
    }

    /// 获取配置
    pub fn config(&self) -> &HotpConfig {
        &self.config
    }

    // ========================================================================
    // 内部方法
    // ========================================================================

    /// 大写 → 校验 → 解码
    ///
    /// 字符集合法但不足 8 个字符的密钥在进入校验器之前直接判为过短。
    pub(crate) fn decode_secret(&self, secret: &str) -> Result<Zeroizing<Vec<u8>>> {
        let upper = Zeroizing::new(secret.to_ascii_uppercase());
        if upper.len() < MIN_SECRET_CHARS && Alphabet::is_valid(&upper) {
            return Err(SecretKeyError::TooShort.into());
        }
        self.validator.validate(&upper)?;
        decode_upper(&upper)
            .map(Zeroizing::new)
            .ok_or(Error::SecretKey(SecretKeyError::InvalidCharacters))
    }
}
