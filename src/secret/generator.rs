//! 密钥生成
//!
//! 密钥格式：`base32(prefix)`（去掉填充）后接 `length` 个随机字符。
//! 随机字符从 [`Alphabet::SCRAMBLED`] 中均匀抽取，随机源为操作系统 CSPRNG。
//!
//! ```rust
//! use otprs::secret::{Generator, SecretGenerator, SecretValidator};
//!
//! let secret = SecretGenerator::new(SecretValidator).secret_key(32, b"").unwrap();
//! assert_eq!(secret.len(), 32);
//! ```

use base32::{Alphabet as Base32Alphabet, encode as base32_encode};

use crate::error::Result;
use crate::random::generate_random_indices32;
use crate::secret::Alphabet;
use crate::secret::validator::{SecretValidator, Validator};

/// 默认随机字符数
pub const DEFAULT_SECRET_LENGTH: usize = 16;

/// 密钥生成器
pub trait Generator: Send + Sync {
    /// 生成密钥：编码后的前缀 + `length` 个随机字符
    fn secret_key(&self, length: usize, prefix: &[u8]) -> Result<String>;

    /// 使用默认长度、无前缀生成密钥
    fn generate(&self) -> Result<String> {
        self.secret_key(DEFAULT_SECRET_LENGTH, b"")
    }
}

/// 不做校验的 base32 密钥生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct Base32Generator;

impl Base32Generator {
    /// 创建生成器
    pub fn new() -> Self {
        Self
    }

    /// 用随机字符填充到末尾
    fn pad_random(mut secret: String, length: usize) -> Result<String> {
        secret.reserve(length);
        for index in generate_random_indices32(length)? {
            secret.push(Alphabet::scrambled_char(index));
        }
        Ok(secret)
    }
}

impl Generator for Base32Generator {
    fn secret_key(&self, length: usize, prefix: &[u8]) -> Result<String> {
        let encoded = base32_encode(Base32Alphabet::Rfc4648 { padding: false }, prefix);
        Self::pad_random(encoded, length)
    }
}

/// 生成后立即校验的密钥生成器
///
/// 校验器通过构造参数注入，默认使用 [`SecretValidator`]。
#[derive(Debug, Clone, Default)]
pub struct SecretGenerator<V = SecretValidator> {
    validator: V,
    inner: Base32Generator,
}

impl<V: Validator> SecretGenerator<V> {
    /// 使用指定校验器创建生成器
    pub fn new(validator: V) -> Self {
        Self {
            validator,
            inner: Base32Generator,
        }
    }
}

impl<V: Validator> Generator for SecretGenerator<V> {
    fn secret_key(&self, length: usize, prefix: &[u8]) -> Result<String> {
        let secret = self.inner.secret_key(length, prefix)?;
        self.validator.validate(&secret)?;
        Ok(secret)
    }
}
