//! 密钥校验
//!
//! [`Validator`] 是校验器接口，生成器和 HOTP 引擎通过构造参数注入它；
//! [`SecretValidator`] 是默认实现。

use tracing::debug;

use crate::error::{Result, SecretKeyError};
use crate::secret::Alphabet;

/// 最小密钥长度（位）
pub const MIN_SECRET_BITS: usize = 128;

/// 密钥校验器
pub trait Validator: Send + Sync {
    /// 校验 base32 密钥文本，失败时返回具体原因
    fn validate(&self, secret: &str) -> Result<()>;
}

/// 默认密钥校验器
///
/// 依次检查字符集、Google Authenticator 兼容性和长度，返回第一个失败项。
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretValidator;

impl SecretValidator {
    /// 创建校验器
    pub fn new() -> Self {
        Self
    }

    /// 按固定顺序找出第一个不满足的规则
    pub fn check(secret: &str) -> std::result::Result<(), SecretKeyError> {
        if !Alphabet::is_valid(secret) {
            return Err(SecretKeyError::InvalidCharacters);
        }

        // 字符集校验已保证全部为 ASCII，字节数即字符数
        let len = secret.len();

        if len & len.wrapping_sub(1) != 0 {
            return Err(SecretKeyError::IncompatibleWithAuthenticator);
        }

        if len * 8 < MIN_SECRET_BITS {
            return Err(SecretKeyError::TooShort);
        }

        Ok(())
    }
}

impl Validator for SecretValidator {
    fn validate(&self, secret: &str) -> Result<()> {
        Self::check(secret).map_err(|e| {
            debug!(reason = %e, length = secret.len(), "secret key rejected");
            e.into()
        })
    }
}

impl<V: Validator + ?Sized> Validator for &V {
    fn validate(&self, secret: &str) -> Result<()> {
        (**self).validate(secret)
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn validate(&self, secret: &str) -> Result<()> {
        (**self).validate(secret)
    }
}
