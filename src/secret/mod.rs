//! 密钥模块
//!
//! 定义 base32 字母表、密钥值对象，以及密钥的校验与生成。
//!
//! ## 密钥规则
//!
//! - 只能包含 RFC 4648 base32 字母表中的字符（`A-Z2-7`，大写，无填充）
//! - 字符数必须是 2 的幂（Google Authenticator 兼容）
//! - 字符数 × 8 不小于 128 位，即至少 16 个字符
//!
//! 校验顺序固定为：字符集 → 2 的幂 → 长度。
//!
//! ## 示例
//!
//! ```rust
//! use otprs::secret::SecretKey;
//! use otprs::error::SecretKeyError;
//!
//! let secret = SecretKey::new("ADUMJO5634NPDEKW").unwrap();
//! assert_eq!(secret.decode().unwrap().len(), 10);
//!
//! let err = SecretKey::new("DUMJO5634NPDEKX@").unwrap_err();
//! assert_eq!(err.secret_key_error(), Some(SecretKeyError::InvalidCharacters));
//! ```

pub mod generator;
pub mod validator;

use std::fmt;
use std::str::FromStr;

use base32::{Alphabet as Base32Alphabet, decode as base32_decode};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result, SecretKeyError};
use crate::random::constant_time_compare_str;

pub use generator::{Base32Generator, DEFAULT_SECRET_LENGTH, Generator, SecretGenerator};
pub use validator::{SecretValidator, Validator};

/// base32 字母表
pub struct Alphabet;

impl Alphabet {
    /// RFC 4648 标准字母表
    pub const DEFAULT: &'static str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

    /// 标准字母表的一个固定排列，用于随机填充
    pub const SCRAMBLED: &'static str = "234567QWERTYUIOPASDFGHJKLZXCVBNM";

    /// 单个字符是否属于标准字母表
    pub fn is_valid_char(c: char) -> bool {
        matches!(c, 'A'..='Z' | '2'..='7')
    }

    /// 字符串中的字符是否全部属于标准字母表
    pub fn is_valid(value: &str) -> bool {
        value.chars().all(Self::is_valid_char)
    }

    /// 从打乱的字母表中按下标取字符，下标按 32 取模
    pub(crate) fn scrambled_char(index: usize) -> char {
        Self::SCRAMBLED.as_bytes()[index % 32] as char
    }
}

/// 解码大写 base32 字符串（无填充）
pub(crate) fn decode_upper(value: &str) -> Option<Vec<u8>> {
    base32_decode(Base32Alphabet::Rfc4648 { padding: false }, value)
}

/// 密钥值对象
///
/// 构造时完成校验，之后不可变。释放时清零。
#[derive(Clone)]
pub struct SecretKey {
    value: String,
}

impl SecretKey {
    /// 使用默认校验器创建密钥
    pub fn new(value: impl Into<String>) -> Result<Self> {
        Self::with_validator(value, &SecretValidator)
    }

    /// 使用指定校验器创建密钥
    pub fn with_validator<V: Validator + ?Sized>(
        value: impl Into<String>,
        validator: &V,
    ) -> Result<Self> {
        let value = Zeroizing::new(value.into());
        validator.validate(&value)?;
        Ok(Self {
            value: value.as_str().to_owned(),
        })
    }

    /// 生成指定随机字符数的新密钥
    pub fn generate(length: usize) -> Result<Self> {
        let value = SecretGenerator::new(SecretValidator).secret_key(length, b"")?;
        Ok(Self { value })
    }

    /// 解码为 HMAC 使用的原始字节
    pub fn decode(&self) -> Result<Zeroizing<Vec<u8>>> {
        decode_upper(&self.value)
            .map(Zeroizing::new)
            .ok_or(Error::SecretKey(SecretKeyError::InvalidCharacters))
    }

    /// base32 文本
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// 字符数
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// 是否为空（校验通过的密钥永远不为空）
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("value", &"[REDACTED]")
            .field("len", &self.value.len())
            .finish()
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare_str(&self.value, &other.value)
    }
}

impl Eq for SecretKey {}

impl FromStr for SecretKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SecretKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl AsRef<str> for SecretKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
