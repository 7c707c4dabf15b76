//! 统一错误类型模块
//!
//! 提供 otprs 库中所有操作的错误类型定义。
//!
//! 所有错误都直接返回给调用方，库内部不做重试：相同的输入会得到相同的错误。

use thiserror::Error;

/// otprs 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// otprs 库的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 密钥校验失败
    #[error("Secret key error: {0}")]
    SecretKey(#[from] SecretKeyError),

    /// 时间戳或由其推导出的计数器为负数
    #[error("Invalid timestamp: {0} must be at least 0")]
    InvalidTimestamp(i64),

    /// 时间容差不小于 TOTP 周期
    #[error("Invalid leeway: {leeway} must be lower than the TOTP period of {period} seconds")]
    InvalidLeeway {
        /// 调用方传入的容差（秒）
        leeway: i64,
        /// 当前配置的周期（秒）
        period: u64,
    },

    /// HMAC 输出无法按预期的字节布局解析
    #[error("Algorithm output error: {0}")]
    AlgorithmOutput(String),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// 加密错误
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl Error {
    /// 创建一个配置值无效的错误
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config(ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        })
    }

    /// 是否为密钥校验错误
    pub fn is_secret_key_error(&self) -> bool {
        matches!(self, Error::SecretKey(_))
    }

    /// 取出密钥校验错误的具体类型
    pub fn secret_key_error(&self) -> Option<SecretKeyError> {
        match self {
            Error::SecretKey(e) => Some(*e),
            _ => None,
        }
    }
}

/// 密钥校验相关错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SecretKeyError {
    /// 密钥不足 128 位
    #[error("secret key is too short, must be at least 16 base32 characters")]
    TooShort,

    /// 包含 base32 字母表之外的字符
    #[error("invalid characters in the base32 string")]
    InvalidCharacters,

    /// 字符数不是 2 的幂
    #[error("secret key is not compatible with Google Authenticator")]
    IncompatibleWithAuthenticator,
}

/// 配置相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 无效的配置值
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// 随机数生成失败
    #[error("random number generation failed: {0}")]
    RngFailed(String),
}
