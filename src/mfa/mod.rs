//! 一次性密码 (OTP) 模块
//!
//! ## 组成
//!
//! - [`hotp()`]: RFC 4226 核心，字节密钥 + 计数器 → 定长数字码
//! - [`HotpGenerator`]: 校验并解码 base32 密钥后调用 [`hotp()`]
//! - [`Totp`]: RFC 6238，时间 → 计数器，支持对称时间容差验证
//! - [`TotpVerificator`]: 计数器滑动窗口验证，支持防重放
//!
//! ## 示例
//!
//! ```rust
//! use otprs::mfa::{Totp, TotpConfig};
//! use otprs::secret::SecretKey;
//!
//! let totp = Totp::new(TotpConfig::default()).unwrap();
//! let secret = SecretKey::new("ADUMJO5634NPDEKW").unwrap();
//!
//! let code = totp.at(&secret, 1_700_000_000).unwrap();
//! assert!(totp.verify(&secret, &code, Some(1_700_000_000), None).unwrap());
//! ```

pub mod hotp;
pub mod totp;
pub mod verificator;

use std::fmt;
use std::str::FromStr;

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::{Error, Result};

pub use hotp::{HotpConfig, HotpGenerator};
pub use totp::{Totp, TotpConfig};
pub use verificator::{TotpVerificator, VerificatorConfig, VerifyOutcome};

/// 验证码位数上限（31 位截断值最多 10 位十进制）
pub const MAX_DIGITS: u32 = 10;

/// HMAC 哈希算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// SHA-1（认证器应用最广泛支持）
    SHA1,
    /// SHA-256
    SHA256,
    /// SHA-512（默认）
    #[default]
    SHA512,
}

impl Algorithm {
    /// 获取算法名称（用于 otpauth URI）
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::SHA1 => "SHA1",
            Algorithm::SHA256 => "SHA256",
            Algorithm::SHA512 => "SHA512",
        }
    }

    /// HMAC 输出长度（字节）
    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::SHA1 => 20,
            Algorithm::SHA256 => 32,
            Algorithm::SHA512 => 64,
        }
    }

    /// 计算 HMAC
    pub fn hmac(&self, key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Algorithm::SHA1 => hmac_digest::<Hmac<Sha1>>(key, message),
            Algorithm::SHA256 => hmac_digest::<Hmac<Sha256>>(key, message),
            Algorithm::SHA512 => hmac_digest::<Hmac<Sha512>>(key, message),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(Algorithm::SHA1),
            "SHA256" => Ok(Algorithm::SHA256),
            "SHA512" => Ok(Algorithm::SHA512),
            _ => Err(Error::invalid_config(
                "algorithm",
                format!("unsupported algorithm '{}'", s),
            )),
        }
    }
}

fn hmac_digest<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| Error::AlgorithmOutput(format!("invalid HMAC key: {}", e)))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// 检查验证码位数
pub(crate) fn validate_digits(digits: u32) -> Result<()> {
    if digits == 0 || digits > MAX_DIGITS {
        return Err(Error::invalid_config(
            "digits",
            format!("must be between 1 and {}", MAX_DIGITS),
        ));
    }
    Ok(())
}

/// RFC 4226 动态截断：从 HMAC 输出中取出 31 位整数
pub fn dynamic_truncate(hash: &[u8]) -> Result<u32> {
    let last = hash
        .last()
        .ok_or_else(|| Error::AlgorithmOutput("empty HMAC output".to_string()))?;
    let offset = (last & 0x0f) as usize;

    let window: [u8; 4] = hash
        .get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            Error::AlgorithmOutput(format!(
                "HMAC output of {} bytes is too short for offset {}",
                hash.len(),
                offset
            ))
        })?;

    Ok(u32::from_be_bytes(window) & 0x7fff_ffff)
}

/// 生成 HOTP 验证码
///
/// 计数器按 8 字节大端编码，HMAC 后动态截断，对 `10^digits` 取模并左侧补零。
///
/// ```rust
/// use otprs::mfa::{Algorithm, hotp};
///
/// let code = hotp(Algorithm::SHA1, b"12345678901234567890", 0, 6).unwrap();
/// assert_eq!(code, "755224");
/// ```
pub fn hotp(algorithm: Algorithm, key: &[u8], counter: u64, digits: u32) -> Result<String> {
    validate_digits(digits)?;

    let hash = algorithm.hmac(key, &counter.to_be_bytes())?;
    let binary = dynamic_truncate(&hash)?;

    let code = u64::from(binary) % 10u64.pow(digits);

    Ok(format!("{:0width$}", code, width = digits as usize))
}
