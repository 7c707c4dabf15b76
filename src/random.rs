//! 安全随机数与常量时间比较模块
//!
//! 提供密钥生成所需的密码学安全随机字节，以及验证码比较所需的常量时间比较。

use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use otprs::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(32).unwrap();
/// assert_eq!(bytes.len(), 32);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 生成 `count` 个 `[0, 32)` 范围内均匀分布的随机下标
///
/// 每个字节取低 5 位；256 是 32 的整数倍，因此不存在取模偏差。
pub fn generate_random_indices32(count: usize) -> Result<Vec<usize>> {
    let bytes = generate_random_bytes(count)?;
    Ok(bytes.into_iter().map(|b| (b & 0x1F) as usize).collect())
}

/// 常量时间比较两个字节切片
///
/// 用于防止时序攻击。长度不同直接返回 false（长度本身不是秘密）。
///
/// # Example
///
/// ```rust
/// use otprs::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"485723", b"485723"));
/// assert!(!constant_time_compare(b"485723", b"485724"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

/// 常量时间比较两个字符串
pub fn constant_time_compare_str(a: &str, b: &str) -> bool {
    constant_time_compare(a.as_bytes(), b.as_bytes())
}
