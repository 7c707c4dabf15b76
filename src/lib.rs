//! # otprs
//!
//! 兼容 Google Authenticator 的一次性密码 (OTP) 库。
//!
//! ## 功能特性
//!
//! - **密钥校验**: base32 字符集、2 的幂长度、不少于 128 位
//! - **密钥生成**: 使用操作系统 CSPRNG 生成带可选前缀的 base32 密钥
//! - **HOTP**: RFC 4226 计数器一次性密码，支持 SHA1/SHA256/SHA512
//! - **TOTP**: RFC 6238 时间一次性密码，支持自定义 epoch、周期和时间容差
//! - **窗口验证**: 计数器滑动窗口查找，可选防重放
//!
//! 所有验证码比较都是常量时间的。库本身不保存任何状态：防重放所需的
//! "上次接受的计数器" 由调用方持久化。
//!
//! ## 密钥示例
//!
//! ```rust
//! use otprs::secret::SecretKey;
//!
//! let secret = SecretKey::generate(32).unwrap();
//! assert_eq!(secret.len(), 32);
//!
//! assert!(SecretKey::new("ADUMJO5634NPDEKW").is_ok());
//! assert!(SecretKey::new("ADUMJO5634NPDEK").is_err());
//! ```
//!
//! ## HOTP 示例
//!
//! ```rust
//! use otprs::mfa::{HotpConfig, HotpGenerator};
//!
//! let generator = HotpGenerator::new(HotpConfig::default()).unwrap();
//! assert_eq!(generator.generate("ADUMJO5634NPDEKW", 123456).unwrap(), "485723");
//! ```
//!
//! ## TOTP 示例
//!
//! ```rust
//! use otprs::mfa::{Totp, TotpConfig};
//! use otprs::secret::SecretKey;
//!
//! let totp = Totp::new(TotpConfig::google_authenticator()).unwrap();
//! let secret = SecretKey::generate(16).unwrap();
//!
//! let code = totp.at(&secret, 1_700_000_000).unwrap();
//! assert!(totp.verify(&secret, &code, Some(1_700_000_000), None).unwrap());
//!
//! let uri = totp.provisioning_uri(&secret, "alice@example.com", Some("MyApp"));
//! assert!(uri.starts_with("otpauth://totp/"));
//! ```
//!
//! ## 防重放示例
//!
//! ```rust
//! use otprs::mfa::{TotpVerificator, VerificatorConfig};
//!
//! let verificator = TotpVerificator::new(VerificatorConfig::default().with_window(2)).unwrap();
//! let secret = "ADUMJO5634NPDEKW";
//!
//! // 调用方保存的上次接受计数器
//! let mut last_accepted = 26213400;
//!
//! let matched = verificator
//!     .verify_with_replay_protection("424074", secret, Some(26213400), last_accepted)
//!     .unwrap();
//! assert_eq!(matched, Some(26213402));
//! last_accepted = matched.unwrap();
//!
//! // 同一个码再次提交会被拒绝
//! let replayed = verificator
//!     .verify_with_replay_protection("424074", secret, Some(26213400), last_accepted)
//!     .unwrap();
//! assert_eq!(replayed, None);
//! ```

pub mod clock;
pub mod error;
pub mod mfa;
pub mod random;
pub mod secret;

pub use error::{Error, Result};

// ============================================================================
// 密钥相关导出
// ============================================================================

pub use secret::{
    Alphabet, Base32Generator, Generator, SecretGenerator, SecretKey, SecretValidator, Validator,
};

// ============================================================================
// OTP 相关导出
// ============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use mfa::{
    Algorithm, HotpConfig, HotpGenerator, Totp, TotpConfig, TotpVerificator, VerificatorConfig,
    VerifyOutcome, hotp,
};

// ============================================================================
// 随机数与比较函数导出
// ============================================================================

pub use random::{constant_time_compare, constant_time_compare_str, generate_random_bytes};
