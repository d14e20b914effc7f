//! Secret handles for resolved configuration.
//!
//! A [`Secret`] keeps a resolved value out of every implicit output path:
//! `Display`, `Debug` and `serde` serialization all produce the
//! [`SECRET_PLACEHOLDER`]. The raw value is only reachable through
//! [`Secret::reveal`].
//!
//! This is presentation-layer obfuscation. The value lives in process memory
//! (zeroized on drop by `secrecy`) and anyone holding the handle can reveal it.
//!
//! # Example
//!
//! ```
//! use ev_redact::Secret;
//!
//! let password = Secret::new("p@ss");
//! assert_eq!(password.to_string(), "[secret]");
//! assert_eq!(password.reveal(), Some("p@ss"));
//! ```

pub mod secret;

pub use secret::{Secret, SECRET_PLACEHOLDER};
