//! Shared verification utilities: syntax validation, cached DNS
//! resolution, and the SMTP probe.

pub mod dns;
pub mod smtp;
pub mod syntax;
