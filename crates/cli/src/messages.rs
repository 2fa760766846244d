//! Stable message codes, reserved in blocks per subsystem.
//!
//! Every log event carries its code as a structured field so message
//! identities survive wording changes.

/// Codes 10–19: shared reporting helpers.
pub const COMMON: u16 = 10;
/// Codes 20–39: the sign flow.
pub const SIGN: u16 = 20;
/// Codes 40–59: the verify flow.
pub const VERIFY: u16 = 40;
/// Codes 60–69: startup and dispatch.
pub const MAIN: u16 = 60;
/// Codes 70–79: command-line validation.
pub const USAGE: u16 = 70;
