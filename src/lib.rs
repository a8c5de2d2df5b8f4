//! Temporary AWS credentials from STS.
//!
//! [`creds::Creds`] holds a credential set. The executors in [`executor`]
//! issue new sets through GetSessionToken or AssumeRole, with optional MFA.
//! [`console::ConsoleUrlBuilder`] turns a set into an AWS Console sign-in URL.

pub mod cli;
pub mod config;
pub mod console;
pub mod creds;
pub mod env;
pub mod error;
pub mod executor;
pub mod expiry;
pub mod sts;
