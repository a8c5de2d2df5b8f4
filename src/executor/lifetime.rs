use crate::error::{Result, SpeculateError};

pub const MIN_LIFETIME: i64 = 900;
pub const MAX_LIFETIME: i64 = 3600;
pub const DEFAULT_LIFETIME: i64 = 3600;

/// Requested session duration in seconds; 0 means unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifetime {
    seconds: i64,
}

impl Lifetime {
    pub fn set_lifetime(&mut self, seconds: i64) -> Result<()> {
        if seconds != 0 && !(MIN_LIFETIME..=MAX_LIFETIME).contains(&seconds) {
            return Err(SpeculateError::LifetimeOutOfRange(seconds));
        }
        tracing::debug!("Setting lifetime to {}", seconds);
        self.seconds = seconds;
        Ok(())
    }

    /// The stored lifetime, or `DEFAULT_LIFETIME` when unset
    pub fn lifetime(&self) -> i64 {
        if self.seconds == 0 {
            DEFAULT_LIFETIME
        } else {
            self.seconds
        }
    }

    #[cfg(test)]
    fn is_set(&self) -> bool {
        self.seconds != 0
    }
}
