use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeculateError {
    #[error("Account ID is malformed: {0}")]
    InvalidAccountId(String),

    #[error("Role name is malformed: {0}")]
    InvalidRoleName(String),

    #[error("Session name is malformed: {0}")]
    InvalidSessionName(String),

    #[error("Lifetime must be between 900 and 3600: {0}")]
    LifetimeOutOfRange(i64),

    #[error("MFA serial is malformed: {0}")]
    MalformedMfaSerial(String),

    #[error("MFA code is malformed: {0}")]
    MalformedMfaCode(String),

    #[error("Role name cannot be empty")]
    EmptyRole,

    #[error("Missing required key for credentials: {0}")]
    MissingCredentialField(String),

    #[error("Malformed ARN: {0}")]
    MalformedArn(String),

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    #[error("Failed to parse MFA ARN for non-user: {0}")]
    NotAUser(String),

    #[error("AWS STS error: {0}")]
    IdentityApi(String),

    #[error("Console federation failed: {0}")]
    FederationHttp(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunchFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpeculateError {
    /// Whether the error was raised by local input validation, before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SpeculateError::InvalidAccountId(_)
                | SpeculateError::InvalidRoleName(_)
                | SpeculateError::InvalidSessionName(_)
                | SpeculateError::LifetimeOutOfRange(_)
                | SpeculateError::MalformedMfaSerial(_)
                | SpeculateError::MalformedMfaCode(_)
                | SpeculateError::EmptyRole
        )
    }
}

impl From<reqwest::Error> for SpeculateError {
    fn from(e: reqwest::Error) -> Self {
        SpeculateError::FederationHttp(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpeculateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_flagged() {
        assert!(SpeculateError::EmptyRole.is_validation());
        assert!(SpeculateError::LifetimeOutOfRange(10).is_validation());
        assert!(SpeculateError::MalformedMfaCode("12".to_string()).is_validation());
        assert!(!SpeculateError::IdentityApi("denied".to_string()).is_validation());
        assert!(!SpeculateError::NotAUser("arn".to_string()).is_validation());
    }

    #[test]
    fn test_error_messages_name_the_input() {
        let err = SpeculateError::MissingCredentialField("SecretKey".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required key for credentials: SecretKey"
        );
        assert_eq!(
            SpeculateError::UnknownPartition("aws-cn".to_string()).to_string(),
            "Unknown partition: aws-cn"
        );
    }
}
