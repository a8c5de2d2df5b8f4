use super::{mfa_code_regex, mfa_serial_regex};
use crate::creds::CallerLookup;
use crate::error::{Result, SpeculateError};
use crate::sts::{IdentityClient, MfaRequest};
use std::fmt;
use std::io::{self, BufRead, Write};

/// Something that can ask the user for a one-time MFA code
#[cfg_attr(test, mockall::automock)]
pub trait MfaPrompt {
    fn prompt(&self) -> Result<String>;
}

/// Reads the code from stdin, prompting on stderr
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl MfaPrompt for StdinPrompt {
    fn prompt(&self) -> Result<String> {
        let stdin = io::stdin();
        read_code(stdin.lock(), &mut io::stderr())
    }
}

fn read_code<R: BufRead, W: Write>(mut input: R, output: &mut W) -> Result<String> {
    write!(output, "MFA Code: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(SpeculateError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no MFA code entered",
        )));
    }
    Ok(line.trim().to_string())
}

/// MFA settings for an STS request
///
/// The serial and code are resolved on first read and cached: the serial
/// from the caller's own identity (an STS lookup), the code from the
/// installed prompt (interactive by default).
#[derive(Default)]
pub struct Mfa {
    use_mfa: bool,
    serial: Option<String>,
    code: Option<String>,
    prompt: Option<Box<dyn MfaPrompt>>,
}

impl fmt::Debug for Mfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mfa")
            .field("use_mfa", &self.use_mfa)
            .field("serial", &self.serial)
            .field("code", &self.code.as_ref().map(|_| "******"))
            .field("custom_prompt", &self.prompt.is_some())
            .finish()
    }
}

impl Mfa {
    pub fn set_use_mfa(&mut self, enabled: bool) {
        tracing::debug!("Setting MFA: {}", enabled);
        self.use_mfa = enabled;
    }

    /// Set the MFA device ARN; an empty string unsets it
    pub fn set_serial(&mut self, serial: &str) -> Result<()> {
        if serial.is_empty() {
            self.serial = None;
            return Ok(());
        }
        if !mfa_serial_regex().is_match(serial) {
            return Err(SpeculateError::MalformedMfaSerial(serial.to_string()));
        }
        tracing::debug!("Setting MFA serial: {}", serial);
        self.serial = Some(serial.to_string());
        Ok(())
    }

    /// Set the six-digit one-time code; an empty string unsets it
    pub fn set_code(&mut self, code: &str) -> Result<()> {
        if code.is_empty() {
            self.code = None;
            return Ok(());
        }
        if !mfa_code_regex().is_match(code) {
            return Err(SpeculateError::MalformedMfaCode(code.to_string()));
        }
        tracing::debug!("Setting MFA code");
        self.code = Some(code.to_string());
        Ok(())
    }

    pub fn set_prompt(&mut self, prompt: Box<dyn MfaPrompt>) {
        tracing::debug!("Setting MFA prompt function");
        self.prompt = Some(prompt);
    }

    /// Whether MFA will be sent; a code that is already set implies yes
    pub fn use_mfa(&self) -> bool {
        self.use_mfa || self.code.is_some()
    }

    /// MFA device ARN, defaulting to the caller's own virtual device
    ///
    /// The first call without an explicit serial performs an identity lookup.
    pub async fn serial<C: IdentityClient>(
        &mut self,
        caller: &mut CallerLookup<'_, C>,
    ) -> Result<String> {
        if let Some(serial) = &self.serial {
            return Ok(serial.clone());
        }
        let serial = caller.identity().await?.mfa_arn()?;
        tracing::info!("Using default value for MFA serial: {}", serial);
        self.serial = Some(serial.clone());
        Ok(serial)
    }

    /// One-time code, prompting for it on first use when unset
    pub fn code(&mut self) -> Result<String> {
        if let Some(code) = &self.code {
            return Ok(code.clone());
        }
        tracing::info!("Calling MFA prompt function");
        let code = match &self.prompt {
            Some(prompt) => prompt.prompt()?,
            None => StdinPrompt.prompt()?,
        };
        if !mfa_code_regex().is_match(&code) {
            return Err(SpeculateError::MalformedMfaCode(code));
        }
        self.code = Some(code.clone());
        Ok(code)
    }

    /// Add the token code and serial to a request when MFA is in use
    pub async fn configure_request<R, C>(
        &mut self,
        request: &mut R,
        caller: &mut CallerLookup<'_, C>,
    ) -> Result<()>
    where
        R: MfaRequest,
        C: IdentityClient,
    {
        if !self.use_mfa() {
            return Ok(());
        }
        let code = self.code()?;
        let serial = self.serial(caller).await?;
        request.set_mfa(serial, code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sts::testing::{base_creds, FakeIdentityClient};
    use crate::sts::SessionTokenRequest;
    use std::io::Cursor;

    fn prompt_returning(code: &'static str, times: usize) -> Box<dyn MfaPrompt> {
        let mut prompt = MockMfaPrompt::new();
        prompt
            .expect_prompt()
            .times(times)
            .returning(move || Ok(code.to_string()));
        Box::new(prompt)
    }

    #[test]
    fn test_set_code_validation() {
        let mut mfa = Mfa::default();
        for bad in ["12345", "1234567", "abcdef", " 123456", "12345a"] {
            assert!(
                matches!(mfa.set_code(bad), Err(SpeculateError::MalformedMfaCode(_))),
                "{}",
                bad
            );
        }
        assert!(mfa.set_code("123456").is_ok());
        assert!(mfa.set_code("").is_ok());
    }

    #[test]
    fn test_set_serial_validation() {
        let mut mfa = Mfa::default();
        assert!(mfa.set_serial("arn:aws:iam::111111111111:mfa/alice").is_ok());
        assert!(mfa.set_serial("").is_ok());
        assert!(matches!(
            mfa.set_serial("arn:aws:iam::111111111111:user/alice"),
            Err(SpeculateError::MalformedMfaSerial(_))
        ));
    }

    #[test]
    fn test_code_implies_use_mfa() {
        let mut mfa = Mfa::default();
        assert!(!mfa.use_mfa());
        mfa.set_code("123456").unwrap();
        assert!(mfa.use_mfa());
        mfa.set_code("").unwrap();
        assert!(!mfa.use_mfa());
        mfa.set_use_mfa(true);
        assert!(mfa.use_mfa());
    }

    #[test]
    fn test_code_prompts_once() {
        let mut mfa = Mfa::default();
        mfa.set_prompt(prompt_returning("246810", 1));
        assert_eq!(mfa.code().unwrap(), "246810");
        assert_eq!(mfa.code().unwrap(), "246810");
    }

    #[test]
    fn test_explicit_code_skips_prompt() {
        let mut mfa = Mfa::default();
        mfa.set_prompt(prompt_returning("000000", 0));
        mfa.set_code("135790").unwrap();
        assert_eq!(mfa.code().unwrap(), "135790");
    }

    #[test]
    fn test_prompted_code_is_validated() {
        let mut mfa = Mfa::default();
        mfa.set_prompt(prompt_returning("12ab", 1));
        assert!(matches!(mfa.code(), Err(SpeculateError::MalformedMfaCode(_))));
    }

    #[test]
    fn test_read_code_trims_input() {
        let mut output = Vec::new();
        let code = read_code(Cursor::new("123456  \n"), &mut output).unwrap();
        assert_eq!(code, "123456");
        assert_eq!(String::from_utf8(output).unwrap(), "MFA Code: ");
    }

    #[test]
    fn test_read_code_eof() {
        let mut output = Vec::new();
        let err = read_code(Cursor::new(""), &mut output).unwrap_err();
        assert!(matches!(err, SpeculateError::Io(_)));
    }

    #[tokio::test]
    async fn test_serial_is_resolved_once() {
        let client = FakeIdentityClient::for_user("111111111111", "alice");
        let creds = base_creds();
        let mut mfa = Mfa::default();

        let first = mfa
            .serial(&mut CallerLookup::new(&client, &creds))
            .await
            .unwrap();
        let second = mfa
            .serial(&mut CallerLookup::new(&client, &creds))
            .await
            .unwrap();

        assert_eq!(first, "arn:aws:iam::111111111111:mfa/alice");
        assert_eq!(first, second);
        assert_eq!(client.identity_calls(), 1);
    }

    #[tokio::test]
    async fn test_serial_for_role_caller_fails() {
        let client = FakeIdentityClient::with_arn(
            "111111111111",
            "arn:aws:sts::111111111111:assumed-role/admin/alice",
        );
        let creds = base_creds();
        let mut mfa = Mfa::default();
        let err = mfa
            .serial(&mut CallerLookup::new(&client, &creds))
            .await
            .unwrap_err();
        assert!(matches!(err, SpeculateError::NotAUser(_)));
    }

    #[tokio::test]
    async fn test_configure_request_disabled_is_noop() {
        let client = FakeIdentityClient::for_user("111111111111", "alice");
        let creds = base_creds();
        let mut mfa = Mfa::default();
        mfa.set_prompt(prompt_returning("000000", 0));

        let mut request = SessionTokenRequest::default();
        mfa.configure_request(&mut request, &mut CallerLookup::new(&client, &creds))
            .await
            .unwrap();

        assert_eq!(request, SessionTokenRequest::default());
        assert_eq!(client.identity_calls(), 0);
    }

    #[tokio::test]
    async fn test_configure_request_fills_fields() {
        let client = FakeIdentityClient::for_user("111111111111", "alice");
        let creds = base_creds();
        let mut mfa = Mfa::default();
        mfa.set_use_mfa(true);
        mfa.set_prompt(prompt_returning("112233", 1));

        let mut request = SessionTokenRequest::default();
        mfa.configure_request(&mut request, &mut CallerLookup::new(&client, &creds))
            .await
            .unwrap();

        assert_eq!(request.token_code.as_deref(), Some("112233"));
        assert_eq!(
            request.serial_number.as_deref(),
            Some("arn:aws:iam::111111111111:mfa/alice")
        );
    }
}
