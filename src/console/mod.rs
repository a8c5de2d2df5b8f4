// AWS Console federation and URL generation
use crate::creds::{Creds, CONSOLE_FIELDS};
use crate::error::{Result, SpeculateError};
use crate::sts::IdentityClient;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SigninTokenResponse {
    #[serde(rename = "SigninToken")]
    signin_token: String,
}

/// Federation endpoint for a console namespace
pub fn federation_base(namespace: &str) -> String {
    format!("https://signin.{}.com", namespace)
}

/// Console page the browser lands on after signing in
pub fn destination_url(region: Option<&str>, namespace: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    match region {
        Some(region) => format!("https://{}.console.{}.com/{}", region, namespace, path),
        None => format!("https://console.{}.com/{}", namespace, path),
    }
}

/// Builds AWS Console sign-in and sign-out URLs from temporary credentials
///
/// Sign-in goes through the federation endpoint: the credentials are
/// exchanged for a sign-in token, which is then embedded in a login URL.
#[derive(Debug, Clone, Default)]
pub struct ConsoleUrlBuilder {
    http: reqwest::Client,
    federation_endpoint: Option<String>,
}

impl ConsoleUrlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send federation requests somewhere other than the partition's signin host
    pub fn with_federation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.federation_endpoint = Some(endpoint.into());
        self
    }

    fn federation_base(&self, namespace: &str) -> String {
        match &self.federation_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => federation_base(namespace),
        }
    }

    pub async fn console_url<C: IdentityClient>(&self, client: &C, creds: &Creds) -> Result<String> {
        self.custom_console_url(client, creds, "").await
    }

    /// Sign-in URL landing on `destination`, a path below the console root
    pub async fn custom_console_url<C: IdentityClient>(
        &self,
        client: &C,
        creds: &Creds,
        destination: &str,
    ) -> Result<String> {
        let namespace = creds.namespace(client).await?;
        let base = self.federation_base(namespace);
        let signin_token = self.signin_token(&base, creds).await?;
        let target = destination_url(creds.region(), namespace, destination);

        Ok(format!(
            "{}/federation?Action=login&Issuer=&Destination={}&SigninToken={}",
            base,
            urlencoding::encode(&target),
            signin_token
        ))
    }

    pub async fn signout_url<C: IdentityClient>(&self, client: &C, creds: &Creds) -> Result<String> {
        let namespace = creds.namespace(client).await?;
        Ok(format!("{}/oauth?Action=logout", self.federation_base(namespace)))
    }

    async fn signin_token(&self, base: &str, creds: &Creds) -> Result<String> {
        let session = serde_json::to_string(&creds.translate(CONSOLE_FIELDS))?;
        let token_url = format!(
            "{}/federation?Action=getSigninToken&Session={}",
            base,
            urlencoding::encode(&session)
        );

        tracing::debug!("Requesting sign-in token from AWS federation endpoint");
        let response = self
            .http
            .get(&token_url)
            .send()
            .await
            .map_err(|e| SpeculateError::FederationHttp(format!("Failed to get sign-in token: {}", e)))?
            .error_for_status()?;

        let body: SigninTokenResponse = response.json().await.map_err(|e| {
            SpeculateError::FederationHttp(format!("Failed to parse token response: {}", e))
        })?;

        Ok(body.signin_token)
    }
}

/// Open a console URL in the default browser
///
/// Returns false without trying when there is no display to open it on.
pub fn open_in_browser(url: &str) -> Result<bool> {
    if crate::env::is_headless_environment() {
        tracing::info!("Headless environment, not opening a browser");
        return Ok(false);
    }

    tracing::info!("Opening AWS Console in browser");
    webbrowser::open(url).map_err(|e| SpeculateError::BrowserLaunchFailed(format!("{}", e)))?;
    Ok(true)
}
