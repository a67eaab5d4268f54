use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Build the default header map carrying a personal access token as
/// `Authorization: Token <pat>`.
///
/// The header value is marked sensitive so it never shows up in debug output.
pub fn auth_headers(token: &SecretString) -> Result<HeaderMap, Error> {
    let mut value = HeaderValue::from_str(&format!("Token {}", token.expose_secret())).map_err(
        |e| Error::Authentication {
            message: format!("invalid API token header value: {e}"),
        },
    )?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}
