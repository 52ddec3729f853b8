//! Basic-auth guard for the upload, URL-repair and summary-refresh routes
//! under `/api/admin`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header::AUTHORIZATION, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use jal_core::store::SchemeStore;

use crate::{AppState, error::Error, translate::Translator};

/// The single administrator account.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`. Empty disables
  /// the admin routes.
  pub password_hash: String,
}

impl AuthConfig {
  fn accepts(&self, username: &str, password: &str) -> bool {
    if self.password_hash.is_empty() || username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Taken by every admin handler; extraction fails with 401 unless the
/// request carries the administrator's credentials.
pub struct AdminAuth;

/// `Authorization: Basic …` split into user and password.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Check the request headers against the administrator account.
pub fn verify_admin(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  match basic_credentials(headers) {
    Some((username, password)) if config.accepts(&username, &password) => Ok(()),
    _ => Err(Error::Unauthorized),
  }
}

impl<S, T> FromRequestParts<AppState<S, T>> for AdminAuth
where
  S: SchemeStore + 'static,
  T: Translator + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, T>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, &state.auth).inspect_err(|_| {
      tracing::warn!(uri = %parts.uri, "admin request rejected");
    })?;
    Ok(AdminAuth)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};

  fn make_config(password: &str) -> AuthConfig {
    use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig {
      username:      "admin".to_string(),
      password_hash: hash,
    }
  }

  fn headers(value: Option<&str>) -> HeaderMap {
    let mut builder = Request::builder();
    if let Some(v) = value {
      builder = builder.header(header::AUTHORIZATION, v);
    }
    builder.body(()).unwrap().into_parts().0.headers
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials() {
    let config = make_config("secret");
    assert!(verify_admin(&headers(Some(&basic("admin", "secret"))), &config).is_ok());
  }

  #[test]
  fn wrong_password_or_user() {
    let config = make_config("secret");
    assert!(matches!(
      verify_admin(&headers(Some(&basic("admin", "wrong"))), &config),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      verify_admin(&headers(Some(&basic("root", "secret"))), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn missing_or_garbled_header() {
    let config = make_config("secret");
    assert!(matches!(verify_admin(&headers(None), &config), Err(Error::Unauthorized)));
    assert!(matches!(
      verify_admin(&headers(Some("Basic !!!not-base64!!!")), &config),
      Err(Error::Unauthorized)
    ));
    assert!(matches!(
      verify_admin(&headers(Some("Bearer abc")), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn unparseable_hash_rejects_instead_of_failing_open() {
    let config = AuthConfig { username: "admin".into(), password_hash: "plaintext".into() };
    assert!(matches!(
      verify_admin(&headers(Some(&basic("admin", "plaintext"))), &config),
      Err(Error::Unauthorized)
    ));
  }

  #[test]
  fn empty_hash_locks_everyone_out() {
    let config = AuthConfig { username: "admin".into(), password_hash: String::new() };
    assert!(matches!(
      verify_admin(&headers(Some(&basic("admin", ""))), &config),
      Err(Error::Unauthorized)
    ));
  }
}
