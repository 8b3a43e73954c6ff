//! User validation
//!
//! A single, non-paginated request that tells an existing user apart from a
//! missing one before any listing is scraped.

use crate::scrape::fetcher::Fetcher;
use crate::scrape::urls::SiteUrls;
use crate::{FetchError, VaultError};
use reqwest::StatusCode;

/// Checks that `user_id` exists on the site
///
/// # Returns
///
/// * `Ok(())` - HTTP 200
/// * `Err(VaultError::UserNotFound)` - HTTP 404
/// * `Err(VaultError::Fetch(FetchError::UnexpectedStatus))` - any other status
/// * `Err(VaultError::Fetch(_))` - transport failure after retries
pub async fn validate_user(
    fetcher: &Fetcher,
    urls: &SiteUrls,
    user_id: &str,
) -> Result<(), VaultError> {
    let url = urls.user_lists(user_id, None);
    let response = fetcher.fetch(&url).await?;

    match StatusCode::from_u16(response.status_code) {
        Ok(StatusCode::OK) => {
            tracing::debug!("User {} exists", user_id);
            Ok(())
        }
        Ok(StatusCode::NOT_FOUND) => Err(VaultError::UserNotFound {
            user_id: user_id.to_string(),
            url,
        }),
        _ => Err(FetchError::UnexpectedStatus {
            reason: response.reason().to_string(),
            status: response.status_code,
            url,
        }
        .into()),
    }
}
