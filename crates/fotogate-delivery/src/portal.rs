//! Portal URL formatting.

/// Build the canonical family-facing URL for a token value.
///
/// `GET /f/{token}` is the portal entry point; this string is also what a
/// printed QR code encodes.
pub fn portal_url(base_url: &str, token_value: &str) -> String {
    format!("{}/f/{}", base_url.trim_end_matches('/'), token_value)
}
