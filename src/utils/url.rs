//! URL utilities for consistent URL handling
//!
//! This module provides utilities for normalizing URLs to prevent issues
//! with trailing slashes when constructing API endpoints.

/// Normalize a base URL by removing trailing slashes
///
/// This ensures consistent URL construction when appending endpoints,
/// preventing double slashes in the final URLs.
///
/// # Examples
///
/// ```
/// use parlor::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.example.com/v1"), "https://api.example.com/v1");
/// assert_eq!(normalize_base_url("https://api.example.com/v1/"), "https://api.example.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Construct a complete API endpoint URL from a base URL and endpoint path
///
/// This function normalizes the base URL and safely appends the endpoint,
/// ensuring there are no double slashes in the result.
///
/// # Examples
///
/// ```
/// use parlor::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1/", "widget/conversation/stream"),
///     "https://api.example.com/v1/widget/conversation/stream"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalized_base, endpoint)
}

/// Append a cache-busting version parameter to an asset URL.
pub fn with_version_param(url: &str, version: &str) -> String {
    if url.contains('?') {
        format!("{url}&v={version}")
    } else {
        format!("{url}?v={version}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/v1"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1/"),
            "https://api.example.com/v1"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/v1///"),
            "https://api.example.com/v1"
        );
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn test_construct_api_url() {
        assert_eq!(
            construct_api_url("https://api.example.com/v1", "widget/conversation/stream"),
            "https://api.example.com/v1/widget/conversation/stream"
        );
        assert_eq!(
            construct_api_url("https://api.example.com/v1/", "/widget/conversation/stream"),
            "https://api.example.com/v1/widget/conversation/stream"
        );
        assert_eq!(
            construct_api_url("https://cdn.example.com///", "embed/widget.js"),
            "https://cdn.example.com/embed/widget.js"
        );
    }

    #[test]
    fn test_with_version_param() {
        assert_eq!(
            with_version_param("https://cdn.example.com/embed/widget.js", "123"),
            "https://cdn.example.com/embed/widget.js?v=123"
        );
        assert_eq!(
            with_version_param("https://cdn.example.com/widget.js?theme=dark", "123"),
            "https://cdn.example.com/widget.js?theme=dark&v=123"
        );
    }
}
