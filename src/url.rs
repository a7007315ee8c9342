//! APKMirror page URLs for resolved and unresolved apps.

const APKMIRROR_BASE_URL: &str = "https://www.apkmirror.com";

/// App page for a `publisher/app` slug.
pub fn direct_url(slug: &str) -> String {
    format!("{}/apk/{}/", APKMIRROR_BASE_URL, slug)
}

/// Search page for a package, the fallback when no slug is known.
pub fn search_url(package: &str) -> String {
    format!(
        "{}/?post_type=app_release&searchtype=app&s={}",
        APKMIRROR_BASE_URL, package
    )
}
