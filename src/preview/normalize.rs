use url::Url;

/// Scheme written in place of `http` and `https`, so one pattern covers both.
pub const FOLDED_HTTP_SCHEME: &str = "http(s)";

/// Parses a link as posted, reading protocol-relative links as https.
pub fn parse_link(link: &str) -> Option<Url> {
    if link.starts_with("//") {
        Url::parse(&format!("https:{link}")).ok()
    } else {
        Url::parse(link).ok()
    }
}

/// Normalize a URL so that links which differ only cosmetically compare equal.
///
/// Applies the following transformations:
/// - Converts protocol-relative URLs to https
/// - Folds `http` and `https` into the literal scheme `http(s)`
/// - Lowercases the hostname and strips a leading `www.`
/// - Drops default ports
/// - Removes trailing slashes from the path (preserves root `/`)
///
/// Query and fragment are kept as they are. Credentials are dropped.
/// Returns the original string if the URL cannot be parsed.
pub fn normalize_url(url: &str) -> String {
    let parsed = match parse_link(url) {
        Some(u) => u,
        None => return url.to_string(),
    };

    let host = match parsed.host_str() {
        Some(host) if !parsed.cannot_be_a_base() => host.to_lowercase(),
        _ => return parsed.to_string(),
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let scheme = match parsed.scheme() {
        "http" | "https" => FOLDED_HTTP_SCHEME,
        other => other,
    };

    // `Url::port` is already `None` for the scheme's default port
    let port = parsed
        .port()
        .map(|port| format!(":{port}"))
        .unwrap_or_default();

    let path = parsed.path();
    let path = if path.len() > 1 && path.ends_with('/') {
        path.trim_end_matches('/')
    } else {
        path
    };

    let mut normalized = format!("{scheme}://{host}{port}{path}");
    if let Some(query) = parsed.query() {
        normalized.push('?');
        normalized.push_str(query);
    }
    if let Some(fragment) = parsed.fragment() {
        normalized.push('#');
        normalized.push_str(fragment);
    }

    normalized
}
