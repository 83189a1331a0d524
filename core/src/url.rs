//! Final request URL assembly.
//!
//! Path placeholders are substituted literally and never validated: a
//! `{key}` with no matching parameter stays in the URL, and a parameter with
//! no placeholder is ignored.

/// Join `base` and `endpoint`, substitute `{key}` placeholders, and append
/// the query string.
///
/// Keys and values are percent-encoded as UTF-8. The query string is joined
/// with `&` instead of `?` when the URL already carries one.
pub fn compose(
    base: &str,
    endpoint: &str,
    path_params: &[(String, String)],
    query_params: &[(String, String)],
) -> String {
    let mut url = format!("{base}{endpoint}");

    for (key, value) in path_params {
        url = url.replace(&format!("{{{key}}}"), &urlencoding::encode(value));
    }

    let query = query_params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    if !query.is_empty() {
        let separator = if url.contains('?') { '&' } else { '?' };
        url.push(separator);
        url.push_str(&query);
    }

    url
}
