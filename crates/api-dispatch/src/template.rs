//! URL templating: `:name` placeholders and query strings.

use std::fmt::Display;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched by [`encode_uri`], matching ECMAScript `encodeURI`.
const URI_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Percent-encode a string the way `encodeURI` does.
///
/// URI delimiters survive; spaces, quotes, brackets and all non-ASCII text
/// are encoded as UTF-8 bytes.
pub fn encode_uri(value: &str) -> String {
    utf8_percent_encode(value, URI_RESERVED).to_string()
}

/// Expand a URL template.
///
/// Every literal `:key` in `template` is replaced by the URI-encoded value,
/// for each key in `path_params`. Matching is plain substring replacement,
/// so `:id` also rewrites the start of `:identity`; placeholders without a
/// matching key are left as they are.
///
/// Query pairs are appended in order as `?k1=v1&k2=v2`, without encoding.
/// A single trailing `&` and then a single trailing `?` are stripped from
/// the result.
///
/// # Example
///
/// ```
/// use api_dispatch::compute_url;
///
/// let url = compute_url(
///     "/accounts/:accountId/books/:bookId",
///     &[("accountId", "a1"), ("bookId", "b1")],
///     &[("limit", "10"), ("offset", "0")],
/// );
/// assert_eq!(url, "/accounts/a1/books/b1?limit=10&offset=0");
/// ```
pub fn compute_url<K, V, Q, W>(template: &str, path_params: &[(K, V)], query: &[(Q, W)]) -> String
where
    K: AsRef<str>,
    V: Display,
    Q: Display,
    W: Display,
{
    let mut url = template.to_string();

    for (key, value) in path_params {
        let placeholder = format!(":{}", key.as_ref());
        url = url.replace(&placeholder, &encode_uri(&value.to_string()));
    }

    if !query.is_empty() {
        url.push('?');
    }
    for (key, value) in query {
        url.push_str(&format!("{key}={value}&"));
    }

    if url.ends_with('&') {
        url.pop();
    }
    if url.ends_with('?') {
        url.pop();
    }
    url
}
