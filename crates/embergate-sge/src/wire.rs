//! Tab-delimited wire helpers.
//!
//! Gateway responses are tab-separated fields, sometimes with positional
//! meaning and sometimes carrying `NAME=value` pairs at arbitrary
//! positions. These helpers are the only field extraction the protocol
//! layer does. No regexes: malformed responses fall out as explicit
//! `None`/empty cases instead of silent partial matches.

/// Splits a response into its tab-delimited fields.
///
/// Trailing CR/LF is stripped first; empty fields (from adjacent tabs)
/// are preserved because positions matter.
pub fn fields(response: &str) -> Vec<&str> {
    response.trim_end_matches(['\r', '\n']).split('\t').collect()
}

/// The last tab-delimited field, where the gateway puts failure reasons.
pub fn last_field(response: &str) -> &str {
    response
        .trim_end_matches(['\r', '\n'])
        .rsplit('\t')
        .next()
        .unwrap_or("")
}

/// Looks up the value of a `\t{key}=` field.
///
/// The value runs to the next tab or the end of the response. Returns
/// `None` when the key is absent; an empty value is `Some("")`.
pub fn named_field<'a>(response: &'a str, key: &str) -> Option<&'a str> {
    let marker = format!("\t{key}=");
    let start = response.find(&marker)? + marker.len();
    let rest = &response[start..];
    let end = rest.find('\t').unwrap_or(rest.len());
    Some(rest[..end].trim_end_matches(['\r', '\n']))
}
