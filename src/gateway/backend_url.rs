//! Usage: Backend base URL (resolved once) + absolute URL construction for forwarded calls.

use reqwest::Url;

/// Configured backend base. Immutable once built; parsing happens up front so the
/// per-call path never re-reads configuration.
#[derive(Debug, Clone)]
pub struct BackendBase {
    raw: String,
    parsed: Option<Url>,
}

impl BackendBase {
    pub fn new(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&raw)
            .ok()
            .filter(|url| url.has_host() && !url.cannot_be_a_base());
        Self { raw, parsed }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> Option<&Url> {
        self.parsed.as_ref()
    }

    pub fn is_well_formed(&self) -> bool {
        self.parsed.is_some()
    }

    /// Origin + path of the base, without a trailing slash, and whether that path
    /// already carries an `api` segment.
    fn prefix_and_api_flag(&self) -> (String, bool) {
        match &self.parsed {
            Some(url) => {
                let path = url.path().trim_end_matches('/');
                let has_api_segment = path
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .any(|segment| segment.eq_ignore_ascii_case("api"));
                (
                    format!("{}{}", url.origin().ascii_serialization(), path),
                    has_api_segment,
                )
            }
            None => (
                self.raw.clone(),
                self.raw.to_ascii_lowercase().contains("/api"),
            ),
        }
    }
}

pub fn build_backend_url(base: &BackendBase, path: &str) -> String {
    let cleaned = path.trim_start_matches('/');
    let (prefix, base_has_api) = base.prefix_and_api_flag();
    let path_has_api = cleaned
        .get(..4)
        .is_some_and(|head| head.eq_ignore_ascii_case("api/"));

    let joined = match (base_has_api, path_has_api) {
        // `api/` is ASCII, so slicing off four bytes stays on a char boundary.
        (true, true) => format!("{prefix}/{}", &cleaned[4..]),
        (false, true) | (true, false) => format!("{prefix}/{cleaned}"),
        (false, false) => format!("{prefix}/api/{cleaned}"),
    };

    collapse_slashes(&joined)
}

/// Collapses runs of two or more `/` into one, except when the run follows a `:`
/// (scheme separators) or starts the string.
pub(crate) fn collapse_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '/' {
            out.push(c);
            prev = Some(c);
            continue;
        }

        let mut run = 1usize;
        while chars.peek() == Some(&'/') {
            chars.next();
            run += 1;
        }

        let keep_run = run == 1 || matches!(prev, None | Some(':'));
        if keep_run {
            out.extend(std::iter::repeat('/').take(run));
        } else {
            out.push('/');
        }
        prev = Some('/');
    }

    out
}

#[cfg(test)]
mod tests;
