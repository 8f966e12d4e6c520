//! Reverse routing: route name → URL.
//!
//! Substitution happens on the original pattern, not the compiled regex:
//! each placeholder is replaced with the percent-encoded parameter value
//! (RFC 3986 path-segment encoding, space as `%20`), an optional query is
//! appended in `application/x-www-form-urlencoded` form (space as `+`), and
//! an absolute URL prepends the configured base with any trailing `/`
//! stripped.

use crate::pattern;
use crate::router::Router;
use std::collections::HashMap;
use std::fmt;

/// Error raised by URL generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// No route is registered under the requested name.
    NameNotFound { name: String },
    /// The pattern requires parameters the caller did not supply; `missing`
    /// is in pattern order.
    MissingParameters { name: String, missing: Vec<String> },
    /// An absolute URL was requested but no base URL is configured.
    BaseUrlNotSet,
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::NameNotFound { name } => {
                write!(f, "no route named '{name}'")
            }
            UrlError::MissingParameters { name, missing } => {
                write!(
                    f,
                    "route '{name}' is missing parameters: {}",
                    missing.join(", ")
                )
            }
            UrlError::BaseUrlNotSet => {
                write!(f, "absolute URL requested but no base URL is configured")
            }
        }
    }
}

impl std::error::Error for UrlError {}

/// Reverse URL generator over a frozen router.
pub struct UrlGenerator<'r> {
    router: &'r Router,
    base_url: Option<String>,
}

impl<'r> UrlGenerator<'r> {
    #[must_use]
    pub fn new(router: &'r Router) -> Self {
        Self {
            router,
            base_url: None,
        }
    }

    /// Configure the base URL used for absolute generation.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Generate a URL for the named route.
    ///
    /// Parameters not required by the pattern are ignored. Query pairs are
    /// appended in input order.
    ///
    /// # Errors
    ///
    /// Returns [`UrlError`] when the name is unknown, required parameters
    /// are missing, or `absolute` is requested without a configured base.
    pub fn generate(
        &self,
        name: &str,
        params: &HashMap<String, String>,
        query: &[(String, String)],
        absolute: bool,
    ) -> Result<String, UrlError> {
        let route = self
            .router
            .find_by_name(name)
            .ok_or_else(|| UrlError::NameNotFound {
                name: name.to_string(),
            })?;

        let missing: Vec<String> = route
            .parameter_names()
            .iter()
            .filter(|n| !params.contains_key(*n))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(UrlError::MissingParameters {
                name: name.to_string(),
                missing,
            });
        }

        let mut url = pattern::replace_placeholders(route.pattern(), |param| {
            // Presence was checked above.
            params.get(param).map_or_else(
                || {
                    Err(UrlError::MissingParameters {
                        name: name.to_string(),
                        missing: vec![param.to_string()],
                    })
                },
                |value| Ok(urlencoding::encode(value).into_owned()),
            )
        })?;

        if !query.is_empty() {
            url.push('?');
            for (i, (key, value)) in query.iter().enumerate() {
                if i > 0 {
                    url.push('&');
                }
                url.push_str(&form_encode(key));
                url.push('=');
                url.push_str(&form_encode(value));
            }
        }

        if absolute {
            let base = self.base_url.as_deref().ok_or(UrlError::BaseUrlNotSet)?;
            let mut full = String::with_capacity(base.len() + url.len());
            full.push_str(base.trim_end_matches('/'));
            full.push_str(&url);
            return Ok(full);
        }
        Ok(url)
    }

    /// Relative URL with no query string.
    ///
    /// # Errors
    ///
    /// Same as [`UrlGenerator::generate`].
    pub fn path(&self, name: &str, params: &HashMap<String, String>) -> Result<String, UrlError> {
        self.generate(name, params, &[], false)
    }
}

/// `application/x-www-form-urlencoded` encoding: like percent-encoding but
/// with space as `+`.
fn form_encode(value: &str) -> String {
    urlencoding::encode(value).replace("%20", "+")
}
