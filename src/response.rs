//! Handler responses and forward resolution.

use std::fmt;

use serde::Serialize;

use crate::config::ViewConfig;
use crate::context::Ctx;
use crate::error::Error;

const REDIRECT_PREFIX: &str = "redirect:";

/// What a handler chain produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    /// Render the view at `path`
    View {
        /// Resolved view path
        path: String,
    },
    /// Send the client to `location`
    Redirect {
        /// Target location
        location: String,
    },
    /// A literal body
    Text {
        /// Body text
        body: String,
    },
}

impl Response {
    /// Creates a view response.
    pub fn view(path: impl Into<String>) -> Self {
        Response::View { path: path.into() }
    }

    /// Creates a redirect response.
    pub fn redirect(location: impl Into<String>) -> Self {
        Response::Redirect {
            location: location.into(),
        }
    }

    /// Creates a text response.
    pub fn text(body: impl Into<String>) -> Self {
        Response::Text { body: body.into() }
    }
}

/// A forward designator returned by a hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Forward(String);

impl Forward {
    /// Creates a forward designator.
    pub fn to(designator: impl Into<String>) -> Self {
        Self(designator.into())
    }

    /// Returns the designator text.
    pub fn designator(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Forward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a forward designator into a response.
pub trait ResolveForward: Send + Sync {
    /// Resolves `forward` for the request in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the designator cannot be resolved.
    fn resolve(&self, forward: &Forward, ctx: &Ctx) -> Result<Response, Error>;
}

/// Default forward resolver.
///
/// - `redirect:<location>` becomes a redirect
/// - an absolute designator (`/…`) is used as the view path unchanged
/// - anything else is wrapped in the configured prefix and suffix
///
/// # Examples
///
/// ```
/// use action_pipeline::{Ctx, Forward, MethodIdentity, ResolveForward, Response, ViewConfig, ViewResolver};
///
/// let resolver = ViewResolver::new(ViewConfig {
///     prefix: "/WEB-INF/views/".into(),
///     suffix: ".html".into(),
/// });
/// let ctx = Ctx::new("req-1").dispatch(MethodIdentity::new("index"));
///
/// assert_eq!(
///     resolver.resolve(&Forward::to("home"), &ctx).unwrap(),
///     Response::view("/WEB-INF/views/home.html")
/// );
/// assert_eq!(
///     resolver.resolve(&Forward::to("redirect:/login"), &ctx).unwrap(),
///     Response::redirect("/login")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ViewResolver {
    config: ViewConfig,
}

impl ViewResolver {
    /// Creates a resolver with the given view settings.
    pub fn new(config: ViewConfig) -> Self {
        Self { config }
    }
}

impl ResolveForward for ViewResolver {
    fn resolve(&self, forward: &Forward, ctx: &Ctx) -> Result<Response, Error> {
        let designator = forward.designator().trim();
        if designator.is_empty() {
            return Err(Error::configuration(format!(
                "empty forward designator returned by '{}'",
                ctx.method()
            )));
        }

        if let Some(location) = designator.strip_prefix(REDIRECT_PREFIX) {
            let location = location.trim();
            if location.is_empty() {
                return Err(Error::configuration("redirect designator without a location"));
            }
            return Ok(Response::redirect(location));
        }

        if designator.starts_with('/') {
            return Ok(Response::view(designator));
        }

        Ok(Response::view(format!(
            "{}{}{}",
            self.config.prefix, designator, self.config.suffix
        )))
    }
}
