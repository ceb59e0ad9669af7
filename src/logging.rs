use std::fmt;

/// Request-scoped logger.
///
/// `RequestLog` is obtained from [`crate::Ctx::log`] or created directly from
/// a request id. Every event carries the request id and, once known, the
/// dispatched method so a request's pipeline can be followed end to end.
#[derive(Debug, Clone, Copy)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    method: Option<&'a str>,
}

impl<'a> RequestLog<'a> {
    /// Creates a logger for the given request and method.
    pub fn new(request_id: &'a str, method: Option<&'a str>) -> Self {
        Self { request_id, method }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    fn method(&self) -> &str {
        self.method.unwrap_or("-")
    }

    /// Logs an info-level message with request ID and method.
    ///
    /// ```no_run
    /// # use action_pipeline::RequestLog;
    /// let log = RequestLog::new("req-1", Some("save"));
    /// log.info(format_args!("bound {} parameters", 3));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, method = %self.method(), "{}", args);
    }

    /// Logs a warning-level message with request ID and method.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, method = %self.method(), "{}", args);
    }

    /// Logs an error-level message with request ID and method.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, method = %self.method(), "{}", args);
    }

    /// Logs a debug-level message with request ID and method.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, method = %self.method(), "{}", args);
    }
}
