//! Status callbacks.

/// Hooks fired for specific failing status codes.
///
/// Every method is a no-op unless overridden. Hooks run synchronously on the
/// worker thread executing the request, once per failing call, before the
/// error envelope is built. They never fire for 200, for unlisted codes, or
/// when the request fails in transport.
pub trait ResponseHandler: Send + Sync {
    /// 404
    fn on_not_found(&self) {}
    /// 400
    fn on_bad_request(&self) {}
    /// 401
    fn on_unauthorized(&self) {}
    /// 504
    fn on_gateway_timeout(&self) {}
    /// 500
    fn on_internal_error(&self) {}
    /// 503
    fn on_unavailable(&self) {}
}
