//! Request gate: source lookup, ACL decision, allow/deny dispatch.
//!
//! # Request States
//! ```text
//! Received ──lookup ok──→ AddressExtracted ──permitted──→ AllowDispatched
//!    │                          │
//!    │ lookup failed            └─denied─┬─ deny handler ──→ DenyDispatched
//!    ▼                                   └─ none ──────────→ Unauthorized (401)
//! InternalError (500)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a failed lookup is never treated as permitted
//! - Default deny: with no deny handler the caller gets a 401
//! - The ACL is only read here; mutation happens elsewhere through the
//!   `Arc` the owner kept

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::handler::Handler;
use axum::http::Request;
use axum::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceExt};

use crate::acl::Acl;
use crate::error::ConfigError;
use crate::http::response;
use crate::lookup::{AddressLookup, RequestLookup};
use crate::observability::metrics;

/// Type-erased allow or deny handler.
pub type BoxHandler = BoxCloneSyncService<Request<Body>, Response, Infallible>;

/// Shared request address lookup.
pub type SharedLookup = Arc<dyn AddressLookup<Request<Body>>>;

/// Terminal state of one gated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InternalError,
    Unauthorized,
    AllowDispatched,
    DenyDispatched,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::InternalError => "internal_error",
            Outcome::Unauthorized => "unauthorized",
            Outcome::AllowDispatched => "allow",
            Outcome::DenyDispatched => "deny",
        }
    }
}

/// Result of looking up and checking a request's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Permitted,
    Denied,
    LookupFailed,
}

pub(crate) fn decide(acl: &dyn Acl, lookup: &dyn AddressLookup<Request<Body>>, req: &Request<Body>) -> Decision {
    let addr = match lookup.address(req) {
        Ok(addr) => addr,
        Err(e) => {
            tracing::warn!(
                error = %e,
                method = %req.method(),
                path = %req.uri().path(),
                "Failed to look up request address"
            );
            return Decision::LookupFailed;
        }
    };

    if acl.permitted(&addr) {
        tracing::debug!(client = %addr, path = %req.uri().path(), "ACL permitted request");
        Decision::Permitted
    } else {
        tracing::info!(client = %addr, path = %req.uri().path(), "ACL denied request");
        Decision::Denied
    }
}

fn boxed<S>(service: S) -> BoxHandler
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    BoxCloneSyncService::new(service)
}

/// Wraps an allow handler (and optionally a deny handler) with an ACL.
///
/// `AclGate` is a `tower::Service`, so it mounts directly with
/// `Router::route_service` or `Router::fallback_service`. Serve the
/// router with `into_make_service_with_connect_info::<SocketAddr>()` so
/// the default lookup can see the peer address.
#[derive(Clone)]
pub struct AclGate {
    acl: Arc<dyn Acl>,
    allow: BoxHandler,
    deny: Option<BoxHandler>,
    lookup: SharedLookup,
}

impl AclGate {
    pub fn builder() -> AclGateBuilder {
        AclGateBuilder::default()
    }

    /// Run the state machine for `req` without dispatching it.
    pub fn outcome(&self, req: &Request<Body>) -> Outcome {
        match decide(self.acl.as_ref(), self.lookup.as_ref(), req) {
            Decision::LookupFailed => Outcome::InternalError,
            Decision::Permitted => Outcome::AllowDispatched,
            Decision::Denied if self.deny.is_some() => Outcome::DenyDispatched,
            Decision::Denied => Outcome::Unauthorized,
        }
    }
}

impl std::fmt::Debug for AclGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclGate")
            .field("deny_handler", &self.deny.is_some())
            .finish_non_exhaustive()
    }
}

impl Service<Request<Body>> for AclGate {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // handlers are cloned and driven with oneshot, which polls their readiness
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let outcome = self.outcome(&req);
        metrics::record_decision(outcome.as_str());

        match outcome {
            Outcome::AllowDispatched => Box::pin(self.allow.clone().oneshot(req)),
            Outcome::DenyDispatched => match self.deny.clone() {
                Some(deny) => Box::pin(deny.oneshot(req)),
                None => Box::pin(std::future::ready(Ok(response::unauthorized()))),
            },
            Outcome::Unauthorized => Box::pin(std::future::ready(Ok(response::unauthorized()))),
            Outcome::InternalError => Box::pin(std::future::ready(Ok(response::internal_error()))),
        }
    }
}

/// Builder for [`AclGate`]. The ACL and the allow handler are required.
#[derive(Default)]
pub struct AclGateBuilder {
    acl: Option<Arc<dyn Acl>>,
    allow: Option<BoxHandler>,
    deny: Option<BoxHandler>,
    lookup: Option<SharedLookup>,
}

impl AclGateBuilder {
    pub fn acl(mut self, acl: Arc<dyn Acl>) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Service invoked for permitted requests.
    pub fn allow<S>(mut self, service: S) -> Self
    where
        S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        self.allow = Some(boxed(service));
        self
    }

    /// Axum handler function invoked for permitted requests.
    pub fn allow_handler<H, T>(self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.allow(handler.with_state(()))
    }

    /// Service invoked for denied requests instead of the default 401.
    pub fn deny<S>(mut self, service: S) -> Self
    where
        S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
        S::Future: Send + 'static,
    {
        self.deny = Some(boxed(service));
        self
    }

    pub fn deny_handler<H, T>(self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.deny(handler.with_state(()))
    }

    /// Replace the default [`RequestLookup`].
    pub fn lookup(mut self, lookup: SharedLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn build(self) -> Result<AclGate, ConfigError> {
        let acl = self.acl.ok_or(ConfigError::MissingAcl)?;
        let allow = self.allow.ok_or(ConfigError::MissingAllow)?;
        Ok(AclGate {
            acl,
            allow,
            deny: self.deny,
            lookup: self.lookup.unwrap_or_else(|| Arc::new(RequestLookup)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{HostAcl, MutableAcl};
    use crate::error::LookupError;
    use crate::lookup::RemoteAddr;
    use axum::extract::ConnectInfo;
    use axum::http::StatusCode;
    use std::net::{IpAddr, SocketAddr, SocketAddrV6};

    async fn ok() -> &'static str {
        "OK"
    }

    async fn no() -> &'static str {
        "NO"
    }

    fn request_from(endpoint: &str) -> Request<Body> {
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(RemoteAddr(endpoint.to_string()));
        req
    }

    async fn body_of(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    struct FixedLookup(Result<IpAddr, LookupError>);

    impl AddressLookup<Request<Body>> for FixedLookup {
        fn address(&self, _req: &Request<Body>) -> Result<IpAddr, LookupError> {
            self.0.clone()
        }
    }

    #[test]
    fn build_requires_acl_and_allow() {
        let err = AclGate::builder().allow_handler(ok).build().unwrap_err();
        assert_eq!(err, ConfigError::MissingAcl);
        assert_eq!(err.to_string(), "ACL cannot be empty");

        let err = AclGate::builder()
            .acl(Arc::new(HostAcl::new()))
            .deny_handler(no)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingAllow);

        assert!(AclGate::builder()
            .acl(Arc::new(HostAcl::new()))
            .allow_handler(ok)
            .build()
            .is_ok());
    }

    #[tokio::test]
    async fn dispatches_by_decision() {
        let acl = Arc::new(HostAcl::new());
        let gate = AclGate::builder()
            .acl(acl.clone())
            .allow_handler(ok)
            .deny_handler(no)
            .build()
            .unwrap();

        let res = gate.clone().oneshot(request_from("10.0.0.1:9999")).await.unwrap();
        assert_eq!(body_of(res).await, "NO");

        acl.add("10.0.0.1".parse().unwrap());
        let res = gate.clone().oneshot(request_from("10.0.0.1:9999")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_of(res).await, "OK");
    }

    #[tokio::test]
    async fn denied_without_handler_is_401() {
        let gate = AclGate::builder()
            .acl(Arc::new(HostAcl::new()))
            .allow_handler(ok)
            .build()
            .unwrap();

        let req = request_from("10.0.0.1:1");
        assert_eq!(gate.outcome(&req), Outcome::Unauthorized);
        let res = gate.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(res).await, "Unauthorized");
    }

    #[tokio::test]
    async fn lookup_failure_is_500_even_for_stub() {
        let gate = AclGate::builder()
            .acl(Arc::new(crate::acl::HostStub::new()))
            .allow_handler(ok)
            .deny_handler(no)
            .build()
            .unwrap();

        let res = gate.oneshot(Request::new(Body::empty())).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(res).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn custom_lookup_replaces_default() {
        let acl = Arc::new(HostAcl::new());
        acl.add("192.0.2.1".parse().unwrap());
        let gate = AclGate::builder()
            .acl(acl)
            .allow_handler(ok)
            .lookup(Arc::new(FixedLookup(Ok("192.0.2.1".parse().unwrap()))))
            .build()
            .unwrap();

        // no connection info at all, but the fixed lookup answers anyway
        let req = Request::new(Body::empty());
        assert_eq!(gate.outcome(&req), Outcome::AllowDispatched);
        let res = gate.oneshot(req).await.unwrap();
        assert_eq!(body_of(res).await, "OK");
    }

    #[test]
    fn scoped_link_local_peer_is_permitted() {
        let acl = Arc::new(HostAcl::new());
        acl.add("fe80::1".parse().unwrap());
        let gate = AclGate::builder().acl(acl).allow_handler(ok).build().unwrap();

        let peer = SocketAddr::V6(SocketAddrV6::new("fe80::1".parse().unwrap(), 443, 0, 3));
        let mut req = Request::new(Body::empty());
        req.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(gate.outcome(&req), Outcome::AllowDispatched);
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::InternalError.as_str(), "internal_error");
        assert_eq!(Outcome::DenyDispatched.as_str(), "deny");
    }
}
