//! ACL enforcement as axum function middleware.
//!
//! For stacking on an existing router:
//!
//! ```ignore
//! Router::new()
//!     .route("/admin/status", get(status))
//!     .layer(middleware::from_fn_with_state(GateState::new(acl), acl_middleware))
//! ```
//!
//! The rest of the router is the allow path. Denied requests get a 401;
//! use [`AclGate`](super::AclGate) when a custom deny handler is needed.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use super::gate::{decide, Decision, Outcome, SharedLookup};
use super::response;
use crate::acl::Acl;
use crate::lookup::RequestLookup;
use crate::observability::metrics;

/// State required by [`acl_middleware`].
#[derive(Clone)]
pub struct GateState {
    acl: Arc<dyn Acl>,
    lookup: SharedLookup,
}

impl GateState {
    /// Gate on `acl`, looking up addresses with [`RequestLookup`].
    pub fn new(acl: Arc<dyn Acl>) -> Self {
        Self {
            acl,
            lookup: Arc::new(RequestLookup),
        }
    }

    pub fn with_lookup(mut self, lookup: SharedLookup) -> Self {
        self.lookup = lookup;
        self
    }
}

pub async fn acl_middleware(
    State(state): State<GateState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    match decide(state.acl.as_ref(), state.lookup.as_ref(), &req) {
        Decision::Permitted => {
            metrics::record_decision(Outcome::AllowDispatched.as_str());
            next.run(req).await
        }
        Decision::Denied => {
            metrics::record_decision(Outcome::Unauthorized.as_str());
            response::unauthorized()
        }
        Decision::LookupFailed => {
            metrics::record_decision(Outcome::InternalError.as_str());
            response::internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{MutableAcl, NetAcl};
    use crate::lookup::RemoteAddr;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(acl: Arc<NetAcl>) -> Router {
        Router::new()
            .route("/admin", get(|| async { "admin" }))
            .layer(middleware::from_fn_with_state(GateState::new(acl), acl_middleware))
    }

    fn request_from(endpoint: &str) -> Request<Body> {
        let mut req = Request::builder().uri("/admin").body(Body::empty()).unwrap();
        req.extensions_mut().insert(RemoteAddr(endpoint.to_string()));
        req
    }

    #[tokio::test]
    async fn network_gate_on_router() {
        let acl = Arc::new(NetAcl::new());
        let router = app(acl.clone());

        let res = router.clone().oneshot(request_from("10.1.2.3:5000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        acl.add("10.0.0.0/8".parse().unwrap());
        let res = router.clone().oneshot(request_from("10.1.2.3:5000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = router.oneshot(request_from("11.0.0.1:5000")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_address_is_500() {
        let router = app(Arc::new(NetAcl::new()));
        let req = Request::builder().uri("/admin").body(Body::empty()).unwrap();
        let res = router.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
