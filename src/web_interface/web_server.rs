use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use warp::{Filter, Reply};

use super::rate_limit::{with_rate_limit, RateLimiter};
use super::routes::{
    capture_route, delete_capture_route, handle_rejection, health_route, list_captures_route,
    viewer_route,
};
use crate::capture_service::CaptureService;
use crate::error_handling::types::WebError;

/// HTTP front end for the capture service
pub struct WebServer {
    service: Arc<CaptureService>,
    limiter: Arc<RateLimiter>,
    body_limit: u64,
}

impl WebServer {
    /// Create a new WebServer instance
    pub fn new(service: Arc<CaptureService>, limiter: Arc<RateLimiter>, body_limit: u64) -> Self {
        Self {
            service,
            limiter,
            body_limit,
        }
    }

    /// Every route behind the rate limiter, with rejections rendered as JSON.
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
        let api = health_route()
            .or(capture_route(self.service.clone(), self.body_limit))
            .or(list_captures_route(self.service.clone()))
            .or(delete_capture_route(self.service.clone()))
            .or(viewer_route(self.service.clone()));

        with_rate_limit(self.limiter.clone())
            .and(api)
            .recover(handle_rejection)
            .with(warp::log("sentry_api::access"))
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self, addr: SocketAddr) -> Result<(), WebError> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .map_err(|e| WebError::BindFailed(e.to_string()))?;

        info!("Listening on http://{}", bound);
        info!("  - POST   /capture");
        info!("  - GET    /admin/captures");
        info!("  - DELETE /admin/captures/:filename");
        info!("  - GET    /admin/viewer");
        server.await;
        info!("Web server stopped");
        Ok(())
    }
}
