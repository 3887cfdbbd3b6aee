use std::convert::Infallible;
use std::sync::Arc;

use log::{error, warn};
use percent_encoding::percent_decode_str;
use warp::http::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER, WWW_AUTHENTICATE};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::{reply, Filter, Rejection, Reply};

use super::rate_limit::{retry_after_secs, RateLimited};
use super::types::{
    ApiError, CaptureDeletedResponse, CaptureListResponse, CaptureSavedResponse, HealthResponse,
};
use super::viewer::render_viewer;
use crate::capture_service::CaptureService;
use crate::error_handling::types::ServiceError;

/// Raw `Authorization` header. A value that is not visible ASCII is treated as absent.
pub fn authorization_header() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone
{
    warp::header::headers_cloned().map(|headers: HeaderMap| {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    })
}

fn json_error(status: StatusCode, message: &str) -> Response {
    reply::with_status(
        reply::json(&ApiError {
            error: message.to_string(),
        }),
        status,
    )
    .into_response()
}

fn error_reply(err: &ServiceError) -> Response {
    let mut res = json_error(err.status(), err.message());
    if let Some(challenge) = err.challenge() {
        res.headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
    }
    res
}

/// Runs a service call on the blocking pool; store operations do synchronous file I/O.
async fn run_blocking<T, F>(service: Arc<CaptureService>, call: F) -> Result<T, ServiceError>
where
    F: FnOnce(&CaptureService) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .unwrap_or_else(|e| {
            error!("Blocking task failed: {}", e);
            Err(ServiceError::Storage("Internal server error"))
        })
}

/// GET /health
pub fn health_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| reply::json(&HealthResponse { status: "ok" }))
}

/// POST /capture
pub fn capture_route(
    service: Arc<CaptureService>,
    body_limit: u64,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("capture")
        .and(warp::path::end())
        .and(warp::post())
        .and(authorization_header())
        .and(warp::body::content_length_limit(body_limit))
        .and(warp::body::bytes())
        .and_then(move |authorization: Option<String>, body: Bytes| {
            let service = service.clone();
            async move {
                let result = run_blocking(service, move |svc| {
                    svc.ingest(authorization.as_deref(), &body)
                })
                .await;
                let res = match result {
                    Ok(saved) => reply::with_status(
                        reply::json(&CaptureSavedResponse::from(saved)),
                        StatusCode::CREATED,
                    )
                    .into_response(),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /admin/captures
pub fn list_captures_route(
    service: Arc<CaptureService>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("admin" / "captures")
        .and(warp::get())
        .and(authorization_header())
        .and_then(move |authorization: Option<String>| {
            let service = service.clone();
            async move {
                let result = run_blocking(service, move |svc| {
                    svc.list_captures(authorization.as_deref())
                })
                .await;
                let res = match result {
                    Ok(captures) => {
                        reply::json(&CaptureListResponse::from(captures.as_slice())).into_response()
                    }
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// Percent-decodes a path segment. `None` when the decoded bytes are not UTF-8.
pub fn decode_path_segment(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// DELETE /admin/captures/:filename
///
/// The whole remaining path is the filename. It is percent-decoded before the path
/// guard sees it, so encoded separators (`%2F`, `..%2F`) are still rejected.
pub fn delete_capture_route(
    service: Arc<CaptureService>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("admin")
        .and(warp::path("captures"))
        .and(warp::path::tail())
        .and(warp::delete())
        .and(authorization_header())
        .and_then(move |tail: warp::path::Tail, authorization: Option<String>| {
            let service = service.clone();
            async move {
                // Not UTF-8 decodes to "", which the path guard rejects after auth.
                let filename = decode_path_segment(tail.as_str()).unwrap_or_default();
                let result = run_blocking(service, move |svc| {
                    svc.delete_capture(authorization.as_deref(), &filename)
                })
                .await;
                let res = match result {
                    Ok(deleted) => reply::json(&CaptureDeletedResponse::new(deleted)).into_response(),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// GET /admin/viewer
pub fn viewer_route(
    service: Arc<CaptureService>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("admin" / "viewer")
        .and(warp::get())
        .and(authorization_header())
        .and_then(move |authorization: Option<String>| {
            let service = service.clone();
            async move {
                let result = run_blocking(service, move |svc| {
                    svc.viewer_captures(authorization.as_deref())
                        .map(|captures| render_viewer(&captures))
                })
                .await;
                let res = match result {
                    Ok(html) => reply::html(html).into_response(),
                    Err(e) => error_reply(&e),
                };
                Ok::<_, Rejection>(res)
            }
        })
}

/// Turns unmatched or refused requests into JSON errors.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.is_not_found() {
        return Ok(json_error(StatusCode::NOT_FOUND, "Not found"));
    }
    if let Some(limited) = err.find::<RateLimited>() {
        let secs = retry_after_secs(limited.retry_after);
        let mut res = json_error(
            StatusCode::TOO_MANY_REQUESTS,
            &format!("Rate limit exceeded, retry in {} seconds", secs),
        );
        res.headers_mut().insert(RETRY_AFTER, HeaderValue::from(secs));
        return Ok(res);
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        warn!("Rejected oversized request body");
        return Ok(json_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    if err.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(json_error(StatusCode::LENGTH_REQUIRED, "Length required"));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
        ));
    }

    error!("Unhandled rejection: {:?}", err);
    Ok(json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}
