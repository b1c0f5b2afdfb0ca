pub mod favicon;
pub mod following;
pub mod tweets;

use crate::aggregator::TwitterSource;
use crate::color::Gradient;
use crate::error::{Error, Result};
use crate::sentiment::SentimentScorer;
use crate::templates::{self, Templates};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use regex::Regex;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{error, info, warn};

/// Everything a request handler needs. Built once in `main` and shared behind an `Arc`.
pub struct AppState {
    pub source: Arc<dyn TwitterSource>,
    pub scorer: Arc<dyn SentimentScorer>,
    pub gradient: Gradient,
    pub templates: Templates,
    pub favicon: Bytes,
}

impl AppState {
    pub fn new(
        source: Arc<dyn TwitterSource>,
        scorer: Arc<dyn SentimentScorer>,
        favicon: Bytes,
    ) -> Result<Self> {
        Ok(Self {
            source,
            scorer,
            gradient: Gradient::red_to_green(),
            templates: Templates::new()?,
            favicon,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Favicon,
    Tweets(&'a str),
    Following(&'a str),
    NotFound,
}

fn is_handle(segment: &str) -> bool {
    static HANDLE: OnceLock<Regex> = OnceLock::new();
    HANDLE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{1,50}$").expect("handle regex"))
        .is_match(segment)
}

pub fn route(path: &str) -> Route<'_> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match segments.as_slice() {
        ["favicon.ico"] => Route::Favicon,
        ["following", handle] if is_handle(handle) => Route::Following(*handle),
        [handle] if is_handle(handle) => Route::Tweets(*handle),
        _ => Route::NotFound,
    }
}

/// hyper service entry point; also writes the access log line.
pub async fn handle(
    state: Arc<AppState>,
    req: Request<Body>,
) -> std::result::Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let resp = respond(&state, req.method(), req.uri().path()).await;

    info!(
        method = %req.method(),
        path = req.uri().path(),
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    Ok(resp)
}

pub async fn respond(state: &AppState, method: &Method, path: &str) -> Response<Body> {
    if *method != Method::GET {
        let mut resp = error_page(
            state,
            StatusCode::METHOD_NOT_ALLOWED,
            &format!("{method} is not supported"),
        );
        resp.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
        return resp;
    }

    let rendered = match route(path) {
        Route::Favicon => return favicon::respond(&state.favicon),
        Route::NotFound => {
            return error_page(state, StatusCode::NOT_FOUND, &format!("Nothing lives at {path}"))
        }
        Route::Tweets(handle) => tweets::render(state, handle).await,
        Route::Following(handle) => following::render(state, handle).await,
    };

    match rendered {
        Ok(html) => html_response(StatusCode::OK, html),
        Err(err) => error_response(state, &err),
    }
}

fn error_response(state: &AppState, err: &Error) -> Response<Body> {
    match err {
        Error::NotFound(handle) => {
            warn!(%handle, "unknown account");
            error_page(
                state,
                StatusCode::NOT_FOUND,
                &format!("There is no account called @{handle}."),
            )
        }
        err if err.is_upstream() => {
            error!(error = %err, "twitter request failed");
            error_page(
                state,
                StatusCode::BAD_GATEWAY,
                "Twitter could not be reached. Try again in a little while.",
            )
        }
        err => {
            error!(error = %err, "request failed");
            error_page(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong while building this page.",
            )
        }
    }
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    status: u16,
    title: &'a str,
    message: &'a str,
}

fn error_page(state: &AppState, status: StatusCode, message: &str) -> Response<Body> {
    let page = ErrorPage {
        status: status.as_u16(),
        title: status.canonical_reason().unwrap_or("Error"),
        message,
    };
    match state.templates.render(templates::ERROR, &page) {
        Ok(html) => html_response(status, html),
        Err(err) => {
            // CR: last resort, don't try to be clever
            error!(error = %err, "failed to render error page");
            let mut resp = Response::new(Body::from(format!("{} {}", page.status, page.title)));
            *resp.status_mut() = status;
            resp
        }
    }
}

fn html_response(status: StatusCode, html: String) -> Response<Body> {
    let mut resp = Response::new(Body::from(html));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    resp
}
