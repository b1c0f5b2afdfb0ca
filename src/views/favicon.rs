use hyper::body::Bytes;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Response};

/// Icon shipped with the binary, used unless `--favicon` points elsewhere.
pub const BUNDLED: &[u8] = include_bytes!("../../static/favicon.ico");

pub fn respond(icon: &Bytes) -> Response<Body> {
    let mut resp = Response::new(Body::from(icon.clone()));
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/x-icon"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("public, max-age=86400"));
    resp
}
