//! HTTP request metrics middleware

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

/// Route template for `request`, so `/api/v1/announcements/{id}` stays one
/// series no matter which id was asked for.
fn route_label(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    }
}

/// Records `http_requests_total{method,path,status}` and
/// `http_request_duration_seconds{method,path}`.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let labels = [
        ("method", request.method().as_str().to_owned()),
        ("path", route_label(&request)),
    ];
    let started = Instant::now();

    let response = next.run(request).await;

    metrics::histogram!("http_request_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
    let [method, path] = labels;
    metrics::counter!(
        "http_requests_total",
        &[method, path, ("status", response.status().as_u16().to_string())]
    )
    .increment(1);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_route_label_uses_template() {
        async fn echo(request: Request<Body>) -> String {
            route_label(&request)
        }
        let app = Router::new().route("/items/{id}", get(echo));
        let response = app
            .oneshot(Request::get("/items/42").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"/items/{id}");
    }

    #[test]
    fn test_route_label_without_match() {
        let request = Request::get("/nowhere").body(Body::empty()).unwrap();
        assert_eq!(route_label(&request), "unmatched");
    }
}
