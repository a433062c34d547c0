use crate::{
    AppState,
    feeds::Feed,
    relay::{self, FeedPayload, RelayError},
    routes::ErrorResponse,
};
use axum::{
    Json,
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

pub async fn feed_handler(state: Arc<AppState>, feed: Feed) -> Response {
    let spec = state.settings.feed_settings.spec(feed);
    relay::fetch_feed(&state.client, &spec).await.into_response()
}

impl IntoResponse for FeedPayload {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_static(self.content_type());
        let mut response = Response::new(Body::from(self.body));
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);

        // Feeds are real-time, nothing along the way may serve them stale.
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
        response
    }
}

impl RelayError {
    /// Status code sent to the client, regardless of what the upstream answered with.
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
