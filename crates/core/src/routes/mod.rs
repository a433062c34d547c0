mod feed;

pub use feed::*;

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    error: String,
}
