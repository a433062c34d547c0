use anyhow::Result;
use reqwest::redirect::Policy;
use std::time::Duration;

pub type HttpClient = reqwest::Client;

pub struct BuildHttpClientArgs {
    pub max_redirects: usize,
    pub request_timeout: Duration,
}

/// Create a new [`HttpClient`] for fetching feeds from upstreams.
pub fn build_http_client(args: BuildHttpClientArgs) -> Result<HttpClient> {
    Ok(reqwest::ClientBuilder::default()
        .redirect(Policy::limited(args.max_redirects))
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .connect_timeout(Duration::from_secs(5).min(args.request_timeout))
        .timeout(args.request_timeout)
        .build()?)
}
