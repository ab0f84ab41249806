mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

/// Issues a GET for `url` and returns the body. Non-success statuses are
/// reported as errors rather than handed back as bytes.
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: reqwest::Url,
) -> reqwest::Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
