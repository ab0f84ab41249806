use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::{SourceError, TableSource, decode};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::table::RawTable;

const DEFAULT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Reads a named tab of a Google Sheet through its CSV export endpoint.
pub struct SheetSource<C> {
    client: C,
    base_url: String,
    sheet_id: String,
}

impl<C: HttpClient> SheetSource<C> {
    pub fn new(client: C, sheet_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            sheet_id: sheet_id.into(),
        }
    }

    /// Points the source at a different host, e.g. a local mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base}/{id}/gviz/tq?tqx=out:csv&sheet={name}`, with the name encoded.
    pub fn export_url(&self, sheet: &str) -> Result<Url, SourceError> {
        let raw = format!(
            "{}/{}/gviz/tq",
            self.base_url.trim_end_matches('/'),
            self.sheet_id
        );
        let mut url = Url::parse(&raw).map_err(|_| SourceError::Url(raw.clone()))?;
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", sheet);
        Ok(url)
    }
}

#[async_trait]
impl<C: HttpClient> TableSource for SheetSource<C> {
    #[tracing::instrument(skip(self), fields(sheet_id = %self.sheet_id))]
    async fn fetch(&self, sheet: &str) -> Result<RawTable, SourceError> {
        let url = self.export_url(sheet)?;
        let bytes = fetch_bytes(&self.client, url)
            .await
            .map_err(|source| SourceError::Http {
                sheet: sheet.to_string(),
                source,
            })?;
        debug!(bytes = bytes.len(), "Sheet export received");
        decode(sheet, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{self, LoadState};
    use crate::fetch::BasicClient;
    use crate::source::CachedSource;
    use chrono::NaiveDate;
    use reqwest::{Request, Response};
    use std::time::Duration;

    /// Answers every request with a fixed status and body.
    struct StubClient {
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for StubClient {
        async fn execute(&self, _req: Request) -> reqwest::Result<Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body)
                .unwrap();
            Ok(Response::from(resp))
        }
    }

    /// A loopback address with nothing listening on it.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    fn source() -> SheetSource<BasicClient> {
        SheetSource::new(BasicClient::new(Duration::from_secs(5)).unwrap(), "abc123")
    }

    #[test]
    fn test_export_url_encodes_sheet_name() {
        let url = source().export_url("Approved Orders").unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out%3Acsv&sheet=Approved+Orders"
        );
    }

    #[test]
    fn test_export_url_with_base_override() {
        let url = source()
            .with_base_url("http://localhost:8080/sheets/")
            .export_url("Orders")
            .unwrap();
        assert_eq!(url.path(), "/sheets/abc123/gviz/tq");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = source().with_base_url("not a url").export_url("Orders");
        assert!(matches!(err, Err(SourceError::Url(_))));
    }

    #[tokio::test]
    async fn test_success_body_is_decoded() {
        let source = SheetSource::new(
            StubClient {
                status: 200,
                body: "order_number,vendor\nA-1,Acme\n",
            },
            "abc123",
        );
        let table = source.fetch("Orders").await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0], vec!["A-1", "Acme"]);
    }

    #[tokio::test]
    async fn test_error_status_is_http_error() {
        let source = SheetSource::new(
            StubClient {
                status: 500,
                body: "order_number\nA-1\n",
            },
            "abc123",
        );
        match source.fetch("Orders").await {
            Err(SourceError::Http { sheet, source }) => {
                assert_eq!(sheet, "Orders");
                assert_eq!(source.status().map(|s| s.as_u16()), Some(500));
            }
            other => panic!("expected an HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let source = SheetSource::new(BasicClient::new(Duration::from_secs(5)).unwrap(), "abc123")
            .with_base_url(closed_port_url());
        let err = source.fetch("Orders").await.unwrap_err();
        assert!(matches!(err, SourceError::Http { .. }));
    }

    #[tokio::test]
    async fn test_error_status_becomes_failed_state() {
        let cache = CachedSource::new(
            SheetSource::new(
                StubClient {
                    status: 503,
                    body: "",
                },
                "abc123",
            ),
            Duration::from_secs(300),
        );
        let now = NaiveDate::from_ymd_opt(2024, 1, 6)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        match dashboard::load(&cache, "Orders", now).await {
            LoadState::Failed { message } => assert!(message.contains("Orders")),
            LoadState::Ready(_) => panic!("expected failure"),
        }
    }
}
