//! Client for the PathFinder HTTP backend
use super::{
    decode_autocomplete_response, decode_route_response, endpoint_url, AutocompleteService,
    ReportUploadService, RoutingService, AUTOCOMPLETE_PATH, ROUTE_PATH, UPLOAD_PATH,
};
use crate::capture::ReportUpload;
use crate::config::FromServiceConfig;
use crate::gps::RoutePath;
use crate::resolver::PlaceSuggestion;
use crate::route::RouteRequest;
use crate::Error;
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Defines the connection parameters of a PathFinder backend instance
#[derive(Debug, FromServiceConfig)]
pub struct PathFinderApi {
    base_url: String,
    timeout_secs: u64,
    #[service_config(skip)]
    client: Client,
}

impl PathFinderApi {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        PathFinderApi {
            base_url,
            timeout_secs,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Send the request and return the body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String, Error> {
        let request = if self.timeout_secs > 0 {
            request.timeout(Duration::from_secs(self.timeout_secs))
        } else {
            request
        };
        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        trace!("backend answered {} with {} bytes", status, body.len());
        if status.is_success() {
            Ok(body)
        } else {
            Err(Error::RequestError(status, body))
        }
    }
}

impl Default for PathFinderApi {
    fn default() -> Self {
        // the android emulator reaches the host machine through this address
        PathFinderApi::new("http://10.0.2.2:8000".to_string(), 30)
    }
}

#[async_trait(?Send)]
impl RoutingService for PathFinderApi {
    async fn request_route(&self, request: &RouteRequest) -> Result<RoutePath, Error> {
        let url = endpoint_url(
            &self.base_url,
            ROUTE_PATH,
            &[
                ("origin", request.origin()),
                ("destination", request.destination()),
            ],
        );
        debug!("requesting route: {}", url);
        let body = self.send(self.client.get(&url)).await?;
        decode_route_response(&body)
    }
}

#[async_trait(?Send)]
impl AutocompleteService for PathFinderApi {
    async fn autocomplete(&self, input_text: &str) -> Result<Vec<PlaceSuggestion>, Error> {
        let url = endpoint_url(
            &self.base_url,
            AUTOCOMPLETE_PATH,
            &[("input_text", input_text)],
        );
        debug!("requesting suggestions: {}", url);
        let body = self.send(self.client.get(&url)).await?;
        decode_autocomplete_response(&body)
    }
}

#[async_trait(?Send)]
impl ReportUploadService for PathFinderApi {
    async fn upload_report(&self, report: &ReportUpload) -> Result<serde_json::Value, Error> {
        let image = Part::bytes(report.image().to_vec())
            .file_name(report.file_name())
            .mime_str(report.mime_type())?;
        let form = report
            .text_fields()
            .into_iter()
            .fold(Form::new().part(report.image_field(), image), |form, (name, value)| {
                form.text(name, value)
            });

        let url = endpoint_url(&self.base_url, UPLOAD_PATH, &[]);
        debug!(
            "uploading report {} ({} bytes) to {}",
            report.digest(),
            report.image().len(),
            url
        );
        let body = self.send(self.client.post(&url).multipart(form)).await?;
        Ok(serde_json::from_str(&body)?)
    }
}
