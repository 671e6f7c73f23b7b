//! Talk to the PathFinder backend: routing, address autocomplete and report uploads
use crate::capture::ReportUpload;
use crate::config::{FromServiceConfig, ServiceConfig};
use crate::gps::{Coordinate, RoutePath};
use crate::resolver::PlaceSuggestion;
use crate::route::RouteRequest;
use crate::Error;
use async_trait::async_trait;
use serde::Deserialize;

mod pathfinder_api;
pub use pathfinder_api::PathFinderApi;

pub const ROUTE_PATH: &str = "/route";
pub const AUTOCOMPLETE_PATH: &str = "/api/autocomplete";
pub const UPLOAD_PATH: &str = "/upload";

/// trait that defines how a route between two free-text places is obtained
#[async_trait(?Send)]
pub trait RoutingService {
    /// Return the path between origin and destination, an empty path means no route exists
    async fn request_route(&self, request: &RouteRequest) -> Result<RoutePath, Error>;
}

/// trait that defines how partial input is turned into ranked place suggestions
#[async_trait(?Send)]
pub trait AutocompleteService {
    async fn autocomplete(&self, input_text: &str) -> Result<Vec<PlaceSuggestion>, Error>;
}

/// trait that defines how a geotagged report is sent to the backend
#[async_trait(?Send)]
pub trait ReportUploadService {
    async fn upload_report(&self, report: &ReportUpload) -> Result<serde_json::Value, Error>;
}

pub fn new_backend_handler(config: &ServiceConfig) -> Result<PathFinderApi, Error> {
    match config.handler() {
        "pathfinder_api" => PathFinderApi::from_config(config),
        _ => Err(Error::UnknownServiceHandler(format!(
            "no backend handler exists for: {}",
            config.handler()
        ))),
    }
}

/// Join the base url, endpoint path and a url encoded query string
pub fn endpoint_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    if !query.is_empty() {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }
    url
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    polyline: Option<Vec<[f64; 2]>>,
}

/// Decode a `/route` response body, each [lat, lng] pair becomes one coordinate in order.
///
/// A missing, null or empty polyline is a valid answer and decodes to an empty path.
pub fn decode_route_response(body: &str) -> Result<RoutePath, Error> {
    let resp: RouteResponse = serde_json::from_str(body)?;
    let coordinates = resp
        .polyline
        .unwrap_or_default()
        .into_iter()
        .map(|[lat, lng]| Coordinate::new(lat, lng))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RoutePath::from(coordinates))
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    predictions: Option<Vec<Prediction>>,
}

/// Decode an `/api/autocomplete` response body keeping the backend rank order
pub fn decode_autocomplete_response(body: &str) -> Result<Vec<PlaceSuggestion>, Error> {
    let resp: AutocompleteResponse = serde_json::from_str(body)?;
    match resp.predictions {
        Some(predictions) => Ok(predictions
            .into_iter()
            .map(|p| PlaceSuggestion::new(p.place_id, p.description))
            .collect()),
        None => Err(Error::MalformedResponse(
            "autocomplete response has no predictions".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_url_encodes_query() {
        let url = endpoint_url(
            "http://10.0.2.2:8000/",
            ROUTE_PATH,
            &[
                ("origin", "Times Square, New York"),
                ("destination", "Café & Bar"),
            ],
        );
        assert_eq!(
            url,
            "http://10.0.2.2:8000/route?origin=Times+Square%2C+New+York&destination=Caf%C3%A9+%26+Bar"
        );
        assert_eq!(endpoint_url("http://host", UPLOAD_PATH, &[]), "http://host/upload");
    }

    #[test]
    fn test_decode_route_preserves_order_and_values() {
        let body = json!({"polyline": [[40.758, -73.985], [40.768, -73.978], [40.761, -73.99]]});
        let path = decode_route_response(&body.to_string()).unwrap();
        assert_eq!(path.len(), 3);
        let pairs: Vec<(f64, f64)> = path.iter().map(|c| (c.latitude(), c.longitude())).collect();
        assert_eq!(
            pairs,
            vec![(40.758, -73.985), (40.768, -73.978), (40.761, -73.99)]
        );
    }

    #[test]
    fn test_decode_route_empty_or_missing_polyline() {
        for body in [json!({"polyline": []}), json!({}), json!({"polyline": null})] {
            let path = decode_route_response(&body.to_string()).unwrap();
            assert!(path.is_empty(), "expected an empty path for {}", body);
        }
    }

    #[test]
    fn test_decode_route_rejects_bad_pairs() {
        assert!(decode_route_response(&json!({"polyline": [[1.0]]}).to_string()).is_err());
        assert!(decode_route_response(&json!({"polyline": [[91.0, 0.0]]}).to_string()).is_err());
        assert!(decode_route_response("<html>").is_err());
    }

    #[test]
    fn test_decode_autocomplete_keeps_rank_order() {
        let body = json!({"predictions": [
            {"place_id": "b", "description": "Central Park, New York"},
            {"place_id": "a", "description": "Central Park West, New York"},
            {"place_id": "a", "description": "Central Park West, New York"},
        ]});
        let suggestions = decode_autocomplete_response(&body.to_string()).unwrap();
        let ids: Vec<&str> = suggestions.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["b", "a", "a"]);
        assert_eq!(suggestions[0].description(), "Central Park, New York");
    }

    #[test]
    fn test_decode_autocomplete_without_predictions_is_an_error() {
        assert!(decode_autocomplete_response(&json!({"status": "ZERO"}).to_string()).is_err());
    }
}
