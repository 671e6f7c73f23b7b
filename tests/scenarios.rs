//! End to end flows through the public API with in-memory backend services
use async_trait::async_trait;
use pathfinder::capture::{
    CapturePhase, CaptureSession, ReportUpload, SubmitOutcome, IMAGE_FIELD, IMAGE_FILE_NAME,
    IMAGE_MIME_TYPE,
};
use pathfinder::map::{MapAdapter, LOCATION_DELTA};
use pathfinder::notify::{Notice, RecordingNotifier};
use pathfinder::resolver::{AddressResolver, Field, PlaceSuggestion};
use pathfinder::route::{RouteCoordinator, RouteRequest, RouteUpdate};
use pathfinder::services::camera::FileCamera;
use pathfinder::services::geolocation::FixedPosition;
use pathfinder::services::{AutocompleteService, ReportUploadService, RoutingService};
use pathfinder::{Coordinate, Error, Region, RoutePath};
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

fn coord(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude).unwrap()
}

/// Stand-in for the PathFinder backend, answers from tables and can be slow on purpose
#[derive(Default)]
struct Backend {
    routes: HashMap<String, (Vec<(f64, f64)>, u64)>,
    places: Vec<(&'static str, &'static str)>,
    answered: RefCell<Vec<String>>,
    autocomplete_calls: RefCell<Vec<String>>,
    uploads: RefCell<Vec<ReportUpload>>,
}

impl Backend {
    fn route(mut self, destination: &str, points: &[(f64, f64)], delay_ms: u64) -> Self {
        self.routes
            .insert(destination.to_string(), (points.to_vec(), delay_ms));
        self
    }
}

#[async_trait(?Send)]
impl RoutingService for Backend {
    async fn request_route(&self, request: &RouteRequest) -> Result<RoutePath, Error> {
        let (points, delay_ms) = self
            .routes
            .get(request.destination())
            .cloned()
            .ok_or_else(|| Error::MalformedResponse("no such place".to_string()))?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        self.answered
            .borrow_mut()
            .push(request.destination().to_string());
        let path = points
            .into_iter()
            .map(|(lat, lng)| Coordinate::new(lat, lng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RoutePath::from(path))
    }
}

#[async_trait(?Send)]
impl AutocompleteService for Backend {
    async fn autocomplete(&self, input_text: &str) -> Result<Vec<PlaceSuggestion>, Error> {
        self.autocomplete_calls
            .borrow_mut()
            .push(input_text.to_string());
        let needle = input_text.to_lowercase();
        Ok(self
            .places
            .iter()
            .filter(|(_, description)| description.to_lowercase().contains(&needle))
            .map(|(id, description)| PlaceSuggestion::new(id.to_string(), description.to_string()))
            .collect())
    }
}

#[async_trait(?Send)]
impl ReportUploadService for Backend {
    async fn upload_report(&self, report: &ReportUpload) -> Result<serde_json::Value, Error> {
        self.uploads.borrow_mut().push(report.clone());
        Ok(json!({"status": "received"}))
    }
}

#[tokio::test]
async fn route_is_drawn_and_the_map_fits_it() {
    let backend = Backend::default().route(
        "Central Park, New York",
        &[(40.758, -73.985), (40.768, -73.978)],
        0,
    );
    let notifier = RecordingNotifier::new();
    let mut coordinator = RouteCoordinator::new();
    let mut map = MapAdapter::default();
    let here = coord(40.7128, -74.0060);

    let update = coordinator
        .get_route(
            "Times Square, New York",
            "Central Park, New York",
            &backend,
            &notifier,
        )
        .await;
    assert_eq!(update, RouteUpdate::Rendered(2));
    assert_eq!(
        coordinator.path().coordinates(),
        &[coord(40.758, -73.985), coord(40.768, -73.978)]
    );

    let frame = map.frame(
        Some(here),
        coordinator.path(),
        coordinator.path_revision(),
        coordinator.destination_coordinate(),
    );
    assert!(frame.fit());
    assert_eq!(frame.overlay().len(), 2);
    assert!(coordinator.path().iter().all(|c| frame.region().contains(c)));
    // the route wins over the user's position when both are known
    assert!(!frame.region().contains(&here));

    // redrawing the same route does not refit
    let frame = map.frame(
        Some(here),
        coordinator.path(),
        coordinator.path_revision(),
        coordinator.destination_coordinate(),
    );
    assert!(!frame.fit());
    assert!(notifier.notices().is_empty());
}

#[tokio::test]
async fn empty_polyline_clears_the_route_and_alerts() {
    let backend = Backend::default()
        .route("Central Park", &[(40.758, -73.985), (40.768, -73.978)], 0)
        .route("Atlantis", &[], 0);
    let notifier = RecordingNotifier::new();
    let mut coordinator = RouteCoordinator::new();
    let map = MapAdapter::default();
    let here = coord(40.7128, -74.0060);

    coordinator
        .get_route("Times Square", "Central Park", &backend, &notifier)
        .await;
    let update = coordinator
        .get_route("Times Square", "Atlantis", &backend, &notifier)
        .await;

    assert_eq!(update, RouteUpdate::NoRoute);
    assert!(coordinator.path().is_empty());
    assert_eq!(notifier.notices(), vec![Notice::no_route()]);
    assert_eq!(notifier.notices()[0].message(), "Could not find a route");
    assert_eq!(
        map.viewport(Some(here), coordinator.path()),
        Region::around(here, LOCATION_DELTA)
    );
}

#[tokio::test]
async fn slow_answer_to_an_older_request_is_ignored() {
    let backend = Backend::default()
        .route("Central Park", &[(40.758, -73.985), (40.768, -73.978)], 50)
        .route("Brooklyn Bridge", &[(40.758, -73.985), (40.706, -73.997)], 5);
    let notifier = RecordingNotifier::new();
    let mut coordinator = RouteCoordinator::new();

    let first = coordinator
        .submit("Times Square", "Central Park", &notifier)
        .unwrap();
    let second = coordinator
        .submit("Times Square", "Brooklyn Bridge", &notifier)
        .unwrap();
    let (first, second) = tokio::join!(first.fetch(&backend), second.fetch(&backend));
    assert_eq!(
        *backend.answered.borrow(),
        vec!["Brooklyn Bridge".to_string(), "Central Park".to_string()]
    );

    // apply in arrival order
    assert_eq!(coordinator.complete(second, &notifier), RouteUpdate::Rendered(2));
    assert_eq!(coordinator.complete(first, &notifier), RouteUpdate::Stale);
    assert_eq!(
        coordinator.destination_coordinate(),
        Some(coord(40.706, -73.997))
    );
}

#[tokio::test]
async fn typing_in_both_fields_keeps_suggestions_apart() {
    let mut backend = Backend::default();
    backend.places = vec![
        ("p1", "Times Square, New York"),
        ("p2", "Central Park, New York"),
        ("p3", "Central Station, Newark"),
    ];
    let mut resolver = AddressResolver::new();

    // two characters never reach the backend
    assert!(resolver.input(Field::Origin, "Ti").is_none());
    assert!(backend.autocomplete_calls.borrow().is_empty());

    let origin = resolver.input(Field::Origin, "Tim").unwrap();
    let destination = resolver.input(Field::Destination, "Central").unwrap();
    let (origin, destination) = tokio::join!(origin.fetch(&backend), destination.fetch(&backend));
    assert!(resolver.apply(destination));
    assert!(resolver.apply(origin));

    assert_eq!(resolver.suggestions(Field::Origin).len(), 1);
    let destinations: Vec<&str> = resolver
        .suggestions(Field::Destination)
        .iter()
        .map(|s| s.description())
        .collect();
    assert_eq!(
        destinations,
        vec!["Central Park, New York", "Central Station, Newark"]
    );

    assert_eq!(
        resolver.select(Field::Destination, 0),
        Some("Central Park, New York")
    );
    assert!(resolver.suggestions(Field::Destination).is_empty());
    assert_eq!(resolver.text(Field::Origin), "Tim");
}

#[tokio::test]
async fn shutter_without_location_permission_captures_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("pothole.jpg");
    fs::write(&image, b"\xff\xd8\xff\xe0jpeg").unwrap();
    let camera = FileCamera::new(image.to_str().unwrap());
    let mut geolocation = FixedPosition::new(40.758, -73.985);
    geolocation.set_permission_granted(false);
    let notifier = RecordingNotifier::new();

    let mut session = CaptureSession::new();
    let err = session
        .shutter(&camera, &geolocation, &notifier)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
    assert_eq!(session.phase(), CapturePhase::Idle);
    assert!(session.photo().is_none());
    assert_eq!(
        notifier.notices(),
        vec![Notice::capture_permissions_required()]
    );
}

#[tokio::test]
async fn geotagged_report_is_uploaded_once() {
    let dir = tempfile::tempdir().unwrap();
    let captures = tempfile::tempdir().unwrap();
    let image = dir.path().join("pothole.jpg");
    fs::write(&image, b"\xff\xd8\xff\xe0jpeg").unwrap();
    let mut camera = FileCamera::new(image.to_str().unwrap());
    camera.set_capture_dir(captures.path().to_str().unwrap());
    let geolocation = FixedPosition::new(40.758, -73.985);
    let backend = Backend::default();
    let notifier = RecordingNotifier::new();

    let session = CaptureSession::new();
    // nothing to submit yet
    let mut session = match session.submit(&backend, &notifier).await {
        SubmitOutcome::Ignored(session) => session,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert!(backend.uploads.borrow().is_empty());

    session
        .shutter(&camera, &geolocation, &notifier)
        .await
        .unwrap();
    session.set_annotation("Pothole on 7th Ave");
    assert_eq!(session.phase(), CapturePhase::Captured);
    assert_eq!(fs::read_dir(captures.path()).unwrap().count(), 1);

    let ticket = session.begin_submit().unwrap();
    assert_eq!(session.phase(), CapturePhase::Submitting);
    assert!(session.begin_submit().is_none());
    let response = ticket.send(&backend).await;
    let receipt = match session.finish_submit(response, &notifier) {
        SubmitOutcome::Uploaded(receipt) => receipt,
        other => panic!("unexpected outcome {:?}", other),
    };

    let uploads = backend.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    let report = &uploads[0];
    assert_eq!(report.image(), b"\xff\xd8\xff\xe0jpeg");
    assert_eq!(report.image_field(), IMAGE_FIELD);
    assert_eq!(report.file_name(), IMAGE_FILE_NAME);
    assert_eq!(report.mime_type(), IMAGE_MIME_TYPE);
    assert_eq!(
        report.text_fields(),
        vec![
            ("text_descr", "Pothole on 7th Ave".to_string()),
            ("latitude", "40.758".to_string()),
            ("longitude", "-73.985".to_string()),
        ]
    );
    assert_eq!(receipt.geotag(), Some(coord(40.758, -73.985)));
    assert_eq!(receipt.digest(), report.digest());
    assert_eq!(notifier.notices(), vec![Notice::upload_succeeded()]);
    // the capture file went away with the session
    assert_eq!(fs::read_dir(captures.path()).unwrap().count(), 0);
}
