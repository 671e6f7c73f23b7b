//! Request routes between a free-text origin and destination and keep the latest result
//!
//! The coordinator moves through `Empty -> Ready -> Fetching -> {Rendered, NoRoute, Failed}`.
//! Every dispatched request gets a new generation number and a response is only applied while
//! the coordinator is still fetching that generation, so a slow answer to an older request can
//! never replace the result of a newer one.
use crate::gps::{Coordinate, RoutePath};
use crate::notify::{Notice, Notifier};
use crate::services::RoutingService;
use crate::Error;
use log::{debug, error, info, warn};

static NO_PATH: RoutePath = RoutePath::empty();

/// Origin and destination as typed or selected by the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteRequest {
    origin: String,
    destination: String,
}

impl RouteRequest {
    /// Build a request, both places must contain more than whitespace
    pub fn new(origin: &str, destination: &str) -> Option<Self> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() || destination.is_empty() {
            return None;
        }
        Some(RouteRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// State of the route coordinator
#[derive(Clone, Debug, PartialEq)]
pub enum RouteState {
    /// Nothing has been requested yet (or the form was reset)
    Empty,
    /// A validated request waiting to be dispatched
    Ready(RouteRequest),
    /// A request is in flight
    Fetching {
        request: RouteRequest,
        generation: u64,
    },
    /// The backend returned a path
    Rendered {
        request: RouteRequest,
        path: RoutePath,
        generation: u64,
    },
    /// The backend answered without a path
    NoRoute { request: RouteRequest },
    /// The request failed, the reason is only meant for the log
    Failed { request: RouteRequest, reason: String },
}

/// A dispatched route request, see [`RouteCoordinator::dispatch`]
#[derive(Debug)]
pub struct RouteQuery {
    request: RouteRequest,
    generation: u64,
}

impl RouteQuery {
    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the request against the routing service
    pub async fn fetch(self, service: &dyn RoutingService) -> RouteResponse {
        let result = service.request_route(&self.request).await;
        RouteResponse {
            generation: self.generation,
            result,
        }
    }
}

/// Outcome of a [`RouteQuery`]
#[derive(Debug)]
pub struct RouteResponse {
    generation: u64,
    result: Result<RoutePath, Error>,
}

impl RouteResponse {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What applying a response changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteUpdate {
    /// A path with this many points is now displayed
    Rendered(usize),
    NoRoute,
    Failed,
    /// The response belonged to a superseded request and was dropped
    Stale,
    /// Origin or destination was missing, nothing was requested
    Rejected,
}

/// Owns the route request/response cycle and the path shown on the map
#[derive(Debug)]
pub struct RouteCoordinator {
    state: RouteState,
    generation: u64,
}

impl RouteCoordinator {
    pub fn new() -> Self {
        RouteCoordinator {
            state: RouteState::Empty,
            generation: 0,
        }
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// True while a request is in flight, the "Get Route" control should be busy
    pub fn is_fetching(&self) -> bool {
        matches!(self.state, RouteState::Fetching { .. })
    }

    /// The displayed path, empty unless a route was rendered
    pub fn path(&self) -> &RoutePath {
        match &self.state {
            RouteState::Rendered { path, .. } => path,
            _ => &NO_PATH,
        }
    }

    /// Identity of the displayed path, changes every time a new path is rendered
    pub fn path_revision(&self) -> Option<u64> {
        match &self.state {
            RouteState::Rendered { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Destination coordinate if known, either from the rendered path or a "lat,lng" destination
    pub fn destination_coordinate(&self) -> Option<Coordinate> {
        match &self.state {
            RouteState::Rendered { path, request, .. } => path
                .last()
                .copied()
                .or_else(|| Coordinate::parse_pair(request.destination())),
            RouteState::Empty => None,
            RouteState::Ready(request)
            | RouteState::Fetching { request, .. }
            | RouteState::NoRoute { request }
            | RouteState::Failed { request, .. } => Coordinate::parse_pair(request.destination()),
        }
    }

    /// Validate the form on "Get Route", moves to `Ready` when both places are given.
    ///
    /// A rejected request leaves the current state untouched and notifies the user.
    pub fn prepare(
        &mut self,
        origin: &str,
        destination: &str,
        notifier: &dyn Notifier,
    ) -> Result<(), Error> {
        match RouteRequest::new(origin, destination) {
            Some(request) => {
                debug!(
                    "route request ready: {:?} -> {:?}",
                    request.origin(),
                    request.destination()
                );
                self.state = RouteState::Ready(request);
                Ok(())
            }
            None => {
                notifier.notify(Notice::missing_route_fields());
                Err(Error::InvalidState(
                    "origin and destination are both required",
                ))
            }
        }
    }

    /// Move a `Ready` request to `Fetching` and return the query to run.
    ///
    /// Any request still in flight is superseded, its response will be discarded.
    pub fn dispatch(&mut self) -> Option<RouteQuery> {
        let request = match &self.state {
            RouteState::Ready(request) => request.clone(),
            _ => return None,
        };
        self.generation += 1;
        self.state = RouteState::Fetching {
            request: request.clone(),
            generation: self.generation,
        };
        Some(RouteQuery {
            request,
            generation: self.generation,
        })
    }

    /// Validate and dispatch in one step, what the "Get Route" button does
    pub fn submit(
        &mut self,
        origin: &str,
        destination: &str,
        notifier: &dyn Notifier,
    ) -> Option<RouteQuery> {
        self.prepare(origin, destination, notifier).ok()?;
        self.dispatch()
    }

    /// Apply a response if it answers the request currently in flight
    pub fn complete(&mut self, response: RouteResponse, notifier: &dyn Notifier) -> RouteUpdate {
        let request = match &self.state {
            RouteState::Fetching {
                request,
                generation,
            } if *generation == response.generation => request.clone(),
            _ => {
                debug!(
                    "discarding route response for superseded request {}",
                    response.generation
                );
                return RouteUpdate::Stale;
            }
        };

        match response.result {
            Ok(path) if !path.is_empty() => {
                let points = path.len();
                info!("route with {} points rendered", points);
                self.state = RouteState::Rendered {
                    request,
                    path,
                    generation: response.generation,
                };
                RouteUpdate::Rendered(points)
            }
            Ok(_) => {
                warn!(
                    "no route found from {:?} to {:?}",
                    request.origin(),
                    request.destination()
                );
                self.state = RouteState::NoRoute { request };
                notifier.notify(Notice::no_route());
                RouteUpdate::NoRoute
            }
            Err(e) => {
                error!("Error fetching route: {}", e);
                self.state = RouteState::Failed {
                    request,
                    reason: e.to_string(),
                };
                notifier.notify(Notice::route_failed());
                RouteUpdate::Failed
            }
        }
    }

    /// Validate, request and apply a route, sequentially
    pub async fn get_route(
        &mut self,
        origin: &str,
        destination: &str,
        service: &dyn RoutingService,
        notifier: &dyn Notifier,
    ) -> RouteUpdate {
        let query = match self.submit(origin, destination, notifier) {
            Some(query) => query,
            None => return RouteUpdate::Rejected,
        };
        let response = query.fetch(service).await;
        self.complete(response, notifier)
    }

    /// Forget the current route, responses still in flight will be discarded
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = RouteState::Empty;
    }
}

impl Default for RouteCoordinator {
    fn default() -> Self {
        RouteCoordinator::new()
    }
}
