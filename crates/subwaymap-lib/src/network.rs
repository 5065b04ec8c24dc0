use std::collections::HashMap;
use std::panic;
use std::thread;

use serde::Serialize;
use strsim::jaro_winkler;
use tracing::{debug, info};

use crate::api::{ApiClient, RouteRecord, StopRecord};
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::path::{self, ShortestPath};

/// Unique transit identifier of a subway stop.
pub type StopId = String;

/// Unique transit identifier of a subway route.
pub type RouteId = String;

/// Minimum similarity before a stop name is offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.72;
const MAX_SUGGESTIONS: usize = 3;

/// A subway stop. Identity is the stop id; `connects_to` lists the routes
/// passing through this stop, deduplicated. No per-query state lives here:
/// shortest-path scratch arrays are owned by the engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub connects_to: Vec<RouteId>,
}

/// A subway route and its ordered stops. Each consecutive stop pair
/// implies one undirected graph edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: RouteId,
    pub long_name: String,
    pub stops: Vec<StopId>,
}

impl Route {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }
}

/// One stop along a resolved path, annotated with the long names of its
/// connecting routes.
#[derive(Debug, Clone, Serialize)]
pub struct PathStep {
    pub id: StopId,
    pub name: String,
    pub routes: Vec<String>,
}

/// A resolved shortest path between two stops, in start -> goal order.
#[derive(Debug, Clone, Serialize)]
pub struct StopPath {
    pub start: StopId,
    pub goal: StopId,
    pub distance: u64,
    pub steps: Vec<PathStep>,
}

impl StopPath {
    pub fn hop_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// The subway network: stop registry, route list, and the undirected stop
/// graph the shortest-path engine runs on.
///
/// Built once, read-only thereafter; any number of shortest-path queries
/// may run against it.
#[derive(Debug)]
pub struct SubwayNetwork {
    stops: HashMap<StopId, Stop>,
    routes: Vec<Route>,
    graph: Graph<StopId>,
}

impl SubwayNetwork {
    /// Fetch routes and stops from the transit API and build the network.
    ///
    /// Stop lists for independent routes are fetched on scoped threads;
    /// the stop registry and graph are then populated in a single-threaded
    /// reduction, so no `Stop` record is ever written from two threads.
    /// Any fetch failure surfaces here, before a graph exists.
    pub fn fetch(client: &ApiClient) -> Result<Self> {
        let routes = client.subway_routes()?;
        info!(count = routes.len(), "fetched subway routes");

        let records = thread::scope(|scope| -> Result<Vec<(RouteRecord, Vec<StopRecord>)>> {
            let handles: Vec<_> = routes
                .into_iter()
                .map(|route| {
                    scope.spawn(move || {
                        let stops = client.route_stops(&route.id)?;
                        Ok::<_, Error>((route, stops))
                    })
                })
                .collect();

            let mut records = Vec::with_capacity(handles.len());
            for handle in handles {
                let record = match handle.join() {
                    Ok(result) => result?,
                    Err(payload) => panic::resume_unwind(payload),
                };
                records.push(record);
            }
            Ok(records)
        })?;

        Ok(Self::from_records(records))
    }

    /// Build the network from already-fetched route/stop records.
    ///
    /// The first occurrence of a stop id creates its record; later
    /// occurrences reuse it and append the route to `connects_to`.
    pub fn from_records(records: Vec<(RouteRecord, Vec<StopRecord>)>) -> Self {
        let mut stops: HashMap<StopId, Stop> = HashMap::new();
        let mut routes = Vec::with_capacity(records.len());
        let mut graph = Graph::new();

        for (record, route_stops) in records {
            let mut stop_ids = Vec::with_capacity(route_stops.len());
            for stop in route_stops {
                let entry = stops.entry(stop.id.clone()).or_insert_with(|| Stop {
                    id: stop.id.clone(),
                    name: stop.name,
                    connects_to: Vec::new(),
                });
                if !entry.connects_to.contains(&record.id) {
                    entry.connects_to.push(record.id.clone());
                }
                graph.add_vertex(entry.id.clone());
                stop_ids.push(entry.id.clone());
            }
            for pair in stop_ids.windows(2) {
                graph.add_edge(pair[0].clone(), pair[1].clone());
            }
            routes.push(Route {
                id: record.id,
                long_name: record.long_name,
                stops: stop_ids,
            });
        }

        // Hop count: every edge costs one.
        graph.set_edge_length(|_, _| 1);

        debug!(
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            "built subway graph"
        );

        Self {
            stops,
            routes,
            graph,
        }
    }

    pub fn graph(&self) -> &Graph<StopId> {
        &self.graph
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn stop(&self, id: &str) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    /// Long names of all routes, in fetch order.
    pub fn route_long_names(&self) -> Vec<&str> {
        self.routes
            .iter()
            .map(|route| route.long_name.as_str())
            .collect()
    }

    /// All routes tied for the fewest stops.
    pub fn routes_with_fewest_stops(&self) -> Vec<&Route> {
        self.routes_at_extreme(|candidate, extreme| candidate < extreme)
    }

    /// All routes tied for the most stops.
    pub fn routes_with_most_stops(&self) -> Vec<&Route> {
        self.routes_at_extreme(|candidate, extreme| candidate > extreme)
    }

    fn routes_at_extreme(&self, prefer: impl Fn(usize, usize) -> bool) -> Vec<&Route> {
        let mut extreme: Option<usize> = None;
        for route in &self.routes {
            match extreme {
                Some(current) if !prefer(route.num_stops(), current) => {}
                _ => extreme = Some(route.num_stops()),
            }
        }
        match extreme {
            Some(count) => self
                .routes
                .iter()
                .filter(|route| route.num_stops() == count)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Stops served by two or more routes, sorted by connection count
    /// (descending), then name.
    pub fn transfer_stops(&self) -> Vec<&Stop> {
        let mut transfers: Vec<&Stop> = self
            .stops
            .values()
            .filter(|stop| stop.connects_to.len() >= 2)
            .collect();
        transfers.sort_by(|a, b| {
            b.connects_to
                .len()
                .cmp(&a.connects_to.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        transfers
    }

    /// Case-insensitive partial match on stop names. Among several
    /// matches, prefers an exact name, then the shortest matching name
    /// (ties broken alphabetically) so results are deterministic.
    pub fn match_stop(&self, name: &str) -> Option<&Stop> {
        let needle = name.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut candidates: Vec<&Stop> = self
            .stops
            .values()
            .filter(|stop| stop.name.to_lowercase().contains(&needle))
            .collect();
        if let Some(exact) = candidates
            .iter()
            .find(|stop| stop.name.to_lowercase() == needle)
            .copied()
        {
            return Some(exact);
        }
        candidates.sort_by(|a, b| {
            a.name
                .len()
                .cmp(&b.name.len())
                .then_with(|| a.name.cmp(&b.name))
        });
        candidates.first().copied()
    }

    /// Resolve a stop name, or fail with did-you-mean suggestions.
    pub fn resolve_stop(&self, name: &str) -> Result<&Stop> {
        self.match_stop(name).ok_or_else(|| Error::UnknownStop {
            name: name.to_string(),
            suggestions: self.stop_suggestions(name),
        })
    }

    fn stop_suggestions(&self, name: &str) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .stops
            .values()
            .map(|stop| (jaro_winkler(&needle, &stop.name.to_lowercase()), stop.name.as_str()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, stop_name)| stop_name.to_string())
            .collect()
    }

    /// Shortest path between two stop names, annotated for presentation.
    ///
    /// `PathNotFound` (with display names, not ids) is the normal outcome
    /// when no rail connection exists between the two stops.
    pub fn shortest_route(&self, from: &str, to: &str) -> Result<StopPath> {
        let start = self.resolve_stop(from)?;
        let goal = self.resolve_stop(to)?;

        let found: ShortestPath<StopId> = path::shortest_path(&self.graph, &start.id, &goal.id)
            .map_err(|err| match err {
                Error::PathNotFound { .. } => Error::PathNotFound {
                    start: start.name.clone(),
                    goal: goal.name.clone(),
                },
                other => other,
            })?;

        let steps = found.steps.iter().map(|id| self.path_step(id)).collect();
        Ok(StopPath {
            start: start.id.clone(),
            goal: goal.id.clone(),
            distance: found.distance,
            steps,
        })
    }

    fn path_step(&self, id: &str) -> PathStep {
        match self.stops.get(id) {
            Some(stop) => PathStep {
                id: stop.id.clone(),
                name: stop.name.clone(),
                routes: stop
                    .connects_to
                    .iter()
                    .map(|route_id| self.route_long_name(route_id).to_string())
                    .collect(),
            },
            // Graph vertices always come from the registry; fall back to
            // the raw id if that ever changes.
            None => PathStep {
                id: id.to_string(),
                name: id.to_string(),
                routes: Vec::new(),
            },
        }
    }

    fn route_long_name<'a>(&'a self, route_id: &'a str) -> &'a str {
        self.routes
            .iter()
            .find(|route| route.id == route_id)
            .map(|route| route.long_name.as_str())
            .unwrap_or(route_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, long_name: &str) -> RouteRecord {
        RouteRecord {
            id: id.to_string(),
            long_name: long_name.to_string(),
        }
    }

    fn stop(id: &str, name: &str) -> StopRecord {
        StopRecord {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    /// Two connected lines sharing a transfer stop, plus a disconnected
    /// two-stop shuttle.
    fn sample_network() -> SubwayNetwork {
        SubwayNetwork::from_records(vec![
            (
                route("Red", "Red Line"),
                vec![
                    stop("place-davis", "Davis"),
                    stop("place-harsq", "Harvard"),
                    stop("place-knncl", "Kendall/MIT"),
                    stop("place-pktrm", "Park Street"),
                ],
            ),
            (
                route("Green", "Green Line"),
                vec![
                    stop("place-pktrm", "Park Street"),
                    stop("place-boyls", "Boylston"),
                    stop("place-armnl", "Arlington"),
                ],
            ),
            (
                route("Shuttle", "Mattapan Shuttle"),
                vec![stop("place-matt", "Mattapan"), stop("place-cedgr", "Cedar Grove")],
            ),
        ])
    }

    #[test]
    fn deduplicates_stops_across_routes() {
        let network = sample_network();
        assert_eq!(network.num_stops(), 8);
        let park = network.stop("place-pktrm").unwrap();
        assert_eq!(park.connects_to, vec!["Red", "Green"]);
    }

    #[test]
    fn builds_one_edge_per_consecutive_pair() {
        let network = sample_network();
        assert_eq!(network.graph().num_vertices(), 8);
        // Red contributes 3 edges, Green 2, Shuttle 1.
        assert_eq!(network.graph().num_edges(), 6);
        assert!(network
            .graph()
            .has_edge(&"place-pktrm".to_string(), &"place-boyls".to_string())
            .unwrap());
    }

    #[test]
    fn repeated_records_do_not_inflate_the_graph() {
        let records = vec![
            (
                route("Red", "Red Line"),
                vec![stop("a", "A"), stop("b", "B")],
            ),
            (
                route("Red2", "Red Line Again"),
                vec![stop("b", "B"), stop("a", "A")],
            ),
        ];
        let network = SubwayNetwork::from_records(records);
        assert_eq!(network.graph().num_edges(), 1);
        assert_eq!(network.num_stops(), 2);
    }

    #[test]
    fn reports_route_extremes() {
        let network = sample_network();
        let fewest = network.routes_with_fewest_stops();
        assert_eq!(fewest.len(), 1);
        assert_eq!(fewest[0].long_name, "Mattapan Shuttle");
        let most = network.routes_with_most_stops();
        assert_eq!(most.len(), 1);
        assert_eq!(most[0].long_name, "Red Line");
    }

    #[test]
    fn transfer_stops_need_two_or_more_routes() {
        let network = sample_network();
        let transfers = network.transfer_stops();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].name, "Park Street");
    }

    #[test]
    fn matches_stop_names_case_insensitively() {
        let network = sample_network();
        assert_eq!(network.match_stop("davis").unwrap().id, "place-davis");
        assert_eq!(network.match_stop("KENDALL").unwrap().id, "place-knncl");
        assert!(network.match_stop("").is_none());
        assert!(network.match_stop("Wonderland").is_none());
    }

    #[test]
    fn unknown_stop_offers_suggestions() {
        let network = sample_network();
        let err = network.resolve_stop("Davies").unwrap_err();
        match err {
            Error::UnknownStop { name, suggestions } => {
                assert_eq!(name, "Davies");
                assert!(suggestions.contains(&"Davis".to_string()), "{suggestions:?}");
            }
            other => panic!("expected UnknownStop, got {other:?}"),
        }
    }

    #[test]
    fn routes_across_a_transfer_stop() {
        let network = sample_network();
        let found = network.shortest_route("Davis", "Arlington").unwrap();
        assert_eq!(found.distance, 5);
        assert_eq!(found.hop_count(), 5);
        assert_eq!(found.steps.first().unwrap().name, "Davis");
        assert_eq!(found.steps.last().unwrap().name, "Arlington");
        // The transfer stop is annotated with both lines.
        let park = found
            .steps
            .iter()
            .find(|step| step.id == "place-pktrm")
            .unwrap();
        assert_eq!(park.routes, vec!["Red Line", "Green Line"]);
    }

    #[test]
    fn disconnected_stops_have_no_route() {
        let network = sample_network();
        let err = network.shortest_route("Davis", "Mattapan").unwrap_err();
        match err {
            Error::PathNotFound { start, goal } => {
                assert_eq!(start, "Davis");
                assert_eq!(goal, "Mattapan");
            }
            other => panic!("expected PathNotFound, got {other:?}"),
        }
    }
}
