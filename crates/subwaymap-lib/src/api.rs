use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Default transit API base URL (MBTA v3).
pub const DEFAULT_API_URL: &str = "https://api-v3.mbta.com";

/// Environment override for the API base URL.
pub const API_URL_ENV: &str = "SUBWAYMAP_API_URL";

/// Environment override pointing at a local fixture directory instead of
/// the live API. The directory holds `routes.json` plus one
/// `stops/<route-id>.json` per route, in the wire format. Used by the test
/// suite to run offline.
pub const API_SOURCE_ENV: &str = "SUBWAYMAP_API_SOURCE";

/// Route type filter selecting subway lines (light and heavy rail).
const SUBWAY_ROUTE_TYPES: &str = "0,1";

/// A subway route as returned by the transit API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub id: String,
    pub long_name: String,
}

/// A subway stop as returned by the transit API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopRecord {
    pub id: String,
    pub name: String,
}

// JSON:API payload shapes. Only the fields the builder needs are modelled.

#[derive(Debug, Deserialize)]
struct Document<A> {
    data: Vec<Resource<A>>,
}

#[derive(Debug, Deserialize)]
struct Resource<A> {
    id: String,
    attributes: A,
}

#[derive(Debug, Deserialize)]
struct RouteAttributes {
    long_name: String,
}

#[derive(Debug, Deserialize)]
struct StopAttributes {
    // The API reports null names for a handful of stops.
    name: Option<String>,
}

#[derive(Debug)]
enum Source {
    Remote { base_url: String, client: Client },
    Fixture { dir: PathBuf },
}

/// Thin GET wrapper over the transit API.
///
/// The client is a boundary collaborator: it produces the raw route/stop
/// records the domain builder turns into a graph, and any HTTP or parse
/// failure surfaces here, before graph construction completes.
#[derive(Debug)]
pub struct ApiClient {
    source: Source,
}

impl ApiClient {
    /// Create a client for the given base URL, honouring the
    /// `SUBWAYMAP_API_SOURCE` fixture override when set.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        if let Some(dir) = env::var_os(API_SOURCE_ENV) {
            let dir = PathBuf::from(dir);
            info!(fixture = %dir.display(), "using local transit API fixture");
            return Ok(Self::from_fixture_dir(dir));
        }
        Ok(Self {
            source: Source::Remote {
                base_url: base_url.into(),
                client: build_client()?,
            },
        })
    }

    /// Create a client from `SUBWAYMAP_API_URL`, falling back to the
    /// default MBTA endpoint.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    /// Create a client that reads responses from a local fixture directory.
    pub fn from_fixture_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Fixture { dir: dir.into() },
        }
    }

    /// Fetch all subway routes (`GET /routes?filter[type]=0,1`).
    pub fn subway_routes(&self) -> Result<Vec<RouteRecord>> {
        let document: Document<RouteAttributes> = match &self.source {
            Source::Remote { base_url, client } => {
                get(client, base_url, "/routes", &[("filter[type]", SUBWAY_ROUTE_TYPES)])?
            }
            Source::Fixture { dir } => read_fixture(&dir.join("routes.json"))?,
        };
        Ok(document
            .data
            .into_iter()
            .map(|resource| RouteRecord {
                id: resource.id,
                long_name: resource.attributes.long_name,
            })
            .collect())
    }

    /// Fetch the ordered stops of one route
    /// (`GET /stops?filter[route]=<id>`).
    pub fn route_stops(&self, route_id: &str) -> Result<Vec<StopRecord>> {
        let document: Document<StopAttributes> = match &self.source {
            Source::Remote { base_url, client } => {
                get(client, base_url, "/stops", &[("filter[route]", route_id)])?
            }
            Source::Fixture { dir } => {
                read_fixture(&dir.join("stops").join(format!("{route_id}.json")))?
            }
        };
        Ok(document
            .data
            .into_iter()
            .map(|resource| StopRecord {
                id: resource.id,
                name: resource.attributes.name.unwrap_or_default(),
            })
            .collect())
    }
}

fn get<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    path: &str,
    query: &[(&str, &str)],
) -> Result<T> {
    let url = format!("{base_url}{path}");
    debug!(%url, "requesting transit data");
    let response = client
        .get(&url)
        .query(query)
        .header(ACCEPT, "application/json")
        .send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ApiStatus {
            url,
            status: status.as_u16(),
        });
    }
    Ok(response.json()?)
}

fn read_fixture<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FixtureNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(user_agent())
        .build()
        .map_err(Error::Http)
}

fn user_agent() -> String {
    format!("subwaymap-lib/{}", env!("CARGO_PKG_VERSION"))
}
