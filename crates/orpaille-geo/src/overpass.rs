//! Map-data client: waterway and settlement lookups.
//!
//! Wraps an Overpass-compatible interpreter endpoint with two query
//! shapes: a broad area scan and a named-way-plus-neighbors scan used by
//! the secondary coordinate resolver.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use orpaille_core::defaults::{
    GEO_TIMEOUT_SECS, MEANDER_MIN_ANGLE_RAD, OVERPASS_URL, RIVER_NEIGHBOR_RADIUS_M,
};
use orpaille_core::models::{AreaScan, Coordinates, PlaceNode, WaterwayCandidate};
use orpaille_core::{Error, Result};

#[derive(Debug, Default, Clone, Deserialize)]
struct Tags {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    waterway: Option<String>,
    #[serde(default)]
    place: Option<String>,
}

/// One element of the interpreter's flat reply. Nodes carry coordinates,
/// ways carry node-id sequences; other element kinds are ignored.
#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags: Tags,
}

#[derive(Debug, Deserialize)]
struct OverpassReply {
    elements: Vec<RawElement>,
}

#[derive(Debug, Clone, Copy)]
struct NodePoint {
    lat: f64,
    lon: f64,
    has_place_tag: bool,
}

#[derive(Debug, Clone)]
struct Way {
    id: i64,
    nodes: Vec<i64>,
    tags: Tags,
}

/// Client for the map-data service.
pub struct OverpassClient {
    client: Client,
    base_url: String,
    rng: Mutex<StdRng>,
}

impl OverpassClient {
    /// Create a client against the public interpreter.
    pub fn new() -> Self {
        Self::with_base_url(OVERPASS_URL.to_string())
    }

    /// Create a client against an explicit endpoint (tests, mirrors).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(GEO_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fix the random source so interest-point tie-breaking is
    /// deterministic.
    pub fn with_rng_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Enumerate named waterways and settlement nodes within `radius_km`
    /// of a point. Fails soft: any transport or parse failure yields an
    /// empty scan.
    pub async fn waterways_and_places(&self, lat: f64, lon: f64, radius_km: f64) -> AreaScan {
        let radius_m = (radius_km * 1000.0) as u64;
        let query = format!(
            "[out:json];\n(\n  way[\"waterway\"](around:{radius_m},{lat},{lon});\n  \
             node[\"place\"~\"hamlet|village|locality\"](around:{radius_m},{lat},{lon});\n  >;\n);\nout body;"
        );

        match self.run_query(&query).await {
            Ok(elements) => {
                let scan = area_scan_from_elements(elements);
                debug!(
                    lat,
                    lon,
                    radius_km,
                    waterways = scan.waterways.len(),
                    places = scan.places.len(),
                    "area scan complete"
                );
                scan
            }
            Err(e) => {
                warn!(lat, lon, radius_km, error = %e, "area scan failed, returning empty");
                AreaScan::default()
            }
        }
    }

    /// Resolve a coordinate on the named river.
    ///
    /// Interest points are confluence nodes (shared with another waterway)
    /// and meander nodes (bearing change over 45 degrees); one is chosen
    /// uniformly at random, falling back to a uniformly random node of the
    /// named way.
    pub async fn river_coordinates(
        &self,
        river_name: &str,
        lat: f64,
        lon: f64,
        radius_km: f64,
    ) -> Result<Coordinates> {
        let radius_m = (radius_km * 1000.0) as u64;
        let escaped = escape_query_value(river_name);
        let query = format!(
            "[out:json];\n(\n  way[\"waterway\"][\"name\"=\"{escaped}\"](around:{radius_m},{lat},{lon});\n  \
             way[\"waterway\"](around:{RIVER_NEIGHBOR_RADIUS_M},{lat},{lon});\n  >;\n);\nout body;"
        );

        let elements = self
            .run_query(&query)
            .await
            .map_err(|e| Error::MapData(e.to_string()))?;
        if elements.is_empty() {
            return Err(Error::RiverCoordinatesNotFound(river_name.to_string()));
        }

        let (node_points, ways) = partition_elements(elements);
        let main_way = ways
            .iter()
            .find(|w| w.tags.name.as_deref() == Some(river_name))
            .ok_or_else(|| Error::RiverNotFound(river_name.to_string()))?;

        let interest = interest_points(main_way, &ways, &node_points);
        debug!(
            river = river_name,
            interest_points = interest.len(),
            "river coordinate resolution"
        );

        let mut rng = self.rng.lock().unwrap();
        if !interest.is_empty() {
            return Ok(interest[rng.gen_range(0..interest.len())]);
        }

        if main_way.nodes.is_empty() {
            return Err(Error::RiverCoordinatesNotFound(river_name.to_string()));
        }
        let node_id = main_way.nodes[rng.gen_range(0..main_way.nodes.len())];
        node_points
            .get(&node_id)
            .map(|n| Coordinates::new(n.lat, n.lon))
            .ok_or_else(|| Error::RiverCoordinatesNotFound(river_name.to_string()))
    }

    async fn run_query(&self, query: &str) -> reqwest::Result<Vec<RawElement>> {
        let reply: OverpassReply = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(query.to_string())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(reply.elements)
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape a tag value for inclusion in a quoted query filter.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn partition_elements(elements: Vec<RawElement>) -> (HashMap<i64, NodePoint>, Vec<Way>) {
    let mut nodes = HashMap::new();
    let mut ways = Vec::new();

    for element in elements {
        match element.kind.as_str() {
            "node" => {
                if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
                    nodes.insert(
                        element.id,
                        NodePoint {
                            lat,
                            lon,
                            has_place_tag: element.tags.place.is_some(),
                        },
                    );
                }
            }
            "way" => ways.push(Way {
                id: element.id,
                nodes: element.nodes,
                tags: element.tags,
            }),
            _ => {}
        }
    }

    (nodes, ways)
}

fn area_scan_from_elements(elements: Vec<RawElement>) -> AreaScan {
    let mut scan = AreaScan::default();
    let mut node_tags: HashMap<i64, Tags> = HashMap::new();

    for element in &elements {
        if element.kind == "node" {
            node_tags.insert(element.id, element.tags.clone());
        }
    }

    let (node_points, ways) = partition_elements(elements);

    for way in &ways {
        let (Some(name), Some(kind)) = (way.tags.name.clone(), way.tags.waterway.clone()) else {
            continue;
        };
        // Representative coordinate: the node at the middle index of the
        // way's point sequence (not the centroid).
        if let Some(coordinates) = middle_node_coordinates(way, &node_points) {
            scan.waterways.push(WaterwayCandidate {
                name,
                kind,
                coordinates,
            });
        }
    }

    for (id, point) in &node_points {
        if !point.has_place_tag {
            continue;
        }
        let Some(tags) = node_tags.get(id) else {
            continue;
        };
        let (Some(name), Some(kind)) = (tags.name.clone(), tags.place.clone()) else {
            continue;
        };
        scan.places.push(PlaceNode {
            name,
            kind,
            coordinates: Coordinates::new(point.lat, point.lon),
        });
    }

    scan
}

fn middle_node_coordinates(way: &Way, nodes: &HashMap<i64, NodePoint>) -> Option<Coordinates> {
    let mid_id = way.nodes.get(way.nodes.len() / 2)?;
    nodes.get(mid_id).map(|n| Coordinates::new(n.lat, n.lon))
}

/// Collect confluence and meander interest points along the main way.
fn interest_points(
    main_way: &Way,
    ways: &[Way],
    nodes: &HashMap<i64, NodePoint>,
) -> Vec<Coordinates> {
    let mut points = Vec::new();

    // Confluences: nodes shared with any other waterway way.
    for way in ways {
        if way.id == main_way.id || way.tags.waterway.is_none() {
            continue;
        }
        for node_id in way.nodes.iter().filter(|n| main_way.nodes.contains(n)) {
            if let Some(node) = nodes.get(node_id) {
                points.push(Coordinates::new(node.lat, node.lon));
            }
        }
    }

    // Meanders: interior nodes where the bearing change between
    // consecutive segments exceeds 45 degrees.
    for window in main_way.nodes.windows(3) {
        let (Some(prev), Some(curr), Some(next)) = (
            nodes.get(&window[0]),
            nodes.get(&window[1]),
            nodes.get(&window[2]),
        ) else {
            continue;
        };

        let angle = ((next.lat - curr.lat).atan2(next.lon - curr.lon)
            - (curr.lat - prev.lat).atan2(curr.lon - prev.lon))
        .abs();

        if angle > MEANDER_MIN_ANGLE_RAD {
            points.push(Coordinates::new(curr.lat, curr.lon));
        }
    }

    points
}
