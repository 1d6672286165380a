// Airport code extraction: walks the nested route document and keeps every
// departure/arrival IATA code once, in first-seen order

use crate::error::{PipelineError, Result};
use crate::model::{RouteEndpoints, RouteGroups, RouteRecord};
use crate::pipeline::JobContext;
use crate::progress::ProgressEvent;
use std::collections::HashSet;
use tracing::info;

// Insertion ordered set of airport codes.
#[derive(Debug, Default, Clone)]
pub struct AirportCodes {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl AirportCodes {
    pub fn new() -> Self {
        Self::default()
    }

    // Returns true if the code was not present yet
    pub fn insert(&mut self, code: &str) -> bool {
        if self.seen.contains(code) {
            return false;
        }
        self.seen.insert(code.to_string());
        self.ordered.push(code.to_string());
        true
    }

    pub fn add_route(&mut self, route: &RouteEndpoints) {
        self.insert(&route.dep_iata);
        self.insert(&route.arr_iata);
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ordered
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

// Reads `dep_iata`/`arr_iata` from one raw route record. Route `index` is
// (group, position), both 0-based, for error messages.
pub fn route_endpoints(record: &RouteRecord, index: (usize, usize)) -> Result<RouteEndpoints> {
    let field = |name: &str| -> Result<String> {
        record
            .get(name)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| PipelineError::MissingField {
                field: name.to_string(),
                context: format!("route {} of airline group {}", index.1, index.0),
            })
    };
    Ok(RouteEndpoints {
        dep_iata: field("dep_iata")?,
        arr_iata: field("arr_iata")?,
    })
}

// Collects unique airport codes across all route groups (outer list first,
// then each inner list). `on_group` is called after every outer element with
// its 1-based index and the number of unique codes so far.
pub fn collect_airport_codes<F>(groups: &RouteGroups, mut on_group: F) -> Result<AirportCodes>
where
    F: FnMut(usize, usize),
{
    let mut codes = AirportCodes::new();
    for (g, group) in groups.iter().enumerate() {
        for (r, record) in group.iter().enumerate() {
            let route = route_endpoints(record, (g, r))?;
            codes.add_route(&route);
        }
        on_group(g + 1, codes.len());
    }
    Ok(codes)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportsReport {
    pub route_groups: usize,
    pub airports: Vec<String>,
    pub output: String,
}

pub fn extract_airport_codes(ctx: &JobContext<'_>) -> Result<AirportsReport> {
    let groups: RouteGroups = ctx.store.read_json(&ctx.layout.flights_file())?;
    let total = groups.len();
    info!(route_groups = total, "extracting airport codes");

    let codes = collect_airport_codes(&groups, |index, unique_airports| {
        ctx.progress.report(&ProgressEvent::RouteGroupScanned {
            index,
            total,
            unique_airports,
        })
    })?;

    let output = ctx.layout.airport_codes_file();
    ctx.store.write_json(&output, codes.as_slice())?;

    Ok(AirportsReport {
        route_groups: total,
        airports: codes.into_vec(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DatasetLayout;
    use crate::progress::recording::RecordingProgress;
    use crate::store::FileStore;
    use serde_json::json;

    fn groups(value: serde_json::Value) -> RouteGroups {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let routes = groups(json!([[
            {"dep_iata": "LHR", "arr_iata": "CDG"},
            {"dep_iata": "CDG", "arr_iata": "LHR"}
        ]]));
        let codes = collect_airport_codes(&routes, |_, _| {}).unwrap();
        assert_eq!(codes.as_slice(), ["LHR", "CDG"]);
    }

    #[test]
    fn test_order_follows_outer_then_inner_traversal() {
        let routes = groups(json!([
            [{"dep_iata": "FRA", "arr_iata": "MUC"}, {"dep_iata": "MUC", "arr_iata": "BER"}],
            [],
            [{"dep_iata": "AMS", "arr_iata": "FRA"}, {"dep_iata": "BER", "arr_iata": "OSL"}]
        ]));
        let mut progress = Vec::new();
        let codes = collect_airport_codes(&routes, |i, unique| progress.push((i, unique))).unwrap();

        assert_eq!(codes.as_slice(), ["FRA", "MUC", "BER", "AMS", "OSL"]);
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 5)]);
    }

    #[test]
    fn test_output_is_unique_and_drawn_from_input() {
        // Deterministic pseudo-random route set over a small airport pool
        let pool = ["LHR", "CDG", "FRA", "AMS", "MAD", "FCO", "VIE", "ZRH"];
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            pool[(state % pool.len() as u64) as usize]
        };
        let routes: RouteGroups = (0..20)
            .map(|_| {
                (0..15)
                    .map(|_| json!({"dep_iata": next(), "arr_iata": next()}))
                    .collect()
            })
            .collect();

        let codes = collect_airport_codes(&routes, |_, _| {}).unwrap();

        let unique: HashSet<&String> = codes.as_slice().iter().collect();
        assert_eq!(unique.len(), codes.len());

        let mut input = HashSet::new();
        for route in routes.iter().flatten() {
            input.insert(route["dep_iata"].as_str().unwrap().to_string());
            input.insert(route["arr_iata"].as_str().unwrap().to_string());
        }
        assert_eq!(unique.len(), input.len());
        assert!(codes.as_slice().iter().all(|c| input.contains(c)));
    }

    #[test]
    fn test_missing_endpoint_is_reported() {
        let routes = groups(json!([[{"dep_iata": "LHR", "arr_iata": "CDG"}], [{"dep_iata": "LHR"}]]));
        let err = collect_airport_codes(&routes, |_, _| {}).unwrap_err();
        match err {
            PipelineError::MissingField { field, context } => {
                assert_eq!(field, "arr_iata");
                assert_eq!(context, "route 0 of airline group 1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_job_writes_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let layout = DatasetLayout::default();
        store
            .write_raw(
                &layout.flights_file(),
                br#"[[{"dep_iata":"LHR","arr_iata":"CDG","airline_iata":"BA"},{"dep_iata":"CDG","arr_iata":"LHR"}]]"#,
            )
            .unwrap();
        let progress = RecordingProgress::default();
        let ctx = JobContext::new(&store, &layout, &progress);

        let report = extract_airport_codes(&ctx).unwrap();
        assert_eq!(report.airports, vec!["LHR", "CDG"]);

        let raw = std::fs::read_to_string(store.path_of(&layout.airport_codes_file())).unwrap();
        assert_eq!(raw, r#"["LHR","CDG"]"#);
        assert_eq!(
            progress.events(),
            vec![ProgressEvent::RouteGroupScanned {
                index: 1,
                total: 1,
                unique_airports: 2
            }]
        );
    }

    #[test]
    fn test_missing_flights_file_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let layout = DatasetLayout::default();
        let progress = RecordingProgress::default();
        let ctx = JobContext::new(&store, &layout, &progress);

        assert!(matches!(
            extract_airport_codes(&ctx),
            Err(PipelineError::IoError { .. })
        ));
        assert!(!store.exists(&layout.airport_codes_file()));
    }
}
