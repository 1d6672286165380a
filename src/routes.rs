// Route fetch: one routes request per airline code. Each airline's route list
// is kept as its own inner list; the whole set is written once, at the end.

use crate::api::{parse_response_list, AirLabsApi};
use crate::error::{PipelineError, Result};
use crate::fetcher::Fetcher;
use crate::model::{RouteGroups, RouteRecord};
use crate::pipeline::JobContext;
use crate::progress::ProgressEvent;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct RoutesReport {
    pub airlines: usize,
    pub routes: usize,
    pub output: String,
}

pub async fn fetch_routes(
    ctx: &JobContext<'_>,
    fetcher: &dyn Fetcher,
    api: &AirLabsApi,
) -> Result<RoutesReport> {
    let codes: Vec<String> = ctx.store.read_json(&ctx.layout.airline_codes_file())?;
    info!(airlines = codes.len(), "fetching routes per airline");

    let total = codes.len();
    let mut groups: RouteGroups = Vec::with_capacity(total);
    for (i, code) in codes.iter().enumerate() {
        let url = api.routes_by_airline(code)?;
        let body = fetcher
            .fetch(&url)
            .await
            .map_err(|source| PipelineError::FetchError {
                key: code.clone(),
                source,
            })?;
        let routes: Vec<RouteRecord> = parse_response_list(code, &body)?;

        ctx.progress.report(&ProgressEvent::RoutesFetched {
            index: i + 1,
            total,
            airline_code: code.clone(),
            routes: routes.len(),
        });
        groups.push(routes);
    }

    let output = ctx.layout.flights_file();
    ctx.store.write_json(&output, &groups)?;

    Ok(RoutesReport {
        airlines: groups.len(),
        routes: groups.iter().map(Vec::len).sum(),
        output,
    })
}
