// Country -> airline fetch: one airlines request per country code, each body
// saved verbatim as `{Source}_{CODE}_Airlines.json`

use crate::api::{parse_response_list, unwrap_envelope, AirLabsApi};
use crate::error::{PipelineError, Result};
use crate::fetcher::Fetcher;
use crate::model::{ApiEnvelope, Country};
use crate::pipeline::JobContext;
use crate::progress::ProgressEvent;
use serde::de::IgnoredAny;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct CountryAirlinesReport {
    pub countries: Vec<String>,
    pub files: Vec<String>,
}

// Country codes from the countries document, in document order. When
// `targets` is given only those codes are kept (order still follows the document).
pub fn select_country_codes(countries: Vec<Country>, targets: Option<&[String]>) -> Vec<String> {
    let codes = countries.into_iter().map(|c| c.code);
    match targets {
        None => codes.collect(),
        Some(targets) => {
            let selected: Vec<String> = codes
                .filter(|code| targets.iter().any(|t| t.eq_ignore_ascii_case(code)))
                .collect();
            for target in targets {
                if !selected.iter().any(|c| c.eq_ignore_ascii_case(target)) {
                    warn!(country = %target, "target country not present in countries document");
                }
            }
            selected
        }
    }
}

// Country codes end up in file names; anything that could leave the data
// directory is refused
pub fn check_country_code(code: &str, source: &str) -> Result<()> {
    let escapes = code.contains(|c: char| c == '/' || c == '\\') || code.contains("..");
    if code.trim().is_empty() || escapes {
        return Err(PipelineError::InvalidFormat(format!(
            "country code {code:?} in {source} is not usable in a file name"
        )));
    }
    Ok(())
}

pub async fn fetch_country_airlines(
    ctx: &JobContext<'_>,
    fetcher: &dyn Fetcher,
    api: &AirLabsApi,
    targets: Option<&[String]>,
) -> Result<CountryAirlinesReport> {
    let countries_file = ctx.layout.countries_file();
    let envelope: ApiEnvelope<Country> = ctx.store.read_json(&countries_file)?;
    let countries = unwrap_envelope(&countries_file, &countries_file, envelope)?;
    let codes = select_country_codes(countries, targets);
    for code in &codes {
        check_country_code(code, &countries_file)?;
    }

    info!(countries = codes.len(), source = %countries_file, "fetching airlines per country");

    let total = codes.len();
    let mut files = Vec::with_capacity(total);
    for (i, code) in codes.iter().enumerate() {
        let url = api.airlines_by_country(code)?;
        let body = fetcher
            .fetch(&url)
            .await
            .map_err(|source| PipelineError::FetchError {
                key: code.clone(),
                source,
            })?;

        // The body is stored as-is, but only once it is known to be a usable
        // airlines document
        parse_response_list::<IgnoredAny>(code, &body)?;

        let file = ctx.layout.country_airlines_file(code);
        ctx.store.write_raw(&file, body.as_bytes())?;

        ctx.progress.report(&ProgressEvent::CountryFetched {
            index: i + 1,
            total,
            country_code: code.clone(),
            file: file.clone(),
        });
        files.push(file);
    }

    Ok(CountryAirlinesReport {
        countries: codes,
        files,
    })
}
