// Airline code extraction: gathers `iata_code` from every per-country airlines
// file into one JSON array. Airlines without a code are skipped and counted.

use crate::api::unwrap_envelope;
use crate::error::Result;
use crate::model::{Airline, ApiEnvelope};
use crate::pipeline::JobContext;
use crate::progress::ProgressEvent;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AirlineCodeExtraction {
    pub codes: Vec<String>,
    // Entries that carried a code
    pub total: usize,
    // Entries without a code
    pub skipped: usize,
}

impl AirlineCodeExtraction {
    // Appends the codes of one airlines document; returns (extracted, skipped)
    // for that document.
    pub fn absorb(&mut self, airlines: Vec<Airline>) -> (usize, usize) {
        let mut extracted = 0;
        let mut skipped = 0;
        for airline in airlines {
            match airline.iata_code {
                Some(code) => {
                    self.codes.push(code);
                    extracted += 1;
                }
                None => skipped += 1,
            }
        }
        self.total += extracted;
        self.skipped += skipped;
        (extracted, skipped)
    }

    // Drops repeated codes, keeping the first occurrence. Counters are untouched.
    pub fn dedup_codes(&mut self) -> usize {
        let before = self.codes.len();
        let mut seen = HashSet::with_capacity(before);
        self.codes.retain(|code| seen.insert(code.clone()));
        before - self.codes.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirlineCodesReport {
    pub files: Vec<String>,
    pub extraction: AirlineCodeExtraction,
    pub duplicates_removed: usize,
    pub output: String,
}

pub fn extract_airline_codes(ctx: &JobContext<'_>, dedup: bool) -> Result<AirlineCodesReport> {
    let files = ctx
        .store
        .list_matching(|name| ctx.layout.is_country_airlines_file(name))?;
    info!(files = files.len(), "scanning airline files");

    let mut extraction = AirlineCodeExtraction::default();
    for file in &files {
        let envelope: ApiEnvelope<Airline> = ctx.store.read_json(file)?;
        let airlines = unwrap_envelope(file, file, envelope)?;
        let (extracted, skipped) = extraction.absorb(airlines);
        debug!(file = %file, extracted, skipped, "airline file scanned");
        ctx.progress.report(&ProgressEvent::AirlineFileScanned {
            file: file.clone(),
            extracted,
            skipped,
        });
    }

    let duplicates_removed = if dedup { extraction.dedup_codes() } else { 0 };

    ctx.progress.report(&ProgressEvent::AirlineCodesExtracted {
        total: extraction.total,
        skipped: extraction.skipped,
    });

    let output = ctx.layout.airline_codes_file();
    ctx.store.write_json(&output, &extraction.codes)?;

    Ok(AirlineCodesReport {
        files,
        extraction,
        duplicates_removed,
        output,
    })
}
