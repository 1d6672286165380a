// Progress reporting for the batch jobs. Jobs receive an observer instead of
// printing, so the CLI can log while library callers collect or ignore events.

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    CountryFetched {
        index: usize,
        total: usize,
        country_code: String,
        file: String,
    },
    AirlineFileScanned {
        file: String,
        extracted: usize,
        skipped: usize,
    },
    AirlineCodesExtracted {
        total: usize,
        skipped: usize,
    },
    RoutesFetched {
        index: usize,
        total: usize,
        airline_code: String,
        routes: usize,
    },
    RouteGroupScanned {
        index: usize,
        total: usize,
        unique_airports: usize,
    },
}

pub trait ProgressObserver: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

// Logs every event at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::CountryFetched {
                index,
                total,
                country_code,
                file,
            } => info!(index, total, country = %country_code, file = %file, "country airlines saved"),
            ProgressEvent::AirlineFileScanned {
                file,
                extracted,
                skipped,
            } => info!(file = %file, extracted, skipped, "airline file scanned"),
            ProgressEvent::AirlineCodesExtracted { total, skipped } => {
                info!(total, skipped, "Total (non-skipped): {total}, skip count: {skipped}")
            }
            ProgressEvent::RoutesFetched {
                index,
                total,
                airline_code,
                routes,
            } => info!(airline = %airline_code, routes, total, "Progress: {index}"),
            ProgressEvent::RouteGroupScanned {
                index,
                total,
                unique_airports,
            } => info!(total, unique_airports, "route group {index}"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_observer() {
        let seen = AtomicUsize::new(0);
        let observer = |event: &ProgressEvent| {
            if let ProgressEvent::RoutesFetched { index, .. } = event {
                seen.store(*index, Ordering::SeqCst);
            }
        };
        observer.report(&ProgressEvent::RoutesFetched {
            index: 7,
            total: 9,
            airline_code: "LH".to_string(),
            routes: 120,
        });
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_builtin_observers_accept_all_events() {
        let event = ProgressEvent::AirlineCodesExtracted {
            total: 2,
            skipped: 1,
        };
        NoopProgress.report(&event);
        TracingProgress.report(&event);
    }
}
