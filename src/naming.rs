// File naming contract used to hand data from one job to the next.
// Every file follows `{Source}_{Scope}_{EntityType}.json`; downstream jobs find
// upstream output purely by name.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    pub source: String,
    pub region: String,
    pub region_adjective: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            source: "AirLabs".to_string(),
            region: "Europe".to_string(),
            region_adjective: "European".to_string(),
        }
    }
}

pub const AIRLINES_SUFFIX: &str = "_Airlines.json";

impl DatasetLayout {
    // Country reference input, e.g. AirLabs_Europe_Countries.json
    pub fn countries_file(&self) -> String {
        format!("{}_{}_Countries.json", self.source, self.region)
    }

    // One per country, e.g. AirLabs_DE_Airlines.json
    pub fn country_airlines_file(&self, country_code: &str) -> String {
        format!("{}_{}{}", self.source, country_code, AIRLINES_SUFFIX)
    }

    pub fn is_country_airlines_file(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.source) && file_name.ends_with(AIRLINES_SUFFIX)
    }

    pub fn airline_codes_file(&self) -> String {
        format!(
            "{}_{}_Airline_Code_List.json",
            self.source, self.region_adjective
        )
    }

    pub fn flights_file(&self) -> String {
        format!("{}_All_{}_Flights.json", self.source, self.region_adjective)
    }

    pub fn airport_codes_file(&self) -> String {
        format!("{}_Flight_Airport_IATA_List.json", self.source)
    }
}
