use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Leader as returned by `/leaders`, plus the bio attached after scraping.
/// Birth/death fields in the payload are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Leader {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub wikipedia_url: Option<String>,
    #[serde(default)]
    pub start_mandate: Option<String>,
    #[serde(default)]
    pub end_mandate: Option<String>,
    #[serde(skip)]
    pub bio: Option<String>,
}

impl Leader {
    pub fn name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        format!("{first} {last}").trim().to_string()
    }

    pub fn record(&self) -> LeaderRecord {
        LeaderRecord {
            name: self.name(),
            start: self.start_mandate.clone().unwrap_or_default(),
            end: self.end_mandate.clone().unwrap_or_default(),
            bio: self.bio.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Country {
    pub code: String,
    pub leaders: Vec<Leader>,
}

/// Countries in fetch order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub countries: Vec<Country>,
}

impl Dataset {
    pub fn leader_count(&self) -> usize {
        self.countries.iter().map(|c| c.leaders.len()).sum()
    }

    /// One flattened row per leader, countries and leaders in order.
    pub fn rows(&self) -> impl Iterator<Item = CsvRow> + '_ {
        self.countries.iter().flat_map(|c| {
            c.leaders.iter().map(move |l| {
                let r = l.record();
                CsvRow {
                    country: c.code.clone(),
                    name: r.name,
                    start: r.start,
                    end: r.end,
                    bio: r.bio,
                }
            })
        })
    }
}

/// JSON shape: `{ "<country>": [ {name, start, end, bio}, ... ], ... }`
impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.countries.len()))?;
        for country in &self.countries {
            let records: Vec<LeaderRecord> =
                country.leaders.iter().map(Leader::record).collect();
            map.serialize_entry(&country.code, &records)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderRecord {
    pub name: String,
    pub start: String,
    pub end: String,
    pub bio: String,
}

/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvRow {
    pub country: String,
    pub name: String,
    pub start: String,
    pub end: String,
    pub bio: String,
}
