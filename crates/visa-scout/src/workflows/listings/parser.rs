use crate::workflows::assessment::{Listing, ListingId};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_listings<R: Read>(reader: R) -> Result<Vec<Listing>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut listings = Vec::new();

    for record in csv_reader.deserialize::<ListingRow>() {
        listings.push(record?.into_listing());
    }

    Ok(listings)
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: i64,
    company_name: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    apply_url: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requirements: Option<String>,
}

impl ListingRow {
    fn into_listing(self) -> Listing {
        Listing {
            id: ListingId(self.id),
            company_name: self.company_name,
            title: self.title,
            description: self.description,
            location: self.location,
            apply_url: self.apply_url,
            requirements: self.requirements,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
