//! CSV ingestion of normalized listings for offline assessment runs.

mod parser;

use crate::workflows::assessment::Listing;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ListingImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ListingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingImportError::Io(err) => write!(f, "failed to read listings file: {}", err),
            ListingImportError::Csv(err) => write!(f, "invalid listings CSV data: {}", err),
        }
    }
}

impl std::error::Error for ListingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListingImportError::Io(err) => Some(err),
            ListingImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ListingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ListingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads listings from a CSV export with the columns
/// `id,company_name,title,description,location,apply_url,requirements`.
pub struct ListingCsvImporter;

impl ListingCsvImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<Listing>, ListingImportError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Listing>, ListingImportError> {
        Ok(parser::parse_listings(reader)?)
    }
}
