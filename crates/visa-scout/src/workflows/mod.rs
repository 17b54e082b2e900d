pub mod assessment;
pub mod listings;
