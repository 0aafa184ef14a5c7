pub mod extract;
pub mod index;
pub mod scrape;
pub mod status;
