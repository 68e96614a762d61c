// Domain layer: records, outcomes and the ports the scraper drives.

pub mod model;
pub mod ports;
