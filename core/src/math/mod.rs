pub mod geodesy;
pub mod stats;

pub use geodesy::GeodesyHelper;
pub use stats::StatsHelper;
