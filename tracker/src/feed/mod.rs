pub mod opensky;
pub mod scenario;

use async_trait::async_trait;
use overheadcore::Observation;

pub use opensky::OpenSkyFeed;
pub use scenario::ScenarioFeed;

/// Source of one observation batch per poll tick.
#[async_trait]
pub trait ObservationFeed: Send {
    async fn fetch(&mut self) -> anyhow::Result<Vec<Observation>>;

    /// True once the feed has nothing more to deliver.
    fn exhausted(&self) -> bool {
        false
    }
}
