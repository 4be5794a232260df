use crate::feed::ObservationFeed;
use async_trait::async_trait;
use overheadcore::Observation;
use std::collections::VecDeque;

/// Replays prepared batches, one per tick, then reports an empty zone.
pub struct ScenarioFeed {
    batches: VecDeque<Vec<Observation>>,
}

impl ScenarioFeed {
    pub fn new(batches: Vec<Vec<Observation>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

#[async_trait]
impl ObservationFeed for ScenarioFeed {
    async fn fetch(&mut self) -> anyhow::Result<Vec<Observation>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn scenario_feed_replays_in_order() {
        let now = Utc::now();
        let mut feed = ScenarioFeed::new(vec![
            vec![Observation::new("UA1", 0.0, 0.0, now)],
            vec![],
        ]);
        assert!(!feed.exhausted());
        assert_eq!(feed.fetch().await.unwrap()[0].callsign, "UA1");
        assert!(feed.fetch().await.unwrap().is_empty());
        assert!(feed.exhausted());
        assert!(feed.fetch().await.unwrap().is_empty());
    }
}
