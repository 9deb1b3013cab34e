use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counters for one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages_attempted: u32,
    pub pages_failed: u32,
    pub items_attempted: u32,
    pub items_failed: u32,
    pub records_stored: u32,
}

impl CrawlSummary {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            pages_attempted: 0,
            pages_failed: 0,
            items_attempted: 0,
            items_failed: 0,
            records_stored: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.finished_at
            .map_or(0, |end| (end - self.started_at).num_seconds())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_run_gets_its_own_id() {
        let first = CrawlSummary::start();
        let second = CrawlSummary::start();
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.records_stored, 0);
        assert!(first.finished_at.is_none());
    }

    #[test]
    fn test_finish_stamps_end_time() {
        let mut summary = CrawlSummary::start();
        assert_eq!(summary.elapsed_seconds(), 0);
        summary.finish();
        assert!(summary.finished_at.is_some_and(|end| end >= summary.started_at));
    }
}
