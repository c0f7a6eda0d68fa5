//! In-memory report store.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::model::{
    Location, NewReport, Report, ReportCategory, ReportError, ReportFilter, ReportStatus,
};

/// Aggregate counts for the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    /// Reports not yet resolved or rejected
    pub open: usize,
    pub by_status: BTreeMap<ReportStatus, usize>,
    pub by_category: BTreeMap<ReportCategory, usize>,
}

/// Thread-safe report store shared by the API and the submission service
#[derive(Debug, Default)]
pub struct ReportStore {
    reports: RwLock<HashMap<Uuid, Report>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a handful of sample reports
    pub fn with_sample_data() -> Self {
        let now = Utc::now();
        let samples = [
            (
                ReportCategory::Pothole,
                "Pothole on Main St",
                "Large pothole in the right lane near the bakery",
                "120 Main St",
                ReportStatus::InProgress,
                3,
            ),
            (
                ReportCategory::Streetlight,
                "Streetlight out",
                "The light at the park entrance has been off for days",
                "Elm Park, north gate",
                ReportStatus::Submitted,
                1,
            ),
            (
                ReportCategory::Graffiti,
                "Graffiti on bus shelter",
                "Spray paint covering the route map",
                "Oak Ave & 3rd St",
                ReportStatus::Resolved,
                10,
            ),
            (
                ReportCategory::Trash,
                "Overflowing bins",
                "Public bins have not been emptied this week",
                "Market Square",
                ReportStatus::InReview,
                2,
            ),
        ];

        let reports = samples
            .into_iter()
            .map(|(category, title, description, address, status, days_ago)| {
                let mut report = NewReport {
                    category,
                    title: title.to_string(),
                    description: description.to_string(),
                    location: Location {
                        address: Some(address.to_string()),
                        latitude: None,
                        longitude: None,
                    },
                    photo_url: None,
                    anonymous: false,
                }
                .into_report(Uuid::new_v4(), now - Duration::days(days_ago));
                report.status = status;
                (report.id, report)
            })
            .collect();

        Self {
            reports: RwLock::new(reports),
        }
    }

    pub async fn insert(&self, new_report: NewReport) -> Report {
        let report = new_report.into_report(Uuid::new_v4(), Utc::now());
        self.reports
            .write()
            .await
            .insert(report.id, report.clone());
        debug!(report_id = %report.id, "report inserted");
        report
    }

    pub async fn get(&self, id: Uuid) -> Result<Report, ReportError> {
        self.reports
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ReportError::NotFound(id))
    }

    /// Reports matching `filter`, newest first
    pub async fn list(&self, filter: &ReportFilter) -> Vec<Report> {
        let mut reports: Vec<Report> = self
            .reports
            .read()
            .await
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reports
    }

    pub async fn update_status(&self, id: Uuid, status: ReportStatus) -> Result<Report, ReportError> {
        let mut reports = self.reports.write().await;
        let report = reports.get_mut(&id).ok_or(ReportError::NotFound(id))?;
        report.status = status;
        Ok(report.clone())
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }

    pub async fn stats(&self) -> ReportStats {
        let reports = self.reports.read().await;
        let mut stats = ReportStats {
            total: reports.len(),
            ..ReportStats::default()
        };
        for report in reports.values() {
            if report.status.is_open() {
                stats.open += 1;
            }
            *stats.by_status.entry(report.status).or_default() += 1;
            *stats.by_category.entry(report.category).or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_report(category: ReportCategory, title: &str) -> NewReport {
        NewReport {
            category,
            title: title.to_string(),
            description: "Something needs fixing".to_string(),
            location: Location {
                address: Some("1 Main St".to_string()),
                ..Location::default()
            },
            photo_url: None,
            anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = ReportStore::new();
        let report = store.insert(new_report(ReportCategory::Water, "Leak")).await;

        let fetched = store.get(report.id).await.unwrap();
        assert_eq!(fetched.title, "Leak");
        assert_eq!(fetched.status, ReportStatus::Submitted);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = ReportStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.get(id).await, Err(ReportError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_newest_first() {
        let store = ReportStore::with_sample_data();
        let all = store.list(&ReportFilter::default()).await;
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

        let potholes = store
            .list(&ReportFilter {
                category: Some(ReportCategory::Pothole),
                status: None,
            })
            .await;
        assert_eq!(potholes.len(), 1);
        assert_eq!(potholes[0].title, "Pothole on Main St");
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = ReportStore::new();
        let report = store.insert(new_report(ReportCategory::Noise, "Alarm")).await;
        let updated = store
            .update_status(report.id, ReportStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(updated.status, ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = ReportStore::with_sample_data();
        store.insert(new_report(ReportCategory::Pothole, "Another")).await;

        let stats = store.stats().await;
        assert_eq!(stats.total, 5);
        assert_eq!(stats.open, 4); // one sample is resolved
        assert_eq!(stats.by_category.get(&ReportCategory::Pothole), Some(&2));
        assert_eq!(stats.by_status.get(&ReportStatus::Submitted), Some(&2));
    }
}
