//! Bulk moderation
//!
//! Applies a single-listing operation to many ids. Ids are de-duplicated
//! keeping first-seen order; each item runs independently and reports its own
//! outcome, so one failure never aborts the rest.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use super::ListingService;
use crate::domain::{Capability, DomainResult, ListingId};
use crate::shared::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BulkStatus {
    Succeeded,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// The id as supplied by the caller
    pub id: String,
    #[serde(flatten)]
    pub status: BulkStatus,
}

impl BulkOutcome {
    fn succeeded(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: BulkStatus::Succeeded,
        }
    }

    fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: BulkStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BulkStatus::Succeeded
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

#[derive(Debug, Clone, Copy)]
enum BulkAction {
    Approve,
    Delete,
}

impl BulkAction {
    fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Approve => "approve",
            BulkAction::Delete => "delete",
        }
    }
}

pub struct BulkCoordinator {
    service: Arc<ListingService>,
    max_ids: usize,
    concurrency: usize,
}

impl BulkCoordinator {
    pub fn new(service: Arc<ListingService>, max_ids: usize, concurrency: usize) -> Self {
        Self {
            service,
            max_ids,
            concurrency: concurrency.max(1),
        }
    }

    /// Approve each listing. Already-approved listings fail with their
    /// `InvalidState` reason.
    pub async fn bulk_approve(&self, admin: &Capability, ids: &[String]) -> DomainResult<BulkReport> {
        self.run(admin, ids, BulkAction::Approve).await
    }

    /// Delete each listing regardless of state.
    pub async fn bulk_delete(&self, admin: &Capability, ids: &[String]) -> DomainResult<BulkReport> {
        self.run(admin, ids, BulkAction::Delete).await
    }

    async fn run(
        &self,
        admin: &Capability,
        ids: &[String],
        action: BulkAction,
    ) -> DomainResult<BulkReport> {
        admin.require_admin(&format!("bulk {}", action.as_str()))?;

        let unique = dedupe(ids);
        if unique.is_empty() {
            return Ok(BulkReport::default());
        }
        if unique.len() > self.max_ids {
            return Err(DomainError::Validation(format!(
                "ids: at most {} per request, got {}",
                self.max_ids,
                unique.len()
            )));
        }

        let parsed = parse_ids(&unique);

        // buffered() keeps input order while running up to `concurrency` items
        let outcomes: Vec<BulkOutcome> = stream::iter(parsed)
            .map(|(raw, id)| async move {
                match id {
                    Ok(id) => match self.apply(admin, &id, action).await {
                        Ok(()) => BulkOutcome::succeeded(raw),
                        Err(e) => BulkOutcome::failed(raw, e.to_string()),
                    },
                    Err(e) => BulkOutcome::failed(raw, e.to_string()),
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = BulkReport { outcomes };
        if report.failed() > 0 {
            warn!(
                action = action.as_str(),
                succeeded = report.succeeded(),
                failed = report.failed(),
                "Bulk operation finished with failures"
            );
        } else {
            info!(
                action = action.as_str(),
                succeeded = report.succeeded(),
                "Bulk operation finished"
            );
        }
        Ok(report)
    }

    async fn apply(&self, admin: &Capability, id: &ListingId, action: BulkAction) -> DomainResult<()> {
        match action {
            BulkAction::Approve => self.service.approve(admin, id).await.map(|_| ()),
            BulkAction::Delete => self.service.delete(admin, id).await,
        }
    }
}

/// Trimmed, blank-free, first occurrence wins
fn dedupe(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Pair each raw id with its parse result; malformed ids become per-item
/// failures rather than failing the batch.
pub fn parse_ids(raw: &[String]) -> Vec<(String, DomainResult<ListingId>)> {
    raw.iter()
        .map(|r| (r.clone(), r.parse::<ListingId>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::application::geo::GeoClassifier;
    use crate::domain::{Categories, Category, SubmitListingDto};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;
    use crate::notifications::create_event_bus;

    fn setup(max_ids: usize) -> (Arc<ListingService>, BulkCoordinator) {
        let service = Arc::new(ListingService::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(GeoClassifier::default()),
            create_event_bus(),
            Duration::from_secs(1),
        ));
        let bulk = BulkCoordinator::new(service.clone(), max_ids, 4);
        (service, bulk)
    }

    async fn submit(service: &ListingService, title: &str) -> ListingId {
        let dto = SubmitListingDto {
            title: title.to_string(),
            description: None,
            city: "Riyadh".into(),
            address: String::new(),
            categories: Categories::with_primary(Category::new("cafe", "Cafe"), Vec::new())
                .unwrap(),
            location_confirmation: None,
        };
        service
            .submit(&Capability::owner("owner-1"), dto)
            .await
            .unwrap()
            .id
    }

    fn admin() -> Capability {
        Capability::admin("admin-1")
    }

    #[tokio::test]
    async fn approve_reports_each_item() {
        let (service, bulk) = setup(10);
        let id1 = submit(&service, "First").await;
        let missing = ListingId::new();

        let report = bulk
            .bulk_approve(&admin(), &[id1.to_string(), missing.to_string()])
            .await
            .unwrap();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0], BulkOutcome::succeeded(id1.to_string()));
        assert!(matches!(
            report.outcomes[1].status,
            BulkStatus::Failed { ref reason } if reason.contains("Not found")
        ));
        assert!(service.find_by_id(None, &id1).await.unwrap().approved);
    }

    #[tokio::test]
    async fn duplicates_collapse_in_first_seen_order() {
        let (service, bulk) = setup(10);
        let a = submit(&service, "Alpha").await.to_string();
        let b = submit(&service, "Beta").await.to_string();

        let report = bulk
            .bulk_approve(&admin(), &[b.clone(), a.clone(), b.clone(), format!(" {} ", a)])
            .await
            .unwrap();

        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str(), a.as_str()]);
        assert_eq!(report.succeeded(), 2);
    }

    #[tokio::test]
    async fn already_approved_is_item_failure() {
        let (service, bulk) = setup(10);
        let id = submit(&service, "Alpha").await;
        service.approve(&admin(), &id).await.unwrap();

        let report = bulk.bulk_approve(&admin(), &[id.to_string()]).await.unwrap();
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn malformed_id_is_item_failure() {
        let (service, bulk) = setup(10);
        let id = submit(&service, "Alpha").await;

        let report = bulk
            .bulk_delete(&admin(), &["not-a-uuid".to_string(), id.to_string()])
            .await
            .unwrap();
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.outcomes[0].id, "not-a-uuid");
    }

    #[tokio::test]
    async fn whole_call_failures() {
        let (_, bulk) = setup(2);
        let ids: Vec<String> = (0..3).map(|_| ListingId::new().to_string()).collect();

        assert!(matches!(
            bulk.bulk_approve(&Capability::owner("owner-1"), &ids).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            bulk.bulk_approve(&admin(), &ids).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn empty_id_list_yields_empty_report() {
        let (_, bulk) = setup(2);

        let report = bulk.bulk_approve(&admin(), &[]).await.unwrap();
        assert!(report.outcomes.is_empty());

        let blanks = vec![" ".to_string(), String::new()];
        let report = bulk.bulk_delete(&admin(), &blanks).await.unwrap();
        assert_eq!(report, BulkReport::default());
    }

    #[tokio::test]
    async fn bulk_delete_removes_all_states() {
        let (service, bulk) = setup(10);
        let pending = submit(&service, "Pending").await;
        let approved = submit(&service, "Approved").await;
        service.approve(&admin(), &approved).await.unwrap();

        let report = bulk
            .bulk_delete(&admin(), &[pending.to_string(), approved.to_string()])
            .await
            .unwrap();
        assert_eq!(report.succeeded(), 2);
        assert!(service.find_by_id(Some(&admin()), &approved).await.is_err());
    }

    #[test]
    fn report_serializes_flat() {
        let report = BulkReport {
            outcomes: vec![BulkOutcome::failed("x", "bad id")],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "failed");
        assert_eq!(json["outcomes"][0]["reason"], "bad id");
        assert_eq!(json["outcomes"][0]["id"], "x");
    }
}
