use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    dtos::activities::{CreateActivityRequest, UpdateActivityRequest},
    location::{EditSession, LocationError, LocationResolver},
    models::{ActivityChanges, ActivityView, LocationCombination, NewActivity},
    services::{ServiceError, Store},
};

/// Marker the original forms used for "nobody assigned".
const UNASSIGNED: &str = "—";

#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn Store>,
    staff: Arc<Vec<String>>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn Store>, staff: Vec<String>) -> Self {
        Self {
            store,
            staff: Arc::new(staff),
        }
    }

    pub fn staff(&self) -> &[String] {
        &self.staff
    }

    /// Newest first, each joined with its location.
    pub async fn list(&self) -> Result<Vec<ActivityView>, ServiceError> {
        let activities = self.store.list_activities().await?;
        let locations = self.store.list_locations().await?;
        Ok(activities
            .into_iter()
            .map(|a| ActivityView::new(a, &locations))
            .collect())
    }

    pub async fn get(&self, id: i64) -> Result<ActivityView, ServiceError> {
        let activity = self
            .store
            .find_activity(id)
            .await?
            .ok_or(ServiceError::NotFound("Activity"))?;
        let locations = self.store.list_locations().await?;
        Ok(ActivityView::new(activity, &locations))
    }

    /// Location and responsible are validated against fresh data before
    /// anything is written.
    #[instrument(skip(self, req))]
    pub async fn create(&self, req: CreateActivityRequest) -> Result<ActivityView, ServiceError> {
        let description = required_description(&req.description)?;
        let responsible = self.responsible(req.responsible.as_deref())?;

        let locations = self.store.list_locations().await?;
        let resolver = LocationResolver::new(&locations);
        let location_id = match (req.location_id, req.location) {
            (Some(_), Some(_)) => return Err(both_location_forms()),
            (Some(id), None) => Some(existing_location(&resolver, id)?),
            (None, Some(selection)) if !selection.normalized().is_empty() => {
                Some(resolver.resolve(&selection)?)
            }
            _ => None,
        };

        let activity = self
            .store
            .insert_activity(NewActivity {
                description,
                status: req.status.unwrap_or_default(),
                responsible,
                location_id,
            })
            .await?;

        metrics::counter!("activities_created_total").increment(1);
        info!(activity_id = activity.id, ?location_id, "Activity created");
        Ok(ActivityView::new(activity, &locations))
    }

    /// Partial update. A submitted location tuple is checked with edit-mode
    /// rules against the activity's current location.
    #[instrument(skip(self, req))]
    pub async fn update(
        &self,
        id: i64,
        req: UpdateActivityRequest,
    ) -> Result<ActivityView, ServiceError> {
        let existing = self
            .store
            .find_activity(id)
            .await?
            .ok_or(ServiceError::NotFound("Activity"))?;

        let description = req
            .description
            .as_deref()
            .map(required_description)
            .transpose()?;
        let responsible = req
            .responsible
            .as_deref()
            .map(|r| self.responsible(Some(r)))
            .transpose()?;

        let locations = self.store.list_locations().await?;
        let resolver = LocationResolver::new(&locations);
        let location_id = match (req.clear_location, req.location_id, req.location) {
            (true, None, None) => Some(None),
            (true, _, _) | (false, Some(_), Some(_)) => return Err(both_location_forms()),
            (false, Some(location_id), None) => {
                Some(Some(existing_location(&resolver, location_id)?))
            }
            (false, None, Some(selection)) => {
                let original: Option<LocationCombination> = existing
                    .location_id
                    .and_then(|lid| resolver.get(lid))
                    .cloned();
                let session = EditSession::with_selection(original, &selection);
                Some(Some(session.submission(&resolver)?))
            }
            (false, None, None) => None,
        };

        let changes = ActivityChanges {
            description,
            status: req.status,
            responsible,
            location_id,
        };

        let updated = self
            .store
            .update_activity(id, changes)
            .await?
            .ok_or(ServiceError::NotFound("Activity"))?;

        info!(activity_id = id, status = %updated.status, "Activity updated");
        Ok(ActivityView::new(updated, &locations))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.store.delete_activity(id).await? {
            return Err(ServiceError::NotFound("Activity"));
        }
        info!(activity_id = id, "Activity deleted");
        Ok(())
    }

    /// `None` for unassigned; otherwise the canonical staff name.
    fn responsible(&self, value: Option<&str>) -> Result<Option<String>, ServiceError> {
        let value = match value.map(str::trim) {
            None | Some("") | Some(UNASSIGNED) => return Ok(None),
            Some(v) => v,
        };

        self.staff
            .iter()
            .find(|s| s.eq_ignore_ascii_case(value))
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                ServiceError::validation(
                    "responsible",
                    format!("'{}' is not a member of the support staff", value),
                )
            })
    }
}

fn required_description(value: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(
            "description",
            "Description is required",
        ));
    }
    Ok(value.to_string())
}

fn existing_location(resolver: &LocationResolver<'_>, id: i64) -> Result<i64, LocationError> {
    resolver
        .get(id)
        .map(|row| row.id)
        .ok_or(LocationError::NoMatch)
}

fn both_location_forms() -> ServiceError {
    ServiceError::validation(
        "location",
        "Give only one of location_id, location or clear_location",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stores::LocationStore;
    use crate::config::DEFAULT_STAFF;
    use crate::models::{ActivityStatus, Level, LocationSelection};
    use crate::services::InMemoryStore;

    fn tuple(zone: &str, subzone: Option<&str>, store: Option<&str>, company: Option<&str>) -> LocationSelection {
        LocationSelection {
            zone: Some(zone.into()),
            subzone: subzone.map(Into::into),
            store: store.map(Into::into),
            company: company.map(Into::into),
        }
    }

    async fn service() -> ActivityService {
        let store = Arc::new(InMemoryStore::new());
        for selection in [
            tuple("Caracas", None, None, None),
            tuple("Caracas", Some("Sambil Chacao"), Some("SHOE BOX"), Some("GG CCS 2024, C.A.")),
            tuple("Caracas", Some("Sambil Chacao"), Some("FOREVER 21"), Some("HH CCS 2024, C.A.")),
            tuple("Valencia", Some("Sambil Valencia"), Some("SHOE BOX"), Some("GG VAL 2024, C.A.")),
        ] {
            store.insert_location(&selection).await.unwrap();
        }
        ActivityService::new(store, DEFAULT_STAFF.iter().map(|s| s.to_string()).collect())
    }

    fn create(description: &str) -> CreateActivityRequest {
        CreateActivityRequest {
            description: description.into(),
            status: None,
            responsible: None,
            location_id: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_create_resolves_tuple() {
        let service = service().await;
        let view = service
            .create(CreateActivityRequest {
                responsible: Some("luis".into()),
                location: Some(tuple(
                    "Caracas",
                    Some("Sambil Chacao"),
                    Some("FOREVER 21"),
                    Some("HH CCS 2024, C.A."),
                )),
                ..create("  Replace POS printer ")
            })
            .await
            .unwrap();

        assert_eq!(view.description, "Replace POS printer");
        assert_eq!(view.status, ActivityStatus::Pending);
        assert_eq!(view.responsible.as_deref(), Some("Luis"));
        assert_eq!(view.location.map(|l| l.id), Some(3));
    }

    #[tokio::test]
    async fn test_create_with_unknown_tuple_writes_nothing() {
        let service = service().await;
        let err = service
            .create(CreateActivityRequest {
                location: Some(tuple("Valencia", Some("Sambil Chacao"), None, None)),
                ..create("Check cameras")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Location(LocationError::NoMatch)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_responsible_must_be_staff() {
        let service = service().await;
        let err = service
            .create(CreateActivityRequest {
                responsible: Some("Mallory".into()),
                ..create("Check cameras")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "responsible", .. }));

        let view = service
            .create(CreateActivityRequest {
                responsible: Some("—".into()),
                ..create("Check cameras")
            })
            .await
            .unwrap();
        assert_eq!(view.responsible, None);
    }

    #[tokio::test]
    async fn test_update_keeps_untouched_location() {
        let service = service().await;
        let view = service
            .create(CreateActivityRequest {
                location_id: Some(2),
                ..create("Network audit")
            })
            .await
            .unwrap();

        let updated = service
            .update(
                view.id,
                UpdateActivityRequest {
                    status: Some(ActivityStatus::Completed),
                    location: Some(tuple(
                        "Caracas",
                        Some("Sambil Chacao"),
                        Some("SHOE BOX"),
                        Some("GG CCS 2024, C.A."),
                    )),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.map(|l| l.id), Some(2));
        assert_eq!(updated.status, ActivityStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_changed_store_requires_company() {
        let service = service().await;
        let view = service
            .create(CreateActivityRequest {
                location_id: Some(2),
                ..create("Network audit")
            })
            .await
            .unwrap();

        let err = service
            .update(
                view.id,
                UpdateActivityRequest {
                    location: Some(tuple("Caracas", Some("Sambil Chacao"), Some("FOREVER 21"), None)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Location(LocationError::Incomplete(Level::Company))
        ));

        let reloaded = service.get(view.id).await.unwrap();
        assert_eq!(reloaded.location.map(|l| l.id), Some(2));
    }

    #[tokio::test]
    async fn test_update_clear_location_and_responsible() {
        let service = service().await;
        let view = service
            .create(CreateActivityRequest {
                location_id: Some(1),
                responsible: Some("Edgar".into()),
                ..create("Printer toner")
            })
            .await
            .unwrap();

        let updated = service
            .update(
                view.id,
                UpdateActivityRequest {
                    clear_location: true,
                    responsible: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.location.is_none());
        assert!(updated.responsible.is_none());
    }

    #[tokio::test]
    async fn test_missing_activity() {
        let service = service().await;
        assert!(matches!(service.get(42).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(42).await, Err(ServiceError::NotFound(_))));
    }
}
