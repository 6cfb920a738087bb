use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    location::{CascadeEvent, CascadeOptions, CascadeSelection, LocationResolver},
    models::{Level, LocationCombination, LocationSelection},
    services::{ServiceError, Store},
};

/// Read access to the location catalogue plus admin maintenance.
///
/// Every call works on a fresh snapshot; nothing is cached between requests.
#[derive(Clone)]
pub struct LocationService {
    store: Arc<dyn Store>,
}

impl LocationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> Result<Vec<LocationCombination>, ServiceError> {
        self.store.list_locations().await
    }

    /// Option list for `level` given the parent levels in `parents`.
    pub async fn options(
        &self,
        level: Level,
        parents: &LocationSelection,
    ) -> Result<Vec<String>, ServiceError> {
        let snapshot = self.snapshot().await?;
        let resolver = LocationResolver::new(&snapshot);
        Ok(resolver.options(level, &parents.normalized()))
    }

    /// Every option list for a selection, after walking it through the
    /// cascade so that inconsistent lower levels are rejected.
    pub async fn cascade(
        &self,
        selection: &LocationSelection,
    ) -> Result<CascadeOptions, ServiceError> {
        let snapshot = self.snapshot().await?;
        let resolver = LocationResolver::new(&snapshot);
        let cascade = walk(&resolver, selection)?;
        Ok(cascade.options(&resolver))
    }

    pub async fn resolve(&self, selection: &LocationSelection) -> Result<i64, ServiceError> {
        let snapshot = self.snapshot().await?;
        let id = LocationResolver::new(&snapshot).resolve(&selection.normalized())?;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        selection: LocationSelection,
    ) -> Result<LocationCombination, ServiceError> {
        let selection = require_zone(selection)?;
        let row = self.store.insert_location(&selection).await?;
        info!(location_id = row.id, "Location combination created");
        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        selection: LocationSelection,
    ) -> Result<LocationCombination, ServiceError> {
        let selection = require_zone(selection)?;
        let row = self
            .store
            .update_location(id, &selection)
            .await?
            .ok_or(ServiceError::NotFound("Location"))?;
        info!(location_id = id, "Location combination updated");
        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.store.delete_location(id).await? {
            return Err(ServiceError::NotFound("Location"));
        }
        info!(location_id = id, "Location combination deleted");
        Ok(())
    }
}

fn require_zone(selection: LocationSelection) -> Result<LocationSelection, ServiceError> {
    let selection = selection.normalized();
    if selection.zone.is_none() {
        return Err(ServiceError::validation("zone", "Zone is required"));
    }
    Ok(selection)
}

/// Replays a submitted selection top-down through the cascade reducer.
fn walk(
    resolver: &LocationResolver<'_>,
    selection: &LocationSelection,
) -> Result<CascadeSelection, ServiceError> {
    let selection = selection.normalized();
    let mut cascade = CascadeSelection::new();
    for level in Level::ALL {
        if let Some(value) = selection.get(level) {
            cascade = cascade.apply(resolver, CascadeEvent::select(level, value))?;
        }
    }
    Ok(cascade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationError;
    use crate::services::InMemoryStore;

    async fn seeded() -> LocationService {
        let store = Arc::new(InMemoryStore::new());
        let service = LocationService::new(store);
        for (zone, subzone, shop) in [
            ("Caracas", None, None),
            ("Caracas", Some("Sambil Chacao"), Some("SHOE BOX")),
            ("Caracas", Some("Sambil Chacao"), Some("FOREVER 21")),
            ("Valencia", Some("Sambil Valencia"), Some("SHOE BOX")),
        ] {
            service
                .create(LocationSelection {
                    zone: Some(zone.into()),
                    subzone: subzone.map(Into::into),
                    store: shop.map(Into::into),
                    company: None,
                })
                .await
                .unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_options_follow_parents() {
        let service = seeded().await;
        let parents = LocationSelection {
            zone: Some("Caracas".into()),
            subzone: Some("Sambil Chacao".into()),
            ..Default::default()
        };
        assert_eq!(
            service.options(Level::Store, &parents).await.unwrap(),
            ["SHOE BOX", "FOREVER 21"]
        );
        assert_eq!(
            service.options(Level::Zone, &LocationSelection::default()).await.unwrap(),
            ["Caracas", "Valencia"]
        );
    }

    #[tokio::test]
    async fn test_cascade_rejects_inconsistent_lower_level() {
        let service = seeded().await;
        let selection = LocationSelection {
            zone: Some("Valencia".into()),
            subzone: Some("Sambil Chacao".into()),
            ..Default::default()
        };
        let err = service.cascade(&selection).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Location(LocationError::NotAnOption { level: Level::Subzone, .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_normalizes_input() {
        let service = seeded().await;
        let id = service
            .resolve(&LocationSelection {
                zone: Some("  Caracas ".into()),
                subzone: Some("NULL".into()),
                store: Some("".into()),
                company: None,
            })
            .await
            .unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_create_requires_zone_and_rejects_duplicates() {
        let service = seeded().await;
        let err = service
            .create(LocationSelection {
                zone: Some("   ".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "zone", .. }));

        let err = service
            .create(LocationSelection {
                zone: Some("Caracas".into()),
                subzone: Some("null".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LocationExists));
    }
}
