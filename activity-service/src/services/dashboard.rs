//! Activity statistics for the dashboard view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::models::{Activity, ActivityStatus, LocationCombination};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub zone: Option<String>,
    pub responsible: Option<String>,
    pub status: Option<ActivityStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: ActivityStatus,
    pub count: usize,
}

/// `zone: None` counts activities without a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ZoneCount {
    pub zone: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub total: usize,
    /// Every status, in workflow order, including zero counts.
    pub by_status: Vec<StatusCount>,
    /// Sorted by zone name; the location-less bucket comes last.
    pub by_zone: Vec<ZoneCount>,
    pub responsibles: Vec<String>,
}

pub fn summarize(
    activities: &[Activity],
    locations: &[LocationCombination],
    filter: &DashboardFilter,
) -> DashboardSummary {
    let zone_of = |activity: &Activity| -> Option<&str> {
        activity
            .location_id
            .and_then(|id| locations.iter().find(|l| l.id == id))
            .map(|l| l.zone.as_str())
    };

    let wanted_zone = filter.zone.as_deref().map(str::trim).filter(|z| !z.is_empty());
    let wanted_responsible = filter
        .responsible
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let selected: Vec<&Activity> = activities
        .iter()
        .filter(|a| wanted_zone.map_or(true, |z| zone_of(a) == Some(z)))
        .filter(|a| {
            wanted_responsible.map_or(true, |r| {
                a.responsible
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(r))
            })
        })
        .filter(|a| filter.status.map_or(true, |s| a.status == s))
        .collect();

    let by_status = ActivityStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: selected.iter().filter(|a| a.status == status).count(),
        })
        .collect();

    let mut by_zone: Vec<ZoneCount> = Vec::new();
    for activity in &selected {
        let zone = zone_of(activity).map(str::to_string);
        match by_zone.iter_mut().find(|z| z.zone == zone) {
            Some(bucket) => bucket.count += 1,
            None => by_zone.push(ZoneCount { zone, count: 1 }),
        }
    }
    // Some sorts before None for Option, so flip to put the null bucket last.
    by_zone.sort_by(|a, b| match (&a.zone, &b.zone) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let responsibles: BTreeSet<&str> = selected
        .iter()
        .filter_map(|a| a.responsible.as_deref())
        .collect();

    DashboardSummary {
        total: selected.len(),
        by_status,
        by_zone,
        responsibles: responsibles.into_iter().map(str::to_string).collect(),
    }
}
