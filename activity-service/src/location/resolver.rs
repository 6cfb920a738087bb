use crate::models::{Level, LocationCombination, LocationSelection};

use super::LocationError;

/// Read-only queries over a snapshot of the location catalogue.
///
/// Rows are visited in ascending id order, which fixes both the first-seen
/// order of option lists and the tie-break when a tuple is duplicated.
pub struct LocationResolver<'a> {
    rows: Vec<(&'a LocationCombination, LocationSelection)>,
}

impl<'a> LocationResolver<'a> {
    pub fn new(snapshot: &'a [LocationCombination]) -> Self {
        let mut rows: Vec<_> = snapshot.iter().map(|row| (row, row.selection())).collect();
        rows.sort_by_key(|(row, _)| row.id);
        Self { rows }
    }

    pub fn get(&self, id: i64) -> Option<&'a LocationCombination> {
        self.rows
            .iter()
            .find(|(row, _)| row.id == id)
            .map(|(row, _)| *row)
    }

    pub fn zones(&self) -> Vec<String> {
        self.options(Level::Zone, &LocationSelection::default())
    }

    pub fn subzones(&self, zone: Option<&str>) -> Vec<String> {
        self.options(Level::Subzone, &selection(zone, None, None))
    }

    pub fn stores(&self, zone: Option<&str>, subzone: Option<&str>) -> Vec<String> {
        self.options(Level::Store, &selection(zone, subzone, None))
    }

    pub fn companies(
        &self,
        zone: Option<&str>,
        subzone: Option<&str>,
        store: Option<&str>,
    ) -> Vec<String> {
        self.options(Level::Company, &selection(zone, subzone, store))
    }

    /// Distinct non-empty values for `level` among rows matching every level
    /// above it in `parents`. Empty whenever the zone is unset.
    pub fn options(&self, level: Level, parents: &LocationSelection) -> Vec<String> {
        let parents = parents.normalized();
        if level != Level::Zone && parents.zone.is_none() {
            return Vec::new();
        }

        let mut values: Vec<String> = Vec::new();
        for (_, row) in &self.rows {
            let matches = Level::ALL
                .iter()
                .take_while(|l| **l < level)
                .all(|l| row.get(*l) == parents.get(*l));
            if !matches {
                continue;
            }
            if let Some(value) = row.get(level) {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
        values
    }

    /// Id of the row matching all four levels exactly; an unset level only
    /// matches rows where that level is unset too.
    pub fn resolve(&self, selection: &LocationSelection) -> Result<i64, LocationError> {
        let wanted = selection.normalized();
        if wanted.zone.is_none() {
            return Err(LocationError::NoMatch);
        }

        self.rows
            .iter()
            .find(|(_, row)| *row == wanted)
            .map(|(row, _)| row.id)
            .ok_or(LocationError::NoMatch)
    }
}

fn selection(zone: Option<&str>, subzone: Option<&str>, store: Option<&str>) -> LocationSelection {
    LocationSelection {
        zone: zone.map(str::to_owned),
        subzone: subzone.map(str::to_owned),
        store: store.map(str::to_owned),
        company: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::test_support::{caracas_catalogue, row};

    #[test]
    fn test_zones_in_first_seen_order_by_id() {
        // Out of id order on purpose.
        let snapshot = vec![
            row(5, "Valencia", None, None, None),
            row(2, "Caracas", Some("Sambil Chacao"), None, None),
            row(9, "Caracas", None, None, None),
            row(7, "Maracay", None, None, None),
        ];
        let resolver = LocationResolver::new(&snapshot);
        assert_eq!(resolver.zones(), vec!["Caracas", "Valencia", "Maracay"]);
    }

    #[test]
    fn test_option_lists_follow_parents() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);

        assert_eq!(
            resolver.subzones(Some("Caracas")),
            vec!["Sambil Chacao", "Centro Plaza"]
        );
        assert_eq!(
            resolver.stores(Some("Caracas"), Some("Sambil Chacao")),
            vec!["SHOE BOX", "FOREVER 21", "ILAHUI"]
        );
        assert_eq!(
            resolver.companies(Some("Caracas"), Some("Sambil Chacao"), Some("FOREVER 21")),
            vec!["HH CCS 2024, C.A.", "AA CCS OUTLET 2025, C.A."]
        );
    }

    #[test]
    fn test_option_lists_empty_without_zone() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);

        assert!(resolver.subzones(None).is_empty());
        assert!(resolver.stores(None, Some("Sambil Chacao")).is_empty());
        assert!(resolver.companies(Some("  "), None, None).is_empty());
        assert!(resolver.subzones(Some("Atlantis")).is_empty());
    }

    #[test]
    fn test_resolve_exact_tuple() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);

        let id = resolver
            .resolve(&LocationSelection {
                zone: Some("Caracas".into()),
                subzone: Some("Sambil Chacao".into()),
                store: Some("SHOE BOX".into()),
                company: Some("GG CCS 2024, C.A.".into()),
            })
            .unwrap();
        assert_eq!(id, 11);
    }

    #[test]
    fn test_resolve_unset_level_matches_only_null() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);

        // Zone-only row exists.
        let zone_only = LocationSelection {
            zone: Some("Caracas".into()),
            ..Default::default()
        };
        assert_eq!(resolver.resolve(&zone_only).unwrap(), 1);

        // Store without company is not a prefix match for rows that have one.
        let missing_company = LocationSelection {
            zone: Some("Caracas".into()),
            subzone: Some("Sambil Chacao".into()),
            store: Some("SHOE BOX".into()),
            company: None,
        };
        assert_eq!(
            resolver.resolve(&missing_company),
            Err(LocationError::NoMatch)
        );
    }

    #[test]
    fn test_resolve_treats_null_markers_as_unset() {
        let snapshot = vec![row(4, "Caracas", Some("NULL"), Some(""), None)];
        let resolver = LocationResolver::new(&snapshot);

        let id = resolver
            .resolve(&LocationSelection {
                zone: Some(" Caracas ".into()),
                subzone: Some("null".into()),
                store: None,
                company: Some("".into()),
            })
            .unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn test_resolve_duplicates_picks_lowest_id() {
        let snapshot = vec![
            row(30, "Caracas", Some("Centro"), None, None),
            row(8, "Caracas", Some("Centro"), None, None),
            row(19, "Caracas", Some("Centro"), None, None),
        ];
        let resolver = LocationResolver::new(&snapshot);
        let wanted = LocationSelection {
            zone: Some("Caracas".into()),
            subzone: Some("Centro".into()),
            ..Default::default()
        };

        assert_eq!(resolver.resolve(&wanted).unwrap(), 8);
        // Idempotent.
        assert_eq!(resolver.resolve(&wanted).unwrap(), 8);
    }

    #[test]
    fn test_resolve_never_returns_non_matching_row() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);

        let probes = [
            ("Caracas", Some("Sambil Chacao"), Some("SHOE BOX"), Some("HH CCS 2024, C.A.")),
            ("Caracas", Some("Sambil Chacao"), Some("FOREVER 21"), Some("GG CCS 2024, C.A.")),
            ("Caracas", None, Some("SHOE BOX"), None),
            ("Valencia", Some("Sambil Chacao"), None, None),
        ];

        for (zone, subzone, store, company) in probes {
            let wanted = LocationSelection {
                zone: Some(zone.to_string()),
                subzone: subzone.map(str::to_string),
                store: store.map(str::to_string),
                company: company.map(str::to_string),
            };
            match resolver.resolve(&wanted) {
                Ok(id) => assert_eq!(resolver.get(id).unwrap().selection(), wanted),
                Err(e) => assert_eq!(e, LocationError::NoMatch),
            }
        }
    }

    #[test]
    fn test_resolve_requires_zone() {
        let snapshot = caracas_catalogue();
        let resolver = LocationResolver::new(&snapshot);
        assert_eq!(
            resolver.resolve(&LocationSelection::default()),
            Err(LocationError::NoMatch)
        );
    }
}
