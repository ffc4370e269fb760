//! Client-side patient filtering.
//!
//! Pure functions over the cached list: nothing here touches the network
//! or mutates the cache, so running a filter on every keystroke is safe.

use std::collections::HashSet;

use crate::models::{PatientFilter, PatientRecord};

/// Does `record` satisfy every active dimension of `filter`?
pub fn matches(record: &PatientRecord, filter: &PatientFilter) -> bool {
    let id_ok = filter.id_query.is_empty() || contains_ignore_case(&record.id, &filter.id_query);

    // Records without a phone never match a phone query.
    let phone_ok = filter.phone_query.is_empty()
        || record
            .phone
            .as_deref()
            .is_some_and(|phone| contains_ignore_case(phone, &filter.phone_query));

    let doctor_ok = filter
        .doctor
        .as_deref()
        .map_or(true, |doctor| record.doctor == doctor);

    let status_ok = filter.status.map_or(true, |status| record.status == status);

    id_ok && phone_ok && doctor_ok && status_ok
}

/// The records of `cache` that match `filter`, in cache order.
pub fn filter_patients<'a>(
    cache: &'a [PatientRecord],
    filter: &PatientFilter,
) -> Vec<&'a PatientRecord> {
    cache.iter().filter(|r| matches(r, filter)).collect()
}

/// Distinct doctor names in order of first appearance.
pub fn distinct_doctors(cache: &[PatientRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut doctors = Vec::new();
    for record in cache {
        if seen.insert(record.doctor.as_str()) {
            doctors.push(record.doctor.clone());
        }
    }
    doctors
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientStatus;

    fn cache() -> Vec<PatientRecord> {
        vec![
            PatientRecord::new("a1b2", "Asha", Some("98765"), "Dr X", PatientStatus::Pending),
            PatientRecord::new("C3D4", "Bilal", None, "Dr Y", PatientStatus::Admitted),
            PatientRecord::new("e5f6", "Chen", Some("55501"), "Dr X", PatientStatus::Discharged),
            PatientRecord::new("a1ff", "Dana", Some("55502"), "Dr Z", PatientStatus::Admitted),
        ]
    }

    /// Every filter dimension written out independently of `matches`.
    pub(super) fn satisfies_all(record: &PatientRecord, filter: &PatientFilter) -> bool {
        let id_lower = record.id.to_lowercase();
        let id_query = filter.id_query.to_lowercase();
        let phone_query = filter.phone_query.to_lowercase();

        let id_ok = id_lower.contains(&id_query);
        let phone_ok = match &record.phone {
            _ if phone_query.is_empty() => true,
            Some(phone) => phone.to_lowercase().contains(&phone_query),
            None => false,
        };
        let doctor_ok = match &filter.doctor {
            Some(doctor) => &record.doctor == doctor,
            None => true,
        };
        let status_ok = match filter.status {
            Some(status) => record.status == status,
            None => true,
        };
        id_ok && phone_ok && doctor_ok && status_ok
    }

    fn ids(records: &[&PatientRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let cache = cache();
        let result = filter_patients(&cache, &PatientFilter::default());
        assert_eq!(ids(&result), ["a1b2", "C3D4", "e5f6", "a1ff"]);
    }

    #[test]
    fn id_query_is_case_insensitive_substring() {
        let cache = cache();
        let filter = PatientFilter {
            id_query: "c3".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["C3D4"]);

        let filter = PatientFilter {
            id_query: "A1".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["a1b2", "a1ff"]);
    }

    #[test]
    fn phone_query_skips_records_without_phone() {
        let cache = cache();
        let filter = PatientFilter {
            phone_query: "555".into(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["e5f6", "a1ff"]);
    }

    #[test]
    fn doctor_and_status_are_exact() {
        let cache = cache();
        let filter = PatientFilter {
            doctor: Some("Dr X".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["a1b2", "e5f6"]);

        let filter = PatientFilter {
            doctor: Some("dr x".into()),
            ..Default::default()
        };
        assert!(filter_patients(&cache, &filter).is_empty());

        let filter = PatientFilter {
            status: Some(PatientStatus::Admitted),
            ..Default::default()
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["C3D4", "a1ff"]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let cache = cache();
        let filter = PatientFilter {
            id_query: "a1".into(),
            phone_query: "555".into(),
            doctor: Some("Dr Z".into()),
            status: Some(PatientStatus::Admitted),
        };
        assert_eq!(ids(&filter_patients(&cache, &filter)), ["a1ff"]);

        let filter = PatientFilter {
            status: Some(PatientStatus::Pending),
            doctor: Some("Dr Y".into()),
            ..Default::default()
        };
        assert!(filter_patients(&cache, &filter).is_empty());
    }

    #[test]
    fn result_is_exactly_the_matching_subset() {
        let cache = cache();
        let statuses = [None, Some(PatientStatus::Pending), Some(PatientStatus::Admitted)];
        let doctors = [None, Some("Dr X"), Some("Dr Z"), Some("Dr Q")];
        for id_query in ["", "a1", "F"] {
            for phone_query in ["", "55", "9"] {
                for doctor in doctors {
                    for status in statuses {
                        let filter = PatientFilter {
                            id_query: id_query.into(),
                            phone_query: phone_query.into(),
                            doctor: doctor.map(str::to_string),
                            status,
                        };
                        let result = filter_patients(&cache, &filter);
                        let expected: Vec<&PatientRecord> =
                            cache.iter().filter(|r| satisfies_all(r, &filter)).collect();
                        assert_eq!(result, expected, "{filter:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_cache_alone() {
        let cache = cache();
        let snapshot = cache.clone();
        let filter = PatientFilter {
            doctor: Some("Dr X".into()),
            ..Default::default()
        };
        let first = ids(&filter_patients(&cache, &filter));
        let second = ids(&filter_patients(&cache, &filter));
        assert_eq!(first, second);
        assert_eq!(cache, snapshot);
    }

    #[test]
    fn distinct_doctors_keep_first_seen_order() {
        let cache = cache();
        assert_eq!(distinct_doctors(&cache), ["Dr X", "Dr Y", "Dr Z"]);
        assert!(distinct_doctors(&[]).is_empty());
    }
}
