//! Expiry filtering of temporary grants.

use chrono::{DateTime, Utc};

use gatekeeper_core::TemporaryGrant;

/// Grants active at `now`, in their original order.
pub fn active_grants<'a>(
    grants: &'a [TemporaryGrant],
    now: DateTime<Utc>,
) -> impl Iterator<Item = &'a TemporaryGrant> + 'a {
    grants.iter().filter(move |g| g.is_active(now))
}

/// Drop grants that are not active at `now`, keeping the relative order of
/// the rest.
pub fn retain_active(mut grants: Vec<TemporaryGrant>, now: DateTime<Utc>) -> Vec<TemporaryGrant> {
    grants.retain(|g| g.is_active(now));
    grants
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn grant(name: &str, expires: DateTime<Utc>) -> TemporaryGrant {
        TemporaryGrant::new(name, expires)
    }

    #[test]
    fn test_filters_expired_and_keeps_order() {
        let now = Utc::now();
        let grants = vec![
            grant("a", now + Duration::hours(1)),
            grant("expired", now - Duration::hours(1)),
            grant("b", now + Duration::days(1)),
            grant("boundary", now),
        ];

        let names: Vec<_> = active_grants(&grants, now)
            .map(|g| g.action_name.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);

        let kept = retain_active(grants, now);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].action_name, "a");
        assert_eq!(kept[1].action_name, "b");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(active_grants(&[], Utc::now()).count(), 0);
        assert!(retain_active(Vec::new(), Utc::now()).is_empty());
    }
}
