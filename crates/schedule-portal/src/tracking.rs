//! Analytics cookies the portal expects a real browser to carry
//! before the first request.

use chrono::Utc;
use rand::Rng;

use crate::cookies::CookieSet;

fn random_client_id(rng: &mut impl Rng) -> u64 {
    rng.random_range(1_000_000_000..10_000_000_000)
}

/// Fresh `_ga`, `_gid`, `_gat` and `_fbp` identifiers.
pub fn tracking_cookies() -> CookieSet {
    let mut rng = rand::rng();
    let now = Utc::now();
    let seconds = now.timestamp();
    let millis = now.timestamp_millis();

    let mut cookies = CookieSet::new();
    cookies.insert("_ga", format!("GA1.1.{}.{}", random_client_id(&mut rng), seconds));
    cookies.insert("_gid", format!("GA1.1.{}.{}", random_client_id(&mut rng), seconds));
    cookies.insert("_gat", "1");
    cookies.insert("_fbp", format!("fb.1.{}.{}", millis, random_client_id(&mut rng)));
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_cookie_shapes() {
        let cookies = tracking_cookies();

        let ga = cookies.get("_ga").unwrap();
        let parts: Vec<&str> = ga.split('.').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "GA1");
        assert_eq!(parts[2].len(), 10);

        assert!(cookies.get("_fbp").unwrap().starts_with("fb.1."));
        assert_eq!(cookies.get("_gat"), Some("1"));
    }

    #[test]
    fn test_identifiers_differ_between_calls() {
        let first = tracking_cookies();
        let second = tracking_cookies();
        assert_ne!(first.get("_ga"), second.get("_ga"));
    }
}
