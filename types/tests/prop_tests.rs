use proptest::prelude::*;

use velock_types::{TimestampNs, YoctoNear};

proptest! {
    /// YoctoNear decimal-string parse is the inverse of to_string on raw.
    #[test]
    fn amount_decimal_string_roundtrip(raw in any::<u128>()) {
        let parsed: YoctoNear = raw.to_string().parse().unwrap();
        prop_assert_eq!(parsed.raw(), raw);
    }

    /// YoctoNear serde JSON form is always a string, never a number.
    #[test]
    fn amount_serializes_as_string(raw in any::<u128>()) {
        let json = serde_json::to_value(YoctoNear::new(raw)).unwrap();
        prop_assert!(json.is_string());
        let back: YoctoNear = serde_json::from_value(json).unwrap();
        prop_assert_eq!(back.raw(), raw);
    }

    /// is_zero is true only for the exact zero amount.
    #[test]
    fn amount_is_zero_correct(raw in any::<u128>()) {
        prop_assert_eq!(YoctoNear::new(raw).is_zero(), raw == 0);
    }

    /// Timestamp ordering mirrors the underlying nanosecond ordering, and a
    /// deadline is reached exactly when now >= deadline.
    #[test]
    fn timestamp_reached_matches_ordering(deadline in any::<u64>(), now in any::<u64>()) {
        let d = TimestampNs::new(deadline);
        let n = TimestampNs::new(now);
        prop_assert_eq!(d.is_reached(n), now >= deadline);
        prop_assert_eq!(d.remaining_since(n), deadline.saturating_sub(now));
    }
}
