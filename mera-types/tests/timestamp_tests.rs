use mera_types::HybridTimestamp;
use proptest::prelude::*;

#[test]
fn now_has_zero_logical() {
    let ts = HybridTimestamp::now();
    assert_eq!(ts.logical(), 0);
    assert!(ts.wall_time() > 0);
}

#[test]
fn ordering_by_wall_time_then_logical() {
    assert!(HybridTimestamp::new(100, 9) < HybridTimestamp::new(200, 0));
    assert!(HybridTimestamp::new(100, 0) < HybridTimestamp::new(100, 1));
    assert_eq!(HybridTimestamp::new(100, 5), HybridTimestamp::new(100, 5));
}

#[test]
fn tick_from_future_timestamp_bumps_logical() {
    // Wall time far ahead of the real clock: tick must not go backwards.
    let future = HybridTimestamp::new(u64::MAX / 2, 3);
    let next = future.tick();
    assert_eq!(next.wall_time(), future.wall_time());
    assert_eq!(next.logical(), 4);
}

#[test]
fn tick_from_past_timestamp_uses_wall_clock() {
    let past = HybridTimestamp::new(1, 7);
    let next = past.tick();
    assert!(next.wall_time() > 1);
    assert_eq!(next.logical(), 0);
}

#[test]
fn serde_shape_is_stable() {
    let ts = HybridTimestamp::new(1_700_000_000_000, 2);
    let json = serde_json::to_value(ts).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"wall_time": 1_700_000_000_000u64, "logical": 2})
    );
}

proptest! {
    #[test]
    fn tick_is_strictly_monotonic(wall in 0u64..u64::MAX / 2, logical in 0u32..1000) {
        let ts = HybridTimestamp::new(wall, logical);
        prop_assert!(ts.tick() > ts);
    }
}
