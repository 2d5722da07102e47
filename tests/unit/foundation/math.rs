use super::*;

#[test]
fn fnv_streaming_matches_one_shot() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"visar");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"vi");
    b.write_bytes(b"sar");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_distinguishes_signed_zero() {
    let mut a = Fnv1a64::new_default();
    a.write_f64(0.0);
    let mut b = Fnv1a64::new_default();
    b.write_f64(-0.0);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn unit_range_maps_endpoints_and_clamps() {
    assert_eq!(unit_range_to_u8(0.0, 0.0, 4.0), 0);
    assert_eq!(unit_range_to_u8(4.0, 0.0, 4.0), 255);
    assert_eq!(unit_range_to_u8(2.0, 0.0, 4.0), 128);
    assert_eq!(unit_range_to_u8(9.0, 0.0, 4.0), 255);
    assert_eq!(unit_range_to_u8(-1.0, 0.0, 4.0), 0);
    assert_eq!(unit_range_to_u8(f64::NAN, 0.0, 4.0), 0);
}
