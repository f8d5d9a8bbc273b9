use super::*;

#[test]
fn test_position_basic() {
    let pos = Position::new(42, 3);
    assert_eq!(pos.offset, 42);
    assert_eq!(pos.line, 3);
    assert!(!pos.is_dummy());
    assert!(Position::DUMMY.is_dummy());
}

#[test]
fn test_location_display() {
    let loc = Location::new(Arc::from("site.pp"), Position::line(7));
    assert_eq!(loc.to_string(), "site.pp:7");
    assert_eq!(loc.line(), 7);
}

#[test]
fn test_position_hash() {
    use std::collections::HashSet;
    let mut set = HashSet::new();
    set.insert(Position::new(0, 1));
    set.insert(Position::new(0, 1)); // duplicate
    set.insert(Position::new(5, 2));
    assert_eq!(set.len(), 2);
}
