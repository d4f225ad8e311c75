use super::Manager;
use crate::type_list;

type List = type_list![i32, f32, u8];

#[test]
fn add_entity_sets_mask_and_creates_components() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0b011, 0).unwrap();
    assert!(mgr.check_entity(id));
    assert!(mgr.check_component::<i32, _>(id));
    assert!(mgr.check_component::<f32, _>(id));
    assert!(!mgr.check_component::<u8, _>(id));
    assert_eq!(mgr.masks()[0], 0b011);
}

#[test]
fn add_entity_is_a_noop_past_capacity() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(2, 1);
    assert!(mgr.add_entity(0, 0).is_some());
    assert!(mgr.add_entity(0, 0).is_some());
    assert!(mgr.add_entity(0, 0).is_none());
    assert_eq!(mgr.len(), 2);
}

#[test]
fn delete_entity_removes_components_and_is_idempotent() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0b001, 0).unwrap();
    assert!(mgr.delete_entity(id));
    assert!(!mgr.check_entity(id));
    assert!(!mgr.check_component::<i32, _>(id));
    assert!(!mgr.delete_entity(id));
}

#[test]
fn delete_all_entities_clears_everything() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    mgr.add_entity(0b001, 0).unwrap();
    mgr.add_entity(0b010, 0).unwrap();
    mgr.delete_all_entities();
    assert_eq!(mgr.len(), 0);
    assert_eq!(mgr.bucket_len::<i32, _>(), 0);
}

#[test]
fn set_flag_then_get_flag_roundtrips() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0, 0).unwrap();
    assert!(!mgr.get_flag(5, id));
    mgr.set_flag(5, id, true);
    assert!(mgr.get_flag(5, id));
    mgr.set_flag(5, id, false);
    assert!(!mgr.get_flag(5, id));
}

#[test]
fn delete_filtered_entities_matches_on_msb_first_bits() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(8, 1);
    let ids: Vec<u64> = (0..5).map(|_| mgr.add_entity(0, 0).unwrap()).collect();
    mgr.set_flag(0, ids[2], true);
    mgr.set_flag(0, ids[4], true);
    let deleted = mgr.delete_filtered_entities(1, &[true]).unwrap();
    assert_eq!(deleted, 2);
    assert!(!mgr.check_entity(ids[2]));
    assert!(!mgr.check_entity(ids[4]));
    assert!(mgr.check_entity(ids[0]));
    assert!(mgr.check_entity(ids[1]));
    assert!(mgr.check_entity(ids[3]));
}

#[test]
fn delete_filtered_entities_reads_multi_bit_masks_msb_first() {
    // mask 0b101 covers bits 2 and 0; `bits` must be walked top-down, so
    // `values[0]` pairs with bit 2 and `values[1]` pairs with bit 0. Using
    // a single-bit mask can't tell msb-first and lsb-first apart — every
    // entity here has a distinct (bit2, bit0) pair so a silent flip to
    // lsb-first would delete the wrong one.
    let mut mgr = Manager::<List>::with_capacity_and_workers(8, 1);
    let neither = mgr.add_entity(0, 0b000).unwrap();
    let bit0_only = mgr.add_entity(0, 0b001).unwrap();
    let bit2_only = mgr.add_entity(0, 0b100).unwrap();
    let both = mgr.add_entity(0, 0b101).unwrap();

    // Wants bit 2 set and bit 0 clear: matches only `bit2_only`.
    let deleted = mgr.delete_filtered_entities(0b101, &[true, false]).unwrap();

    assert_eq!(deleted, 1);
    assert!(!mgr.check_entity(bit2_only));
    assert!(mgr.check_entity(neither));
    assert!(mgr.check_entity(bit0_only));
    assert!(mgr.check_entity(both));
}

#[test]
fn delete_filtered_entities_rejects_mismatched_value_count() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    mgr.add_entity(0, 0).unwrap();
    assert!(mgr.delete_filtered_entities(0b11, &[true]).is_err());
}

#[test]
fn bucket_forwards_to_the_component_store() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let a = mgr.add_entity(0b001, 0).unwrap();
    let b = mgr.add_entity(0b001, 0).unwrap();
    let owners: Vec<u64> = mgr.bucket::<i32, _>().iter().map(|w| w.owner()).collect();
    assert_eq!(owners, vec![a, b]);
}

#[test]
fn add_component_by_index_updates_mask() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0, 0).unwrap();
    assert!(mgr.add_component_by_index(1, id).is_ok());
    assert_eq!(mgr.masks()[0], 0b010);
    assert!(mgr.check_component_by_index(1, id));
}

#[test]
fn add_component_by_index_out_of_range_errors() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0, 0).unwrap();
    assert!(mgr.add_component_by_index(99, id).is_err());
}
