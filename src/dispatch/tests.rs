use std::sync::atomic::{AtomicUsize, Ordering};

use crate::manager::Manager;
use crate::type_list;

type List = type_list![i32, f32, u8];

#[test]
fn apply_system_1_writes_through_matching_entities_only() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(8, 1);
    let a = mgr.add_entity(0b001, 0).unwrap();
    let _b = mgr.add_entity(0b010, 0).unwrap();
    mgr.apply_system_1::<i32, _, _>(|x| *x = 7);
    assert_eq!(*mgr.get_component::<i32, _>(a).unwrap(), 7);
}

#[test]
fn apply_system_2_runs_only_on_entities_with_both_components() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(8, 1);
    let both = mgr.add_entity(0b011, 0).unwrap();
    let _only_i32 = mgr.add_entity(0b001, 0).unwrap();
    let _only_f32 = mgr.add_entity(0b010, 0).unwrap();
    let visits = AtomicUsize::new(0);
    mgr.apply_system_2::<i32, _, f32, _, _>(|a, b| {
        *a = 1;
        *b = 2.0;
        visits.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(visits.load(Ordering::SeqCst), 1);
    assert_eq!(*mgr.get_component::<i32, _>(both).unwrap(), 1);
}

#[test]
fn apply_system_with_interface_exposes_id_and_flags() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    let id = mgr.add_entity(0b001, 0).unwrap();
    mgr.apply_system_1_with_interface::<i32, _, _>(|iface, x| {
        assert_eq!(iface.id(), id);
        iface_flag_roundtrip(iface);
        *x = 9;
    });
    assert_eq!(*mgr.get_component::<i32, _>(id).unwrap(), 9);

    fn iface_flag_roundtrip(mut iface: crate::interface::Interface<'_>) {
        iface.set_flag(3, true);
        assert!(iface.flag(3));
    }
}

#[test]
fn apply_system_interface_only_visits_every_entity() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(4, 1);
    for _ in 0..3 {
        mgr.add_entity(0, 0).unwrap();
    }
    let visits = AtomicUsize::new(0);
    mgr.apply_system_interface_only(|_iface| {
        visits.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(visits.load(Ordering::SeqCst), 3);
}

#[test]
fn dispatch_above_threshold_covers_every_matching_slot() {
    let mut mgr = Manager::<List>::with_capacity_and_workers(2000, 4);
    mgr.set_parallel_threshold(300);
    for _ in 0..1000 {
        mgr.add_entity(0b001, 0).unwrap();
    }
    let counter = std::sync::Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    mgr.apply_system_1::<i32, _, _>(move |_x| {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(counter.load(Ordering::SeqCst), 1000);
}
