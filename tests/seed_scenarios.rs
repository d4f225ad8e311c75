//! End-to-end scenarios exercising the manager, dispatcher, and thread pool
//! together rather than one subsystem at a time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use ecs_core::{type_list, Manager};

type Components = type_list![i32, f32, u8];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn write_through_dispatch_is_visible_to_get_component() {
    init_logging();
    let mut mgr = Manager::<Components>::with_capacity_and_workers(10, 1);
    let id = mgr.add_entity(0b001, 0).unwrap();
    mgr.apply_system_1::<i32, _, _>(|x| *x = 7);
    assert_eq!(*mgr.get_component::<i32, _>(id).unwrap(), 7);
}

#[test]
fn interface_variant_writes_the_owning_id_into_each_slot() {
    type OneComponent = type_list![i32];
    let mut mgr = Manager::<OneComponent>::with_capacity_and_workers(4, 1);
    let ids: Vec<u64> = (0..4).map(|_| mgr.add_entity(0b1, 0).unwrap()).collect();

    mgr.apply_system_1_with_interface::<i32, _, _>(|iface, x| {
        *x = iface.id() as i32;
    });

    for id in ids {
        assert_eq!(*mgr.get_component::<i32, _>(id).unwrap(), id as i32);
    }
}

#[test]
fn two_component_system_runs_on_the_single_matching_entity() {
    let mut mgr = Manager::<Components>::with_capacity_and_workers(8, 1);
    let both = mgr.add_entity(0b011, 0).unwrap();
    let _only_i32 = mgr.add_entity(0b001, 0).unwrap();
    let _only_f32 = mgr.add_entity(0b010, 0).unwrap();

    let visits = AtomicUsize::new(0);
    mgr.apply_system_2::<i32, _, f32, _, _>(|_a, _b| {
        visits.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(visits.load(Ordering::SeqCst), 1);
    assert!(mgr.check_entity(both));
}

#[test]
fn dispatch_above_parallel_threshold_visits_every_entity_exactly_once() {
    type OneComponent = type_list![i32];
    let mut mgr = Manager::<OneComponent>::with_capacity_and_workers(2000, 4);
    for _ in 0..1000 {
        mgr.add_entity(0b1, 0).unwrap();
    }
    assert!(mgr.len() > mgr.parallel_threshold());

    let counter = std::sync::Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();
    mgr.apply_system_1::<i32, _, _>(move |_x| {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(counter.load(Ordering::SeqCst), 1000);
}

#[test]
fn ten_sleeping_tasks_overlap_then_drain_then_restart() {
    let mut pool = ecs_core::ThreadPool::new(4);

    let start = Instant::now();
    let handles: Vec<_> = (0..10)
        .map(|_| pool.add_task(|_idx| std::thread::sleep(Duration::from_millis(10))))
        .collect();
    for h in handles {
        h.join();
    }
    assert!(start.elapsed() < Duration::from_millis(40));

    pool.halt_drain();
    assert_eq!(pool.size(), 0);

    pool.restart();
    assert_eq!(pool.size(), 4);
    assert!(pool.add_task(|idx| idx).join().is_some());
}

#[test]
fn flag_filtered_delete_removes_exactly_the_flagged_entities() {
    type OneComponent = type_list![i32];
    let mut mgr = Manager::<OneComponent>::with_capacity_and_workers(8, 1);
    let ids: Vec<u64> = (0..5).map(|_| mgr.add_entity(0, 0).unwrap()).collect();

    mgr.set_flag(0, ids[2], true);
    mgr.set_flag(0, ids[4], true);

    let deleted = mgr.delete_filtered_entities(1, &[true]).unwrap();

    assert_eq!(deleted, 2);
    assert!(!mgr.check_entity(ids[2]));
    assert!(!mgr.check_entity(ids[4]));
    for &id in &[ids[0], ids[1], ids[3]] {
        assert!(mgr.check_entity(id));
    }
}

#[test]
fn flag_filtered_delete_reads_a_multi_bit_mask_msb_first() {
    // A single-bit mask can't distinguish msb-first from lsb-first bit
    // ordering; this pins down the documented msb-first convention with a
    // mask covering two bits whose values differ per entity.
    type OneComponent = type_list![i32];
    let mut mgr = Manager::<OneComponent>::with_capacity_and_workers(8, 1);
    let bit2_only = mgr.add_entity(0, 0b100).unwrap();
    let bit0_only = mgr.add_entity(0, 0b001).unwrap();
    let both = mgr.add_entity(0, 0b101).unwrap();
    let neither = mgr.add_entity(0, 0b000).unwrap();

    // mask 0b101 -> bits [2, 0] read top-down; values[0] wants bit 2 set,
    // values[1] wants bit 0 clear. Only `bit2_only` satisfies both.
    let deleted = mgr.delete_filtered_entities(0b101, &[true, false]).unwrap();

    assert_eq!(deleted, 1);
    assert!(!mgr.check_entity(bit2_only));
    assert!(mgr.check_entity(bit0_only));
    assert!(mgr.check_entity(both));
    assert!(mgr.check_entity(neither));
}
