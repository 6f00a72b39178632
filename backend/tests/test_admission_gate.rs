//! WIP admission gate tests

use delivery_simulator_core_rs::models::WorkItemId;
use delivery_simulator_core_rs::resources::{AdmissionGate, GateError};

#[test]
fn test_unbounded_gate_admits_everything() {
    let mut gate = AdmissionGate::new(None);
    for i in 0..500 {
        assert!(gate.admit(WorkItemId(i)));
    }
    assert_eq!(gate.occupied(), 500);
    assert_eq!(gate.waiting(), 0);
}

#[test]
fn test_limit_blocks_and_hands_over_fifo() {
    let mut gate = AdmissionGate::new(Some(2));
    assert!(gate.admit(WorkItemId(0)));
    assert!(gate.admit(WorkItemId(1)));
    assert!(!gate.admit(WorkItemId(2)));
    assert!(!gate.admit(WorkItemId(3)));
    assert_eq!(gate.waiting(), 2);

    assert_eq!(gate.vacate(), Ok(Some(WorkItemId(2))));
    assert_eq!(gate.occupied(), 2);
    assert_eq!(gate.vacate(), Ok(Some(WorkItemId(3))));
    assert_eq!(gate.vacate(), Ok(None));
    assert_eq!(gate.vacate(), Ok(None));
    assert_eq!(gate.occupied(), 0);
    assert_eq!(gate.peak(), 2);
}

#[test]
fn test_new_arrival_waits_behind_queue() {
    let mut gate = AdmissionGate::new(Some(1));
    gate.admit(WorkItemId(0));
    gate.admit(WorkItemId(1));

    // Slot goes to the waiter, so a fresh arrival still blocks.
    assert_eq!(gate.vacate(), Ok(Some(WorkItemId(1))));
    assert!(!gate.admit(WorkItemId(2)));
}

#[test]
fn test_vacate_empty_gate_is_error() {
    let mut gate = AdmissionGate::new(Some(3));
    assert_eq!(gate.vacate(), Err(GateError::VacateWhileEmpty));
    assert_eq!(gate.limit(), Some(3));
}
