//! Property-based tests for occupancy dispatch.

mod common;

use proptest::prelude::*;
use sensorhub_core::{DeviceId, OccupancyState};

proptest! {
    /// Property: Observers see exactly the state transitions, never repeats.
    #[test]
    fn prop_notifications_match_transitions(reports in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut hub = common::recording_hub(&[1]);
        let stream: Vec<u8> = reports.iter().flat_map(|&o| common::report(1, o)).collect();

        hub.run(&mut stream.into_iter());

        let mut expected = Vec::new();
        let mut current = false;
        for &occupied in &reports {
            if occupied != current {
                expected.push(occupied);
                current = occupied;
            }
        }

        let seen: Vec<bool> = hub.observer().changes().iter().map(|c| c.occupied).collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(hub.stats().dispatch.dispatched, reports.len() as u64);
    }

    /// Property: Reports for unregistered identifiers never change any state.
    #[test]
    fn prop_unknown_devices_are_inert(ids in prop::collection::vec(2u16..=u16::MAX, 1..32)) {
        let mut hub = common::recording_hub(&[1]);
        let stream: Vec<u8> = ids.iter().flat_map(|&id| common::report(id, true)).collect();

        hub.run(&mut stream.into_iter());

        prop_assert!(hub.observer().is_empty());
        prop_assert_eq!(hub.stats().dispatch.unknown_devices, ids.len() as u64);
        prop_assert_eq!(hub.state(DeviceId::new(1)), Some(OccupancyState::Unoccupied));
    }
}
