use fleet_dispatch::geo::{self, Coordinate};
use fleet_dispatch::model::{DeliveryId, DeliveryStop};
use fleet_dispatch::routing::nearest_neighbor_order;
use proptest::prelude::*;

/// Points around greater Nairobi.
fn nearby() -> impl Strategy<Value = Coordinate> {
    (-1.45f64..-1.15, 36.65f64..37.0).prop_map(|(lat, lng)| Coordinate::new(lat, lng))
}

fn stops(points: &[Coordinate]) -> Vec<DeliveryStop> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| DeliveryStop {
            delivery_id: DeliveryId::new(format!("D{i}")),
            location: *p,
        })
        .collect()
}

/// Plain greedy walk over indices, used as a reference.
fn greedy_indices(points: &[Coordinate], start: Coordinate) -> Vec<usize> {
    let mut left: Vec<usize> = (0..points.len()).collect();
    let mut order = Vec::new();
    let mut current = start;
    while !left.is_empty() {
        let mut pick = 0;
        for k in 1..left.len() {
            if geo::distance_km(current, points[left[k]]) < geo::distance_km(current, points[left[pick]]) {
                pick = k;
            }
        }
        let index = left.remove(pick);
        current = points[index];
        order.push(index);
    }
    order
}

proptest! {
    #[test]
    fn ordering_matches_greedy_reference(points in prop::collection::vec(nearby(), 0..12), start in nearby()) {
        let ordered = nearest_neighbor_order(stops(&points), start);
        let ids: Vec<String> = ordered.iter().map(|o| o.stop.delivery_id.to_string()).collect();
        let expected: Vec<String> = greedy_indices(&points, start).into_iter().map(|i| format!("D{i}")).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn ordering_is_a_permutation(points in prop::collection::vec(nearby(), 0..12), start in nearby()) {
        let ordered = nearest_neighbor_order(stops(&points), start);
        prop_assert_eq!(ordered.len(), points.len());
        let mut ids: Vec<DeliveryId> = ordered.into_iter().map(|o| o.stop.delivery_id).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), points.len());
    }

    #[test]
    fn leg_distances_sum_to_path_length(points in prop::collection::vec(nearby(), 1..12), start in nearby()) {
        let ordered = nearest_neighbor_order(stops(&points), start);
        let mut path = vec![start];
        path.extend(ordered.iter().map(|o| o.stop.location));
        let legs: f64 = ordered.iter().map(|o| o.distance_from_previous_km).sum();
        // each leg is rounded to 2 decimals
        prop_assert!((legs - geo::path_length_km(&path)).abs() <= 0.005 * ordered.len() as f64 + 1e-9);
    }

    #[test]
    fn stepping_never_moves_away(from in nearby(), to in nearby(), step in 0.5f64..3.0) {
        let mut here = from;
        let mut remaining = geo::distance_km(here, to);
        for _ in 0..200 {
            here = geo::step_toward(here, to, step);
            let next = geo::distance_km(here, to);
            prop_assert!(next <= remaining + 1e-9);
            remaining = next;
            if here == to {
                break;
            }
        }
        prop_assert_eq!(here, to);
    }
}
