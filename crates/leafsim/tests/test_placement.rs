use leafsim::core::cluster::ClusterState;
use leafsim::core::common::{NodeRange, NodeState};
use leafsim::core::job::{Job, JobStatus};
use leafsim::core::placement::{placement_algorithm_resolver, FirstFit, PlacementAlgorithm, PlacementEngine};

#[test]
// Two 2-node jobs on a 2-leaf cluster: both fit, the first takes the lowest
// window and the second starts at the leaf-domain boundary.
fn test_first_fit_determinism() {
    let mut cluster = ClusterState::new(8, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let a = Job::new("a", 2, 10);
    let b = Job::new("b", 2, 10);
    assert_eq!(engine.allocate(&a, &mut cluster), Some(NodeRange::new(0, 2)));
    assert_eq!(engine.allocate(&b, &mut cluster), Some(NodeRange::new(4, 2)));

    let occupancy = cluster.occupancy();
    for node in [0, 1, 4, 5] {
        assert_eq!(occupancy[node], NodeState::Occupied);
    }
    for node in [2, 3, 6, 7] {
        assert_eq!(occupancy[node], NodeState::Free);
    }

    // Both leaves are dirty now, so a third 2-node job does not fit even
    // though four nodes are still free.
    let c = Job::new("c", 2, 10);
    assert!(!engine.can_place(&c, &cluster));
    assert_eq!(cluster.occupied_count(), 4);
}

#[test]
fn test_oversized_job_never_places() {
    let cluster = ClusterState::new(8, 4);
    let algorithm = FirstFit::new();
    let job = Job::new("big", 9, 1);
    assert_eq!(algorithm.select_range(&job, &cluster), None);
}

#[test]
// A 5-node job needs two whole leaves but only occupies the first five nodes
// of its window; the sixth node stays free yet both leaves are dirty, so the
// next job lands on leaf 2.
fn test_partial_window_grant() {
    let mut cluster = ClusterState::new(12, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let a = Job::new("a", 5, 10);
    assert_eq!(engine.allocate(&a, &mut cluster), Some(NodeRange::new(0, 5)));
    assert_eq!(cluster.occupied_count(), 5);
    assert_eq!(cluster.occupancy()[5], NodeState::Free);

    let b = Job::new("b", 2, 10);
    assert_eq!(engine.allocate(&b, &mut cluster), Some(NodeRange::new(8, 2)));
}

#[test]
// A job covering the whole cluster takes the single full-width window.
fn test_whole_cluster_window() {
    let mut cluster = ClusterState::new(8, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let job = Job::new("full", 8, 1);
    assert_eq!(engine.allocate(&job, &mut cluster), Some(NodeRange::new(0, 8)));
    assert_eq!(cluster.occupied_count(), 8);

    let next = Job::new("next", 1, 1);
    assert!(!engine.can_place(&next, &cluster));
}

#[test]
fn test_release_frees_exact_range() {
    let mut cluster = ClusterState::new(8, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let a = Job::new("a", 2, 1);
    let range = engine.allocate(&a, &mut cluster).unwrap();
    assert_eq!(cluster.occupied_count(), 2);

    engine.release(range, &mut cluster);
    assert_eq!(cluster.occupied_count(), 0);
}

#[test]
fn test_can_place_does_not_mutate() {
    let cluster = ClusterState::new(8, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let job = Job::new("j", 4, 1);
    assert!(engine.can_place(&job, &cluster));
    assert_eq!(cluster.occupied_count(), 0);
}

#[test]
fn test_algorithm_resolver() {
    let cluster = ClusterState::new(8, 4);
    let algorithm = placement_algorithm_resolver("FirstFit".to_string());
    let job = Job::new("j", 4, 1);
    assert_eq!(algorithm.select_range(&job, &cluster), Some(NodeRange::new(0, 4)));
}

#[test]
#[should_panic(expected = "Can't resolve")]
fn test_unknown_algorithm() {
    placement_algorithm_resolver("BestFit".to_string());
}

#[test]
#[should_panic(expected = "does not evenly divide")]
fn test_invalid_topology() {
    ClusterState::new(10, 4);
}

#[test]
// A job is queued until it receives a placement, running until its runtime
// reaches its duration, and completed afterwards.
fn test_job_status_transitions() {
    let mut cluster = ClusterState::new(8, 4);
    let engine = PlacementEngine::new(Box::new(FirstFit::new()));

    let mut job = Job::new("j", 2, 2);
    assert_eq!(job.status(), JobStatus::Queued);

    let range = engine.allocate(&job, &mut cluster).unwrap();
    job.set_placement(range);
    assert_eq!(job.status(), JobStatus::Running);

    job.advance_runtime();
    assert_eq!(job.status(), JobStatus::Running);
    job.advance_runtime();
    assert_eq!(job.status(), JobStatus::Completed);
}

#[test]
// The display view is indexed [node within leaf][leaf domain].
fn test_occupancy_matrix() {
    let mut cluster = ClusterState::new(8, 4);
    cluster.mark_range(NodeRange::new(4, 2), NodeState::Occupied);

    let matrix = cluster.occupancy_matrix();
    assert_eq!(matrix.len(), 4);
    assert_eq!(matrix[0].len(), 2);
    assert_eq!(matrix[0][0], NodeState::Free);
    assert_eq!(matrix[0][1], NodeState::Occupied);
    assert_eq!(matrix[1][1], NodeState::Occupied);
    assert_eq!(matrix[2][1], NodeState::Free);
}
