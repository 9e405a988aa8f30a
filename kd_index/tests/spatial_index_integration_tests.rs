//! Integration tests for SpatialIndex through the public kd3d API
//!
//! Moving entities are shared `Rc` handles whose positions change out of band,
//! the way an owning simulation would use the index.
//!
//! Run with: cargo test --test spatial_index_integration_tests

use kd_index::glam::Vec3;
use kd_index::kd3d::{Error, IndexConfig, Positioned, SpatialIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// TEST ENTITY
// ============================================================================

struct Body {
    name: String,
    position: Cell<Vec3>,
}

impl Body {
    fn new(name: &str, position: Vec3) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            position: Cell::new(position),
        })
    }
}

impl Positioned for Body {
    fn position(&self) -> Vec3 {
        self.position.get()
    }
}

fn random_in_sphere(rng: &mut StdRng, radius: f32) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0f32..1.0),
            rng.random_range(-1.0f32..1.0),
            rng.random_range(-1.0f32..1.0),
        );
        if v.length_squared() <= 1.0 {
            return v * radius;
        }
    }
}

fn brute_force<'a>(bodies: impl IntoIterator<Item = &'a Rc<Body>>, query: Vec3) -> Option<&'a Rc<Body>> {
    bodies.into_iter().min_by(|a, b| {
        query
            .distance_squared(a.position())
            .total_cmp(&query.distance_squared(b.position()))
    })
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_integration_three_bodies_move_and_rebuild() {
    let origin = Body::new("origin", Vec3::new(0.0, 0.0, 0.0));
    let unit_x = Body::new("unit_x", Vec3::new(1.0, 0.0, 0.0));
    let up = Body::new("up", Vec3::new(0.0, 2.0, 0.0));

    let mut index = SpatialIndex::new();
    index.add_all([origin.clone(), unit_x.clone(), up.clone()]);

    let query = Vec3::new(0.1, 0.0, 0.0);
    assert_eq!(index.find_closest(query).unwrap().name, "origin");

    origin.position.set(Vec3::splat(10.0));
    index.update_positions();
    assert_eq!(index.find_closest(query).unwrap().name, "unit_x");
}

#[test]
fn test_integration_thousand_bodies_in_sphere() {
    let mut rng = StdRng::seed_from_u64(1000);
    let bodies: Vec<Rc<Body>> = (0..1000)
        .map(|i| Body::new(&format!("body{}", i), random_in_sphere(&mut rng, 100.0)))
        .collect();

    let mut index: SpatialIndex<Rc<Body>> = bodies.iter().cloned().collect();
    assert_eq!(index.len(), 1000);

    for _ in 0..100 {
        let query = random_in_sphere(&mut rng, 100.0);
        let expected = brute_force(&bodies, query).unwrap();
        let hit = index.find_closest(query).unwrap();
        assert!(
            Rc::ptr_eq(hit, expected),
            "query {:?}: got {}, expected {}",
            query,
            hit.name,
            expected.name
        );
    }

    let stats = index.stats();
    assert_eq!(stats.queries, 100);
    assert!(stats.average_search_length > 0.0);
    // A random insertion order keeps searches far below a full scan.
    assert!(stats.last_search_length < 1000);
}

#[test]
fn test_integration_claim_and_respawn_cycle() {
    // Owner loop: hunters claim the nearest body, claimed bodies respawn
    // elsewhere and the owner rebuilds after every respawn.
    let mut rng = StdRng::seed_from_u64(77);
    let bodies: Vec<Rc<Body>> = (0..200)
        .map(|i| Body::new(&format!("m{}", i), random_in_sphere(&mut rng, 50.0)))
        .collect();
    let mut index: SpatialIndex<Rc<Body>> = bodies.iter().cloned().collect();

    for _ in 0..100 {
        let hunter = random_in_sphere(&mut rng, 50.0);
        let target = Rc::clone(index.find_closest(hunter).unwrap());
        assert!(Rc::ptr_eq(&target, brute_force(&bodies, hunter).unwrap()));

        target.position.set(random_in_sphere(&mut rng, 50.0));
        index.update_positions();
    }

    let names: Vec<&str> = index.iter().map(|b| b.name.as_str()).collect();
    let expected: Vec<String> = (0..200).map(|i| format!("m{}", i)).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_integration_remove_claimed_bodies() {
    let mut rng = StdRng::seed_from_u64(5);
    let bodies: Vec<Rc<Body>> = (0..60)
        .map(|i| Body::new(&format!("b{}", i), random_in_sphere(&mut rng, 20.0)))
        .collect();
    let mut index: SpatialIndex<Rc<Body>> = bodies.iter().cloned().collect();

    let removed = index.remove_all(|b| b.position().x < 0.0);
    let survivors: Vec<&Rc<Body>> = bodies.iter().filter(|b| b.position().x >= 0.0).collect();

    assert_eq!(removed, 60 - survivors.len());
    assert_eq!(index.len(), survivors.len());
    assert!(index.iter().zip(&survivors).all(|(a, b)| Rc::ptr_eq(a, b)));

    for _ in 0..30 {
        let query = random_in_sphere(&mut rng, 20.0);
        let expected = brute_force(survivors.iter().copied(), query).unwrap();
        assert!(Rc::ptr_eq(index.find_closest(query).unwrap(), expected));
    }

    assert!(index.find(|b| b.position().x < 0.0).is_none());
}

#[test]
fn test_integration_indexed_access_and_errors() {
    let mut index = SpatialIndex::with_config(IndexConfig {
        initial_capacity: 8,
        label: "bodies".to_string(),
        ..Default::default()
    })
    .unwrap();
    index.add(Body::new("a", Vec3::ZERO));
    index.add(Body::new("b", Vec3::ONE));

    assert_eq!(index.get(1).unwrap().name, "b");
    match index.get(2) {
        Err(Error::IndexOutOfRange { index: position, count }) => {
            assert_eq!(position, 2);
            assert_eq!(count, 2);
        }
        other => panic!("expected IndexOutOfRange, got {:?}", other.map(|b| b.name.clone())),
    }

    index.clear();
    assert!(index.get(0).is_err());
    assert!(index.find_closest(Vec3::ZERO).is_none());
}
