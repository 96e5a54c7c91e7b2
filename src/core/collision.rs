//! Overlap handling between particles of different clusters.
//!
//! Overlapping clusters whose combined size exactly fills the cap are merged.
//! Past the cap, one particle of the smaller cluster is marked for removal;
//! equal sizes push both particles apart instead. Below the cap nothing
//! happens and ordinary spring physics applies.

use std::collections::BTreeSet;

use crate::{
    config,
    core::{
        cluster::{Clusters, Union},
        tension::repel,
    },
    spatial::SpatialHash,
    types::Particle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Merge,
    DestroyFirst,
    DestroySecond,
    Repulse,
}

pub fn classify(size_a: usize, size_b: usize, cap: usize) -> Verdict {
    let combined = size_a + size_b;
    if combined > cap {
        match size_a.cmp(&size_b) {
            std::cmp::Ordering::Less => Verdict::DestroyFirst,
            std::cmp::Ordering::Greater => Verdict::DestroySecond,
            std::cmp::Ordering::Equal => Verdict::Repulse,
        }
    } else if combined == cap {
        Verdict::Merge
    } else {
        Verdict::Pass
    }
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub doomed: BTreeSet<usize>,
    pub merges: usize,
    pub repulsions: usize,
}

pub fn resolve_collisions(
    particles: &mut [Particle],
    clusters: &mut Clusters,
    spatial: &SpatialHash,
) -> Resolution {
    let mut resolution = Resolution::default();
    let mut nearby = Vec::new();

    for i in 0..particles.len() {
        if resolution.doomed.contains(&i) {
            continue;
        }
        spatial.query_block(particles[i].pos, &mut nearby);
        nearby.sort_unstable();
        for &j in &nearby {
            if j <= i || resolution.doomed.contains(&j) {
                continue;
            }
            let reach = particles[i].radius + particles[j].radius;
            if particles[i].pos.distance(particles[j].pos) >= reach {
                continue;
            }
            if clusters.same_cluster(i, j) {
                continue;
            }
            let size_i = clusters.size_of(i);
            let size_j = clusters.size_of(j);
            match classify(size_i, size_j, config::MAX_CLUSTER_SIZE) {
                Verdict::Pass => {}
                Verdict::Merge => {
                    if clusters.merge(i, j) == Union::Joined {
                        resolution.merges += 1;
                    }
                }
                Verdict::DestroyFirst => {
                    resolution.doomed.insert(i);
                    break;
                }
                Verdict::DestroySecond => {
                    resolution.doomed.insert(j);
                }
                Verdict::Repulse => {
                    repel(particles, i, j, config::COLLISION_IMPULSE);
                    resolution.repulsions += 1;
                }
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tone, Vec2};

    fn particle(x: f32, y: f32) -> Particle {
        Particle {
            id: 0,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            radius: 3.0,
            tone: Tone::Dim,
        }
    }

    /// Two groups laid out side by side; the last member of `a` overlaps the first of `b`.
    fn touching_groups(size_a: usize, size_b: usize) -> (Vec<Particle>, Clusters) {
        let mut particles = Vec::new();
        for k in 0..size_a {
            particles.push(particle(100.0 - 20.0 * (size_a - 1 - k) as f32, 100.0));
        }
        for k in 0..size_b {
            particles.push(particle(104.0 + 20.0 * k as f32, 100.0));
        }
        let a: Vec<usize> = (0..size_a).collect();
        let b: Vec<usize> = (size_a..size_a + size_b).collect();
        let clusters = Clusters::from_groups(size_a + size_b, &[&a, &b]);
        (particles, clusters)
    }

    fn resolve(particles: &mut [Particle], clusters: &mut Clusters) -> Resolution {
        let positions: Vec<Vec2> = particles.iter().map(|p| p.pos).collect();
        let spatial = SpatialHash::build(config::CONNECTION_RADIUS, &positions);
        resolve_collisions(particles, clusters, &spatial)
    }

    mod classify_fn {
        use super::*;

        #[test]
        fn over_cap_destroys_smaller() {
            assert_eq!(classify(2, 4, 5), Verdict::DestroyFirst);
            assert_eq!(classify(4, 2, 5), Verdict::DestroySecond);
        }

        #[test]
        fn over_cap_tie_repulses() {
            assert_eq!(classify(3, 3, 5), Verdict::Repulse);
        }

        #[test]
        fn exact_cap_merges() {
            assert_eq!(classify(2, 3, 5), Verdict::Merge);
        }

        #[test]
        fn under_cap_passes() {
            assert_eq!(classify(1, 2, 5), Verdict::Pass);
        }
    }

    mod resolve_fn {
        use super::*;

        #[test]
        fn uneven_overlap_dooms_one_from_smaller() {
            let (mut particles, mut clusters) = touching_groups(4, 2);
            let resolution = resolve(&mut particles, &mut clusters);
            assert_eq!(resolution.doomed.len(), 1);
            let doomed = *resolution.doomed.iter().next().unwrap();
            assert!(doomed >= 4, "doomed {doomed} should be in the smaller cluster");
        }

        #[test]
        fn equal_overlap_repulses_both() {
            let (mut particles, mut clusters) = touching_groups(3, 3);
            let resolution = resolve(&mut particles, &mut clusters);
            assert!(resolution.doomed.is_empty());
            assert_eq!(resolution.repulsions, 1);
            assert!(particles[2].vel.x < 0.0);
            assert!(particles[3].vel.x > 0.0);
        }

        #[test]
        fn exact_fit_hijacks() {
            let (mut particles, mut clusters) = touching_groups(2, 3);
            let resolution = resolve(&mut particles, &mut clusters);
            assert_eq!(resolution.merges, 1);
            assert!(resolution.doomed.is_empty());
            assert!(clusters.same_cluster(0, 4));
            assert_eq!(clusters.size_of(0), 5);
        }

        #[test]
        fn small_overlap_does_nothing() {
            let (mut particles, mut clusters) = touching_groups(1, 2);
            let resolution = resolve(&mut particles, &mut clusters);
            assert_eq!(resolution.merges, 0);
            assert_eq!(resolution.repulsions, 0);
            assert!(resolution.doomed.is_empty());
            assert!(particles.iter().all(|p| p.vel == Vec2::ZERO));
        }

        #[test]
        fn separated_clusters_are_ignored() {
            let (mut particles, mut clusters) = touching_groups(4, 2);
            for p in particles.iter_mut().skip(4) {
                p.pos.x += 50.0;
            }
            let resolution = resolve(&mut particles, &mut clusters);
            assert!(resolution.doomed.is_empty());
        }

        #[test]
        fn particle_overlapping_two_members_is_doomed_once() {
            // Singleton 5 overlaps members 0 and 1 of a full cluster.
            let mut particles = vec![
                particle(100.0, 100.0),
                particle(104.0, 100.0),
                particle(160.0, 100.0),
                particle(180.0, 100.0),
                particle(200.0, 100.0),
                particle(102.0, 103.0),
            ];
            let mut clusters = Clusters::from_groups(6, &[&[0, 1, 2, 3, 4]]);
            let resolution = resolve(&mut particles, &mut clusters);
            assert_eq!(resolution.doomed.iter().copied().collect::<Vec<_>>(), vec![5]);
            assert_eq!(resolution.repulsions, 0);
        }
    }
}
