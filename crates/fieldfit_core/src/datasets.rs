//! Reference datasets.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    /// Corner triangle whose works are consistent with a constant field.
    Conservative,
    /// Corner triangle with inconsistent works around the loop.
    Triangle,
    /// Four points on the unit circle with unit work around the loop.
    Diamond,
}

pub fn sample_dataset(kind: SampleKind) -> DatasetSpec {
    let triangle = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
    match kind {
        SampleKind::Conservative => DatasetSpec {
            points: triangle,
            samples: vec![((0, 1), 5.0), ((0, 2), 10.0), ((1, 2), 5.0)],
        },
        SampleKind::Triangle => DatasetSpec {
            points: triangle,
            samples: vec![((0, 1), 5.0), ((0, 2), 10.0), ((1, 2), 2.5)],
        },
        SampleKind::Diamond => DatasetSpec {
            points: vec![
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![-1.0, 0.0],
                vec![0.0, -1.0],
            ],
            samples: vec![
                ((0, 2), 0.0),
                ((1, 3), 0.0),
                ((0, 1), 1.0),
                ((1, 2), 1.0),
                ((2, 3), 1.0),
                ((3, 0), 1.0),
            ],
        },
    }
}

/// `count` uniform points in `[0, 1)^dim` with one sample per unordered pair,
/// work drawn uniformly from `[0, 10)`.
pub fn random_dataset<R: Rng>(count: usize, dim: usize, rng: &mut R) -> DatasetSpec {
    let points: Vec<Vec<f64>> = (0..count)
        .map(|_| (0..dim).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let mut samples = Vec::with_capacity(count * count.saturating_sub(1) / 2);
    for i in 0..count {
        for j in (i + 1)..count {
            samples.push(((i, j), 10.0 * rng.gen::<f64>()));
        }
    }
    DatasetSpec { points, samples }
}
