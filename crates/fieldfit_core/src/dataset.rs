//! Measured work samples and their cached basis-integral vectors.

use std::sync::{Arc, OnceLock};

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{construction, Result};
use crate::field::FieldModel;

/// One measurement: the work observed moving from `a` to `b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub pair: (usize, usize),
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub work: f64,
}

/// Serializable description of a dataset: points plus `(pair, work)` entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub points: Vec<Vec<f64>>,
    pub samples: Vec<((usize, usize), f64)>,
}

/// Immutable sample collection bound to at most one [`FieldModel`].
///
/// The basis-integral vector of sample `i` is computed on first access and
/// stored in slot `i`; slots are written once and never invalidated, so the
/// bound model cannot change afterwards.
#[derive(Debug)]
pub struct Dataset {
    points: Vec<Vec<f64>>,
    samples: Vec<Sample>,
    model: OnceLock<Arc<FieldModel>>,
    cache: Vec<OnceLock<Vec<f64>>>,
}

impl Dataset {
    pub fn new(points: Vec<Vec<f64>>, entries: Vec<((usize, usize), f64)>) -> Result<Self> {
        if let Some(first) = points.first() {
            let dim = first.len();
            if dim == 0 {
                return Err(construction("points must have positive dimension"));
            }
            for (idx, point) in points.iter().enumerate() {
                if point.len() != dim {
                    return Err(construction(format!(
                        "point {} has dimension {}, expected {}",
                        idx,
                        point.len(),
                        dim
                    )));
                }
                if point.iter().any(|v| !v.is_finite()) {
                    return Err(construction(format!("point {} is not finite", idx)));
                }
            }
        }

        let mut samples = Vec::with_capacity(entries.len());
        for (idx, ((i, j), work)) in entries.into_iter().enumerate() {
            let (a, b) = match (points.get(i), points.get(j)) {
                (Some(a), Some(b)) => (a.clone(), b.clone()),
                _ => {
                    return Err(construction(format!(
                        "sample {} references pair ({}, {}) but only {} points exist",
                        idx,
                        i,
                        j,
                        points.len()
                    )))
                }
            };
            if !work.is_finite() {
                return Err(construction(format!("sample {} has non-finite work", idx)));
            }
            samples.push(Sample {
                pair: (i, j),
                a,
                b,
                work,
            });
        }

        let cache = (0..samples.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            points,
            samples,
            model: OnceLock::new(),
            cache,
        })
    }

    pub fn from_spec(spec: &DatasetSpec) -> Result<Self> {
        Self::new(spec.points.clone(), spec.samples.clone())
    }

    /// Builds a dataset and binds it to `model` in one step.
    pub fn with_model(
        points: Vec<Vec<f64>>,
        entries: Vec<((usize, usize), f64)>,
        model: &Arc<FieldModel>,
    ) -> Result<Self> {
        let dataset = Self::new(points, entries)?;
        dataset.bind(model)?;
        Ok(dataset)
    }

    /// Binds the dataset to `model`.
    ///
    /// Binding again to an equal model is a no-op; any other model is rejected.
    pub fn bind(&self, model: &Arc<FieldModel>) -> Result<()> {
        for (idx, point) in self.points.iter().enumerate() {
            if point.len() != model.dim() {
                return Err(construction(format!(
                    "point {} has dimension {}, field model expects {}",
                    idx,
                    point.len(),
                    model.dim()
                )));
            }
        }

        let bound = self.model.get_or_init(|| {
            debug!(
                "bound dataset of {} samples to field model (dim={}, max_degree={})",
                self.samples.len(),
                model.dim(),
                model.max_degree()
            );
            Arc::clone(model)
        });
        if Arc::ptr_eq(bound, model) || **bound == **model {
            Ok(())
        } else {
            Err(construction(format!(
                "dataset is bound to a field model with dim={}, max_degree={}; \
                 cannot rebind to dim={}, max_degree={}",
                bound.dim(),
                bound.max_degree(),
                model.dim(),
                model.max_degree()
            )))
        }
    }

    pub fn model(&self) -> Option<&Arc<FieldModel>> {
        self.model.get()
    }

    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Dimension of the stored points, if any exist.
    pub fn dim(&self) -> Option<usize> {
        self.points.first().map(Vec::len)
    }

    /// Returns the basis-integral vector of sample `index`, computing it on
    /// first access.
    pub fn basis_vector(&self, index: usize) -> Result<&[f64]> {
        let model = self
            .model
            .get()
            .ok_or_else(|| construction("dataset is not bound to a field model"))?;
        let (sample, slot) = match (self.samples.get(index), self.cache.get(index)) {
            (Some(sample), Some(slot)) => (sample, slot),
            _ => {
                return Err(construction(format!(
                    "sample index {} out of range for {} samples",
                    index,
                    self.samples.len()
                )))
            }
        };
        if let Some(vector) = slot.get() {
            return Ok(vector);
        }
        let vector = model.line_integral_vector(&sample.a, &sample.b)?;
        Ok(slot.get_or_init(|| vector))
    }

    /// Fills every cache slot, in parallel across samples.
    pub fn precompute(&self) -> Result<()> {
        (0..self.samples.len())
            .into_par_iter()
            .try_for_each(|index| self.basis_vector(index).map(|_| ()))?;
        debug!("precomputed {} basis-integral vectors", self.samples.len());
        Ok(())
    }

    /// Number of cache slots already filled.
    pub fn cached_count(&self) -> usize {
        self.cache.iter().filter(|slot| slot.get().is_some()).count()
    }
}
