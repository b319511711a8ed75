pub mod basis;
pub mod dataset;
pub mod datasets;
pub mod descent;
pub mod error;
pub mod field;
pub mod least_squares;
pub mod quadrature;
pub mod regressor;
/// The `fieldfit_core` crate fits polynomial vector fields to pairwise work
/// (line-integral) measurements and exposes the fit as an objective/gradient
/// pair for iterative equilibrium solvers.
///
/// Key components:
/// - **Basis**: bounded-total-degree monomial enumeration defining coefficient order.
/// - **FieldModel**: field evaluation and exact straight-segment line integrals.
/// - **Dataset**: measured point pairs with cached basis-integral vectors.
/// - **Regressor**: RMS objective and least-squares gradient over a dataset.
/// - **Drivers**: fixed-step descent and a direct SVD least-squares fit.
pub mod traits;

pub use basis::{basis_size, Basis, ExponentTuple};
pub use dataset::{Dataset, DatasetSpec, Sample};
pub use error::{FieldError, Result};
pub use field::{FieldConfig, FieldModel};
pub use regressor::Regressor;
pub use traits::Domain;
