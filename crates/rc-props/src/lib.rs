//! rc-props: NaCl–water liquid property package.
//!
//! Provides:
//! - [`NaClParams`] and pure property correlations (density, volumetric flow,
//!   mass concentration, osmotic pressure)
//! - [`PropertyPackage`], which adds [`StateBlock`]s to a model and touches
//!   derived properties on demand
//! - [`StateValues`] for reading, fixing and propagating port states
//!
//! # Example
//!
//! ```
//! use rc_core::units::{g_per_l, gpm, k, pa};
//! use rc_props::StateValues;
//!
//! let feed = StateValues::from_flow_and_conc(gpm(2637.0), g_per_l(0.5), k(298.0), pa(101_325.0)).unwrap();
//! assert!(feed.flow_mass_h2o > 160.0);
//! ```

pub mod error;
pub mod nacl;
pub mod package;
pub mod state;

pub use error::{PropsError, PropsResult};
pub use nacl::NaClParams;
pub use package::{PackageId, PropertyPackage, StateBlock};
pub use state::StateValues;
