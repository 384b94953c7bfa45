//! rc-components: unit-operation models for water-reclamation flowsheets.
//!
//! Every unit adds its state blocks, variables and equations to a shared
//! [`rc_model::Model`] when built and exposes them through [`UnitOp`].
//! Design variables passed in the unit's config are fixed at construction,
//! so a unit with fixed inlet states is square.
//!
//! Units:
//! - [`Feed`], [`Product`], [`StateJunction`]
//! - [`Pump`]
//! - [`ReverseOsmosis0D`]
//! - [`Ultrafiltration`]
//! - [`UvAop`] (surrogate power model)
//! - [`ChemicalAddition`]
//! - [`DeepWellInjection`]
//! - [`Separator`], [`Mixer`]

pub mod block;
pub mod chemical_addition;
pub mod common;
pub mod deep_well;
pub mod endpoints;
pub mod error;
pub mod mixer;
pub mod pump;
pub mod reverse_osmosis;
pub mod separator;
pub mod ultrafiltration;
pub mod unit;
pub mod uv_aop;

pub use block::Unit;
pub use chemical_addition::{ChemicalAddition, ChemicalConfig};
pub use deep_well::DeepWellInjection;
pub use endpoints::{Feed, Product, StateJunction};
pub use error::{ComponentError, ComponentResult};
pub use mixer::Mixer;
pub use pump::{Pump, PumpConfig, PumpSpec};
pub use reverse_osmosis::{ReverseOsmosis0D, RoConfig};
pub use separator::{Separator, validate_split_fractions};
pub use ultrafiltration::{UfConfig, Ultrafiltration};
pub use unit::{UnitKind, UnitOp, UnitPort, default_scaling};
pub use uv_aop::UvAop;
