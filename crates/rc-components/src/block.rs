//! Closed set of unit models a flowsheet can hold.

use rc_core::EqId;
use rc_model::Model;
use rc_props::PropertyPackage;

use crate::chemical_addition::ChemicalAddition;
use crate::deep_well::DeepWellInjection;
use crate::endpoints::{Feed, Product, StateJunction};
use crate::error::ComponentResult;
use crate::mixer::Mixer;
use crate::pump::Pump;
use crate::reverse_osmosis::ReverseOsmosis0D;
use crate::separator::Separator;
use crate::ultrafiltration::Ultrafiltration;
use crate::unit::{UnitKind, UnitOp, UnitPort};
use crate::uv_aop::UvAop;

#[derive(Debug, Clone)]
pub enum Unit {
    Feed(Feed),
    Product(Product),
    StateJunction(StateJunction),
    Pump(Pump),
    ReverseOsmosis(ReverseOsmosis0D),
    Ultrafiltration(Ultrafiltration),
    UvAop(UvAop),
    ChemicalAddition(ChemicalAddition),
    DeepWellInjection(DeepWellInjection),
    Separator(Separator),
    Mixer(Mixer),
}

macro_rules! dispatch {
    ($self:ident, $u:ident => $body:expr) => {
        match $self {
            Unit::Feed($u) => $body,
            Unit::Product($u) => $body,
            Unit::StateJunction($u) => $body,
            Unit::Pump($u) => $body,
            Unit::ReverseOsmosis($u) => $body,
            Unit::Ultrafiltration($u) => $body,
            Unit::UvAop($u) => $body,
            Unit::ChemicalAddition($u) => $body,
            Unit::DeepWellInjection($u) => $body,
            Unit::Separator($u) => $body,
            Unit::Mixer($u) => $body,
        }
    };
}

macro_rules! accessor {
    ($fn:ident, $variant:ident, $ty:ty) => {
        pub fn $fn(&self) -> Option<&$ty> {
            match self {
                Unit::$variant(u) => Some(u),
                _ => None,
            }
        }
    };
}

impl Unit {
    accessor!(as_feed, Feed, Feed);
    accessor!(as_product, Product, Product);
    accessor!(as_junction, StateJunction, StateJunction);
    accessor!(as_pump, Pump, Pump);
    accessor!(as_ro, ReverseOsmosis, ReverseOsmosis0D);
    accessor!(as_uf, Ultrafiltration, Ultrafiltration);
    accessor!(as_uv, UvAop, UvAop);
    accessor!(as_chemical, ChemicalAddition, ChemicalAddition);
    accessor!(as_deep_well, DeepWellInjection, DeepWellInjection);
    accessor!(as_separator, Separator, Separator);
    accessor!(as_mixer, Mixer, Mixer);
}

impl UnitOp for Unit {
    fn name(&self) -> &str {
        dispatch!(self, u => u.name())
    }

    fn kind(&self) -> UnitKind {
        dispatch!(self, u => u.kind())
    }

    fn ports(&self) -> &[UnitPort] {
        dispatch!(self, u => u.ports())
    }

    fn equations(&self) -> &[EqId] {
        dispatch!(self, u => u.equations())
    }

    fn guess_outlets(&self, model: &mut Model, pkg: &PropertyPackage) -> ComponentResult<()> {
        dispatch!(self, u => u.guess_outlets(model, pkg))
    }
}

macro_rules! from_unit {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Unit {
            fn from(u: $ty) -> Self {
                Unit::$variant(u)
            }
        }
    };
}

from_unit!(Feed, Feed);
from_unit!(Product, Product);
from_unit!(StateJunction, StateJunction);
from_unit!(Pump, Pump);
from_unit!(ReverseOsmosis0D, ReverseOsmosis);
from_unit!(Ultrafiltration, Ultrafiltration);
from_unit!(UvAop, UvAop);
from_unit!(ChemicalAddition, ChemicalAddition);
from_unit!(DeepWellInjection, DeepWellInjection);
from_unit!(Separator, Separator);
from_unit!(Mixer, Mixer);

#[cfg(test)]
mod tests {
    use super::*;
    use rc_core::PackageId;

    #[test]
    fn enum_delegates_to_unit() {
        let pkg = PropertyPackage::nacl(PackageId(0));
        let mut m = Model::new();
        let unit: Unit = StateJunction::build(&mut m, &pkg, "j").unwrap().into();
        assert_eq!(unit.name(), "j");
        assert_eq!(unit.kind(), UnitKind::StateJunction);
        assert_eq!(unit.equations().len(), 4);
        assert!(unit.port("outlet").is_some());
        assert!(unit.as_junction().is_some());
        assert!(unit.as_pump().is_none());
    }
}
