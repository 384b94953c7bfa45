use rc_core::VarId;

use crate::Model;

/// Named linear combination of variables, evaluated on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    pub fn term(var: VarId, coeff: f64) -> Self {
        Self {
            terms: vec![(var, coeff)],
        }
    }

    pub fn push(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn eval(&self, model: &Model) -> f64 {
        self.terms.iter().map(|(v, c)| c * model.value(*v)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_weighted_sum() {
        let mut m = Model::new();
        let a = m.add_var("a", 2.0, "W").unwrap();
        let b = m.add_var("b", 3.0, "W").unwrap();
        let mut e = LinearExpr::sum([a, b]);
        assert_eq!(e.eval(&m), 5.0);
        e.push(a, -0.5);
        assert_eq!(e.eval(&m), 4.0);
    }
}
