use rc_core::{EqId, VarId};

/// A set of equations and the free variables they are solved for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subsystem {
    equations: Vec<EqId>,
    unknowns: Vec<VarId>,
}

impl Subsystem {
    pub fn new(equations: Vec<EqId>, unknowns: Vec<VarId>) -> Self {
        Self {
            equations,
            unknowns,
        }
    }

    pub fn equations(&self) -> &[EqId] {
        &self.equations
    }

    pub fn unknowns(&self) -> &[VarId] {
        &self.unknowns
    }

    pub fn degrees_of_freedom(&self) -> i64 {
        self.unknowns.len() as i64 - self.equations.len() as i64
    }

    pub fn is_square(&self) -> bool {
        self.unknowns.len() == self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty() && self.unknowns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::Model;

    #[test]
    fn held_variables_are_not_unknowns() {
        let mut m = Model::new();
        let a = m.add_var("a", 1.0, "-").unwrap();
        let b = m.add_var("b", 1.0, "-").unwrap();
        let c = m.add_var("c", 1.0, "-").unwrap();
        let e1 = m.add_eq("e1", vec![a, b], |v| v[1] - 2.0 * v[0]);
        let e2 = m.add_eq("e2", vec![b, c], |v| v[1] - v[0] - 1.0);

        let sub = m.subsystem(&[e1, e2], &[a]);
        assert_eq!(sub.unknowns(), &[b, c]);
        assert!(sub.is_square());

        let partial = m.subsystem(&[e2], &[]);
        assert_eq!(partial.unknowns(), &[b, c]);
        assert_eq!(partial.degrees_of_freedom(), 1);
    }
}
