use std::collections::BTreeMap;

/// Default scaling factors keyed by variable tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalingDefaults {
    factors: BTreeMap<String, f64>,
}

impl ScalingDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: &str, factor: f64) -> Self {
        self.set(tag, factor);
        self
    }

    /// Insert or override a default.
    pub fn set(&mut self, tag: &str, factor: f64) {
        self.factors.insert(tag.to_string(), factor);
    }

    pub fn get(&self, tag: &str) -> Option<f64> {
        self.factors.get(tag).copied()
    }

    pub fn merge(&mut self, other: &ScalingDefaults) {
        for (k, v) in &other.factors {
            self.factors.insert(k.clone(), *v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Model;

    #[test]
    fn tagged_variables_receive_defaults() {
        let mut m = Model::new();
        let p = m.add_var("feed.pressure", 101_325.0, "Pa").unwrap();
        let t = m.add_var("feed.temperature", 298.0, "K").unwrap();
        let u = m.add_var("misc", 1.0, "-").unwrap();
        m.set_tag(p, "pressure");
        m.set_tag(t, "temperature");
        m.set_scale(t, 0.5).unwrap();

        let defaults = ScalingDefaults::new()
            .with("pressure", 1e-5)
            .with("temperature", 1e-2);
        let missing = m.calculate_scaling_factors(&defaults);

        assert_eq!(missing, 1);
        assert_eq!(m.var(p).scale, Some(1e-5));
        // explicit factors win over defaults
        assert_eq!(m.var(t).scale, Some(0.5));
        assert_eq!(m.var(u).scale, None);
    }

    #[test]
    fn merge_overrides() {
        let mut a = ScalingDefaults::new().with("x", 1.0);
        a.merge(&ScalingDefaults::new().with("x", 2.0).with("y", 3.0));
        assert_eq!(a.get("x"), Some(2.0));
        assert_eq!(a.get("y"), Some(3.0));
    }
}
