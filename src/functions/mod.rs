use crate::errors::{FormulaError, Result};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Trait for pluggable math functions used by the expression evaluator.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> RangeInclusive<usize>;
    /// Apply the function. The evaluator checks `args.len()` against
    /// [`Function::arity`] before dispatching.
    fn call(&self, args: &[f64]) -> Result<f64>;
}

/// Thread-safe function registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The allow-list matching the calculated question type's function set.
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();
        for (name, f) in [
            ("abs", f64::abs as fn(f64) -> f64),
            ("acos", f64::acos),
            ("asin", f64::asin),
            ("atan", f64::atan),
            ("ceil", f64::ceil),
            ("cos", f64::cos),
            ("cosh", f64::cosh),
            ("deg2rad", f64::to_radians),
            ("exp", f64::exp),
            ("floor", f64::floor),
            ("log", f64::ln),
            ("log10", f64::log10),
            ("rad2deg", f64::to_degrees),
            ("sin", f64::sin),
            ("sinh", f64::sinh),
            ("sqrt", f64::sqrt),
            ("tan", f64::tan),
            ("tanh", f64::tanh),
        ] {
            registry.register(builtins::Unary { name, f });
        }
        registry.register(builtins::Binary {
            name: "atan2",
            f: f64::atan2,
        });
        registry.register(builtins::Pi);
        registry.register(builtins::Pow);
        registry.register(builtins::Fmod);
        registry.register(builtins::Round);
        registry.register(builtins::Fold {
            name: "min",
            f: f64::min,
        });
        registry.register(builtins::Fold {
            name: "max",
            f: f64::max,
        });
        registry
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(f.name(), Arc::new(f));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Function>> {
        self.inner.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }
}

pub mod builtins {
    use super::*;

    /// A plain one-argument math function.
    pub struct Unary {
        pub name: &'static str,
        pub f: fn(f64) -> f64,
    }
    impl Function for Unary {
        fn name(&self) -> &'static str {
            self.name
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=1
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            Ok((self.f)(args[0]))
        }
    }

    /// A plain two-argument math function.
    pub struct Binary {
        pub name: &'static str,
        pub f: fn(f64, f64) -> f64,
    }
    impl Function for Binary {
        fn name(&self) -> &'static str {
            self.name
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            Ok((self.f)(args[0], args[1]))
        }
    }

    /// Variadic reduction over two or more arguments (min, max).
    pub struct Fold {
        pub name: &'static str,
        pub f: fn(f64, f64) -> f64,
    }
    impl Function for Fold {
        fn name(&self) -> &'static str {
            self.name
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=usize::MAX
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            args.iter()
                .copied()
                .reduce(self.f)
                .ok_or_else(|| FormulaError::invalid(self.name, "wrong number of arguments"))
        }
    }

    pub struct Pi;
    impl Function for Pi {
        fn name(&self) -> &'static str {
            "pi"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            0..=0
        }
        fn call(&self, _args: &[f64]) -> Result<f64> {
            Ok(std::f64::consts::PI)
        }
    }

    pub struct Pow;
    impl Function for Pow {
        fn name(&self) -> &'static str {
            "pow"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            if args[0] == 0.0 && args[1] < 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(args[0].powf(args[1]))
        }
    }

    pub struct Fmod;
    impl Function for Fmod {
        fn name(&self) -> &'static str {
            "fmod"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            2..=2
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            if args[1] == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            Ok(args[0] % args[1])
        }
    }

    /// Round to the nearest integer, or to an optional decimal precision.
    pub struct Round;
    impl Function for Round {
        fn name(&self) -> &'static str {
            "round"
        }
        fn arity(&self) -> RangeInclusive<usize> {
            1..=2
        }
        fn call(&self, args: &[f64]) -> Result<f64> {
            match args {
                [x] => Ok(x.round()),
                [x, precision] => {
                    let scale = 10f64.powi(*precision as i32);
                    Ok((x * scale).round() / scale)
                }
                _ => unreachable!("arity checked by the evaluator"),
            }
        }
    }
}
