//! Estimated regression terms

use serde::{Deserialize, Serialize};

/// Name of the constant term in every design
pub const INTERCEPT: &str = "const";

/// One estimated term with its inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    /// `const`, `L{lag}.{variable}` or a plain regressor name
    pub name: String,
    /// Lag parsed from an `L{lag}.` prefix
    pub lag: Option<usize>,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic for OLS, z statistic for VAR equations
    pub statistic: f64,
    pub p_value: f64,
}

impl Coefficient {
    pub fn new(name: impl Into<String>, estimate: f64, std_error: f64, statistic: f64, p_value: f64) -> Self {
        let name = name.into();
        Self {
            lag: parse_lag(&name),
            name,
            estimate,
            std_error,
            statistic,
            p_value,
        }
    }

    pub fn is_intercept(&self) -> bool {
        self.name == INTERCEPT
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Conventional significance codes
    pub fn stars(&self) -> &'static str {
        match self.p_value {
            p if p < 0.001 => "***",
            p if p < 0.01 => "**",
            p if p < 0.05 => "*",
            p if p < 0.1 => ".",
            _ => "",
        }
    }
}

fn parse_lag(name: &str) -> Option<usize> {
    let (lag, _) = name.strip_prefix('L')?.split_once('.')?;
    lag.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_parsing_and_codes() {
        let c = Coefficient::new("L12.Temperature", 0.4, 0.1, 4.0, 0.00006);
        assert_eq!(c.lag, Some(12));
        assert_eq!(c.stars(), "***");
        assert!(!c.is_intercept());

        let k = Coefficient::new(INTERCEPT, 1.0, 1.0, 1.0, 0.3);
        assert_eq!(k.lag, None);
        assert!(k.is_intercept());
        assert_eq!(k.stars(), "");
        assert!(!k.is_significant(0.05));

        assert_eq!(Coefficient::new("Lx.y", 0.0, 1.0, 0.0, 0.07).lag, None);
        assert_eq!(Coefficient::new("x", 0.0, 1.0, 0.0, 0.07).stars(), ".");
    }
}
