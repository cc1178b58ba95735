//! Parameter matrices expanded into cases.
//!
//! A matrix is a list of axes. A single-name axis contributes one parameter
//! per value; a multi-name axis contributes one zipped row of parameters
//! (the `"frequency, scale"` form). [`Matrix::expand`] yields the cross
//! product with the first axis outermost.

use core::fmt;

use sdr_hil_errors::ValidationError;
use serde_json::Value;

use crate::case::Case;

type Filter = Box<dyn Fn(&Case) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
struct Axis {
    names: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Builder for a cross product of parameter axes.
#[derive(Default)]
pub struct Matrix {
    axes: Vec<Axis>,
    filters: Vec<Filter>,
}

impl Matrix {
    /// Empty matrix; expands to one case without parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-name axis.
    pub fn param<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.axes.push(Axis {
            names: vec![name.to_string()],
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        });
        self
    }

    /// Add a zipped axis; each row carries one value per name.
    pub fn params<I>(mut self, names: &[&str], rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        self.axes.push(Axis {
            names: names.iter().map(|n| (*n).to_string()).collect(),
            rows: rows.into_iter().collect(),
        });
        self
    }

    /// Keep only the cases for which `predicate` holds.
    pub fn retain<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Case) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Number of axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let mut seen: Vec<&str> = Vec::new();
        for axis in &self.axes {
            for name in &axis.names {
                if seen.contains(&name.as_str()) {
                    return Err(ValidationError::DuplicateParameter(name.clone()));
                }
                seen.push(name);
            }
            if let Some(row) = axis.rows.iter().find(|r| r.len() != axis.names.len()) {
                return Err(ValidationError::RowWidth {
                    axis: axis.names.join(", "),
                    expected: axis.names.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(())
    }

    /// Expand into cases.
    pub fn expand(&self) -> Result<Vec<Case>, ValidationError> {
        self.validate()?;
        let mut cases = vec![Case::new()];
        for axis in &self.axes {
            let mut next = Vec::with_capacity(cases.len() * axis.rows.len());
            for case in &cases {
                for (index, row) in axis.rows.iter().enumerate() {
                    let mut case = case.clone();
                    for (name, value) in axis.names.iter().zip(row) {
                        case.push(name, value.clone(), index);
                    }
                    next.push(case);
                }
            }
            cases = next;
        }
        cases.retain(|case| self.filters.iter().all(|keep| keep(case)));
        Ok(cases)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("axes", &self.axes)
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_first_axis_outermost() -> Result<(), ValidationError> {
        let cases = Matrix::new()
            .param("channel", [0, 1])
            .param("scale", [0.5, 0.25])
            .expand()?;
        let ids: Vec<String> = cases.iter().map(Case::id).collect();
        assert_eq!(ids, ["0-0.5", "0-0.25", "1-0.5", "1-0.25"]);
        Ok(())
    }

    #[test]
    fn test_zipped_axis() -> Result<(), ValidationError> {
        let cases = Matrix::new()
            .param("channel", [0])
            .params(
                &["frequency", "scale"],
                [vec![json!(5_000_000), json!(0.12)], vec![json!(10_000_000), json!(0.06)]],
            )
            .expand()?;
        assert_eq!(cases.len(), 2);
        assert_eq!(cases.get(1).map(Case::id).as_deref(), Some("0-10000000-0.06"));
        Ok(())
    }

    #[test]
    fn test_row_width_mismatch() {
        let err = Matrix::new()
            .params(&["frequency", "scale"], [vec![json!(5_000_000)]])
            .expand()
            .err();
        assert!(matches!(
            err,
            Some(ValidationError::RowWidth { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = Matrix::new().param("channel", [0]).param("channel", [1]).expand().err();
        assert!(matches!(err, Some(ValidationError::DuplicateParameter(n)) if n == "channel"));
    }

    #[test]
    fn test_empty_axis_yields_nothing() -> Result<(), ValidationError> {
        let cases = Matrix::new()
            .param("channel", [0, 1])
            .param("scale", Vec::<f64>::new())
            .expand()?;
        assert!(cases.is_empty());
        Ok(())
    }

    #[test]
    fn test_no_axes_yields_single_case() -> Result<(), ValidationError> {
        let cases = Matrix::new().expand()?;
        assert_eq!(cases, vec![Case::new()]);
        Ok(())
    }

    #[test]
    fn test_retain_filters_cases() -> Result<(), ValidationError> {
        let cases = Matrix::new()
            .param("channel", [0, 1, 2, 3])
            .retain(|c| c.get("channel").and_then(Value::as_u64).is_some_and(|ch| ch >= 2))
            .expand()?;
        assert_eq!(cases.len(), 2);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_case_count_is_product(sizes in proptest::collection::vec(0usize..4, 0..4)) {
            let matrix = sizes.iter().enumerate().fold(Matrix::new(), |m, (i, n)| {
                m.param(&format!("p{i}"), 0..*n as u64)
            });
            let cases = matrix.expand()?;
            prop_assert_eq!(cases.len(), sizes.iter().product::<usize>());
        }

        #[test]
        fn prop_last_axis_varies_fastest(a in 1u64..4, b in 1u64..4) {
            let cases = Matrix::new().param("a", 0..a).param("b", 0..b).expand()?;
            for (i, case) in cases.iter().enumerate() {
                let i = i as u64;
                prop_assert_eq!(case.get("a").and_then(Value::as_u64), Some(i / b));
                prop_assert_eq!(case.get("b").and_then(Value::as_u64), Some(i % b));
            }
        }
    }
}
