//! Validated input value objects.
//!
//! A [`ProductSet`] and a [`ConstraintSet`] are immutable once built; the
//! constructors are the only way in, so every instance is non-empty and holds
//! finite numbers. Serde deserialization goes through the same constructors.

use crate::Error;

/// A product that can be manufactured.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Display label, also used as an axis title. Empty names are replaced by `P{n}`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Profit earned per unit produced
    pub unit_profit: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, unit_profit: f64) -> Self {
        Self {
            name: name.into(),
            unit_profit,
        }
    }
}

/// Ordered, non-empty list of products. One decision variable per product.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Product>", into = "Vec<Product>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSet {
    products: Vec<Product>,
}

impl ProductSet {
    pub fn new(mut products: Vec<Product>) -> Result<Self, Error> {
        if products.is_empty() {
            return Err(Error::NoProducts);
        }
        for (i, product) in products.iter_mut().enumerate() {
            if product.name.trim().is_empty() {
                product.name = format!("P{}", i + 1);
            }
            if !product.unit_profit.is_finite() {
                return Err(Error::NonFiniteValue(format!("profit of {}", product.name)));
            }
        }
        Ok(Self { products })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Constructors reject empty sets, so this is false for any built set.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Product> {
        self.products.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.products.iter().map(|p| p.name.clone()).collect()
    }

    pub fn profits(&self) -> Vec<f64> {
        self.products.iter().map(|p| p.unit_profit).collect()
    }
}

impl TryFrom<Vec<Product>> for ProductSet {
    type Error = Error;

    fn try_from(products: Vec<Product>) -> Result<Self, Self::Error> {
        Self::new(products)
    }
}

impl From<ProductSet> for Vec<Product> {
    fn from(set: ProductSet) -> Self {
        set.products
    }
}

impl<'a> IntoIterator for &'a ProductSet {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// A resource constraint: `sum(coefficients[i] * units[i]) <= limit`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Optional display label
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    /// Resource use per unit of each product, in product order
    pub coefficients: Vec<f64>,
    /// Resource available
    pub limit: f64,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, limit: f64) -> Self {
        Self {
            name: None,
            coefficients,
            limit,
        }
    }

    pub fn named(name: impl Into<String>, coefficients: Vec<f64>, limit: f64) -> Self {
        Self {
            name: Some(name.into()),
            coefficients,
            limit,
        }
    }

    /// Display label for the constraint at `index`.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("Constraint {}", index + 1),
        }
    }

    /// Whether `units` uses no more than `limit`, within `tolerance`.
    pub fn is_satisfied_by(&self, units: &[f64], tolerance: f64) -> bool {
        let used: f64 = self.coefficients.iter().zip(units).map(|(a, x)| a * x).sum();
        used <= self.limit + tolerance
    }
}

/// Ordered, non-empty list of constraints.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<Constraint>", into = "Vec<Constraint>"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<Constraint>) -> Result<Self, Error> {
        if constraints.is_empty() {
            return Err(Error::NoConstraints);
        }
        for (j, c) in constraints.iter().enumerate() {
            if !c.limit.is_finite() || c.coefficients.iter().any(|v| !v.is_finite()) {
                return Err(Error::NonFiniteValue(c.label(j)));
            }
        }
        Ok(Self { constraints })
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Constructors reject empty sets, so this is false for any built set.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn labels(&self) -> Vec<String> {
        self.constraints.iter().enumerate().map(|(j, c)| c.label(j)).collect()
    }

    /// Largest limit across all constraints.
    pub fn max_limit(&self) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.limit)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl TryFrom<Vec<Constraint>> for ConstraintSet {
    type Error = Error;

    fn try_from(constraints: Vec<Constraint>) -> Result<Self, Self::Error> {
        Self::new(constraints)
    }
}

impl From<ConstraintSet> for Vec<Constraint> {
    fn from(set: ConstraintSet) -> Self {
        set.constraints
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sets_rejected() {
        assert_eq!(ProductSet::new(vec![]), Err(Error::NoProducts));
        assert_eq!(ConstraintSet::new(vec![]), Err(Error::NoConstraints));
    }

    #[test]
    fn test_blank_names_get_defaults() {
        let products = ProductSet::new(vec![Product::new("", 1.0), Product::new("Chairs", 2.0)]).unwrap();
        assert_eq!(products.names(), vec!["P1", "Chairs"]);
        assert_eq!(products.profits(), vec![1.0, 2.0]);

        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0, 1.0], 4.0),
            Constraint::named("wood", vec![2.0, 1.0], 6.0),
        ])
        .unwrap();
        assert_eq!(constraints.labels(), vec!["Constraint 1", "wood"]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = ProductSet::new(vec![Product::new("A", f64::NAN)]).unwrap_err();
        assert!(matches!(err, Error::NonFiniteValue(_)));

        let err = ConstraintSet::new(vec![Constraint::new(vec![f64::INFINITY], 1.0)]).unwrap_err();
        assert_eq!(err, Error::NonFiniteValue("Constraint 1".to_string()));
    }

    #[test]
    fn test_max_limit() {
        let constraints = ConstraintSet::new(vec![
            Constraint::new(vec![1.0], -3.0),
            Constraint::new(vec![1.0], 12.0),
            Constraint::new(vec![1.0], 4.0),
        ])
        .unwrap();
        assert_eq!(constraints.max_limit(), 12.0);
    }

    #[test]
    fn test_constraint_satisfaction() {
        let c = Constraint::new(vec![3.0, 2.0], 18.0);
        assert!(c.is_satisfied_by(&[2.0, 6.0], 1e-9));
        assert!(!c.is_satisfied_by(&[2.0, 6.1], 1e-9));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let products: ProductSet = serde_json::from_str(r#"[{"unit_profit": 3}, {"name": "B", "unit_profit": 5}]"#).unwrap();
        assert_eq!(products.names(), vec!["P1", "B"]);

        let err = serde_json::from_str::<ConstraintSet>("[]").unwrap_err();
        assert!(err.to_string().contains("At least one constraint"), "{err}");
    }
}
