use serde::{Deserialize, Serialize};

/// A value that is either computed or explicitly unavailable.
///
/// Every optional output of the engine is carried as a `Metric` so that "zero" and
/// "missing" can never be confused downstream. Serialized adjacently tagged:
/// `{"status":"available","value":42.0}` or `{"status":"unavailable"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric<T> {
    Available(T),
    Unavailable,
}

impl<T> Default for Metric<T> {
    fn default() -> Self {
        Metric::Unavailable
    }
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    pub fn is_unavailable(&self) -> bool {
        !self.is_available()
    }

    pub fn as_ref(&self) -> Metric<&T> {
        match self {
            Metric::Available(v) => Metric::Available(v),
            Metric::Unavailable => Metric::Unavailable,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Available(v) => Some(v),
            Metric::Unavailable => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Metric::Available(v) => Some(v),
            Metric::Unavailable => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Metric<U> {
        match self {
            Metric::Available(v) => Metric::Available(f(v)),
            Metric::Unavailable => Metric::Unavailable,
        }
    }

    pub fn and_then<U, F: FnOnce(T) -> Metric<U>>(self, f: F) -> Metric<U> {
        match self {
            Metric::Available(v) => f(v),
            Metric::Unavailable => Metric::Unavailable,
        }
    }

    pub fn filter<P: FnOnce(&T) -> bool>(self, predicate: P) -> Metric<T> {
        match self {
            Metric::Available(v) if predicate(&v) => Metric::Available(v),
            _ => Metric::Unavailable,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Metric::Available(v) => v,
            Metric::Unavailable => default,
        }
    }
}

impl<T: Copy> Metric<T> {
    pub fn get(&self) -> Option<T> {
        match self {
            Metric::Available(v) => Some(*v),
            Metric::Unavailable => None,
        }
    }
}

impl Metric<f64> {
    /// Available only when `value` is a finite number.
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Metric::Available(value)
        } else {
            Metric::Unavailable
        }
    }

    /// Available only when `value` is finite and strictly positive.
    pub fn positive(value: f64) -> Self {
        Metric::finite(value).filter(|v| *v > 0.0)
    }
}

impl<T> From<Option<T>> for Metric<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Metric::Available(v),
            None => Metric::Unavailable,
        }
    }
}

impl<T> From<Metric<T>> for Option<T> {
    fn from(value: Metric<T>) -> Self {
        value.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_rejects_nan_and_infinity() {
        assert_eq!(Metric::finite(f64::NAN), Metric::Unavailable);
        assert_eq!(Metric::finite(f64::INFINITY), Metric::Unavailable);
        assert_eq!(Metric::finite(0.0), Metric::Available(0.0));
    }

    #[test]
    fn test_positive_keeps_zero_distinct_from_missing() {
        assert_eq!(Metric::positive(0.0), Metric::Unavailable);
        assert_eq!(Metric::positive(2.5), Metric::Available(2.5));
    }

    #[test]
    fn test_serialized_form_is_explicit() {
        let available = serde_json::to_value(Metric::Available(1.5)).unwrap();
        assert_eq!(available, serde_json::json!({"status": "available", "value": 1.5}));

        let missing = serde_json::to_value(Metric::<f64>::Unavailable).unwrap();
        assert_eq!(missing, serde_json::json!({"status": "unavailable"}));

        let back: Metric<f64> = serde_json::from_value(missing).unwrap();
        assert!(back.is_unavailable());
    }

    #[test]
    fn test_option_conversions() {
        let m: Metric<i32> = Some(3).into();
        assert_eq!(m.get(), Some(3));
        let o: Option<i32> = Metric::<i32>::Unavailable.into();
        assert_eq!(o, None);
    }
}
