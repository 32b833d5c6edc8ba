use rocket::form::{self, FromFormField, ValueField};

/// A query filter on an enumerated field.
///
/// A value outside the enumeration still filters: it matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    Is(T),
    Unknown,
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        matches!(self, Filter::Is(wanted) if wanted == value)
    }
}

impl<T> From<T> for Filter<T> {
    fn from(value: T) -> Self {
        Filter::Is(value)
    }
}

impl<'v, T: FromFormField<'v>> FromFormField<'v> for Filter<T> {
    fn from_value(field: ValueField<'v>) -> form::Result<'v, Self> {
        Ok(T::from_value(field).map_or(Filter::Unknown, Filter::Is))
    }
}
