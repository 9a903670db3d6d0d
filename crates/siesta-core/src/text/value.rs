use crate::domain::{Quantity, Unit};

/// A typed capture produced by a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
    List(Vec<Value>),
    Record(Extraction),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Flattens scalars, arrays and numeric lists into a vector.
    pub fn as_array(&self) -> Option<Vec<f64>> {
        match self {
            Self::Int(_) | Self::Float(_) => self.as_f64().map(|value| vec![value]),
            Self::Array(values) => Some(values.clone()),
            Self::Matrix(rows) => Some(rows.iter().flatten().copied().collect()),
            Self::List(items) => items.iter().map(Value::as_f64).collect(),
            _ => None,
        }
    }

    /// Interprets the value as rows: a matrix, a list of numeric rows, or a
    /// single array row.
    pub fn as_rows(&self) -> Option<Vec<Vec<f64>>> {
        match self {
            Self::Matrix(rows) => Some(rows.clone()),
            Self::Array(values) => Some(vec![values.clone()]),
            Self::List(items) => items.iter().map(Value::as_array).collect(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Extraction> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, Self::List(items) if items.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: &'static str,
    pub value: Value,
    pub unit: Option<Unit>,
}

/// Named captures in the order their patterns were discovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    entries: Vec<Entry>,
}

impl Extraction {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entry(name).map(|entry| &entry.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn unit_of(&self, name: &str) -> Option<Unit> {
        self.entry(name).and_then(|entry| entry.unit)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn array(&self, name: &str) -> Option<Vec<f64>> {
        self.get(name).and_then(Value::as_array)
    }

    pub fn rows(&self, name: &str) -> Option<Vec<Vec<f64>>> {
        self.get(name).and_then(Value::as_rows)
    }

    pub fn record(&self, name: &str) -> Option<&Extraction> {
        self.get(name).and_then(Value::as_record)
    }

    /// Items of a repeating pattern; empty when the name is absent.
    pub fn list(&self, name: &str) -> &[Value] {
        self.get(name).and_then(Value::as_list).unwrap_or(&[])
    }

    pub fn records(&self, name: &str) -> impl Iterator<Item = &Extraction> + '_ {
        self.list(name).iter().filter_map(Value::as_record)
    }

    /// A scalar paired with the unit its pattern declared.
    pub fn quantity(&self, name: &str) -> Option<Quantity<f64>> {
        let entry = self.entry(name)?;
        Some(Quantity::new(entry.value.as_f64()?, entry.unit?))
    }

    /// Whether a pattern named `name` may still store a value: later
    /// definitions only fill names that are absent or hold an empty list.
    pub(crate) fn is_fillable(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_empty_list)
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: Value, unit: Option<Unit>) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) if entry.value.is_empty_list() => {
                entry.value = value;
                entry.unit = unit;
            }
            Some(_) => {}
            None => self.entries.push(Entry { name, value, unit }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Extraction, Value};
    use crate::domain::Unit;

    #[test]
    fn insert_keeps_first_value_but_fills_empty_lists() {
        let mut extraction = Extraction::default();
        extraction.insert("energy", Value::Float(-1.0), Some(Unit::ElectronVolt));
        extraction.insert("energy", Value::Float(-2.0), None);
        assert_eq!(extraction.float("energy"), Some(-1.0));
        assert_eq!(extraction.unit_of("energy"), Some(Unit::ElectronVolt));

        extraction.insert("steps", Value::List(Vec::new()), None);
        assert!(extraction.is_fillable("steps"));
        extraction.insert("steps", Value::List(vec![Value::Int(1)]), None);
        assert_eq!(extraction.list("steps").len(), 1);
        assert!(!extraction.is_fillable("steps"));
    }

    #[test]
    fn numeric_views_accept_ints_and_lists() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(4.0).as_i64(), Some(4));
        assert_eq!(Value::Float(4.5).as_i64(), None);
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Float(2.5)]).as_array(),
            Some(vec![1.0, 2.5])
        );
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Text("Si".into())]).as_array(),
            None
        );
        assert_eq!(
            Value::List(vec![
                Value::Array(vec![0.0, 0.0, 0.0]),
                Value::Array(vec![1.0, 1.0, 1.0]),
            ])
            .as_rows(),
            Some(vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]])
        );
    }

    #[test]
    fn absent_repeating_name_reads_as_empty_list() {
        let extraction = Extraction::default();
        assert!(extraction.list("step").is_empty());
        assert_eq!(extraction.records("step").count(), 0);
        assert!(extraction.quantity("energy_total").is_none());
    }
}
