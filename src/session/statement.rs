// src/session/statement.rs
use super::{ConsistencyLevel, SessionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub query: String,
    pub consistency_level: Option<ConsistencyLevel>,
}

impl Statement {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            consistency_level: None,
        }
    }

    pub fn with_consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = Some(level);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    Text(String),
    BigInt(i64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<Option<CqlValue>>,
}

impl Row {
    pub fn new(values: Vec<Option<CqlValue>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text value of column `index`; `Ok(None)` when the column is null.
    pub fn get_text(&self, index: usize) -> Result<Option<&str>, SessionError> {
        match self.values.get(index) {
            None => Err(SessionError::MalformedResult(format!(
                "row has {} columns, expected at least {}",
                self.values.len(),
                index + 1
            ))),
            Some(None) => Ok(None),
            Some(Some(CqlValue::Text(value))) => Ok(Some(value.as_str())),
            Some(Some(other)) => Err(SessionError::MalformedResult(format!(
                "column {} is not text: {:?}",
                index, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_text() {
        let row = Row::new(vec![
            Some(CqlValue::Text("4.0.1".into())),
            None,
            Some(CqlValue::BigInt(7)),
        ]);

        assert_eq!(row.get_text(0), Ok(Some("4.0.1")));
        assert_eq!(row.get_text(1), Ok(None));
        assert!(matches!(row.get_text(2), Err(SessionError::MalformedResult(_))));
        assert!(matches!(row.get_text(3), Err(SessionError::MalformedResult(_))));
    }
}
