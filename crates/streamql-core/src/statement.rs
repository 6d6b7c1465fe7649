//! Compiled continuous-query statements

use crate::expr::{Comparison, Predicate, Projection};
use crate::schema::EventType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Bound on how much of the stream a query sees at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// Events from the trailing duration
    Time(Duration),
    /// The trailing N events
    Length(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    Time,
    Length,
}

impl Window {
    pub fn kind(&self) -> WindowKind {
        match self {
            Window::Time(_) => WindowKind::Time,
            Window::Length(_) => WindowKind::Length,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Window::Time(d) => Some(*d),
            Window::Length(_) => None,
        }
    }

    pub fn length(&self) -> Option<usize> {
        match self {
            Window::Length(n) => Some(*n),
            Window::Time(_) => None,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Time(d) => {
                let secs = d.as_secs();
                if secs % 60 == 0 && secs > 0 {
                    write!(f, "time({} min)", secs / 60)
                } else {
                    write!(f, "time({} sec)", secs)
                }
            }
            Window::Length(n) => write!(f, "length({})", n),
        }
    }
}

/// A fully resolved query, ready for a windowed stream engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    event_type: Arc<EventType>,
    projections: Vec<Projection>,
    window: Window,
    filter: Option<Predicate>,
}

impl Statement {
    pub fn event_type(&self) -> &Arc<EventType> {
        &self.event_type
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Filter comparisons flattened in source order; empty without a `where`.
    pub fn predicates(&self) -> Vec<&Comparison> {
        self.filter
            .as_ref()
            .map(Predicate::comparisons)
            .unwrap_or_default()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select ")?;
        for (i, p) in self.projections.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, " from {}.{}", self.event_type.name, self.window)?;
        if let Some(filter) = &self.filter {
            write!(f, " where {}", filter)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("Statement has no event type")]
    MissingEventType,

    #[error("Statement selects nothing: expected '*', count(*), a field or an aggregate")]
    EmptyProjection,

    #[error("Statement has no window: expected time(...) or length(...)")]
    MissingWindow,
}

/// Incrementally populated statement; [`build`](Self::build) checks that
/// every required part was set.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    event_type: Option<Arc<EventType>>,
    projections: Vec<Projection>,
    window: Option<Window>,
    filter: Option<Predicate>,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_event_type(&mut self, event_type: Arc<EventType>) -> &mut Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn event_type(&self) -> Option<&Arc<EventType>> {
        self.event_type.as_ref()
    }

    pub fn push_projection(&mut self, projection: Projection) -> &mut Self {
        self.projections.push(projection);
        self
    }

    pub fn extend_projections<I: IntoIterator<Item = Projection>>(&mut self, iter: I) -> &mut Self {
        self.projections.extend(iter);
        self
    }

    pub fn set_window(&mut self, window: Window) -> &mut Self {
        self.window = Some(window);
        self
    }

    pub fn set_filter(&mut self, filter: Option<Predicate>) -> &mut Self {
        self.filter = filter;
        self
    }

    pub fn build(self) -> Result<Statement, StatementError> {
        let event_type = self.event_type.ok_or(StatementError::MissingEventType)?;
        if self.projections.is_empty() {
            return Err(StatementError::EmptyProjection);
        }
        let window = self.window.ok_or(StatementError::MissingWindow)?;
        Ok(Statement {
            event_type,
            projections: self.projections,
            window,
            filter: self.filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Literal;
    use crate::schema::FieldType;

    fn event() -> Arc<EventType> {
        Arc::new(EventType::new("E").with_field("Value", FieldType::Int))
    }

    #[test]
    fn test_build_requires_event_type() {
        let mut builder = StatementBuilder::new();
        builder
            .push_projection(Projection::Count)
            .set_window(Window::Length(5));
        assert_eq!(builder.build(), Err(StatementError::MissingEventType));
    }

    #[test]
    fn test_build_requires_projection() {
        let mut builder = StatementBuilder::new();
        builder
            .set_event_type(event())
            .set_window(Window::Length(5));
        assert_eq!(builder.build(), Err(StatementError::EmptyProjection));
    }

    #[test]
    fn test_build_requires_window() {
        let mut builder = StatementBuilder::new();
        builder
            .set_event_type(event())
            .push_projection(Projection::SelectAll);
        assert_eq!(builder.build(), Err(StatementError::MissingWindow));
    }

    #[test]
    fn test_display_round_trips_shape() {
        let mut builder = StatementBuilder::new();
        builder
            .set_event_type(event())
            .push_projection(Projection::Count)
            .set_window(Window::Time(Duration::from_secs(10)))
            .set_filter(Some(
                Comparison::greater_than("Value", Literal::Int(97)).into(),
            ));
        let statement = builder.build().unwrap();
        assert_eq!(
            statement.to_string(),
            "select count(*) from E.time(10 sec) where Value > 97"
        );
        assert_eq!(statement.predicates().len(), 1);
    }

    #[test]
    fn test_window_accessors() {
        let w = Window::Time(Duration::from_secs(120));
        assert_eq!(w.kind(), WindowKind::Time);
        assert_eq!(w.duration(), Some(Duration::from_secs(120)));
        assert_eq!(w.length(), None);
        assert_eq!(w.to_string(), "time(2 min)");
        assert_eq!(Window::Length(50).to_string(), "length(50)");
    }
}
