//! Compilation context
//!
//! Carries the placeholder counter, the value marshaller and the target
//! expression keyword through one compilation. Several compilations in the
//! same request share one context (or use distinct offsets) so their
//! placeholders never collide.

use crate::condition::{ConditionError, ConditionResult};
use crate::value::ValueMarshaller;

/// Expression slot a condition is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKeyword {
    /// Query/scan filter. Compiled to a token list so key clauses can be lifted out.
    Filter,
    /// Conditional write guard. Compiled straight to a string.
    Condition,
}

impl ExpressionKeyword {
    /// Request field name
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionKeyword::Filter => "FilterExpression",
            ExpressionKeyword::Condition => "ConditionExpression",
        }
    }

    /// Whether results keep their token form
    pub fn returns_tokens(&self) -> bool {
        matches!(self, ExpressionKeyword::Filter)
    }
}

/// Monotonic placeholder index allocator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderCounter {
    next: u32,
}

impl PlaceholderCounter {
    /// Counter whose first allocation is `offset`
    pub fn starting_at(offset: u32) -> Self {
        Self { next: offset }
    }

    /// Allocates the next index. Fails once the index space is used up.
    pub fn allocate(&mut self) -> ConditionResult<u32> {
        let index = self.next;
        self.next = index
            .checked_add(1)
            .ok_or_else(|| ConditionError::placeholder_overflow(index))?;
        Ok(index)
    }

    /// Index the next allocation will return
    pub fn peek(&self) -> u32 {
        self.next
    }
}

/// State shared by every compilation within one request
pub struct CompileContext<'a> {
    counter: PlaceholderCounter,
    marshaller: &'a dyn ValueMarshaller,
    keyword: ExpressionKeyword,
}

impl<'a> CompileContext<'a> {
    /// Creates a context whose counter starts at zero
    pub fn new(marshaller: &'a dyn ValueMarshaller, keyword: ExpressionKeyword) -> Self {
        Self {
            counter: PlaceholderCounter::default(),
            marshaller,
            keyword,
        }
    }

    /// Starts the counter at `offset`
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.counter = PlaceholderCounter::starting_at(offset);
        self
    }

    /// Current counter state
    pub fn counter(&self) -> PlaceholderCounter {
        self.counter
    }

    /// Allocates one placeholder index outside of a condition
    pub fn allocate(&mut self) -> ConditionResult<u32> {
        self.counter.allocate()
    }

    /// Replaces the counter after a successful compilation
    pub(crate) fn commit(&mut self, counter: PlaceholderCounter) {
        self.counter = counter;
    }

    pub fn marshaller(&self) -> &'a dyn ValueMarshaller {
        self.marshaller
    }

    pub fn keyword(&self) -> ExpressionKeyword {
        self.keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::JsonMarshaller;

    #[test]
    fn test_counter_offset() {
        let mut counter = PlaceholderCounter::starting_at(5);
        assert_eq!(counter.allocate().unwrap(), 5);
        assert_eq!(counter.allocate().unwrap(), 6);
        assert_eq!(counter.peek(), 7);
    }

    #[test]
    fn test_context_allocation() {
        let marshaller = JsonMarshaller;
        let mut ctx = CompileContext::new(&marshaller, ExpressionKeyword::Filter).with_offset(3);
        assert_eq!(ctx.allocate().unwrap(), 3);
        assert_eq!(ctx.counter().peek(), 4);
    }

    #[test]
    fn test_counter_exhaustion() {
        let mut counter = PlaceholderCounter::starting_at(u32::MAX - 1);
        assert_eq!(counter.allocate().unwrap(), u32::MAX - 1);

        let err = counter.allocate().unwrap_err();
        assert_eq!(err.code().code(), "AERO_CONDITION_PLACEHOLDER_OVERFLOW");
        assert_eq!(counter.peek(), u32::MAX);
    }

    #[test]
    fn test_keyword_names() {
        assert_eq!(ExpressionKeyword::Filter.as_str(), "FilterExpression");
        assert_eq!(ExpressionKeyword::Condition.as_str(), "ConditionExpression");
        assert!(ExpressionKeyword::Filter.returns_tokens());
        assert!(!ExpressionKeyword::Condition.returns_tokens());
    }
}
