//! Static step registry for the report flow.

use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::error::FlowError;

/// A single step of a multi-step flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct StepDescriptor {
    /// 1-based position in the flow
    pub order: u32,
    pub title: String,
    pub description: String,
    /// Short helper text shown under the step heading
    pub hint: String,
}

impl StepDescriptor {
    pub fn new(title: &str, description: &str, hint: &str) -> Self {
        Self {
            order: 0,
            title: title.to_string(),
            description: description.to_string(),
            hint: hint.to_string(),
        }
    }
}

/// Built-in report flow: category, details, location & photo, review
static REPORT_STEPS: Lazy<StepRegistry> = Lazy::new(|| {
    StepRegistry::new(vec![
        StepDescriptor::new(
            "Category",
            "What kind of problem are you reporting?",
            "Pick the category that fits best, staff can re-classify it later",
        ),
        StepDescriptor::new(
            "Details",
            "Describe the problem",
            "A short title and a few sentences help crews find and fix it faster",
        ),
        StepDescriptor::new(
            "Location & photo",
            "Where is it?",
            "Enter a street address or drop a pin, a photo is optional",
        ),
        StepDescriptor::new(
            "Review",
            "Check your report before sending",
            "You can go back to edit any step",
        ),
    ])
});

/// Ordered, immutable collection of step descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl StepRegistry {
    /// Build a registry; orders are renumbered 1..=N in the given sequence
    pub fn new(steps: Vec<StepDescriptor>) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(i, mut step)| {
                step.order = i as u32 + 1;
                step
            })
            .collect();
        Self { steps }
    }

    /// The built-in citizen report flow
    pub fn report() -> Self {
        REPORT_STEPS.clone()
    }

    pub fn list(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn get(&self, order: u32) -> Result<&StepDescriptor, FlowError> {
        order
            .checked_sub(1)
            .and_then(|i| self.steps.get(i as usize))
            .ok_or(FlowError::StepNotFound(order))
    }

    pub fn len(&self) -> u32 {
        self.steps.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, order: u32) -> bool {
        order >= 1 && order <= self.len()
    }

    pub fn is_last(&self, order: u32) -> bool {
        !self.is_empty() && order == self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_registry_is_ordered() {
        let registry = StepRegistry::report();
        let orders: Vec<u32> = registry.list().iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(registry.get(1).unwrap().title, "Category");
        assert_eq!(registry.get(4).unwrap().title, "Review");
    }

    #[test]
    fn test_get_out_of_range() {
        let registry = StepRegistry::report();
        assert!(matches!(registry.get(0), Err(FlowError::StepNotFound(0))));
        assert!(matches!(registry.get(5), Err(FlowError::StepNotFound(5))));
    }

    #[test]
    fn test_new_renumbers_orders() {
        let mut first = StepDescriptor::new("A", "a", "");
        first.order = 7;
        let registry = StepRegistry::new(vec![first, StepDescriptor::new("B", "b", "")]);
        assert_eq!(registry.get(1).unwrap().title, "A");
        assert_eq!(registry.get(2).unwrap().order, 2);
    }

    #[test]
    fn test_is_last_and_contains() {
        let registry = StepRegistry::report();
        assert!(registry.is_last(4));
        assert!(!registry.is_last(3));
        assert!(registry.contains(1));
        assert!(!registry.contains(0));
        assert!(!registry.contains(5));

        let empty = StepRegistry::new(Vec::new());
        assert!(!empty.is_last(0));
    }

    #[test]
    fn test_list_is_restartable() {
        let registry = StepRegistry::report();
        let first: Vec<_> = registry.list().iter().map(|s| s.title.clone()).collect();
        let second: Vec<_> = registry.list().iter().map(|s| s.title.clone()).collect();
        assert_eq!(first, second);
    }
}
