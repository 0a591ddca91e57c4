//! Assertion types and builders for verifying step results.

use std::fmt::Debug;

use warden_collection::{ConstrainedCollection, MutationOutcome};
use warden_core::NotifyPropertyChanged;

use crate::error::{ScenarioError, ScenarioResult};

/// What a step produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// The mutation outcome, or the rendered error. An in-place edit the
    /// collection rejected after the fact is reported as an error too.
    pub outcome: Result<MutationOutcome, String>,
    /// Properties forwarded through `on_item_property_changed` during the step.
    pub forwarded: Vec<&'static str>,
}

type CustomCheck<T, P> = Box<dyn Fn(&ConstrainedCollection<T, P>) -> bool>;

/// A complete assertion for a step result.
pub struct Assertion<T, P> {
    // Outcome assertions
    pub accepted: bool,
    pub auto_corrected: Option<usize>,

    // Collection state assertions
    pub len: Option<usize>,
    pub values: Option<Vec<P>>,
    pub subscribed: bool,

    // Notification assertions
    pub forwarded: Option<Vec<&'static str>>,

    // Error assertions
    pub error: Option<String>,
    pub error_pattern: Option<String>,

    // Custom assertion function
    pub custom: Option<CustomCheck<T, P>>,
}

impl<T, P> Default for Assertion<T, P> {
    fn default() -> Self {
        Self {
            accepted: false,
            auto_corrected: None,
            len: None,
            values: None,
            subscribed: false,
            forwarded: None,
            error: None,
            error_pattern: None,
            custom: None,
        }
    }
}

impl<T, P: Debug> Debug for Assertion<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assertion")
            .field("accepted", &self.accepted)
            .field("auto_corrected", &self.auto_corrected)
            .field("len", &self.len)
            .field("values", &self.values)
            .field("subscribed", &self.subscribed)
            .field("forwarded", &self.forwarded)
            .field("error", &self.error)
            .field("error_pattern", &self.error_pattern)
            .field("custom", &self.custom.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<T, P> Assertion<T, P>
where
    T: NotifyPropertyChanged + 'static,
    P: PartialEq + Clone + Debug + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify the assertion against a step report and the collection state
    /// after the step.
    pub fn verify(
        &self,
        scenario: &str,
        step: &str,
        report: &StepReport,
        collection: &ConstrainedCollection<T, P>,
    ) -> ScenarioResult<()> {
        let fail = |message: String| ScenarioError::assertion_failed(scenario, step, message);

        // Check error expectations first
        if let Some(ref expected_error) = self.error {
            match &report.outcome {
                Err(msg) if msg.contains(expected_error) => {}
                Err(msg) => {
                    return Err(fail(format!(
                        "expected error containing '{}', got: {}",
                        expected_error, msg
                    )))
                }
                Ok(_) => {
                    return Err(fail(format!(
                        "expected error containing '{}', but step succeeded",
                        expected_error
                    )))
                }
            }
        }

        if let Some(ref pattern) = self.error_pattern {
            let re = regex_lite::Regex::new(pattern).map_err(|e| {
                ScenarioError::invalid_assertion(step, format!("invalid regex pattern: {}", e))
            })?;
            match &report.outcome {
                Err(msg) if re.is_match(msg) => {}
                Err(msg) => {
                    return Err(fail(format!(
                        "expected error matching '{}', got: {}",
                        pattern, msg
                    )))
                }
                Ok(_) => {
                    return Err(fail(format!(
                        "expected error matching '{}', but step succeeded",
                        pattern
                    )))
                }
            }
        }

        if self.error.is_none() && self.error_pattern.is_none() {
            if let Err(msg) = &report.outcome {
                return Err(fail(format!("step failed: {}", msg)));
            }
        }

        if let Ok(outcome) = &report.outcome {
            if self.accepted && *outcome != MutationOutcome::Accepted {
                return Err(fail(format!("expected plain acceptance, got {:?}", outcome)));
            }
            if let Some(expected) = self.auto_corrected {
                if outcome.corrected_index() != Some(expected) {
                    return Err(fail(format!(
                        "expected auto-correction of index {}, got {:?}",
                        expected, outcome
                    )));
                }
            }
        }

        if let Some(ref expected) = self.forwarded {
            if &report.forwarded != expected {
                return Err(fail(format!(
                    "expected forwarded notifications {:?}, got {:?}",
                    expected, report.forwarded
                )));
            }
        }

        self.verify_state(collection).map_err(fail)
    }

    fn verify_state(&self, collection: &ConstrainedCollection<T, P>) -> Result<(), String> {
        if let Some(expected) = self.len {
            if collection.len() != expected {
                return Err(format!("expected length {}, got {}", expected, collection.len()));
            }
        }

        if let Some(ref expected) = self.values {
            let binding = collection.binding();
            let actual: Vec<P> = collection.items().iter().map(|item| binding.get(item)).collect();
            if &actual != expected {
                return Err(format!(
                    "expected {} values {:?}, got {:?}",
                    binding.name(),
                    expected,
                    actual
                ));
            }
        }

        if self.subscribed && collection.subscription_count() != collection.len() {
            return Err(format!(
                "expected one subscription per item ({}), got {}",
                collection.len(),
                collection.subscription_count()
            ));
        }

        if let Some(ref custom) = self.custom {
            if !custom(collection) {
                return Err("custom assertion failed".to_string());
            }
        }

        Ok(())
    }
}

/// Builder for step assertions.
pub struct AssertionBuilder<T, P> {
    assertion: Assertion<T, P>,
}

impl<T, P> AssertionBuilder<T, P> {
    pub fn new() -> Self {
        Self {
            assertion: Assertion::default(),
        }
    }

    /// Assert the step was accepted without auto-correction.
    pub fn accepted(mut self) -> Self {
        self.assertion.accepted = true;
        self
    }

    /// Assert the step reset the member now at `index`.
    pub fn auto_corrected(mut self, index: usize) -> Self {
        self.assertion.auto_corrected = Some(index);
        self
    }

    /// Assert the collection length after the step.
    pub fn len(mut self, len: usize) -> Self {
        self.assertion.len = Some(len);
        self
    }

    /// Assert the tracked values of all members, in order.
    pub fn values(mut self, values: impl IntoIterator<Item = P>) -> Self {
        self.assertion.values = Some(values.into_iter().collect());
        self
    }

    /// Assert every member is subscribed exactly once.
    pub fn subscribed(mut self) -> Self {
        self.assertion.subscribed = true;
        self
    }

    /// Assert the properties forwarded during the step, in order.
    pub fn forwarded(mut self, properties: &[&'static str]) -> Self {
        self.assertion.forwarded = Some(properties.to_vec());
        self
    }

    /// Assert nothing was forwarded during the step.
    pub fn silent(self) -> Self {
        self.forwarded(&[])
    }

    /// Assert that the step fails with an error containing the given text.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.assertion.error = Some(message.into());
        self
    }

    /// Assert that the step fails with an error matching the given regex.
    pub fn error_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.assertion.error_pattern = Some(pattern.into());
        self
    }

    /// Add a custom check of the collection after the step.
    pub fn custom<F>(mut self, check: F) -> Self
    where
        F: Fn(&ConstrainedCollection<T, P>) -> bool + 'static,
    {
        self.assertion.custom = Some(Box::new(check));
        self
    }

    pub fn build(self) -> Assertion<T, P> {
        self.assertion
    }
}

impl<T, P> Default for AssertionBuilder<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{email_addresses, EmailAddress, EmailAddresses};
    use warden_constraint::ConflictHandler;

    fn report(outcome: Result<MutationOutcome, String>) -> StepReport {
        StepReport {
            outcome,
            forwarded: Vec::new(),
        }
    }

    #[test]
    fn test_error_containing() {
        let collection = email_addresses(ConflictHandler::ThrowOnConflict, []).unwrap();
        let assertion = AssertionBuilder::new().error("same `is_default`").build();

        let ok = assertion.verify(
            "s",
            "add",
            &report(Err("Another item in the collection has the same `is_default` value.".into())),
            &collection,
        );
        let wrong = assertion.verify("s", "add", &report(Ok(MutationOutcome::Accepted)), &collection);

        assert!(ok.is_ok());
        assert!(matches!(wrong, Err(ScenarioError::AssertionFailed { .. })));
    }

    #[test]
    fn test_error_pattern_invalid_regex() {
        let collection = email_addresses(ConflictHandler::ThrowOnConflict, []).unwrap();
        let assertion = AssertionBuilder::new().error_pattern("(").build();

        let result = assertion.verify("s", "add", &report(Err("x".into())), &collection);

        assert!(matches!(result, Err(ScenarioError::InvalidAssertion { .. })));
    }

    #[test]
    fn test_state_assertions() {
        // GIVEN
        let collection = email_addresses(
            ConflictHandler::ResetOthersToDefault,
            [EmailAddress::new("a@example.com", true), EmailAddress::new("b@example.com", false)],
        )
        .unwrap();

        // WHEN
        let passing = AssertionBuilder::new()
            .len(2)
            .values([true, false])
            .subscribed()
            .custom(|c: &EmailAddresses| c.first().is_some_and(|e| e.is_default()))
            .build();
        let failing = AssertionBuilder::new().values([false, true]).build();

        // THEN
        let step = report(Ok(MutationOutcome::Accepted));
        assert!(passing.verify("s", "check", &step, &collection).is_ok());
        let err = failing.verify("s", "check", &step, &collection).unwrap_err();
        assert!(err.to_string().contains("expected is_default values"));
    }

    #[test]
    fn test_unexpected_error_fails() {
        let collection = email_addresses(ConflictHandler::ThrowOnConflict, []).unwrap();
        let assertion = AssertionBuilder::new().len(0).build();

        let result = assertion.verify("s", "add", &report(Err("boom".into())), &collection);

        assert!(result.unwrap_err().to_string().contains("step failed: boom"));
    }
}
