//! Sequential code generator.
//!
//! Issues `prefix-period-NNNN` codes whose suffix is unique and strictly
//! increasing by one within each `(category, period)`. The read, increment
//! and write of a counter run as an optimistic compare-and-swap against the
//! [`SequenceStore`](crate::ports::SequenceStore); a lost race re-reads and
//! tries again, up to a fixed budget.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::code::{period_key, validate_category, CodeFamily, PeriodKey};
use crate::config::DEFAULT_MAX_ATTEMPTS;
use crate::context::ServiceContext;
use crate::error::{CodeError, StoreError};
use crate::ports::{SequenceKey, SequenceRecord};

/// A freshly issued code and the counter state it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    /// Rendered code, e.g. `LAPTOP-2501-0001`.
    pub code: String,
    /// Counter category.
    pub category: String,
    /// Counter period.
    pub period: PeriodKey,
    /// Raw sequence number behind `code`.
    pub sequence: u64,
}

/// Issues codes for one [`CodeFamily`].
pub struct CodeGenerator<'a> {
    ctx: &'a ServiceContext,
    family: CodeFamily,
    max_attempts: u32,
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator using the default retry budget.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, family: CodeFamily) -> Self {
        Self { ctx, family, max_attempts: DEFAULT_MAX_ATTEMPTS }
    }

    /// Sets how many compare-and-swap attempts one code may take (minimum 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// The family this generator renders.
    #[must_use]
    pub fn family(&self) -> &CodeFamily {
        &self.family
    }

    /// Period key for the context clock's current time.
    #[must_use]
    pub fn current_period(&self) -> PeriodKey {
        period_key(self.family.granularity, self.ctx.clock.now())
    }

    /// Issues the next code for `category` in the current period.
    ///
    /// # Errors
    ///
    /// See [`Self::next_code_in`].
    pub fn next_code(&self, category: &str) -> Result<IssuedCode, CodeError> {
        self.next_code_with(category, || self.current_period())
    }

    /// Issues the next code for `category` in the period `period_fn` yields.
    ///
    /// The category is validated before `period_fn` runs.
    ///
    /// # Errors
    ///
    /// See [`Self::next_code_in`].
    pub fn next_code_with(
        &self,
        category: &str,
        period_fn: impl FnOnce() -> PeriodKey,
    ) -> Result<IssuedCode, CodeError> {
        self.family.validate(category)?;
        self.next_code_in(category, &period_fn())
    }

    /// Issues the next code for `category` in `period`.
    ///
    /// # Errors
    ///
    /// - [`CodeError::Validation`] if the category is malformed or reserved,
    ///   or the period does not match the family's granularity. The store is
    ///   not touched.
    /// - [`CodeError::Persistence`] if the store fails or holds a counter that
    ///   cannot be incremented. No code is issued.
    /// - [`CodeError::ConflictExhausted`] if every attempt lost a race.
    pub fn next_code_in(&self, category: &str, period: &PeriodKey) -> Result<IssuedCode, CodeError> {
        self.family.validate(category)?;
        let digits = self.family.granularity.digits();
        if period.as_str().len() != digits {
            return Err(CodeError::Validation(format!(
                "period {period} does not have the {digits} digits the {} family uses",
                self.family.name
            )));
        }

        let key = SequenceKey::new(category, period.clone());
        for attempt in 1..=self.max_attempts {
            let expected = self
                .ctx
                .sequences
                .get(&key)
                .map_err(|e| persistence(category, period, &e))?
                .map(|r| r.last_sequence);

            let sequence = match expected {
                None => 1,
                Some(last) => last.checked_add(1).ok_or_else(|| {
                    error!(category, period = %period, last, "sequence counter exhausted");
                    CodeError::Persistence(format!(
                        "sequence counter for {category}/{period} is exhausted at {last}"
                    ))
                })?,
            };
            let code = self.family.render(category, period, sequence);
            let record = SequenceRecord {
                category: category.to_string(),
                period: period.clone(),
                last_sequence: sequence,
                formatted_code: code.clone(),
            };

            match self.ctx.sequences.compare_and_swap(expected, &record) {
                Ok(()) => {
                    debug!(category, period = %period, sequence, code = %code, "issued code");
                    return Ok(IssuedCode {
                        code,
                        category: category.to_string(),
                        period: period.clone(),
                        sequence,
                    });
                }
                Err(StoreError::Conflict) => {
                    warn!(category, period = %period, attempt, "sequence contended, retrying");
                }
                Err(e) => return Err(persistence(category, period, &e)),
            }
        }

        warn!(category, period = %period, attempts = self.max_attempts, "retry budget exhausted");
        Err(CodeError::ConflictExhausted {
            category: category.to_string(),
            period: period.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// The last code issued for `category` in `period`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::Validation`] for a malformed category and
    /// [`CodeError::Persistence`] if the store fails.
    pub fn last_issued(
        &self,
        category: &str,
        period: &PeriodKey,
    ) -> Result<Option<SequenceRecord>, CodeError> {
        validate_category(category)?;
        self.ctx
            .sequences
            .get(&SequenceKey::new(category, period.clone()))
            .map_err(|e| persistence(category, period, &e))
    }

    /// All counters, optionally for one category.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::Persistence`] if the store fails.
    pub fn records(&self, category: Option<&str>) -> Result<Vec<SequenceRecord>, CodeError> {
        if let Some(c) = category {
            validate_category(c)?;
        }
        self.ctx.sequences.list(category).map_err(|e| {
            error!(error = %e, "failed to list sequences");
            CodeError::Persistence(e.to_string())
        })
    }
}

fn persistence(category: &str, period: &PeriodKey, err: &StoreError) -> CodeError {
    error!(category, period = %period, error = %err, "sequence store failure");
    CodeError::Persistence(err.to_string())
}
