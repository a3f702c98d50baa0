//! Quote data validation.
//!
//! Live quotes pass through here before they are merged. A quote with a
//! hard issue is dropped and its symbol is filled from the fallback
//! generator; soft issues are only logged.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Validation severity levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationSeverity {
    /// Reject the quote.
    Hard,
    /// Accept the quote but log a warning.
    Soft,
}

#[derive(Clone, Debug)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
}

/// Quote validator configuration.
#[derive(Clone, Debug)]
pub struct ValidatorConfig {
    /// Whether to reject quotes with negative prices.
    pub reject_negative_prices: bool,
    /// Whether to reject quotes whose change and percent change disagree in sign.
    pub reject_sign_mismatch: bool,
    /// Daily move (in percent) above which a quote is flagged.
    pub max_daily_move_pct: Option<Decimal>,
    /// Whether to warn on a zero price.
    pub warn_on_zero_price: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_negative_prices: true,
            reject_sign_mismatch: true,
            // Circuit breakers halt Indian indices at 20%.
            max_daily_move_pct: Some(Decimal::from(20)),
            warn_on_zero_price: true,
        }
    }
}

pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl QuoteValidator {
    pub fn new() -> Self {
        Self {
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a quote.
    ///
    /// Returns Ok(()) if the quote is usable. Warnings are logged but do not
    /// cause rejection.
    pub fn validate(&self, quote: &Quote) -> Result<(), MarketDataError> {
        let issues = self.issues(quote);

        let errors: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == ValidationSeverity::Hard)
            .map(|i| i.message.as_str())
            .collect();

        if !errors.is_empty() {
            return Err(MarketDataError::ValidationFailed {
                message: format!("{}: {}", quote.symbol, errors.join("; ")),
            });
        }

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Soft) {
            warn!("Quote validation warning for {}: {}", quote.symbol, issue.message);
        }

        Ok(())
    }

    /// Every issue found in a quote, hard and soft.
    pub fn issues(&self, quote: &Quote) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        self.validate_identity(quote, &mut issues);
        self.validate_price(quote, &mut issues);
        self.validate_change(quote, &mut issues);
        issues
    }

    fn validate_identity(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        if quote.symbol.trim().is_empty() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: "Empty symbol".to_string(),
            });
        }
        if quote.name.trim().is_empty() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: "Empty name".to_string(),
            });
        }
    }

    fn validate_price(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        if self.config.reject_negative_prices && quote.price < Decimal::ZERO {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!("Negative price: {}", quote.price),
            });
        }
        if self.config.warn_on_zero_price && quote.price.is_zero() {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Soft,
                message: "Zero price".to_string(),
            });
        }
    }

    /// Change and percent change must agree in sign when both are non-zero.
    fn validate_change(&self, quote: &Quote, issues: &mut Vec<ValidationIssue>) {
        let both_non_zero = !quote.change.is_zero() && !quote.change_percent.is_zero();
        if self.config.reject_sign_mismatch
            && both_non_zero
            && quote.change.is_sign_negative() != quote.change_percent.is_sign_negative()
        {
            issues.push(ValidationIssue {
                severity: ValidationSeverity::Hard,
                message: format!(
                    "Change ({}) and percent change ({}) disagree in sign",
                    quote.change, quote.change_percent
                ),
            });
        }

        if let Some(max_move) = self.config.max_daily_move_pct {
            if quote.change_percent.abs() > max_move {
                issues.push(ValidationIssue {
                    severity: ValidationSeverity::Soft,
                    message: format!(
                        "Percent change ({}) exceeds {}%",
                        quote.change_percent, max_move
                    ),
                });
            }
        }
    }
}

impl Default for QuoteValidator {
    fn default() -> Self {
        Self::new()
    }
}
