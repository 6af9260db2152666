//! Payment collection at exit.
//!
//! Processors answer synchronously. A decline is an ordinary `false`, not
//! an error.

pub trait PaymentProcessor: Send + Sync {
    fn process_payment(&self, amount: f64) -> bool;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CardPaymentProcessor;

impl PaymentProcessor for CardPaymentProcessor {
    fn process_payment(&self, amount: f64) -> bool {
        tracing::info!(amount, method = "card", "Processed payment");
        true
    }

    fn name(&self) -> &'static str {
        "card"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CashPaymentProcessor;

impl PaymentProcessor for CashPaymentProcessor {
    fn process_payment(&self, amount: f64) -> bool {
        tracing::info!(amount, method = "cash", "Processed payment");
        true
    }

    fn name(&self) -> &'static str {
        "cash"
    }
}
