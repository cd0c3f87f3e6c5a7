pub mod amortization;
pub mod balloon;
pub mod mortgage;
pub mod payment;
