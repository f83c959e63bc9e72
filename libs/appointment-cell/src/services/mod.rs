pub mod eligibility;
pub mod formatting;
pub mod scheduling;
pub mod slots;
pub mod validation;
