//! Flows opened from emailed links carrying an access token.

mod acceptance;
mod gate;
mod profile;
mod redirect;

pub use acceptance::AdminAcceptanceFlow;
pub use gate::TokenActionState;
pub use profile::{
    MaritalStatus, ProfileCompletionDraft, ProfileCompletionFlow, ProfileValidationError,
    UnknownChoice, VisaEligibility,
};
pub use redirect::{Navigator, RedirectSchedule};

#[cfg(test)]
mod tests;
