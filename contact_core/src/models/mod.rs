pub mod contact;
pub mod request;

pub use contact::{
    ContactForm, ContactMessage, DeliveryMethod, RelayReply, SubmissionOutcome, DEFAULT_SUBJECT,
};
pub use request::ApiResponse;
