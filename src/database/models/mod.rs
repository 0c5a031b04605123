pub mod account;
pub mod feedback;
pub mod request;
pub mod tutor;

pub use account::{Account, AccountSummary, NewAccount, Role};
pub use feedback::{Feedback, NewFeedback};
pub use request::{Decision, NewRequest, RequestStatus, StudentRequest};
pub use tutor::{NewTutor, Tutor, TutorFields};
