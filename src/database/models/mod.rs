pub mod identity;
pub mod lawyer;
pub mod profile;
pub mod request;

pub use identity::{Identity, NewIdentity};
pub use lawyer::{DirectoryEntry, Lawyer, LawyerChanges, NewLawyer};
pub use profile::{split_full_name, Profile, Role};
pub use request::{ContactRequest, LawyerSummary, NewContactRequest, RequestStatus, RequestWithLawyer};
