pub mod cohort;
pub mod student;
pub mod user;

pub use cohort::{Cohort, CohortFields};
pub use student::{PopulatedStudent, Student, StudentInput, StudentProfile};
pub use user::{NewUser, PublicUser, User};
