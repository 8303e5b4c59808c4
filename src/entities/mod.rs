//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod answer;
pub mod attempt;
pub mod choice;
pub mod enums;
pub mod invitation;
pub mod question;
pub mod quiz;
pub mod user;

// Re-exports per facilitare l'import
pub use answer::Answer;
pub use attempt::Attempt;
pub use choice::Choice;
pub use enums::{AttemptStatus, InvitationStatus, QuestionType, QuizStatus};
pub use invitation::Invitation;
pub use question::Question;
pub use quiz::Quiz;
pub use user::User;
