//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//! Le query usano `query_as::<_, T>` con `FromRow`: il controllo avviene a runtime,
//! quindi per compilare non serve un database raggiungibile.
//!
//! Le funzioni associate che ricevono `&mut SqliteConnection` (invece di `&self`)
//! girano dentro una transazione aperta dal chiamante.

// ************************* MODULI REPOSITORY ************************* //

pub mod answer;
pub mod attempt;
pub mod choice;
pub mod invitation;
pub mod question;
pub mod quiz;
pub mod traits;
pub mod user;

use sqlx::migrate::Migrator;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

pub use answer::AnswerRepository;
pub use attempt::AttemptRepository;
pub use choice::ChoiceRepository;
pub use invitation::InvitationRepository;
pub use question::QuestionRepository;
pub use quiz::QuizRepository;
pub use user::UserRepository;

/// Migrazioni embedded nel binario, applicate all'avvio e nei test
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
