//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::repositories::{
    AnswerRepository, AttemptRepository, ChoiceRepository, InvitationRepository,
    QuestionRepository, QuizRepository, UserRepository,
};
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Pool condiviso, usato per aprire le transazioni del motore
    pub pool: SqlitePool,

    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per i quiz
    pub quiz: QuizRepository,

    /// Repository per le domande
    pub question: QuestionRepository,

    /// Repository per le scelte delle domande
    pub choice: ChoiceRepository,

    /// Repository per la gestione degli inviti
    pub invitation: InvitationRepository,

    /// Repository per i tentativi
    pub attempt: AttemptRepository,

    /// Repository per le risposte
    pub answer: AnswerRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Gruppi di notifica per utente: ogni utente ha zero o più connessioni WebSocket attive
    pub users_online: UserMap,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e la JWT secret.
    ///
    /// # Arguments
    /// * `pool` - Pool di connessioni SQLite condiviso
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            quiz: QuizRepository::new(pool.clone()),
            question: QuestionRepository::new(pool.clone()),
            choice: ChoiceRepository::new(pool.clone()),
            invitation: InvitationRepository::new(pool.clone()),
            attempt: AttemptRepository::new(pool.clone()),
            answer: AnswerRepository::new(pool.clone()),
            pool,
            jwt_secret,
            users_online: UserMap::new(),
        }
    }
}
