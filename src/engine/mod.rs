//! Engine - Regole di dominio con effetti collaterali
//!
//! - `invitation`: macchina a stati degli inviti, crea il tentativo all'accettazione
//!   e notifica gli utenti coinvolti
//! - `scoring`: registrazione delle risposte e accumulo del punteggio

pub mod invitation;
pub mod scoring;

pub use invitation::InvitationStateMachine;
pub use scoring::ScoringEngine;
