//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod attempt;
pub mod invitation;
pub mod quiz;
pub mod user;
pub mod ws_event;

pub use attempt::{AnswerRequestDTO, AttemptDTO, AttemptProgressDTO, SubmitAnswersDTO};
pub use invitation::{CreateInvitationDTO, InvitationDTO, InviteRequestDTO};
pub use quiz::{
    ChoiceDTO, CreateChoiceDTO, CreateQuestionDTO, CreateQuizDTO, QuestionDTO, QuizDTO,
    QuizDetailDTO, QuizProgressDTO, UpdateQuizDTO,
};
pub use user::{CreateUserDTO, LoginDTO, UserDTO};
pub use ws_event::{ClientEvent, ResponseAction, ServerEvent};
