pub mod answer;
pub mod context;
pub mod motivation;
pub mod question;
pub mod session;

pub use answer::{AnswerEvent, RewardBundle, RewardKind, SpecialReward};
pub use context::{
    AnswerRecord, ProgressSnapshot, TopicPatternEntry, TopicPatternSnapshot, UserContext,
};
pub use motivation::{MessageKind, MotivationQuery, MotivationalMessage};
pub use question::{CandidateQuestion, QuestionContent};
pub use session::{
    AnnotatedQuestion, CreateSessionRequest, DifficultyLabel, DistributionPlan, LivesBudget,
    PositionRole, QuestionMetadata, RewardKnobs, SessionBundle, SessionMode, SessionModeConfig,
};
