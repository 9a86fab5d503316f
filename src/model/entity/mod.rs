mod user;
pub use user::{UserEntity, UserEntityCreate, UserEntityUpdate};

mod course;
pub use course::{Course, CourseCreate, CourseEarningsRow, CourseUpdate};

mod module;
pub use module::{Module, ModuleCreate, ModuleUpdate};

mod quiz;
pub use quiz::{QUIZ_OPTION_COUNT, Quiz, QuizCreate, QuizDraftError, QuizUpdate};

mod quiz_result;
pub use quiz_result::{QuizResult, QuizResultCreate};

mod enrollment;
pub use enrollment::Enrollment;

pub mod order;
pub use order::{Order, OrderCreate, OrderTransition};

pub mod feedback;
pub use feedback::{Feedback, FeedbackCreate, FeedbackFilter, FeedbackRow};
