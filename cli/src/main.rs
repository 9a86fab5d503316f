use clap::{Parser, Subcommand};
use lernly::error::{AppError, AppResult};
use lernly::model::entity::{
    Course, CourseCreate, CourseUpdate, Module, ModuleCreate, Quiz, QuizCreate, UserEntity,
    UserEntityCreate,
};
use lernly::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use lernly::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for seeding the course catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage modules
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },

    /// Manage quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },
}

/// User management. This is the only way to create admins.
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin, instructor or user
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        /// Email of the owning instructor
        #[arg(long)]
        instructor_email: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        price: i64,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    Add {
        /// Course title to attach the module to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with module content
        #[arg(long)]
        content: String,
        #[arg(long)]
        pdf_url: Option<String>,
        #[arg(long, default_value_t = 0)]
        order: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Module title to attach the quiz to
        #[arg(long)]
        module_title: String,
        #[arg(long)]
        question: String,
        /// Repeat four times
        #[arg(long = "option", num_args = 1)]
        options: Vec<String>,
        #[arg(long)]
        answer: String,
    },
}

async fn id_by(mm: &ModelManager, query: &'static str, value: &str) -> AppResult<i64> {
    let id = sqlx::query_scalar(query)
        .bind(value)
        .fetch_one(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)?;
    Ok(id)
}

fn invalid_input(message: String) -> AppError {
    AppError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidInput, message))
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| invalid_input(String::from("DATABASE_URL is not set")))?;
    let db_con = DbConnection::connect(&database_url)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add {
                full_name,
                username,
                email,
                password,
                role,
            } => {
                let role = UserRole::parse(&role)
                    .ok_or_else(|| invalid_input(format!("unknown role: {role}")))?;
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        full_name,
                        username,
                        email,
                        password_hash: lernly::auth::hash_password(&password)?,
                        role,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                instructor_email,
                title,
                description,
                price,
                published,
            } => {
                let instructor_id = id_by(
                    &mm,
                    "SELECT id FROM users WHERE email = $1",
                    &instructor_email,
                )
                .await?;
                let mut course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        price,
                        instructor_id,
                    },
                )
                .await?;
                if published {
                    course = course
                        .update(
                            &mm,
                            &actor,
                            CourseUpdate {
                                published: Some(true),
                                ..Default::default()
                            },
                        )
                        .await?;
                }
                println!("Course created: {:?}", course);
            }
        },

        Commands::Module { action } => match action {
            ModuleCommands::Add {
                course_title,
                title,
                content,
                pdf_url,
                order,
            } => {
                let course_id =
                    id_by(&mm, "SELECT id FROM courses WHERE title = $1", &course_title).await?;
                let content = std::fs::read_to_string(content)?;
                let module = Module::create(
                    &mm,
                    &actor,
                    ModuleCreate {
                        course_id,
                        title,
                        content,
                        pdf_url,
                        order_index: Some(order),
                    },
                )
                .await?;
                println!("Module created: {:?}", module);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add {
                module_title,
                question,
                options,
                answer,
            } => {
                let module_id =
                    id_by(&mm, "SELECT id FROM modules WHERE title = $1", &module_title).await?;
                let draft = QuizCreate {
                    module_id,
                    question,
                    options,
                    answer,
                };
                draft
                    .validate()
                    .map_err(|e| invalid_input(e.to_string()))?;
                let quiz = Quiz::create(&mm, &actor, draft).await?;
                println!("Quiz created: {:?}", quiz);
            }
        },
    }

    Ok(())
}
