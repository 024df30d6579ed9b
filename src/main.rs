use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use tutor_scheduler::client::{ApiClient, ClientError};
use tutor_scheduler::config::Config;
use tutor_scheduler::database::Database;
use tutor_scheduler::endpoints;
use tutor_scheduler::form::{FormMode, StudentForm, TeacherForm};
use tutor_scheduler::model::{SchoolLevel, TimeSlot};
use tutor_scheduler::render::{self, NoticeKind};

#[derive(Parser)]
#[command(name = "tutor-scheduler", version)]
#[command(about = "Weekend tutoring scheduler: the scheduling service and its command-line client")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "scheduler.toml")]
    config: PathBuf,

    /// API root to talk to, overriding the configuration
    #[arg(long)]
    api: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the scheduling service
    Serve,
    /// Lists the time slot catalog
    Slots,
    /// Lists teachers
    Teachers,
    /// Adds a teacher
    AddTeacher(TeacherArgs),
    /// Edits a teacher; omitted fields keep their current value
    EditTeacher {
        id: i64,
        #[command(flatten)]
        fields: TeacherArgs,
    },
    /// Deletes a teacher
    DeleteTeacher { id: i64 },
    /// Lists student records
    Students,
    /// Adds a student record
    AddStudent(StudentArgs),
    /// Edits a student record; omitted fields keep their current value
    EditStudent {
        id: i64,
        #[command(flatten)]
        fields: StudentArgs,
    },
    /// Deletes a student record
    DeleteStudent { id: i64 },
    /// Generates the weekly schedule from all records
    Generate,
    /// Shows the last generated schedule
    Schedule,
    /// Deletes all teachers, students and schedules
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct TeacherArgs {
    #[arg(long)]
    name: Option<String>,

    /// Grade taught (7-12); repeat for several
    #[arg(long = "grade", value_name = "GRADE")]
    grades: Vec<String>,

    /// Subject taught; repeat for several
    #[arg(long = "subject", value_name = "SUBJECT")]
    subjects: Vec<String>,

    /// Available slot such as "Saturday 8:00-9:30"; repeat for several
    #[arg(long = "slot", value_name = "SLOT")]
    slots: Vec<String>,
}

impl TeacherArgs {
    fn apply(self, form: &mut TeacherForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if !self.grades.is_empty() {
            form.grades = self.grades;
        }
        if !self.subjects.is_empty() {
            form.subjects = self.subjects;
        }
        if !self.slots.is_empty() {
            form.availability = self.slots;
        }
    }
}

#[derive(Args)]
struct StudentArgs {
    #[arg(long)]
    name: Option<String>,

    /// Grade (7-12)
    #[arg(long)]
    grade: Option<String>,

    #[arg(long)]
    subject: Option<String>,

    /// "one-to-one" or "one-to-many"
    #[arg(long)]
    course: Option<String>,

    /// Preferred teacher's name
    #[arg(long)]
    teacher: Option<String>,

    /// Drop the preferred teacher
    #[arg(long, conflicts_with = "teacher")]
    no_teacher: bool,

    /// Available slot such as "Sunday 13:00-15:00"; repeat for several
    #[arg(long = "slot", value_name = "SLOT")]
    slots: Vec<String>,
}

impl StudentArgs {
    fn apply(self, form: &mut StudentForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if self.grade.is_some() {
            form.grade = self.grade;
        }
        if self.subject.is_some() {
            form.subject = self.subject;
        }
        if self.course.is_some() {
            form.course_type = self.course;
        }
        if self.no_teacher {
            form.preferred_teacher = None;
        } else if self.teacher.is_some() {
            form.preferred_teacher = self.teacher;
        }
        if !self.slots.is_empty() {
            form.availability = self.slots;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Begin logging. Client commands only surface problems.
    let level = match cli.command {
        Commands::Serve => Level::INFO,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Could not install logger: {e}");
    }

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if let Commands::Serve = cli.command {
        return match serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let client = ApiClient::new(cli.api.unwrap_or(config.client.api_url));
    match run(&client, cli.command).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", render::notice(NoticeKind::Error, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Config) -> Result<(), String> {
    let database = Database::connect(&config.database).await?;
    let app = endpoints::router(database);

    // Stop accepting on Ctrl-C, giving in-flight requests a moment to finish
    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shutdown.graceful_shutdown(Some(Duration::from_secs(5)));
        }
    });

    let addr = config.server.bind;
    let served = match config.server.tls {
        Some(tls) => {
            // Both rustls backends may be linked in; pin one before building the TLS config
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
            let rustls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(|e| format!("Could not load TLS certificate: {e}"))?;

            info!("Listening on https://{addr}");
            axum_server::bind_rustls(addr, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Listening on http://{addr}");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };
    served.map_err(|e| format!("Server error: {e}"))
}

async fn run(client: &ApiClient, command: Commands) -> Result<String, ClientError> {
    let success = |message: String| format!("{}\n", render::notice(NoticeKind::Success, &message));

    match command {
        Commands::Serve => unreachable!("handled before the client is built"),
        Commands::Slots => Ok(slot_catalog()),
        Commands::Teachers => Ok(render::teachers(&client.list_teachers().await?)),
        Commands::AddTeacher(fields) => {
            let mut form = TeacherForm::default();
            fields.apply(&mut form);
            form.submit(client, FormMode::Create).await.map(success)
        }
        Commands::EditTeacher { id, fields } => {
            let teachers = client.list_teachers().await?;
            let Some(teacher) = teachers.iter().find(|t| t.id == id) else {
                return Err(ClientError::Missing("Teacher not found".into()));
            };
            let mut form = TeacherForm::from(teacher);
            fields.apply(&mut form);
            form.submit(client, FormMode::Edit(id)).await.map(success)
        }
        Commands::DeleteTeacher { id } => client.delete_teacher(id).await.map(success),
        Commands::Students => Ok(render::students(&client.list_students().await?)),
        Commands::AddStudent(fields) => {
            let mut form = StudentForm::default();
            fields.apply(&mut form);
            form.submit(client, FormMode::Create).await.map(success)
        }
        Commands::EditStudent { id, fields } => {
            let students = client.list_students().await?;
            let Some(student) = students.iter().find(|s| s.id == id) else {
                return Err(ClientError::Missing("Student record not found".into()));
            };
            let mut form = StudentForm::from(student);
            fields.apply(&mut form);
            form.submit(client, FormMode::Edit(id)).await.map(success)
        }
        Commands::DeleteStudent { id } => client.delete_student(id).await.map(success),
        Commands::Generate => {
            let sessions = client.generate_schedule().await?;
            Ok(format!(
                "{}{}",
                render::schedule(&sessions),
                success("Schedule generated".into())
            ))
        }
        Commands::Schedule => Ok(render::schedule(&client.schedule().await?)),
        Commands::Clear { yes } => {
            if !yes && !confirm("Delete all teachers, students and schedules?") {
                return Ok("Nothing deleted\n".into());
            }
            client.clear_data().await.map(success)
        }
    }
}

fn slot_catalog() -> String {
    let mut out = String::new();
    for (title, level) in [("Middle school", SchoolLevel::Middle), ("High school", SchoolLevel::High)] {
        out.push_str(title);
        out.push('\n');
        for slot in TimeSlot::for_level(level) {
            out.push_str(&format!("  {slot}\n"));
        }
    }
    out
}

fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
