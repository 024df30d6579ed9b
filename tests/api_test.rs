use tokio::net::TcpListener;
use tokio::task::JoinSet;

use tutor_scheduler::client::{ApiClient, ClientError};
use tutor_scheduler::config::DatabaseConfig;
use tutor_scheduler::database::Database;
use tutor_scheduler::endpoints;
use tutor_scheduler::form::{FormError, FormMode, StudentForm, TeacherForm};
use tutor_scheduler::model::CourseType;

/// Starts a service on an ephemeral port over a fresh in-memory store.
async fn spawn_service() -> ApiClient {
    let database = Database::connect(&DatabaseConfig::in_memory())
        .await
        .expect("Failed to open in-memory database");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, endpoints::router(database))
            .await
            .unwrap();
    });

    ApiClient::new(format!("http://{addr}/api"))
}

fn teacher_form(name: &str, grades: &[&str], subjects: &[&str], slots: &[&str]) -> TeacherForm {
    TeacherForm {
        name: name.into(),
        grades: grades.iter().map(|&g| g.into()).collect(),
        subjects: subjects.iter().map(|&s| s.into()).collect(),
        availability: slots.iter().map(|&s| s.into()).collect(),
    }
}

fn student_form(name: &str, course: &str, teacher: Option<&str>, slots: &[&str]) -> StudentForm {
    StudentForm {
        name: name.into(),
        grade: Some("8".into()),
        subject: Some("Math".into()),
        course_type: Some(course.into()),
        preferred_teacher: teacher.map(Into::into),
        availability: slots.iter().map(|&s| s.into()).collect(),
    }
}

fn api_error(result: Result<impl std::fmt::Debug, ClientError>) -> (u16, String) {
    match result {
        Err(ClientError::Api { status, message }) => (status, message),
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn teacher_lifecycle() {
    let client = spawn_service().await;
    let lin = teacher_form("Lin", &["8", "9"], &["Math"], &["Saturday 8:00-9:30"]);

    let message = lin.submit(&client, FormMode::Create).await.unwrap();
    assert_eq!(message, "Teacher added");

    let teachers = client.list_teachers().await.unwrap();
    assert_eq!(teachers.len(), 1);
    assert_eq!(teachers[0].name, "Lin");
    assert_eq!(teachers[0].availability[0].to_string(), "Saturday 8:00-9:30");

    let (status, message) = api_error(lin.submit(&client, FormMode::Create).await);
    assert_eq!(status, 400);
    assert_eq!(message, "Teacher already exists");

    let mut renamed = TeacherForm::from(&teachers[0]);
    renamed.subjects.push("Physics".into());
    renamed
        .submit(&client, FormMode::Edit(teachers[0].id))
        .await
        .unwrap();
    let teachers = client.list_teachers().await.unwrap();
    assert_eq!(teachers[0].subjects, vec!["Math", "Physics"]);

    let (status, message) = api_error(client.delete_teacher(999).await);
    assert_eq!(status, 404);
    assert_eq!(message, "Teacher not found");

    assert_eq!(
        client.delete_teacher(teachers[0].id).await.unwrap(),
        "Teacher deleted"
    );
    assert!(client.list_teachers().await.unwrap().is_empty());
}

#[tokio::test]
async fn renaming_onto_another_teacher_is_rejected() {
    let client = spawn_service().await;
    for name in ["Lin", "Zhao"] {
        teacher_form(name, &["8"], &["Math"], &["Sunday 8:00-9:30"])
            .submit(&client, FormMode::Create)
            .await
            .unwrap();
    }
    let zhao = client.list_teachers().await.unwrap().pop().unwrap();

    let mut form = TeacherForm::from(&zhao);
    form.name = "Lin".into();
    let (status, message) = api_error(form.submit(&client, FormMode::Edit(zhao.id)).await);
    assert_eq!(status, 400);
    assert_eq!(message, "Teacher name already exists");
}

#[tokio::test]
async fn invalid_forms_never_reach_the_service() {
    let client = spawn_service().await;
    let nameless = teacher_form(" ", &["8"], &["Math"], &["Saturday 8:00-9:30"]);

    match nameless.submit(&client, FormMode::Create).await {
        Err(ClientError::Invalid(FormError::MissingTeacherName)) => {}
        other => panic!("unexpected result {other:?}"),
    }
    assert!(client.list_teachers().await.unwrap().is_empty());
}

#[tokio::test]
async fn service_validates_raw_payloads() {
    let client = spawn_service().await;
    let http = reqwest::Client::new();

    let response = http
        .post(format!("{}/teachers", client.base_url()))
        .json(&serde_json::json!({
            "name": "Lin",
            "grades": [8],
            "subjects": [],
            "availability": ["Saturday 8:00-9:30"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please select at least one subject to teach");

    let response = http
        .post(format!("{}/students", client.base_url()))
        .json(&serde_json::json!({ "name": "Wei", "grade": 8 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = http
        .put(format!("{}/students/abc", client.base_url()))
        .json(&serde_json::json!({
            "name": "Wei",
            "grade": 8,
            "subject": "Math",
            "courseType": "one-to-many",
            "availability": ["Saturday 8:00-9:30"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn student_records_are_unique_per_course() {
    let client = spawn_service().await;
    let wei = student_form("Wei", "one-to-many", None, &["Saturday 8:00-9:30"]);

    assert_eq!(
        wei.submit(&client, FormMode::Create).await.unwrap(),
        "Student added"
    );
    let (status, message) = api_error(wei.submit(&client, FormMode::Create).await);
    assert_eq!(status, 400);
    assert_eq!(
        message,
        "A Grade 8 Math one-to-many record already exists for this student"
    );

    let mut physics = wei.clone();
    physics.subject = Some("Physics".into());
    physics.submit(&client, FormMode::Create).await.unwrap();

    let students = client.list_students().await.unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[1].subject, "Physics");
    assert_eq!(students[1].preferred_teacher, None);

    let (status, message) = api_error(client.delete_student(42).await);
    assert_eq!(status, 404);
    assert_eq!(message, "Student record not found");
}

#[tokio::test]
async fn generated_schedule_is_stored_and_guards_deletes() {
    let client = spawn_service().await;
    teacher_form(
        "Lin",
        &["8"],
        &["Math"],
        &["Saturday 8:00-9:30", "Saturday 9:30-11:00"],
    )
    .submit(&client, FormMode::Create)
    .await
    .unwrap();
    teacher_form("Zhao", &["8"], &["Math"], &["Sunday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();

    student_form("Wei", "one-to-one", Some("Lin"), &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    for name in ["Ming", "Fang"] {
        student_form(name, "one-to-many", None, &["Saturday 9:30-11:00"])
            .submit(&client, FormMode::Create)
            .await
            .unwrap();
    }

    let sessions = client.generate_schedule().await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].course_type, CourseType::OneToOne);
    assert_eq!(sessions[0].students, vec!["Wei"]);
    assert_eq!(sessions[1].time_slot.to_string(), "Saturday 9:30-11:00");
    assert_eq!(sessions[1].students, vec!["Ming", "Fang"]);
    assert_eq!(client.schedule().await.unwrap(), sessions);

    let teachers = client.list_teachers().await.unwrap();
    let students = client.list_students().await.unwrap();

    let (status, message) = api_error(client.delete_teacher(teachers[0].id).await);
    assert_eq!(status, 400);
    assert_eq!(
        message,
        "Cannot delete: student Wei has chosen this teacher as preferred teacher"
    );

    let (_, message) = api_error(client.delete_student(students[1].id).await);
    assert_eq!(
        message,
        "Cannot delete: the Grade 8 Math record of this student has scheduled classes"
    );

    // Zhao has no students and no sessions
    client.delete_teacher(teachers[1].id).await.unwrap();
}

#[tokio::test]
async fn failed_generation_reports_the_reason() {
    let client = spawn_service().await;

    let (status, message) = api_error(client.generate_schedule().await);
    assert_eq!(status, 400);
    assert_eq!(message, "Please add teachers first");

    teacher_form("Lin", &["8"], &["Math"], &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    student_form("Wei", "one-to-one", Some("Lin"), &["Sunday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();

    let (_, message) = api_error(client.generate_schedule().await);
    assert_eq!(
        message,
        "Unable to schedule student Wei; check for time conflicts"
    );
    assert!(client.schedule().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_data_removes_everything() {
    let client = spawn_service().await;
    teacher_form("Lin", &["8"], &["Math"], &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    student_form("Wei", "one-to-one", Some("Lin"), &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    client.generate_schedule().await.unwrap();

    assert_eq!(client.clear_data().await.unwrap(), "All data cleared");
    assert!(client.list_teachers().await.unwrap().is_empty());
    assert!(client.list_students().await.unwrap().is_empty());
    assert!(client.schedule().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_duplicate_submissions_store_one_record() {
    let client = spawn_service().await;
    let wei = student_form("Wei", "one-to-many", None, &["Saturday 8:00-9:30"]);
    let lin = teacher_form("Lin", &["8"], &["Math"], &["Saturday 8:00-9:30"]);

    let mut submits = JoinSet::new();
    for _ in 0..20 {
        let (client, wei, lin) = (client.clone(), wei.clone(), lin.clone());
        submits.spawn(async move {
            let student = wei.submit(&client, FormMode::Create).await;
            let teacher = lin.submit(&client, FormMode::Create).await;
            (student, teacher)
        });
    }

    let (mut students_added, mut teachers_added) = (0, 0);
    while let Some(joined) = submits.join_next().await {
        let (student, teacher) = joined.unwrap();
        match student {
            Ok(_) => students_added += 1,
            Err(ClientError::Api { status: 400, message }) => assert_eq!(
                message,
                "A Grade 8 Math one-to-many record already exists for this student"
            ),
            Err(e) => panic!("unexpected student error {e:?}"),
        }
        match teacher {
            Ok(_) => teachers_added += 1,
            Err(ClientError::Api { status: 400, message }) => {
                assert_eq!(message, "Teacher already exists")
            }
            Err(e) => panic!("unexpected teacher error {e:?}"),
        }
    }

    assert_eq!(students_added, 1);
    assert_eq!(teachers_added, 1);
    assert_eq!(client.list_students().await.unwrap().len(), 1);
    assert_eq!(client.list_teachers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn student_slots_outside_the_grade_level_are_rejected() {
    let client = spawn_service().await;
    let response = reqwest::Client::new()
        .post(format!("{}/students", client.base_url()))
        .json(&serde_json::json!({
            "name": "Wei",
            "grade": 8,
            "subject": "Math",
            "courseType": "one-to-many",
            "availability": ["Saturday 8:00-10:00"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Time slot Saturday 8:00-10:00 is not offered for Grade 8"
    );
    assert!(client.list_students().await.unwrap().is_empty());
}

#[tokio::test]
async fn off_catalog_slots_are_rejected() {
    let client = spawn_service().await;
    let response = reqwest::Client::new()
        .post(format!("{}/teachers", client.base_url()))
        .json(&serde_json::json!({
            "name": "Lin",
            "grades": [8],
            "subjects": ["Math"],
            "availability": ["Saturday 9:00-10:00"]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Unknown time slot: Saturday 9:00-10:00")
    );
    assert!(client.list_teachers().await.unwrap().is_empty());
}

#[tokio::test]
async fn updating_unknown_teacher_is_not_found() {
    let client = spawn_service().await;
    let lin = teacher_form("Lin", &["8"], &["Math"], &["Saturday 8:00-9:30"]);

    let (status, message) = api_error(lin.submit(&client, FormMode::Edit(999)).await);
    assert_eq!(status, 404);
    assert_eq!(message, "Teacher not found");
    assert!(client.list_teachers().await.unwrap().is_empty());
}

#[tokio::test]
async fn editing_student_onto_another_record_is_rejected() {
    let client = spawn_service().await;
    let math = student_form("Wei", "one-to-many", None, &["Saturday 8:00-9:30"]);
    let mut physics = math.clone();
    physics.subject = Some("Physics".into());
    math.submit(&client, FormMode::Create).await.unwrap();
    physics.submit(&client, FormMode::Create).await.unwrap();

    let students = client.list_students().await.unwrap();
    let (status, message) = api_error(math.submit(&client, FormMode::Edit(students[1].id)).await);
    assert_eq!(status, 400);
    assert_eq!(
        message,
        "A Grade 8 Math one-to-many record already exists for this student"
    );
    assert_eq!(client.list_students().await.unwrap(), students);

    // Saving a record unchanged is not a clash with itself
    math.submit(&client, FormMode::Edit(students[0].id)).await.unwrap();
}

#[tokio::test]
async fn scheduled_teacher_cannot_be_deleted() {
    let client = spawn_service().await;
    teacher_form("Lin", &["8"], &["Math"], &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    student_form("Ming", "one-to-many", None, &["Saturday 8:00-9:30"])
        .submit(&client, FormMode::Create)
        .await
        .unwrap();
    let sessions = client.generate_schedule().await.unwrap();
    assert_eq!(sessions[0].teacher, "Lin");

    let lin = client.list_teachers().await.unwrap().remove(0);
    let (status, message) = api_error(client.delete_teacher(lin.id).await);
    assert_eq!(status, 400);
    assert_eq!(message, "Cannot delete: this teacher has scheduled classes");

    client.clear_data().await.unwrap();
    assert!(client.list_teachers().await.unwrap().is_empty());
}
