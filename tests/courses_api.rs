//! Black-box tests of the courses resource through the HTTP router.

mod common;

use axum::http::StatusCode;
use common::fixtures::{id_of, name_of, CourseFactory, StudentFactory};
use common::harness::TestApp;
use course_api::Settings;
use serde_json::{json, Value};

#[tokio::test]
async fn retrieves_first_course() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(1).await;

    let response = app.server.get(&app.url("/courses/1/")).await;

    response.assert_status_ok();
    let data: Value = response.json();
    assert_eq!(data["name"], courses[0]["name"]);
    assert_eq!(data["students"], json!([]));
}

#[tokio::test]
async fn lists_courses_in_creation_order() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(10).await;

    let response = app.server.get(&app.url("/courses/")).await;

    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert_eq!(data.len(), 10);
    for (d, course) in data.iter().zip(&courses) {
        assert_eq!(name_of(d), name_of(course));
        assert_eq!(id_of(d), id_of(course));
    }
}

#[tokio::test]
async fn list_without_trailing_slash() {
    let app = TestApp::new().await;
    CourseFactory::new(&app).make(2).await;

    let response = app.server.get(&app.url("/courses")).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 2);
}

#[tokio::test]
async fn filters_by_id() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(10).await;
    let id = id_of(&courses[3]);

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("id", id)
        .await;

    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert_eq!(data.len(), 1);
    assert_eq!(id_of(&data[0]), id);
}

#[tokio::test]
async fn filters_by_name() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(10).await;
    let name = name_of(&courses[0]).to_string();

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("name", &name)
        .await;

    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert_eq!(data.len(), 1);
    assert_eq!(name_of(&data[0]), name);
}

#[tokio::test]
async fn name_filter_matches_trimmed_value() {
    let app = TestApp::new().await;
    CourseFactory::new(&app).make(2).await;
    let created = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": " Rust "}))
        .await;
    created.assert_status(StatusCode::CREATED);
    assert_eq!(created.json::<Value>()["name"], "Rust");

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("name", " Rust ")
        .await;

    response.assert_status_ok();
    let data: Vec<Value> = response.json();
    assert_eq!(data.len(), 1);
    assert_eq!(name_of(&data[0]), "Rust");
}

#[tokio::test]
async fn filters_combine_and_unknown_match_nothing() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(3).await;

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("id", id_of(&courses[0]))
        .add_query_param("name", name_of(&courses[1]))
        .await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("id", 9999)
        .await;
    response.assert_status_ok();
    assert!(response.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn empty_and_undeclared_query_params_are_ignored() {
    let app = TestApp::new().await;
    CourseFactory::new(&app).make(4).await;

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("name", "")
        .add_query_param("format", "json")
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Vec<Value>>().len(), 4);
}

#[tokio::test]
async fn non_numeric_id_filter_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .server
        .get(&app.url("/courses/"))
        .add_query_param("id", "abc")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"]["id"], json!(["Enter a number."]));
}

#[tokio::test]
async fn creates_course_from_form() {
    let app = TestApp::new().await;
    let count = app.course_count().await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .form(&[("name", "first_course")])
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.course_count().await, count + 1);
    let data: Value = response.json();
    assert_eq!(data["name"], "first_course");
    assert_eq!(data["students"], json!([]));
}

#[tokio::test]
async fn creates_course_from_json() {
    let app = TestApp::new().await;
    CourseFactory::new(&app).make(2).await;
    let count = app.course_count().await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "Systems programming", "id": 77}))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.course_count().await, count + 1);
    let data: Value = response.json();
    assert_eq!(data["id"], 3);
    assert_eq!(data["name"], "Systems programming");
}

#[tokio::test]
async fn create_requires_a_name() {
    let app = TestApp::new().await;

    let response = app.server.post(&app.url("/courses/")).json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["name"], json!(["This field is required."]));
    assert_eq!(app.course_count().await, 0);
}

#[tokio::test]
async fn create_rejects_blank_and_null_names() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "   "}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["name"], json!(["This field may not be blank."]));

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": null}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["name"], json!(["This field may not be null."]));
}

#[tokio::test]
async fn field_errors_are_reported_together() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "", "students": [true]}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let details = &body["error"]["details"];
    assert_eq!(details["name"], json!(["This field may not be blank."]));
    assert_eq!(
        details["students"],
        json!(["Incorrect type. Expected pk value, received bool."])
    );
    assert_eq!(app.course_count().await, 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!(["not", "an", "object"]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "bad_request");
}

#[tokio::test]
async fn patch_updates_name() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(10).await;
    let id = id_of(&courses[0]);

    let response = app
        .server
        .patch(&app.course_url(id))
        .form(&[("name", "not first course")])
        .await;

    response.assert_status_ok();
    let data: Value = response.json();
    assert_eq!(data["name"], "not first course");

    let response = app.server.get(&app.course_url(id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], data["name"]);

    let untouched = app.server.get(&app.course_url(id_of(&courses[1]))).await;
    assert_eq!(untouched.json::<Value>()["name"], courses[1]["name"]);
}

#[tokio::test]
async fn patch_without_fields_changes_nothing() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(2).await;
    let course = CourseFactory::new(&app).make_with_students("Algebra", &students).await;

    let response = app
        .server
        .patch(&app.course_url(id_of(&course)))
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), course);
}

#[tokio::test]
async fn patch_unknown_course_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .server
        .patch(&app.course_url(42))
        .json(&json!({"name": "ghost"}))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn put_requires_full_body() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(1).await;
    let id = id_of(&courses[0]);

    let response = app.server.put(&app.course_url(id)).json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["name"],
        json!(["This field is required."])
    );

    let response = app
        .server
        .put(&app.course_url(id))
        .json(&json!({"name": "Replaced"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Replaced");
}

#[tokio::test]
async fn deletes_course() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(10).await;
    let id = id_of(&courses[0]);
    let count = app.course_count().await;

    let response = app.server.delete(&app.course_url(id)).await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());
    assert_eq!(app.course_count().await, count - 1);
    app.server.get(&app.course_url(id)).await.assert_status_not_found();
}

#[tokio::test]
async fn delete_twice_is_not_found() {
    let app = TestApp::new().await;
    let courses = CourseFactory::new(&app).make(1).await;
    let id = id_of(&courses[0]);

    app.server
        .delete(&app.course_url(id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server.delete(&app.course_url(id)).await.assert_status_not_found();
    assert_eq!(app.course_count().await, 0);
}

#[tokio::test]
async fn unknown_ids_and_resources_are_not_found() {
    let app = TestApp::new().await;
    CourseFactory::new(&app).make(1).await;

    let response = app.server.get(&app.course_url(2)).await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");

    app.server
        .get(&app.url("/courses/abc/"))
        .await
        .assert_status_not_found();
    app.server
        .get(&app.url("/instructors/"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn creates_course_with_students() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(3).await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "Databases", "students": students}))
        .await;

    response.assert_status(StatusCode::CREATED);
    let data: Value = response.json();
    assert_eq!(data["students"], json!(students));

    let fetched: Value = app.server.get(&app.course_url(id_of(&data))).await.json();
    assert_eq!(fetched["students"], json!(students));
}

#[tokio::test]
async fn form_posts_repeated_student_keys() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(2).await;
    let first = students[0].to_string();
    let second = students[1].to_string();

    let response = app
        .server
        .post(&app.url("/courses/"))
        .form(&[("name", "Networks"), ("students", first.as_str()), ("students", second.as_str())])
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<Value>()["students"], json!(students));
}

#[tokio::test]
async fn unknown_student_ids_are_rejected() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(1).await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "Compilers", "students": [students[0], 999]}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["students"],
        json!(["Invalid pk \"999\" - object does not exist."])
    );
    assert_eq!(app.course_count().await, 0);
}

#[tokio::test]
async fn student_cap_is_enforced() {
    let settings = Settings {
        max_students_per_course: 2,
        ..Settings::for_testing()
    };
    let app = TestApp::with_settings(settings).await;
    let students = StudentFactory::new(&app).make_ids(3).await;

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "Seminar", "students": students}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["details"]["students"],
        json!(["Ensure this field has no more than 2 elements."])
    );

    let response = app
        .server
        .post(&app.url("/courses/"))
        .json(&json!({"name": "Seminar", "students": &students[..2]}))
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn patch_replaces_student_set_and_name_patch_keeps_it() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(3).await;
    let course = CourseFactory::new(&app)
        .make_with_students("Logic", &students[..2])
        .await;
    let url = app.course_url(id_of(&course));

    let response = app
        .server
        .patch(&url)
        .json(&json!({"students": [students[2]]}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["students"], json!([students[2]]));

    let response = app.server.patch(&url).json(&json!({"name": "Logic II"})).await;
    response.assert_status_ok();
    let data: Value = response.json();
    assert_eq!(data["name"], "Logic II");
    assert_eq!(data["students"], json!([students[2]]));

    let response = app.server.patch(&url).json(&json!({"students": []})).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["students"], json!([]));
}

#[tokio::test]
async fn deleting_course_keeps_students() {
    let app = TestApp::new().await;
    let students = StudentFactory::new(&app).make_ids(2).await;
    let course = CourseFactory::new(&app).make_with_students("History", &students).await;

    app.server
        .delete(&app.course_url(id_of(&course)))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_eq!(app.course_count().await, 0);
    assert_eq!(app.student_count().await, 2);
}

#[tokio::test]
async fn custom_api_prefix() {
    let settings = Settings {
        api_prefix: String::new(),
        ..Settings::for_testing()
    };
    let app = TestApp::with_settings(settings).await;
    CourseFactory::new(&app).make(1).await;

    app.server.get("/courses/1/").await.assert_status_ok();
    app.server.get("/api/v1/courses/1/").await.assert_status_not_found();
}
