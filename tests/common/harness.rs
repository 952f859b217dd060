//! Test harness: the full application router served by `axum_test::TestServer`
//! against a fresh in-memory SQLite database per test.

use axum_test::TestServer;
use course_api::config::builtin::{course_catalog, COURSE_MODEL, STUDENT_MODEL};
use course_api::{
    app_router, apply_migrations, connect, resolve, AppState, Backend, CrudService, ResolvedEntity, ResolvedModel,
    Settings,
};
use sqlx::AnyPool;
use std::sync::Arc;

pub struct TestApp {
    pub server: TestServer,
    pub pool: AnyPool,
    pub model: Arc<ResolvedModel>,
    pub settings: Settings,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(Settings::for_testing()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let pool = connect(&settings).await.expect("connect to in-memory sqlite");
        let model = resolve(&course_catalog(Some(settings.max_students_per_course))).expect("resolve course catalog");
        apply_migrations(&pool, Backend::Sqlite, &model)
            .await
            .expect("apply migrations");
        let state = AppState::new(pool.clone(), model);
        let model = Arc::clone(&state.model);
        let server = TestServer::new(app_router(&settings, state)).expect("create test server");
        TestApp {
            server,
            pool,
            model,
            settings,
        }
    }

    /// Path under the API prefix, e.g. `url("/courses/")` -> `/api/v1/courses/`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_prefix, path)
    }

    pub fn course_url(&self, id: i64) -> String {
        self.url(&format!("/courses/{}/", id))
    }

    pub fn courses(&self) -> &ResolvedEntity {
        self.model.entity(COURSE_MODEL).expect("course model")
    }

    pub fn students(&self) -> &ResolvedEntity {
        self.model.entity(STUDENT_MODEL).expect("student model")
    }

    pub async fn course_count(&self) -> i64 {
        CrudService::count(&self.pool, self.courses()).await.expect("count courses")
    }

    pub async fn student_count(&self) -> i64 {
        CrudService::count(&self.pool, self.students()).await.expect("count students")
    }
}
