//! Row factories. Rows are inserted through `CrudService` so tests only go
//! through HTTP for the behavior under test.

use super::harness::TestApp;
use course_api::service::CleanedData;
use course_api::sql::BindValue;
use course_api::CrudService;
use serde_json::Value;
use uuid::Uuid;

fn random_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub fn id_of(row: &Value) -> i64 {
    row["id"].as_i64().expect("row id")
}

pub fn name_of(row: &Value) -> &str {
    row["name"].as_str().expect("row name")
}

pub struct CourseFactory<'a> {
    app: &'a TestApp,
}

impl<'a> CourseFactory<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        CourseFactory { app }
    }

    /// `quantity` courses with random names, in insertion order.
    pub async fn make(&self, quantity: usize) -> Vec<Value> {
        let mut rows = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            rows.push(self.make_named(&random_name("course")).await);
        }
        rows
    }

    pub async fn make_named(&self, name: &str) -> Value {
        self.make_with_students(name, &[]).await
    }

    pub async fn make_with_students(&self, name: &str, student_ids: &[i64]) -> Value {
        let mut data = CleanedData::new().with_column("name", BindValue::Text(name.to_string()));
        if !student_ids.is_empty() {
            data = data.with_relation("students", student_ids.to_vec());
        }
        CrudService::create(&self.app.pool, self.app.courses(), &data)
            .await
            .expect("create course")
    }
}

pub struct StudentFactory<'a> {
    app: &'a TestApp,
}

impl<'a> StudentFactory<'a> {
    pub fn new(app: &'a TestApp) -> Self {
        StudentFactory { app }
    }

    pub async fn make(&self, quantity: usize) -> Vec<Value> {
        let mut rows = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let data = CleanedData::new()
                .with_column("name", BindValue::Text(random_name("student")))
                .with_column("birth_date", BindValue::Text("2000-01-01".into()));
            let row = CrudService::create(&self.app.pool, self.app.students(), &data)
                .await
                .expect("create student");
            rows.push(row);
        }
        rows
    }

    pub async fn make_ids(&self, quantity: usize) -> Vec<i64> {
        self.make(quantity).await.iter().map(id_of).collect()
    }
}
