//! Built-in declarations: students, courses, and the courses resource.

use crate::config::{ApiResourceConfig, FieldConfig, FieldType, FullConfig, ManyToManyConfig, ModelConfig, Operation};

pub const STUDENT_MODEL: &str = "student";
pub const COURSE_MODEL: &str = "course";

pub fn student_model() -> ModelConfig {
    ModelConfig {
        id: STUDENT_MODEL.into(),
        table: "students".into(),
        primary_key: "id".into(),
        fields: vec![
            FieldConfig::new("name", FieldType::Text),
            FieldConfig::new("birth_date", FieldType::Date).nullable(),
        ],
        many_to_many: Vec::new(),
    }
}

/// `max_students` caps how many students one course may hold.
pub fn course_model(max_students: Option<u32>) -> ModelConfig {
    ModelConfig {
        id: COURSE_MODEL.into(),
        table: "courses".into(),
        primary_key: "id".into(),
        fields: vec![FieldConfig::new("name", FieldType::Text)],
        many_to_many: vec![ManyToManyConfig {
            name: "students".into(),
            target_model_id: STUDENT_MODEL.into(),
            join_table: "course_students".into(),
            source_column: "course_id".into(),
            target_column: "student_id".into(),
            max_items: max_students,
        }],
    }
}

pub fn course_catalog(max_students: Option<u32>) -> FullConfig {
    FullConfig {
        models: vec![student_model(), course_model(max_students)],
        api_resources: vec![ApiResourceConfig {
            model_id: COURSE_MODEL.into(),
            path_segment: "courses".into(),
            filter_fields: vec!["id".into(), "name".into()],
            operations: Operation::ALL.to_vec(),
        }],
    }
}
