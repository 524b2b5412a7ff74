use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entity. Rows are created by seeding tooling and never mutated by
/// this backend; every access here is read-only.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub muscle_group: Option<String>,
    pub difficulty_level: Option<String>,
    pub equipment_needed: Option<String>,
    pub met_value: Option<f64>,
    pub average_calories_burned: Option<i32>,
}

/// Minimal reference embedded in workout line items.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRef {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub muscle_group: Option<String>,
}
