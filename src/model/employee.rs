use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 101,
        "employee_code": "ENG-2024-4821",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "position": "Software Engineer",
        "department_id": 1,
        "hire_date": "2024-01-01"
    })
)]
pub struct Employee {
    #[schema(example = 101)]
    pub id: u64,

    /// Server-generated, `DEP-YYYY-XXXX`.
    #[schema(example = "ENG-2024-4821")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "Software Engineer")]
    pub position: String,

    #[schema(example = 1)]
    pub department_id: u64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,
}
