use actix_web::error::ErrorBadRequest;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::MySqlPool;

/// Columns a partial employee update may touch. Anything else in the
/// payload is rejected rather than silently dropped.
pub const EMPLOYEE_COLUMNS: &[&str] = &[
    "employee_code",
    "first_name",
    "last_name",
    "email",
    "position",
    "department_id",
    "hire_date",
];

pub const DEPARTMENT_COLUMNS: &[&str] = &["name"];

#[derive(Debug, PartialEq)]
pub enum PatchValue {
    String(String),
    I64(i64),
    U64(u64),
    Date(NaiveDate),
    Null,
}

/// A rendered `UPDATE … SET … WHERE id = ?` statement plus its bindings,
/// in column order with the row id last.
#[derive(Debug)]
pub struct Patch {
    pub sql: String,
    pub values: Vec<PatchValue>,
}

pub fn build_patch(
    table: &str,
    allowed: &[&str],
    payload: &Value,
    id: u64,
) -> Result<Patch, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    let mut sets = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    for (column, value) in obj {
        if !allowed.contains(&column.as_str()) {
            return Err(ErrorBadRequest(format!("Unknown field `{column}`")));
        }
        sets.push(format!("{column} = ?"));
        values.push(convert(value)?);
    }

    values.push(PatchValue::U64(id));

    Ok(Patch {
        sql: format!("UPDATE {table} SET {} WHERE id = ?", sets.join(", ")),
        values,
    })
}

fn convert(value: &Value) -> Result<PatchValue, actix_web::Error> {
    match value {
        // Date-shaped strings bind as DATE so MySQL comparisons stay sane.
        Value::String(s) => Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(PatchValue::Date)
            .unwrap_or_else(|_| PatchValue::String(s.clone()))),
        Value::Number(n) => n
            .as_i64()
            .map(PatchValue::I64)
            .ok_or_else(|| ErrorBadRequest("Unsupported numeric value")),
        Value::Null => Ok(PatchValue::Null),
        _ => Err(ErrorBadRequest("Unsupported JSON value type")),
    }
}

pub async fn apply_patch(pool: &MySqlPool, patch: Patch) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&patch.sql);

    for value in patch.values {
        query = match value {
            PatchValue::String(v) => query.bind(v),
            PatchValue::I64(v) => query.bind(v),
            PatchValue::U64(v) => query.bind(v),
            PatchValue::Date(v) => query.bind(v),
            PatchValue::Null => query.bind(None::<String>),
        };
    }

    Ok(query.execute(pool).await?.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_update_with_id_bound_last() {
        let patch = build_patch(
            "departments",
            DEPARTMENT_COLUMNS,
            &json!({"name": "Platform"}),
            3,
        )
        .unwrap();

        assert_eq!(patch.sql, "UPDATE departments SET name = ? WHERE id = ?");
        assert_eq!(
            patch.values,
            vec![PatchValue::String("Platform".into()), PatchValue::U64(3)]
        );
    }

    #[test]
    fn rejects_unknown_columns() {
        let result = build_patch(
            "employees",
            EMPLOYEE_COLUMNS,
            &json!({"salary": 100000}),
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_and_non_object_payloads() {
        assert!(build_patch("employees", EMPLOYEE_COLUMNS, &json!({}), 1).is_err());
        assert!(build_patch("employees", EMPLOYEE_COLUMNS, &json!([1, 2]), 1).is_err());
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let patch = build_patch(
            "employees",
            EMPLOYEE_COLUMNS,
            &json!({"hire_date": "2024-02-01"}),
            7,
        )
        .unwrap();

        let expected = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(patch.values[0], PatchValue::Date(expected));
    }
}
