// user_data table module.
// Seeding from CSV and lazy streaming of users.

pub mod seed;
pub mod stream;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Record;
use crate::error::Result;

pub use seed::{SeedOutcome, create_table, insert_data, seed_database};
pub use stream::{
    UserPages, UserStream, batch_processing, calculate_average_age, lazy_paginate,
    paginate_users, stream_user_ages, stream_users, stream_users_in_batches,
};

/// A row of the user_data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl TryFrom<Record> for User {
    type Error = crate::error::ProdevError;

    fn try_from(record: Record) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

/// Convert a page of records into users.
pub fn users_from_records(records: Vec<Record>) -> Result<Vec<User>> {
    records.into_iter().map(User::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProdevError;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_user_from_record() {
        let user = User::try_from(record(json!({
            "user_id": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "age": 36,
        })))
        .unwrap();

        assert_eq!(user.name, "Ada");
        assert_eq!(user.age, 36);
    }

    #[test]
    fn test_user_from_incomplete_record() {
        let result = User::try_from(record(json!({"user_id": "u1"})));
        assert!(matches!(result, Err(ProdevError::Json(_))));
    }
}
