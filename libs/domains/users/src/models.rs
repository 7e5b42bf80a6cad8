use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User identifier. `0` means "not assigned yet".
pub type UserId = u32;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier, assigned by the store on insert
    #[schema(example = 1)]
    pub id: UserId,
    #[schema(example = "John")]
    pub name: String,
    #[schema(example = "Doe")]
    pub surname: String,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Full replacement of the record stored under `id`
    pub fn from_update(id: UserId, input: UpdateUser) -> Self {
        Self::new(id, input.name, input.surname)
    }
}

/// DTO for creating a new user. Any `id` in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "John")]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    #[schema(example = "Doe")]
    pub surname: String,
}

impl From<CreateUser> for User {
    fn from(input: CreateUser) -> Self {
        User::new(0, input.name, input.surname)
    }
}

/// DTO for replacing a user; the id comes from the path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub surname: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_ignores_id() {
        let input: CreateUser =
            serde_json::from_str(r#"{"id": 42, "name": "John", "surname": "Doe"}"#).unwrap();
        let user: User = input.into();

        assert_eq!(user, User::new(0, "John", "Doe"));
    }

    #[test]
    fn test_user_wire_format() {
        let json = serde_json::to_value(User::new(1, "John", "Doe")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "John", "surname": "Doe"})
        );
    }

    #[test]
    fn test_validation_bounds() {
        let ok = CreateUser {
            name: "J".to_string(),
            surname: "D".repeat(100),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateUser {
            name: String::new(),
            surname: "Doe".to_string(),
        };
        assert!(empty.validate().is_err());

        let long = UpdateUser {
            name: "John".to_string(),
            surname: "D".repeat(101),
        };
        let errors = long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("surname"));
    }
}
