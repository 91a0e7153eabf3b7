use serde::{Deserialize, Serialize};
use time::Date;

use crate::users::repo::User;

/// Public part of the user returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub other_name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<Date>,
    pub city: Option<String>,
    pub additional_info: Option<String>,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            other_name: u.other_name,
            phone: u.phone,
            birthday: u.birthday,
            city: u.city,
            additional_info: u.additional_info,
            is_admin: u.is_admin,
        }
    }
}

/// Partial profile update. Absent fields keep their stored values; the
/// password and admin flag are not updatable through this body.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub other_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthday: Option<Date>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Admin-side creation body: registration fields plus the admin flag.
#[derive(Debug, Deserialize)]
pub struct AdminCreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub other_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthday: Option<Date>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Admin-side partial update; may flip the admin flag.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUpdateUser {
    #[serde(flatten)]
    pub profile: UpdateUser,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_page() -> i64 {
    1
}
fn default_size() -> i64 {
    20
}

/// Paginated listing envelope: `{data, meta: {pagination}}`.
#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub data: Vec<UserResponse>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn user_response_drops_the_hash() {
        let user = User {
            id: 3,
            email: "dto@example.com".into(),
            password_hash: "$argon2id$digest".into(),
            first_name: "Dto".into(),
            last_name: "Test".into(),
            other_name: None,
            phone: None,
            birthday: None,
            city: None,
            additional_info: None,
            is_admin: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password_hash"));
        assert_eq!(obj["id"], 3);
        assert_eq!(obj["is_admin"], true);
    }

    #[test]
    fn pagination_defaults_apply() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.size, 20);
    }

    #[test]
    fn admin_update_flattens_profile_fields() {
        let body: AdminUpdateUser =
            serde_json::from_str(r#"{"first_name": "New", "is_admin": true}"#).unwrap();
        assert_eq!(body.profile.first_name.as_deref(), Some("New"));
        assert_eq!(body.is_admin, Some(true));
        assert!(body.profile.email.is_none());
    }

    #[test]
    fn list_envelope_shape() {
        let response = UsersListResponse {
            data: vec![],
            meta: ListMeta {
                pagination: PageInfo {
                    total: 42,
                    page: 2,
                    size: 10,
                },
            },
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["meta"]["pagination"]["total"], 42);
        assert!(json["data"].as_array().unwrap().is_empty());
    }
}
