use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;
use vidshare_api::auth::password::hash_password;
use vidshare_core::models::NewUser;
use vidshare_db::UserRepository;

use super::api_path;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Logged-in test user
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Insert a user directly and log in through the API.
pub async fn create_logged_in_user(
    client: &TestServer,
    pool: &sqlx::PgPool,
    username: &str,
) -> TestUser {
    let email = format!("{}@example.com", username);
    let password_hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");

    let user = UserRepository::new(pool.clone())
        .create(NewUser {
            username: username.to_string(),
            email: email.clone(),
            full_name: format!("{} Tester", username),
            password_hash,
            avatar: format!("{}/avatars/{}.png", super::MEDIA_BASE_URL, username),
            cover_image: String::new(),
        })
        .await
        .expect("Failed to create test user");

    let response = client
        .post(&api_path("/users/login"))
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200, "login failed: {}", response.text());

    let body: serde_json::Value = response.json();
    TestUser {
        id: user.id,
        username: username.to_string(),
        email,
        access_token: body["data"]["accessToken"]
            .as_str()
            .expect("accessToken in login response")
            .to_string(),
        refresh_token: body["data"]["refreshToken"]
            .as_str()
            .expect("refreshToken in login response")
            .to_string(),
    }
}
