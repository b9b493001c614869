use bson::oid::ObjectId;
use scholaris_services::AuthService;

use super::test_app::TestApp;

/// An identity with a valid access token. The user directory is external
/// to this service, so tests mint tokens directly instead of registering
/// users.
pub struct SeededUser {
    pub id: String,
    pub user_id: ObjectId,
    pub email: String,
    pub username: String,
    pub access_token: String,
}

impl TestApp {
    pub fn seed_user(&self, username: &str) -> SeededUser {
        let user_id = ObjectId::new();
        let email = format!("{username}@example.com");

        let auth = AuthService::new(self.settings.jwt.clone());
        let access_token = auth
            .issue_access_token(user_id, &email, username)
            .expect("Failed to issue access token");

        SeededUser {
            id: user_id.to_hex(),
            user_id,
            email,
            username: username.to_string(),
            access_token,
        }
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }
}
