use crate::common::{TestApp, routes};

mod register {
    use super::*;

    #[tokio::test]
    async fn register_creates_user() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "username": "alice",
                    "name": "Alice Wonder",
                    "password": "pass1234",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"].as_str().unwrap(), "alice");
        assert!(res.body["id"].as_i64().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let app = TestApp::spawn().await;
        let body = serde_json::json!({
            "username": "bob",
            "name": "Bob",
            "password": "pass1234",
        });

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201);

        let second = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.error_code(), "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn invalid_payloads_are_rejected() {
        let app = TestApp::spawn().await;

        for body in [
            serde_json::json!({"username": "", "name": "X", "password": "pass1234"}),
            serde_json::json!({"username": "has space", "name": "X", "password": "pass1234"}),
            serde_json::json!({"username": "ok_name", "name": "  ", "password": "pass1234"}),
            serde_json::json!({"username": "ok_name", "name": "X", "password": "short"}),
        ] {
            let res = app.post_without_token(routes::REGISTER, &body).await;
            assert_eq!(res.status, 400, "{}", res.text);
            assert_eq!(res.error_code(), "VALIDATION_ERROR");
        }
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_display_name() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("carol", "pass1234").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({"username": "carol", "password": "pass1234"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].as_str().is_some());
        assert_eq!(res.body["name"].as_str().unwrap(), "carol display");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("dave", "pass1234").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({"username": "dave", "password": "wrong-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &serde_json::json!({"username": "nobody", "password": "pass1234"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "INVALID_CREDENTIALS");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn me_returns_account_info() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("erin", "pass1234").await;

        let res = app.get_with_token(routes::AUTH_ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["username"].as_str().unwrap(), "erin");
        assert_eq!(res.body["name"].as_str().unwrap(), "erin display");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::AUTH_ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn me_with_garbage_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::AUTH_ME, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "TOKEN_INVALID");
    }
}
