use crate::common::{TestApp, routes};

mod upsert {
    use super::*;

    #[tokio::test]
    async fn creates_profile_with_company() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("maker", "pass1234").await;

        let res = app
            .post_with_token(
                routes::PROFILE,
                &serde_json::json!({"company": "Initech"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["company"].as_str().unwrap(), "Initech");
        assert_eq!(res.body["user"]["name"].as_str().unwrap(), "maker display");
        assert_eq!(res.body["files"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn second_upsert_updates_single_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("updater", "pass1234").await;

        let first = app
            .post_with_token(
                routes::PROFILE,
                &serde_json::json!({"company": "A"}),
                &token,
            )
            .await;
        assert_eq!(first.status, 200);
        let first_id = first.body["id"].as_i64().unwrap();

        let second = app
            .post_with_token(
                routes::PROFILE,
                &serde_json::json!({"company": "B"}),
                &token,
            )
            .await;
        assert_eq!(second.status, 200);

        // Same profile row, latest company value.
        assert_eq!(second.body["id"].as_i64().unwrap(), first_id);
        assert_eq!(second.body["company"].as_str().unwrap(), "B");

        let me = app.get_with_token(routes::PROFILE_ME, &token).await;
        assert_eq!(me.body["company"].as_str().unwrap(), "B");
    }

    #[tokio::test]
    async fn upsert_is_idempotent_under_identical_input() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("repeat", "pass1234").await;
        let body = serde_json::json!({"company": "SameCo"});

        let first = app.post_with_token(routes::PROFILE, &body, &token).await;
        let second = app.post_with_token(routes::PROFILE, &body, &token).await;

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        assert_eq!(first.body["id"], second.body["id"]);
        assert_eq!(second.body["company"].as_str().unwrap(), "SameCo");
    }

    #[tokio::test]
    async fn empty_company_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("strict", "pass1234").await;

        for body in [
            serde_json::json!({"company": ""}),
            serde_json::json!({"company": "   "}),
            serde_json::json!({}),
        ] {
            let res = app.post_with_token(routes::PROFILE, &body, &token).await;
            assert_eq!(res.status, 400, "{}", res.text);
            assert_eq!(res.error_code(), "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn upsert_requires_auth() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::PROFILE, &serde_json::json!({"company": "X"}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.error_code(), "TOKEN_MISSING");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn absent_profile_is_400_profile_missing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("newbie", "pass1234").await;

        let res = app.get_with_token(routes::PROFILE_ME, &token).await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.error_code(), "PROFILE_MISSING");
    }

    #[tokio::test]
    async fn me_includes_owner_projection() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("owner", "pass1234").await;
        app.post_with_token(
            routes::PROFILE,
            &serde_json::json!({"company": "OwnCo"}),
            &token,
        )
        .await;

        let res = app.get_with_token(routes::PROFILE_ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["user"]["name"].as_str().unwrap(), "owner display");
        assert_eq!(res.body["company"].as_str().unwrap(), "OwnCo");
    }

    #[tokio::test]
    async fn profiles_are_per_user() {
        let app = TestApp::spawn().await;
        let token_a = app.create_authenticated_user("user_a", "pass1234").await;
        let token_b = app.create_authenticated_user("user_b", "pass1234").await;

        app.post_with_token(
            routes::PROFILE,
            &serde_json::json!({"company": "ACo"}),
            &token_a,
        )
        .await;

        // user_b never created a profile; user_a's must not leak.
        let res = app.get_with_token(routes::PROFILE_ME, &token_b).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error_code(), "PROFILE_MISSING");
    }
}
