//! Page integration tests.
//!
//! Requests run through the full router (auth and flash middleware included)
//! against an in-memory `SQLite` database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use marquee_db::{
    entities::{movie, user},
    repositories::{PetitionRepository, PetitionVoteRepository, ReviewRepository},
    test_utils::TestDatabase,
};
use marquee_web::{AppState, app, flash::FLASH_COOKIE};
use tower::ServiceExt;

struct TestApp {
    db: TestDatabase,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let db = TestDatabase::new().await.unwrap();
        let state = AppState::new(db.connection()).unwrap();
        let router = app(state, Path::new("media"));
        Self { db, router }
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, viewer: Option<&user::Model>) -> Response<Body> {
        self.send(request("GET", uri, viewer, None)).await
    }

    async fn post(&self, uri: &str, viewer: Option<&user::Model>, form: &str) -> Response<Body> {
        self.send(request("POST", uri, viewer, Some(form))).await
    }

    /// Follow a redirect, carrying the flash cookie it set, and return the page.
    async fn follow(&self, response: Response<Body>, viewer: Option<&user::Model>) -> String {
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = location(&response);

        let mut builder = Request::builder().method("GET").uri(&location);
        if let Some(user) = viewer {
            builder = builder.header(header::AUTHORIZATION, bearer(user));
        }
        if let Some(flash) = flash_cookie(&response) {
            builder = builder.header(header::COOKIE, format!("{FLASH_COOKIE}={flash}"));
        }

        let page = self.send(builder.body(Body::empty()).unwrap()).await;
        assert_eq!(page.status(), StatusCode::OK, "GET {location}");
        body_text(page).await
    }
}

fn bearer(user: &user::Model) -> String {
    format!("Bearer {}", user.token.as_deref().unwrap())
}

fn request(method: &str, uri: &str, viewer: Option<&user::Model>, form: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = viewer {
        builder = builder.header(header::AUTHORIZATION, bearer(user));
    }
    match form {
        Some(form) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn location(response: &Response<Body>) -> String {
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

/// Value of the flash cookie set by a response, ignoring removals.
fn flash_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.strip_prefix(&format!("{FLASH_COOKIE}=")))
        .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
        .find(|value| !value.is_empty())
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn add_movie(app: &TestApp, name: &str) -> movie::Model {
    app.db.insert_movie(name).await.unwrap()
}

#[tokio::test]
async fn test_anonymous_search_without_hide_controls() {
    let app = TestApp::new().await;
    add_movie(&app, "The Matrix").await;
    add_movie(&app, "the matrix reloaded").await;
    add_movie(&app, "Zardoz").await;

    let response = app.get("/?search=Matrix", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("The Matrix"));
    assert!(html.contains("the matrix reloaded"));
    assert!(!html.contains("Zardoz"));
    assert!(!html.contains("hide-toggle"));
}

#[tokio::test]
async fn test_signed_in_catalog_offers_hide_controls() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;

    let html = body_text(app.get("/", Some(&alice)).await).await;

    assert!(html.contains(&format!("/{}/hide-toggle/", zardoz.id)));
}

#[tokio::test]
async fn test_token_cookie_authenticates() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    let response = app
        .send(
            Request::builder()
                .uri("/hidden/")
                .header(header::COOKIE, format!("marquee.token={}", alice.token.unwrap()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/nope/", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mutations_require_sign_in() {
    let app = TestApp::new().await;
    let zardoz = add_movie(&app, "Zardoz").await;

    let response = app
        .post(&format!("/{}/review/create/", zardoz.id), None, "comment=Hi")
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/petitions/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/hidden/", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_review_create_edit_delete() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;
    let detail = format!("/{}/", zardoz.id);

    let response = app
        .post(&format!("{detail}review/create/"), Some(&alice), "comment=++Strange+film++")
        .await;
    assert_eq!(location(&response), detail);
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Review added."));
    assert!(html.contains("Strange film"));

    let reviews = ReviewRepository::new(app.db.connection());
    let (review, _) = reviews
        .find_by_movie_with_authors(&zardoz.id)
        .await
        .unwrap()
        .remove(0);
    let edit = format!("{detail}review/{}/edit/", review.id);

    let html = body_text(app.get(&edit, Some(&alice)).await).await;
    assert!(html.contains("Edit Review"));
    assert!(html.contains("Strange film"));

    let response = app.post(&edit, Some(&alice), "comment=Grew+on+me").await;
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Review updated."));
    assert!(html.contains("Grew on me"));

    let response = app
        .post(&format!("{detail}review/{}/delete/", review.id), Some(&alice), "")
        .await;
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Review deleted."));
    assert_eq!(reviews.count_by_movie(&zardoz.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_review_is_skipped_silently() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;

    let response = app
        .post(&format!("/{}/review/create/", zardoz.id), Some(&alice), "comment=+++")
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(flash_cookie(&response).is_none());
    let reviews = ReviewRepository::new(app.db.connection());
    assert_eq!(reviews.count_by_movie(&zardoz.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_over_long_review_is_flashed() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;

    let form = format!("comment={}", "x".repeat(256));
    let response = app
        .post(&format!("/{}/review/create/", zardoz.id), Some(&alice), &form)
        .await;

    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Review must be at most 255 characters."));
}

#[tokio::test]
async fn test_other_users_review_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let bob = app.db.insert_user("bob").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;

    app.post(&format!("/{}/review/create/", zardoz.id), Some(&alice), "comment=Mine")
        .await;
    let reviews = ReviewRepository::new(app.db.connection());
    let (review, _) = reviews
        .find_by_movie_with_authors(&zardoz.id)
        .await
        .unwrap()
        .remove(0);

    let edit = format!("/{}/review/{}/edit/", zardoz.id, review.id);
    assert_eq!(app.get(&edit, Some(&bob)).await.status(), StatusCode::NOT_FOUND);

    let response = app.post(&edit, Some(&bob), "comment=Hijacked").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let delete = format!("/{}/review/{}/delete/", zardoz.id, review.id);
    let response = app.post(&delete, Some(&bob), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(reviews.count_by_movie(&zardoz.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_hide_and_unhide_scenario() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let bob = app.db.insert_user("bob").await.unwrap();
    let zardoz = add_movie(&app, "Zardoz").await;
    add_movie(&app, "Solaris").await;
    let toggle = format!("/{}/hide-toggle/", zardoz.id);

    let response = app
        .send({
            let mut req = request("POST", &toggle, Some(&alice), Some(""));
            req.headers_mut().insert(
                header::REFERER,
                "http://localhost:8000/?search=z".parse().unwrap(),
            );
            req
        })
        .await;
    assert_eq!(location(&response), "/?search=z");
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("&quot;Zardoz&quot; hidden."));

    let html = body_text(app.get("/hidden/", Some(&alice)).await).await;
    assert!(html.contains("Hidden Movies"));
    assert!(html.contains("Zardoz"));

    let html = body_text(app.get("/", Some(&alice)).await).await;
    assert!(!html.contains("Zardoz"));
    assert!(html.contains("Solaris"));

    let html = body_text(app.get("/", Some(&bob)).await).await;
    assert!(html.contains("Zardoz"));

    let response = app.post(&toggle, Some(&alice), "").await;
    assert_eq!(location(&response), "/");
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("&quot;Zardoz&quot; un-hidden."));
    assert!(html.contains(&format!("/{}/", zardoz.id)));
}

#[tokio::test]
async fn test_hide_unknown_movie_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    let response = app.post("/nope/hide-toggle/", Some(&alice), "").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_petition_scenario() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let bob = app.db.insert_user("bob").await.unwrap();

    let response = app
        .post("/petitions/", Some(&alice), "title=Add+4K&reason=")
        .await;
    assert_eq!(location(&response), "/petitions/");
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Petition created."));
    assert!(html.contains("Add 4K"));
    assert!(html.contains("0 yes"));

    let petitions = PetitionRepository::new(app.db.connection());
    let petition_id = petitions.list_with_vote_counts().await.unwrap()[0].id.clone();
    let vote = format!("/petitions/{petition_id}/vote-yes/");

    let html = app.follow(app.post(&vote, Some(&bob), "").await, Some(&bob)).await;
    assert!(html.contains("Your vote has been recorded."));
    assert!(html.contains("1 yes"));

    let html = app.follow(app.post(&vote, Some(&bob), "").await, Some(&bob)).await;
    assert!(html.contains("You already voted Yes on this petition."));
    assert!(html.contains("1 yes"));

    let delete = format!("/petitions/{petition_id}/delete/");
    let response = app.post(&delete, Some(&alice), "").await;
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Petition deleted."));
    assert!(!html.contains("Add 4K"));

    let votes = PetitionVoteRepository::new(app.db.connection());
    assert_eq!(votes.count_for_petition(&petition_id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_petition_requires_title() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    let response = app.post("/petitions/", Some(&alice), "title=++&reason=why").await;
    let html = app.follow(response, Some(&alice)).await;

    assert!(html.contains("Please provide a title for your petition."));
    let petitions = PetitionRepository::new(app.db.connection());
    assert!(petitions.list_with_vote_counts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_author_cannot_edit_or_delete_petition() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();
    let bob = app.db.insert_user("bob").await.unwrap();

    app.post("/petitions/", Some(&alice), "title=Add+4K").await;
    let petitions = PetitionRepository::new(app.db.connection());
    let petition_id = petitions.list_with_vote_counts().await.unwrap()[0].id.clone();
    let edit = format!("/petitions/{petition_id}/edit/");
    let delete = format!("/petitions/{petition_id}/delete/");

    let html = app.follow(app.get(&edit, Some(&bob)).await, Some(&bob)).await;
    assert!(html.contains("You can only edit your own petition."));

    let response = app.post(&edit, Some(&bob), "title=Hijacked").await;
    assert_eq!(location(&response), "/petitions/");
    let html = app.follow(response, Some(&bob)).await;
    assert!(html.contains("You can only edit your own petition."));

    let html = app.follow(app.post(&delete, Some(&bob), "").await, Some(&bob)).await;
    assert!(html.contains("You can only delete your own petition."));

    let html = app.follow(app.get(&delete, Some(&bob)).await, Some(&bob)).await;
    assert!(html.contains("You can only delete your own petition."));

    let petition = petitions.get_by_id(&petition_id).await.unwrap();
    assert_eq!(petition.title, "Add 4K");
}

#[tokio::test]
async fn test_author_edit_flow() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    app.post("/petitions/", Some(&alice), "title=Add+4K").await;
    let petitions = PetitionRepository::new(app.db.connection());
    let petition_id = petitions.list_with_vote_counts().await.unwrap()[0].id.clone();
    let edit = format!("/petitions/{petition_id}/edit/");

    let html = body_text(app.get(&edit, Some(&alice)).await).await;
    assert!(html.contains("Edit Petition"));
    assert!(html.contains("Add 4K"));

    let response = app.post(&edit, Some(&alice), "title=+&reason=x").await;
    assert_eq!(location(&response), edit);
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Please provide a title."));

    let response = app
        .post(&edit, Some(&alice), "title=Add+8K&reason=Sharper")
        .await;
    let html = app.follow(response, Some(&alice)).await;
    assert!(html.contains("Petition updated."));
    assert!(html.contains("Add 8K"));
    assert!(html.contains("Sharper"));

    // Read intent never deletes.
    let response = app.get(&format!("/petitions/{petition_id}/delete/"), Some(&alice)).await;
    assert_eq!(location(&response), "/petitions/");
    assert!(flash_cookie(&response).is_none());
    assert!(petitions.find_by_id(&petition_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_vote_on_missing_petition_is_not_found() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    let response = app.post("/petitions/nope/vote-yes/", Some(&alice), "").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rendered_flash_is_cleared() {
    let app = TestApp::new().await;
    let alice = app.db.insert_user("alice").await.unwrap();

    let response = app.post("/petitions/", Some(&alice), "title=Add+4K").await;
    let flash = flash_cookie(&response).unwrap();

    let page = app
        .send({
            let mut req = request("GET", "/petitions/", Some(&alice), None);
            req.headers_mut().insert(
                header::COOKIE,
                format!("{FLASH_COOKIE}={flash}").parse().unwrap(),
            );
            req
        })
        .await;

    let removal = page.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(removal.starts_with(&format!("{FLASH_COOKIE}=;")));
}
