//! HTTP gateway tests against a wiremock server.

use marknote_client::{ClientConfig, HttpNoteGateway};
use marknote_core::{
    Allowance, CreateNoteRequest, Error, ErrorKind, NoteGateway, UpdateNoteRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> HttpNoteGateway {
    let config = ClientConfig::default().with_base_url(format!("{}/api/", server.uri()));
    HttpNoteGateway::new(config).unwrap()
}

fn note_json(id: &str, title: &str, tags: &[&str]) -> serde_json::Value {
    json!({
        "note_id": id,
        "note": {"title": title, "content": "# body", "owner_id": "u1", "tags": tags},
        "allowance": "Owner"
    })
}

#[tokio::test]
async fn test_list_notes_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "content": [
                {"note_id": "a", "title": "First", "tags": ["work"], "allowance": "Owner"},
                {"note_id": "b", "title": "Second", "tags": [], "allowance": "Read"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notes = gateway(&server).list_notes().await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].tags, vec!["work"]);
    assert_eq!(notes[1].allowance, Allowance::Read);
}

#[tokio::test]
async fn test_get_note_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/note/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "code": "NOT_FOUND",
            "message": "note does not exist"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server).get_note("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_create_note_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/note"))
        .and(body_json(json!({"title": "Fresh", "content": "", "tags": []})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "content": note_json("n9", "Fresh", &[])})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let note = gateway(&server)
        .create_note(&CreateNoteRequest::titled("Fresh"))
        .await
        .unwrap();
    assert_eq!(note.note_id, "n9");
    assert_eq!(note.body.title, "Fresh");
}

#[tokio::test]
async fn test_update_note_puts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/note/n1"))
        .and(body_json(json!({
            "title": "T",
            "content": "new",
            "owner_id": "u1",
            "tags": ["x", "y"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "content": note_json("n1", "T", &["x", "y"])
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let req = UpdateNoteRequest {
        title: "T".to_string(),
        content: "new".to_string(),
        owner_id: "u1".to_string(),
        tags: vec!["x".to_string(), "y".to_string()],
    };
    let note = gateway(&server).update_note("n1", &req).await.unwrap();
    assert_eq!(note.body.tags, vec!["x", "y"]);
}

#[tokio::test]
async fn test_delete_note_accepts_any_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/note/n1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "content": {"deleted": 1}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    gateway(&server).delete_note("n1").await.unwrap();
}

#[tokio::test]
async fn test_failed_envelope_is_recoverable_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/note/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "code": "LOCKED",
            "message": "note is locked"
        })))
        .mount(&server)
        .await;

    let err = gateway(&server).delete_note("n1").await.unwrap_err();
    assert!(matches!(err, Error::Transport { ref code, .. } if code.as_deref() == Some("LOCKED")));
}

#[tokio::test]
async fn test_unauthorized_middleware_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "token-cookie was not found"})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server).list_notes().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permission);
}

#[tokio::test]
async fn test_malformed_note_is_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/note/n1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "content": {"note_id": "n1", "allowance": "Superuser"}
        })))
        .mount(&server)
        .await;

    let err = gateway(&server).get_note("n1").await.unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[tokio::test]
async fn test_preloaded_session_cookie_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("cookie", "token=secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "content": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::default()
        .with_base_url(format!("{}/api", server.uri()))
        .with_session_token("secret");
    let gateway = HttpNoteGateway::new(config).unwrap();
    assert!(gateway.list_notes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_set_cookie_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/note/n1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=issued; Path=/")
                .set_body_json(json!({"success": true, "content": note_json("n1", "T", &[])})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notes"))
        .and(header("cookie", "token=issued"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "content": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server);
    gateway.get_note("n1").await.unwrap();
    gateway.list_notes().await.unwrap();
}

#[tokio::test]
async fn test_note_id_is_a_single_path_segment() {
    let server = MockServer::start().await;

    // Nothing mounted: the server answers 404, we only inspect the request.
    let err = gateway(&server).get_note("a/b?c#d").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/note/a%2Fb%3Fc%23d");
    assert_eq!(requests[0].url.query(), None);
}
