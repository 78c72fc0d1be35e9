pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::intake::handlers as intake;
use crate::render::handlers as render;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

/// Room for multipart boundaries and the `user_id` field on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Intake
        .route(
            "/api/v1/resumes/upload",
            post(intake::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/resumes/:id", get(intake::handle_get_resume))
        .route("/api/v1/resumes/:id/parse", post(intake::handle_parse))
        // Tailoring
        .route("/api/v1/resumes/:id/tailor", post(tailoring::handle_tailor))
        .route("/api/v1/tailored", get(tailoring::handle_list_tailored))
        .route("/api/v1/tailored/:id", get(tailoring::handle_get_tailored))
        .route(
            "/api/v1/tailored/:id/status",
            patch(tailoring::handle_update_status),
        )
        // Export
        .route("/api/v1/pdf/export", post(render::handle_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::llm_client::scripted::ScriptedModel;
    use crate::models::records::NewMasterResume;
    use crate::render::Typesetter;
    use crate::storage::memory::{MemoryBlobStore, MemoryResumeRepository};
    use crate::storage::{BlobStore, ResumeRepository};

    const PDF: &[u8] = b"%PDF-1.4 stand-in document";
    const BOUNDARY: &str = "refit-test-boundary";

    const DISCOVERY: &str = r#"{"sections": ["personalInfo", "skills"]}"#;
    const TAILORED: &str = r#"Here you go:
{"personalInfo": {"name": "Ada Lovelace", "email": "ada@example.com"},
 "skills": {"technical": ["Rust", "PostgreSQL"]},
 "education": [{"degree": "BSc Mathematics", "institution": "London", "year": "1835"}]}"#;

    struct Harness {
        app: Router,
        repo: Arc<MemoryResumeRepository>,
        blobs: Arc<MemoryBlobStore>,
        model: Arc<ScriptedModel>,
    }

    fn harness(model: ScriptedModel) -> Harness {
        let repo = Arc::new(MemoryResumeRepository::default());
        let blobs = Arc::new(MemoryBlobStore::default());
        let model = Arc::new(model);
        let state = AppState {
            repo: repo.clone(),
            blobs: blobs.clone(),
            model: model.clone(),
            renderer: Arc::new(Typesetter),
            config: Config::for_tests(),
        };
        Harness {
            app: build_router(state),
            repo,
            blobs,
            model,
        }
    }

    async fn seed_master(h: &Harness, user_id: &str) -> Uuid {
        let key = format!("resumes/{user_id}/cv_{user_id}_1.pdf");
        h.blobs
            .put(&key, Bytes::from_static(PDF), "application/pdf")
            .await
            .unwrap();
        h.repo
            .insert_master(NewMasterResume {
                user_id,
                original_file_name: "cv.pdf",
                file_size: PDF.len() as i64,
                blob_key: &key,
            })
            .await
            .unwrap()
            .id
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload_request(
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        user_id: Option<&str>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(user_id) = user_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/resumes/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn tailor_request(resume_id: Uuid, body: Value) -> Request<Body> {
        json_request(
            Method::POST,
            &format!("/api/v1/resumes/{resume_id}/tailor"),
            body,
        )
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(&h.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_stores_blob_and_master() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(
            &h.app,
            upload_request("My CV.pdf", "application/pdf", PDF, Some("user_42")),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["user_id"], "user_42");
        let file_name = body["file_name"].as_str().unwrap();
        assert!(file_name.starts_with("My_CV_user_42_"));
        assert_eq!(
            h.blobs.keys(),
            vec![format!("resumes/user_42/{file_name}")]
        );

        let resume_id = body["resume_id"].as_str().unwrap();
        let (status, master) = send(&h.app, get(&format!("/api/v1/resumes/{resume_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(master["original_file_name"], "My CV.pdf");
        assert!(master["section_set"].is_null());
    }

    #[tokio::test]
    async fn test_upload_without_user_generates_one() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(
            &h.app,
            upload_request("cv.pdf", "application/pdf", PDF, None),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(body["user_id"].as_str().unwrap().starts_with("user_"));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(
            &h.app,
            upload_request("photo.png", "image/png", b"\x89PNG", Some("user_1")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(h.blobs.keys().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_resume_is_not_found() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) =
            send(&h.app, get(&format!("/api/v1/resumes/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_tailor_discovers_validates_and_persists() {
        let h = harness(ScriptedModel::texts([DISCOVERY, TAILORED]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(
                resume_id,
                json!({
                    "job_description": "We need a Rust engineer with PostgreSQL and Kubernetes.",
                    "job_title": "Backend Engineer",
                    "company": "Analytical Engines",
                    "user_id": "user_1"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["sections_discovered_now"], true);
        assert_eq!(
            body["tailored"]["section_order"],
            json!(["personalInfo", "skills"])
        );
        assert!(body["tailored"]["content"].get("education").is_none());
        assert_eq!(body["fidelity"]["dropped"], json!(["education"]));
        assert_eq!(body["fidelity"]["missing"], json!([]));
        assert!(body["changes"].is_null());
        assert!(body["keyword_coverage"]["matched"]
            .as_array()
            .unwrap()
            .contains(&json!("Rust")));

        let master = h.repo.get_master(resume_id).await.unwrap().unwrap();
        assert_eq!(
            master.section_set,
            Some(vec!["personalInfo".to_string(), "skills".to_string()])
        );
        assert_eq!(h.repo.tailored_count(), 1);
    }

    #[tokio::test]
    async fn test_second_tailoring_reuses_section_set() {
        let h = harness(ScriptedModel::texts([DISCOVERY, TAILORED]));
        let resume_id = seed_master(&h, "user_1").await;
        let body = json!({"job_description": "Rust role"});

        let (first, _) = send(&h.app, tailor_request(resume_id, body.clone())).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(h.model.calls(), 2);

        let (second, response) = send(&h.app, tailor_request(resume_id, body)).await;
        assert_eq!(second, StatusCode::OK, "{response}");
        assert_eq!(response["sections_discovered_now"], false);
        // tailoring only, no second discovery call
        assert_eq!(h.model.calls(), 3);
        assert_eq!(h.repo.tailored_count(), 2);
    }

    #[tokio::test]
    async fn test_tailor_reports_missing_sections() {
        let discovery = r#"{"sections": ["personalInfo", "skills", "experience"]}"#;
        let tailored = r#"{"personalInfo": {"name": "Ada"}, "experience": []}"#;
        let h = harness(ScriptedModel::texts([discovery, tailored]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(resume_id, json!({"job_description": "Analyst"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["fidelity"]["missing"], json!(["skills"]));
        assert_eq!(
            body["tailored"]["section_order"],
            json!(["personalInfo", "experience"])
        );
    }

    #[tokio::test]
    async fn test_tailor_enforces_ownership() {
        let h = harness(ScriptedModel::texts([DISCOVERY, TAILORED]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(
                resume_id,
                json!({"job_description": "Rust role", "user_id": "user_2"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_tailor_requires_job_description() {
        let h = harness(ScriptedModel::texts([DISCOVERY, TAILORED]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, _) = send(
            &h.app,
            tailor_request(resume_id, json!({"job_description": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_nameless_tailoring_persists_nothing() {
        let nameless = r#"{"personalInfo": {"email": "x@example.com"}, "skills": ["Rust"]}"#;
        let h = harness(ScriptedModel::texts([DISCOVERY, nameless]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(resume_id, json!({"job_description": "Rust role"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "TAILORING_FAILED");
        assert_eq!(h.repo.tailored_count(), 0);

        let master = h.repo.get_master(resume_id).await.unwrap().unwrap();
        assert!(master.section_set.is_none());
    }

    #[tokio::test]
    async fn test_set_without_personal_info_persists_nothing() {
        let h = harness(ScriptedModel::texts([
            r#"{"sections": ["skills", "experience"]}"#,
            TAILORED,
        ]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(resume_id, json!({"job_description": "Rust role"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "INVALID_RESUME_STRUCTURE");
        assert_eq!(h.repo.tailored_count(), 0);

        let master = h.repo.get_master(resume_id).await.unwrap().unwrap();
        assert!(master.section_set.is_none());
    }

    #[tokio::test]
    async fn test_unusable_discovery_is_structure_extraction_failure() {
        let h = harness(ScriptedModel::texts(["I could not read the document."]));
        let resume_id = seed_master(&h, "user_1").await;

        let (status, body) = send(
            &h.app,
            tailor_request(resume_id, json!({"job_description": "Rust role"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "STRUCTURE_EXTRACTION_FAILED");
        assert_eq!(h.repo.tailored_count(), 0);
    }

    #[tokio::test]
    async fn test_list_get_and_update_status() {
        let h = harness(ScriptedModel::texts([DISCOVERY, TAILORED]));
        let resume_id = seed_master(&h, "user_1").await;
        for title in ["First", "Second"] {
            let (status, _) = send(
                &h.app,
                tailor_request(
                    resume_id,
                    json!({"job_description": "Rust role", "job_title": title}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, list) = send(&h.app, get("/api/v1/tailored?user_id=user_1")).await;
        assert_eq!(status, StatusCode::OK);
        let items = list["tailored_resumes"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["job_title"], "Second");
        assert_eq!(items[0]["status"], "draft");

        let tailored_id = items[1]["id"].as_str().unwrap().to_string();
        let (status, updated) = send(
            &h.app,
            json_request(
                Method::PATCH,
                &format!("/api/v1/tailored/{tailored_id}/status"),
                json!({"status": "interview"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "interview");

        let (status, fetched) = send(&h.app, get(&format!("/api/v1/tailored/{tailored_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["status"], "interview");
        assert_eq!(fetched["job_title"], "First");

        let (status, _) = send(
            &h.app,
            json_request(
                Method::PATCH,
                &format!("/api/v1/tailored/{tailored_id}/status"),
                json!({"status": "ghosted"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&h.app, get(&format!("/api/v1/tailored/{}", Uuid::new_v4()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_without_content_uses_placeholder() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(
            &h.app,
            json_request(
                Method::POST,
                "/api/v1/pdf/export",
                json!({"user_id": "user_1", "company": "Acme Corp"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let pdf = STANDARD.decode(body["pdf_base64"].as_str().unwrap()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        assert_eq!(body["byte_size"], pdf.len());
        assert!(body["sections"]
            .as_array()
            .unwrap()
            .contains(&json!("experience")));

        let file_name = body["file_name"].as_str().unwrap();
        assert!(file_name.starts_with("resume_Acme_Corp_"));
        let key = format!("tailored-pdfs/user_1/{file_name}");
        assert_eq!(h.blobs.keys(), vec![key.clone()]);
        assert_eq!(body["download_url"], format!("memory://{key}"));
    }

    #[tokio::test]
    async fn test_export_renders_supplied_content() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, body) = send(
            &h.app,
            json_request(
                Method::POST,
                "/api/v1/pdf/export",
                json!({
                    "user_id": "user_1",
                    "content": {
                        "personalInfo": {"name": "Ada Lovelace"},
                        "skills": {"technical": ["**Rust**", "SQL"]}
                    }
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["sections"], json!(["personalInfo", "skills"]));
    }

    #[tokio::test]
    async fn test_export_rejects_bad_user_id() {
        let h = harness(ScriptedModel::texts(Vec::<String>::new()));
        let (status, _) = send(
            &h.app,
            json_request(
                Method::POST,
                "/api/v1/pdf/export",
                json!({"user_id": "../other"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(h.blobs.keys().is_empty());
    }
}
