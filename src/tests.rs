//! Integration tests for the rug atelier backend.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{AdminSession, Config};
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

const ADMIN_TOKEN: &str = "tok-meera";
const MAX_UPLOAD_BYTES: usize = 1024;

/// Test fixture for integration tests.
struct TestFixture {
    /// Client carrying a valid admin session
    admin: Client,
    /// Client with no credentials
    public: Client,
    base_url: String,
    upload_dir: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_sessions(vec![AdminSession {
            admin_id: "meera".to_string(),
            token: ADMIN_TOKEN.to_string(),
        }])
        .await
    }

    async fn with_sessions(admin_sessions: Vec<AdminSession>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");
        let upload_dir = temp_dir.path().join("uploads");

        // Bind first so stored upload URLs point at this server
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            bind_addr: addr,
            db_path,
            upload_dir: upload_dir.clone(),
            base_url: base_url.clone(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            admin_sessions,
            admin_email: "studio@rugs.example".to_string(),
            from_email: "noreply@rugs.example".to_string(),
            reply_to_email: "hello@rugs.example".to_string(),
            calendly_url: Some("https://calendly.com/rugs/consult".to_string()),
            log_level: "warn".to_string(),
        };

        let app = create_router(AppState::new(Repository::new(pool), config));

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-admin-session", ADMIN_TOKEN.parse().unwrap());

        TestFixture {
            admin: Client::builder().default_headers(headers).build().unwrap(),
            public: Client::new(),
            base_url,
            upload_dir,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn admin_get(&self, path: &str) -> Value {
        body(self.admin.get(self.url(path)).send().await.unwrap()).await
    }

    async fn admin_post(&self, path: &str, payload: Value) -> Value {
        body(
            self.admin
                .post(self.url(path))
                .json(&payload)
                .send()
                .await
                .unwrap(),
        )
        .await
    }

    async fn admin_put(&self, path: &str, payload: Value) -> Value {
        body(
            self.admin
                .put(self.url(path))
                .json(&payload)
                .send()
                .await
                .unwrap(),
        )
        .await
    }

    async fn public_get(&self, path: &str) -> Value {
        body(self.public.get(self.url(path)).send().await.unwrap()).await
    }

    async fn public_post(&self, path: &str, payload: Value) -> Value {
        body(
            self.public
                .post(self.url(path))
                .json(&payload)
                .send()
                .await
                .unwrap(),
        )
        .await
    }

    async fn cache_generation(&self, tag: &str) -> u64 {
        let tags = self.public_get("/api/cache/tags").await;
        tags["data"][tag].as_u64().unwrap_or(0)
    }

    async fn create_product(&self, name: &str, slug: &str) -> Value {
        let resp = self.admin_post("/api/admin/products", product_payload(name, slug)).await;
        assert_eq!(resp["success"], true, "create product failed: {}", resp);
        resp["data"].clone()
    }

    async fn create_collection(&self, name: &str, slug: &str) -> Value {
        let resp = self
            .admin_post("/api/admin/collections", collection_payload(name, slug))
            .await;
        assert_eq!(resp["success"], true, "create collection failed: {}", resp);
        resp["data"].clone()
    }

    async fn submit_contact(&self, name: &str) -> Value {
        let resp = self
            .public_post(
                "/api/leads/contact",
                json!({
                    "name": name,
                    "email": "asha@example.com",
                    "message": "I would love to see the indigo runner in person.",
                }),
            )
            .await;
        assert_eq!(resp["success"], true, "contact form failed: {}", resp);
        resp["data"].clone()
    }

    /// Every file currently in the upload directory.
    fn stored_files(&self) -> Vec<std::path::PathBuf> {
        fn walk(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>) {
            if let Ok(entries) = std::fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_dir() {
                        walk(&path, out);
                    } else {
                        out.push(path);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.upload_dir, &mut out);
        out
    }
}

async fn body(resp: Response) -> Value {
    resp.json().await.unwrap()
}

fn product_payload(name: &str, slug: &str) -> Value {
    json!({
        "name": name,
        "slug": slug,
        "description": "Hand-knotted wool in deep indigo, washed by hand.",
        "images": [
            { "url": "https://cdn.rugs.example/indigo-1.jpg", "alt": "Indigo rug", "isMain": true, "sortOrder": 0 }
        ],
        "specifications": { "materials": ["wool"], "weaveType": "hand-knotted", "origin": "Jaipur" },
        "collections": ["coastal"],
        "roomTypes": ["living-room"],
        "price": { "isVisible": true, "startingFrom": 1200.0, "currency": "USD" }
    })
}

fn collection_payload(name: &str, slug: &str) -> Value {
    json!({
        "name": name,
        "slug": slug,
        "description": "Sea-washed blues and sandy neutrals.",
        "type": "style"
    })
}

fn image_part(name: &str, len: usize) -> Part {
    Part::bytes(vec![0xAB; len])
        .file_name(name.to_string())
        .mime_str("image/jpeg")
        .unwrap()
}

#[test]
fn test_upload_body_limit_saturates() {
    assert_eq!(crate::upload_body_limit(1024), 1024 * 10 + 1024 * 1024);
    assert_eq!(crate::upload_body_limit(usize::MAX / 2), usize::MAX);
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture.public.get(fixture.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_admin_requires_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .public
        .get(fixture.url("/api/admin/leads"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let resp = fixture
        .public
        .get(fixture.url("/api/admin/leads"))
        .header("x-admin-session", "tok-wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_admin_session_sources() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .public
        .get(fixture.url("/api/admin/leads"))
        .header("cookie", format!("__session={}", ADMIN_TOKEN))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .public
        .get(fixture.url("/api/admin/leads"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_no_configured_sessions_rejects_everything() {
    let fixture = TestFixture::with_sessions(vec![]).await;

    let resp = fixture
        .admin
        .get(fixture.url("/api/admin/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_contact_lead_invalid_email_stores_nothing() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .public
        .post(fixture.url("/api/leads/contact"))
        .json(&json!({
            "name": "Asha Rao",
            "email": "not-an-email",
            "message": "I would love to see the indigo runner in person.",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["email"].is_string());

    let leads = fixture.admin_get("/api/admin/leads").await;
    assert_eq!(leads["data"].as_array().unwrap().len(), 0);
    assert_eq!(fixture.cache_generation("leads").await, 0);
}

#[tokio::test]
async fn test_lead_forms_create_new_leads() {
    let fixture = TestFixture::new().await;

    let receipt = fixture.submit_contact("Asha Rao").await;
    assert_eq!(receipt["type"], "contact");
    assert_eq!(fixture.cache_generation("leads").await, 1);
    assert_eq!(fixture.cache_generation("leads-stats").await, 1);

    let enquiry = fixture
        .public_post(
            "/api/leads/enquiry",
            json!({
                "name": "Ravi Menon",
                "email": "ravi@studio.in",
                "productId": "p-123",
                "productName": "Indigo Runner",
                "preferredSize": "8x10"
            }),
        )
        .await;
    assert_eq!(enquiry["success"], true);

    let customize = fixture
        .public_post(
            "/api/leads/customize",
            json!({
                "name": "Lena Ortiz",
                "email": "lena@example.com",
                "width": 8,
                "length": 10,
                "unit": "ft",
                "preferredColors": ["indigo", "rust"],
                "moodboardUrls": ["/media/moodboard/general/1-a.jpg"]
            }),
        )
        .await;
    assert_eq!(customize["success"], true);

    let trade = fixture
        .public_post(
            "/api/leads/trade",
            json!({
                "name": "Studio North",
                "email": "hello@studionorth.com",
                "phone": "+44 20 7946 0000",
                "companyName": "Studio North Ltd",
                "businessType": "interior-designer",
                "website": "https://studionorth.com"
            }),
        )
        .await;
    assert_eq!(trade["success"], true);

    let lead = fixture
        .admin_get(&format!("/api/admin/leads/{}", receipt["id"].as_str().unwrap()))
        .await;
    assert_eq!(lead["data"]["status"], "new");
    assert_eq!(lead["data"]["email"], "asha@example.com");
    assert_eq!(lead["data"]["source"], "contact-page");

    let trades = fixture.admin_get("/api/admin/leads?type=trade").await;
    let trades = trades["data"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["businessType"], "interior-designer");

    let stats = fixture.admin_get("/api/admin/leads/stats").await;
    assert_eq!(stats["data"]["total"], 4);
    assert_eq!(stats["data"]["byStatus"]["new"], 4);
    assert_eq!(stats["data"]["byStatus"]["closed"], 0);
    assert_eq!(stats["data"]["byType"]["customize"], 1);

    let bad_filter = fixture.admin_get("/api/admin/leads?status=archived").await;
    assert!(bad_filter["errors"]["status"].is_string());
}

#[tokio::test]
async fn test_lead_pipeline_is_audited() {
    let fixture = TestFixture::new().await;
    let id = fixture.submit_contact("Asha Rao").await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = fixture
        .admin_put(
            &format!("/api/admin/leads/{}/status", id),
            json!({ "status": "contacted" }),
        )
        .await;
    assert_eq!(resp["data"]["status"], "contacted");

    let resp = fixture
        .admin_put(
            &format!("/api/admin/leads/{}/status", id),
            json!({ "status": "archived" }),
        )
        .await;
    assert!(resp["errors"]["status"].is_string());

    let resp = fixture
        .admin_post(
            &format!("/api/admin/leads/{}/notes", id),
            json!({ "content": "Called back, sending swatches." }),
        )
        .await;
    let notes = resp["data"]["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["author"], "meera");

    let resp = fixture
        .admin_put(
            &format!("/api/admin/leads/{}/assign", id),
            json!({ "assignedTo": "arjun" }),
        )
        .await;
    assert_eq!(resp["data"]["assignedTo"], "arjun");

    let resp = fixture
        .admin_put(
            &format!("/api/admin/leads/{}", id),
            json!({ "phone": "+91 98765 43210", "status": "quoted" }),
        )
        .await;
    assert_eq!(resp["data"]["phone"], "+91 98765 43210");
    assert_eq!(resp["data"]["status"], "quoted");
    assert_eq!(resp["data"]["name"], "Asha Rao");

    let audit = fixture
        .admin_get(&format!("/api/admin/audit-logs?entityType=lead&entityId={}", id))
        .await;
    let actions: Vec<&str> = audit["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions.len(), 4);
    assert!(actions.contains(&"status_change"));
    assert!(actions.contains(&"add_note"));
    assert!(actions.contains(&"assign"));
    assert!(actions.contains(&"update"));
    assert!(audit["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["adminId"] == "meera"));

    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/leads/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .admin
        .get(fixture.url(&format!("/api/admin/leads/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_bulk_lead_actions_are_all_or_nothing() {
    let fixture = TestFixture::new().await;
    let a = fixture.submit_contact("Asha Rao").await["id"].clone();
    let b = fixture.submit_contact("Ravi Menon").await["id"].clone();

    let resp = fixture
        .admin
        .put(fixture.url("/api/admin/leads/bulk/status"))
        .json(&json!({ "ids": [a, "missing"], "status": "closed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let stats = fixture.admin_get("/api/admin/leads/stats").await;
    assert_eq!(stats["data"]["byStatus"]["new"], 2);

    let resp = fixture
        .admin_put(
            "/api/admin/leads/bulk/status",
            json!({ "ids": [a, b], "status": "reviewing" }),
        )
        .await;
    assert_eq!(resp["data"]["updated"], 2);

    let resp = fixture
        .admin_post("/api/admin/leads/bulk/delete", json!({ "ids": [a] }))
        .await;
    assert_eq!(resp["data"]["deleted"], 1);

    let stats = fixture.admin_get("/api/admin/leads/stats").await;
    assert_eq!(stats["data"]["total"], 1);
    assert_eq!(stats["data"]["byStatus"]["reviewing"], 1);

    let empty = fixture
        .admin_post("/api/admin/leads/bulk/delete", json!({ "ids": [] }))
        .await;
    assert!(empty["errors"]["ids"].is_string());

    let repeated = fixture
        .admin_post("/api/admin/leads/bulk/delete", json!({ "ids": [b, b] }))
        .await;
    assert_eq!(repeated["success"], false);
    assert!(repeated["errors"]["ids"].is_string());
    let stats = fixture.admin_get("/api/admin/leads/stats").await;
    assert_eq!(stats["data"]["total"], 1);
}

#[tokio::test]
async fn test_product_missing_name_is_rejected() {
    let fixture = TestFixture::new().await;

    let mut payload = product_payload("", "indigo-runner");
    payload.as_object_mut().unwrap().remove("name");
    let resp = fixture.admin_post("/api/admin/products", payload).await;
    assert_eq!(resp["success"], false);
    assert!(resp["errors"]["name"].is_string());

    let products = fixture.admin_get("/api/admin/products").await;
    assert_eq!(products["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_product_slug_rules() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin_post("/api/admin/products", product_payload("Persian Rug", "Persian Rug"))
        .await;
    assert!(resp["errors"]["slug"].is_string());

    let product = fixture.create_product("Persian Rug", "persian-rug-8x10").await;
    assert_eq!(product["slug"], "persian-rug-8x10");
    assert_eq!(product["isActive"], true);

    let resp = fixture
        .admin_post("/api/admin/products", product_payload("Another", "persian-rug-8x10"))
        .await;
    assert!(resp["errors"]["slug"].is_string());

    // Blank slug is derived from the name
    let derived = fixture.create_product("Indigo Runner", "").await;
    assert_eq!(derived["slug"], "indigo-runner");
}

#[tokio::test]
async fn test_concurrent_creates_cannot_share_a_slug() {
    let fixture = TestFixture::new().await;

    let mut handles = Vec::new();
    for i in 0..4 {
        let request = fixture
            .admin
            .post(fixture.url("/api/admin/products"))
            .json(&product_payload(&format!("Racer {}", i), "same-slug"));
        handles.push(tokio::spawn(request.send()));
    }

    let mut created = 0;
    for handle in handles {
        let body: Value = handle.await.unwrap().unwrap().json().await.unwrap();
        if body["success"] == true {
            created += 1;
        }
    }
    assert_eq!(created, 1);

    let products = fixture.admin_get("/api/admin/products").await;
    assert_eq!(products["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_product_update_and_rename() {
    let fixture = TestFixture::new().await;
    let product = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let id = product["id"].as_str().unwrap();

    let before = fixture.cache_generation("product-indigo-runner").await;
    let resp = fixture
        .admin_put(
            &format!("/api/admin/products/{}", id),
            product_payload("Indigo Runner Long", "indigo-runner-long"),
        )
        .await;
    assert_eq!(resp["data"]["slug"], "indigo-runner-long");
    assert_eq!(resp["data"]["createdAt"], product["createdAt"]);

    // Both the old and the new slug are stale
    assert_eq!(fixture.cache_generation("product-indigo-runner").await, before + 1);
    assert_eq!(fixture.cache_generation("product-indigo-runner-long").await, 1);

    let missing = fixture
        .admin
        .put(fixture.url("/api/admin/products/nope"))
        .json(&product_payload("Ghost", "ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_toggle_featured_invalidates_featured_products() {
    let fixture = TestFixture::new().await;
    let product = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let id = product["id"].as_str().unwrap();
    assert_eq!(product["isFeatured"], false);

    let before = fixture.cache_generation("featured-products").await;
    let resp = fixture
        .admin_post(&format!("/api/admin/products/{}/toggle-featured", id), json!({}))
        .await;
    assert_eq!(resp["data"]["isFeatured"], true);
    assert_eq!(fixture.cache_generation("featured-products").await, before + 1);

    let featured = fixture.public_get("/api/products/featured").await;
    assert_eq!(featured["data"].as_array().unwrap().len(), 1);

    fixture
        .admin_post(&format!("/api/admin/products/{}/toggle-featured", id), json!({}))
        .await;
    assert_eq!(fixture.cache_generation("featured-products").await, before + 2);
}

#[tokio::test]
async fn test_public_catalog_hides_inactive() {
    let fixture = TestFixture::new().await;
    let shown = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let hidden = fixture.create_product("Rust Kilim", "rust-kilim").await;

    let resp = fixture
        .admin_post(
            &format!("/api/admin/products/{}/toggle-status", hidden["id"].as_str().unwrap()),
            json!({}),
        )
        .await;
    assert_eq!(resp["data"]["isActive"], false);

    let public = fixture.public_get("/api/products").await;
    let slugs: Vec<&str> = public["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["indigo-runner"]);

    let by_room = fixture.public_get("/api/products?roomType=bedroom").await;
    assert_eq!(by_room["data"].as_array().unwrap().len(), 0);

    let resp = fixture
        .public
        .get(fixture.url("/api/products/rust-kilim"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let product = fixture.public_get("/api/products/indigo-runner").await;
    assert_eq!(product["data"]["id"], shown["id"]);

    let admin = fixture.admin_get("/api/admin/products").await;
    assert_eq!(admin["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_product_defaults() {
    let fixture = TestFixture::new().await;
    let product = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let id = product["id"].as_str().unwrap();
    fixture
        .admin_post(&format!("/api/admin/products/{}/toggle-featured", id), json!({}))
        .await;

    let resp = fixture
        .admin_post(&format!("/api/admin/products/{}/duplicate", id), json!({}))
        .await;
    let copy = &resp["data"];
    assert_eq!(copy["slug"], "indigo-runner-copy");
    assert_eq!(copy["name"], "Indigo Runner (Copy)");
    assert_eq!(copy["isActive"], false);
    assert_eq!(copy["isFeatured"], false);
    assert_eq!(copy["images"], product["images"]);
    assert_ne!(copy["id"], product["id"]);
}

#[tokio::test]
async fn test_duplicate_collection_onto_existing_slug() {
    let fixture = TestFixture::new().await;
    let coastal = fixture.create_collection("Coastal", "coastal").await;
    fixture.create_collection("Nordic", "nordic").await;

    let resp = fixture
        .admin_post(
            &format!("/api/admin/collections/{}/duplicate", coastal["id"].as_str().unwrap()),
            json!({ "slug": "nordic" }),
        )
        .await;
    assert_eq!(resp["success"], false);
    assert!(resp["errors"]["slug"].is_string());

    let collections = fixture.admin_get("/api/admin/collections").await;
    assert_eq!(collections["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_collection_page_and_delete_unlinks_products() {
    let fixture = TestFixture::new().await;
    let collection = fixture.create_collection("Coastal", "coastal").await;
    let collection_id = collection["id"].as_str().unwrap();

    let mut payload = product_payload("Indigo Runner", "indigo-runner");
    payload["collections"] = json!([collection_id, "other"]);
    let product = fixture.admin_post("/api/admin/products", payload).await["data"].clone();

    let page = fixture.public_get("/api/collections/coastal").await;
    assert_eq!(page["data"]["slug"], "coastal");
    assert_eq!(page["data"]["products"].as_array().unwrap().len(), 1);

    let products_before = fixture.cache_generation("products").await;
    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/collections/{}", collection_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(fixture.cache_generation("products").await, products_before + 1);

    let stored = fixture
        .admin_get(&format!("/api/admin/products/{}", product["id"].as_str().unwrap()))
        .await;
    assert_eq!(stored["data"]["collections"], json!(["other"]));
}

#[tokio::test]
async fn test_collection_delete_refuses_to_orphan_products() {
    let fixture = TestFixture::new().await;
    let collection = fixture.create_collection("Coastal", "coastal").await;
    let collection_id = collection["id"].as_str().unwrap();

    let mut payload = product_payload("Solo Runner", "solo-runner");
    payload["collections"] = json!([collection_id]);
    let product = fixture.admin_post("/api/admin/products", payload).await["data"].clone();
    let product_id = product["id"].as_str().unwrap();

    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/collections/{}", collection_id)))
        .send()
        .await
        .unwrap();
    let refused = body(resp).await;
    assert_eq!(refused["success"], false);
    assert!(refused["errors"]["products"]
        .as_str()
        .unwrap()
        .contains("solo-runner"));

    // Nothing changed on either side.
    let still_there = fixture
        .admin_get(&format!("/api/admin/collections/{}", collection_id))
        .await;
    assert_eq!(still_there["success"], true);
    let stored = fixture
        .admin_get(&format!("/api/admin/products/{}", product_id))
        .await;
    assert_eq!(stored["data"]["collections"], json!([collection_id]));

    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/products/{}", product_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/collections/{}", collection_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_product_delete_unlinks_from_collections() {
    let fixture = TestFixture::new().await;
    let product = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let product_id = product["id"].as_str().unwrap();

    let mut payload = collection_payload("Coastal", "coastal");
    payload["productIds"] = json!([product_id, "kept-id"]);
    let collection = fixture.admin_post("/api/admin/collections", payload).await["data"].clone();
    let collection_id = collection["id"].as_str().unwrap();

    let collections_before = fixture.cache_generation("collections").await;
    let coastal_before = fixture.cache_generation("collection-coastal").await;
    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/products/{}", product_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        fixture.cache_generation("collections").await,
        collections_before + 1
    );
    assert_eq!(
        fixture.cache_generation("collection-coastal").await,
        coastal_before + 1
    );

    let stored = fixture
        .admin_get(&format!("/api/admin/collections/{}", collection_id))
        .await;
    assert_eq!(stored["data"]["productIds"], json!(["kept-id"]));
}

#[tokio::test]
async fn test_bulk_catalog_update() {
    let fixture = TestFixture::new().await;
    let a = fixture.create_product("Indigo Runner", "indigo-runner").await;
    let b = fixture.create_product("Rust Kilim", "rust-kilim").await;

    let resp = fixture
        .admin_put(
            "/api/admin/products/bulk",
            json!({ "ids": [a["id"], b["id"]], "changes": { "isFeatured": true, "sortOrder": 5 } }),
        )
        .await;
    let updated = resp["data"].as_array().unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|p| p["isFeatured"] == true && p["sortOrder"] == 5));

    let resp = fixture
        .admin_put(
            "/api/admin/products/bulk",
            json!({ "ids": [a["id"]], "changes": {} }),
        )
        .await;
    assert!(resp["errors"]["changes"].is_string());
}

#[tokio::test]
async fn test_weave_type_crud() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .admin_post(
            "/api/admin/weave-types",
            json!({ "name": "Hand Knotted", "description": "Knotted by hand on a vertical loom." }),
        )
        .await;
    assert_eq!(resp["data"]["slug"], "hand-knotted");
    let id = resp["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(fixture.cache_generation("weave-types").await, 1);

    let resp = fixture
        .admin_put(
            &format!("/api/admin/weave-types/{}", id),
            json!({ "name": "Hand Knotted", "slug": "hand-knotted", "description": "Up to 200 knots per square inch.", "sortOrder": 2 }),
        )
        .await;
    assert_eq!(resp["data"]["sortOrder"], 2);

    let public = fixture.public_get("/api/weave-types").await;
    assert_eq!(public["data"].as_array().unwrap().len(), 1);

    let resp = fixture
        .admin
        .delete(fixture.url(&format!("/api/admin/weave-types/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let public = fixture.public_get("/api/weave-types").await;
    assert_eq!(public["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_site_settings_and_lookbook() {
    let fixture = TestFixture::new().await;

    let defaults = fixture.public_get("/api/settings").await;
    assert_eq!(defaults["data"]["contact"]["email"], "hello@rugs.example");
    assert_eq!(defaults["data"]["calendlyUrl"], "https://calendly.com/rugs/consult");

    let resp = fixture
        .admin_put(
            "/api/admin/settings",
            json!({
                "contact": { "email": "Studio@Rugs.example", "phone": "+91 98765 43210" },
                "social": { "instagram": "https://instagram.com/rugs" },
                "seo": { "defaultTitle": "Rug Atelier", "defaultDescription": "Handmade rugs." }
            }),
        )
        .await;
    assert_eq!(resp["data"]["contact"]["email"], "studio@rugs.example");
    assert_eq!(fixture.cache_generation("site-settings").await, 1);

    let saved = fixture.public_get("/api/settings").await;
    assert_eq!(saved["data"]["seo"]["defaultTitle"], "Rug Atelier");

    let empty = fixture.public_get("/api/lookbook").await;
    assert_eq!(empty["data"]["title"], "");

    let resp = fixture
        .admin_put(
            "/api/admin/lookbook",
            json!({ "title": "Autumn Lookbook", "fileUrl": "/media/admin/general/1-lookbook.pdf", "fileName": "lookbook.pdf" }),
        )
        .await;
    assert_eq!(resp["data"]["title"], "Autumn Lookbook");
    assert_eq!(fixture.cache_generation("lookbook").await, 1);

    let resp = fixture
        .admin_put("/api/admin/lookbook", json!({ "title": "X", "fileUrl": "ftp://nope" }))
        .await;
    assert!(resp["errors"]["title"].is_string());
    assert!(resp["errors"]["fileUrl"].is_string());
}

#[tokio::test]
async fn test_moodboard_upload_is_public_and_served() {
    let fixture = TestFixture::new().await;

    let form = Form::new().part("file", image_part("My Rug (final).JPG", 64));
    let resp = fixture
        .public
        .post(fixture.url("/api/uploads/moodboard"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let uploaded = body["data"]["uploaded"].as_array().unwrap();
    assert_eq!(uploaded.len(), 1);

    let path = uploaded[0]["path"].as_str().unwrap();
    assert!(path.starts_with("moodboard/general/"));
    assert!(path.ends_with("-my-rug-final-.jpg"));

    let media = fixture
        .public
        .get(uploaded[0]["url"].as_str().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(media.status(), 200);
    assert_eq!(media.bytes().await.unwrap().len(), 64);
}

#[tokio::test]
async fn test_same_named_moodboard_images_are_all_kept() {
    let fixture = TestFixture::new().await;

    let form = Form::new()
        .part("file", image_part("image.jpg", 10))
        .part("file", image_part("image.jpg", 20));
    let resp = fixture
        .public
        .post(fixture.url("/api/uploads/moodboard"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let uploaded = body["data"]["uploaded"].as_array().unwrap();
    assert_eq!(uploaded.len(), 2);
    assert_ne!(uploaded[0]["url"], uploaded[1]["url"]);

    let mut sizes: Vec<u64> = fixture
        .stored_files()
        .iter()
        .map(|p| std::fs::metadata(p).unwrap().len())
        .collect();
    sizes.sort();
    assert_eq!(sizes, vec![10, 20]);
}

#[tokio::test]
async fn test_oversize_upload_never_reaches_storage() {
    let fixture = TestFixture::new().await;

    let form = Form::new()
        .part("file", image_part("huge.jpg", MAX_UPLOAD_BYTES + 1))
        .part("file", image_part("small.jpg", 10));
    let resp = fixture
        .public
        .post(fixture.url("/api/uploads/moodboard"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();

    let failed = body["data"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["fileName"], "huge.jpg");
    assert!(failed[0]["error"].as_str().unwrap().contains("too large"));
    assert_eq!(body["data"]["uploaded"].as_array().unwrap().len(), 1);

    let stored = fixture.stored_files();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].to_string_lossy().ends_with("small.jpg"));
}

#[tokio::test]
async fn test_admin_upload_contexts() {
    let fixture = TestFixture::new().await;

    let pdf = || {
        Part::bytes(b"%PDF-1.4".to_vec())
            .file_name("lookbook.pdf")
            .mime_str("application/pdf")
            .unwrap()
    };

    // Product images only
    let form = Form::new()
        .text("identifier", "indigo-runner")
        .part("file", pdf());
    let body: Value = fixture
        .admin
        .post(fixture.url("/api/admin/uploads/product"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["failed"].as_array().unwrap().len(), 1);

    // Admin context accepts catalog PDFs
    let form = Form::new().part("file", pdf());
    let body: Value = fixture
        .admin
        .post(fixture.url("/api/admin/uploads/admin"))
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let uploaded = body["data"]["uploaded"].as_array().unwrap();
    assert_eq!(uploaded.len(), 1);
    let path = uploaded[0]["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("admin/general/"));

    // Unknown contexts and unauthenticated uploads are refused
    let resp = fixture
        .admin
        .post(fixture.url("/api/admin/uploads/wallpaper"))
        .multipart(Form::new().part("file", image_part("a.jpg", 8)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = fixture
        .public
        .post(fixture.url("/api/admin/uploads/product"))
        .multipart(Form::new().part("file", image_part("a.jpg", 8)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    // Delete by path
    let resp = fixture
        .admin
        .delete(fixture.url("/api/admin/uploads"))
        .json(&json!({ "path": path }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(fixture.stored_files().is_empty());

    let resp = fixture
        .admin
        .delete(fixture.url("/api/admin/uploads"))
        .json(&json!({ "path": "../outside.txt" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let audit = fixture.admin_get("/api/admin/audit-logs?entityType=file").await;
    assert_eq!(audit["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_audit_log_query_and_cleanup() {
    let fixture = TestFixture::new().await;
    for i in 0..3 {
        fixture
            .create_collection(&format!("Collection {}", i), &format!("collection-{}", i))
            .await;
    }

    let all = fixture.admin_get("/api/admin/audit-logs").await;
    assert_eq!(all["data"].as_array().unwrap().len(), 3);
    assert_eq!(all["data"][0]["entityType"], "collection");
    assert_eq!(all["data"][0]["action"], "create");

    let limited = fixture.admin_get("/api/admin/audit-logs?limit=2").await;
    assert_eq!(limited["data"].as_array().unwrap().len(), 2);

    let future = fixture
        .admin_get("/api/admin/audit-logs?from=2999-01-01T00:00:00Z")
        .await;
    assert_eq!(future["data"].as_array().unwrap().len(), 0);

    let bad = fixture
        .admin_get("/api/admin/audit-logs?from=last-week")
        .await;
    assert!(bad["errors"]["from"].is_string());

    let resp = fixture
        .admin_post("/api/admin/audit-logs/cleanup", json!({ "olderThanDays": 5 }))
        .await;
    assert!(resp["errors"]["olderThanDays"].is_string());

    let resp = fixture
        .admin_post("/api/admin/audit-logs/cleanup", json!({ "olderThanDays": 90 }))
        .await;
    assert_eq!(resp["data"]["deleted"], 0);

    let cleanup = fixture
        .admin_get("/api/admin/audit-logs?entityType=audit_log")
        .await;
    assert_eq!(cleanup["data"].as_array().unwrap().len(), 1);
}
