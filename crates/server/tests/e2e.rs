use std::net::SocketAddr;
use std::path::PathBuf;

use configs::{IdPolicy, StorageConfig};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode as HttpStatusCode;
use tokio::net::TcpListener;
use uuid::Uuid;

use server::startup::{build_app, build_state};

struct TestApp {
    base_url: String,
    root: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

async fn start_server(id_policy: IdPolicy) -> anyhow::Result<TestApp> {
    // Isolated data, uploads and static dirs per test run
    let root = PathBuf::from(format!("target/test-data/{}", Uuid::new_v4()));
    let storage = StorageConfig {
        data_file: root.join("studentData.json"),
        uploads_dir: root.join("uploads"),
        static_dir: root.join("static"),
        max_upload_bytes: 1024,
        id_policy,
        ..StorageConfig::default()
    };
    tokio::fs::create_dir_all(&storage.static_dir).await?;
    tokio::fs::write(storage.static_dir.join("style.css"), "body {}").await?;

    let state = build_state(&storage).await?;
    let app = build_app(state, &storage);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, root })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build client")
}

fn student_form(name: &str, cgpa: &str, photo: Option<&'static [u8]>) -> Form {
    let form = Form::new()
        .text("name", name.to_string())
        .text("cgpa", cgpa.to_string())
        .text("career_interest", "AI");
    match photo {
        Some(bytes) => form.part("image", Part::bytes(bytes).file_name("photo.jpg")),
        None => form,
    }
}

#[tokio::test]
async fn e2e_add_display_delete_flow() -> anyhow::Result<()> {
    let app = start_server(IdPolicy::Monotonic).await?;
    let c = client();

    let res = c.post(format!("{}/add", app.base_url))
        .multipart(student_form("Alice", "3.5", Some(&b"jpeg"[..])))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/?added=true");

    let page = c.get(format!("{}/?added=true", app.base_url)).send().await?.text().await?;
    assert!(page.contains("Alice"));
    assert!(page.contains("Student added successfully."));

    let page = c.get(format!("{}/all_students", app.base_url)).send().await?.text().await?;
    assert!(page.contains("Alice"));
    assert!(page.contains("/uploads/1.jpg"));

    let photo = c.get(format!("{}/uploads/1.jpg", app.base_url)).send().await?;
    assert_eq!(photo.status(), HttpStatusCode::OK);
    assert_eq!(&photo.bytes().await?[..], b"jpeg");

    let res = c.post(format!("{}/display", app.base_url))
        .form(&[("display_id", "1")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("<h1>Alice</h1>"));

    let res = c.post(format!("{}/delete", app.base_url))
        .form(&[("delete_id", "1")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/?deleted=true");

    // delete flushes before responding
    let doc = tokio::fs::read_to_string(app.root.join("studentData.json")).await?;
    let v: serde_json::Value = serde_json::from_str(&doc)?;
    assert_eq!(v, serde_json::json!({}));

    let res = c.post(format!("{}/display", app.base_url))
        .form(&[("display_id", "1")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_add_rejects_bad_input() -> anyhow::Result<()> {
    let app = start_server(IdPolicy::Monotonic).await?;
    let c = client();

    let res = c.post(format!("{}/add", app.base_url))
        .multipart(student_form("Bob", "4.5", Some(&b"jpeg"[..])))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.text().await?.contains("Invalid CGPA. CGPA must be between 2.00 and 4.00."));

    let res = c.post(format!("{}/add", app.base_url))
        .multipart(student_form("Bob", "3.0", None))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert!(res.text().await?.contains("Error uploading image"));

    static BIG: [u8; 2048] = [0u8; 2048];
    let res = c.post(format!("{}/add", app.base_url))
        .multipart(student_form("Bob", "3.0", Some(&BIG[..])))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::PAYLOAD_TOO_LARGE);

    let page = c.get(format!("{}/all_students", app.base_url)).send().await?.text().await?;
    assert!(page.contains("No students registered yet."));
    Ok(())
}

#[tokio::test]
async fn e2e_count_based_policy_reuses_ids() -> anyhow::Result<()> {
    let app = start_server(IdPolicy::CountBased).await?;
    let c = client();

    for name in ["Alice", "Bob"] {
        let res = c.post(format!("{}/add", app.base_url))
            .multipart(student_form(name, "3.0", Some(&b"jpeg"[..])))
            .send().await?;
        assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);
    }
    let res = c.post(format!("{}/delete", app.base_url))
        .form(&[("delete_id", "1")])
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);

    let res = c.post(format!("{}/add", app.base_url))
        .multipart(student_form("Cara", "3.0", Some(&b"jpeg"[..])))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);

    // Cara took id 2 and replaced Bob
    let res = c.post(format!("{}/display", app.base_url))
        .form(&[("display_id", "2")])
        .send().await?;
    let page = res.text().await?;
    assert!(page.contains("Cara"));
    assert!(!page.contains("Bob"));
    Ok(())
}

#[tokio::test]
async fn e2e_static_and_health() -> anyhow::Result<()> {
    let app = start_server(IdPolicy::Monotonic).await?;
    let c = client();

    let res = c.get(format!("{}/static/style.css", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let body = c.get(format!("{}/health", app.base_url)).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}
