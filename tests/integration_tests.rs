//! Integration tests for the folio binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A folio command isolated from the user's environment and state.
fn folio(state: &TempDir, api_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("folio");
    cmd.current_dir(state.path())
        .env_remove("FOLIO_API_URL")
        .env_remove("FOLIO_STATE_DIR")
        .env_remove("FOLIO_DEBOUNCE_MS")
        .env_remove("RUST_LOG")
        .arg("--api-url")
        .arg(api_url)
        .arg("--state-dir")
        .arg(state.path());
    cmd
}

const UNREACHABLE: &str = "http://127.0.0.1:9/api";

mod cli_basics {
    use super::*;

    #[test]
    fn test_folio_help() {
        cargo_bin_cmd!("folio")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("browse"));
    }

    #[test]
    fn test_folio_version() {
        cargo_bin_cmd!("folio").arg("--version").assert().success();
    }

    #[test]
    fn test_rejects_non_http_api_url() {
        let dir = TempDir::new().unwrap();
        folio(&dir, "ftp://example.com/api")
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("http"));
    }

    #[test]
    fn test_invalid_article_id() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .args(["show", "a/b"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid article id"));
    }
}

mod session {
    use super::*;

    #[test]
    fn test_whoami_without_session() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .arg("whoami")
            .assert()
            .success()
            .stdout(predicate::str::contains("Not signed in"));
    }

    #[test]
    fn test_logout_without_session_is_local() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .arg("logout")
            .assert()
            .success()
            .stdout(predicate::str::contains("Signed out"));
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("folio.toml"), "api_url = \"ftp://bad\"\n").unwrap();

        let mut cmd = cargo_bin_cmd!("folio");
        cmd.current_dir(dir.path())
            .env_remove("FOLIO_API_URL")
            .arg("--state-dir")
            .arg(dir.path())
            .arg("whoami")
            .assert()
            .failure()
            .stderr(predicate::str::contains("ftp://bad"));
    }
}

mod articles {
    use super::*;

    #[test]
    fn test_create_requires_title_and_content() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .args(["create", "--title", "  ", "--content", "body"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Title and content are required"));
    }

    #[test]
    fn test_create_reads_missing_content_file() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .args(["create", "--title", "T", "--content-file", "missing.md"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing.md"));
    }

    #[test]
    fn test_list_unreachable_server() {
        let dir = TempDir::new().unwrap();
        folio(&dir, UNREACHABLE)
            .arg("list")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch articles"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_list_renders_server_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/articles/"))
            .and(query_param("search", "borrow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Borrowing basics", "author_name": "ada",
                 "is_published": true, "tags": "rust"},
                {"id": 2, "title": "Borrow checker tales", "author_name": "bob",
                 "is_published": true, "tags": ""}
            ])))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let api = format!("{}/api", server.uri());
        let output = tokio::task::spawn_blocking(move || {
            folio(&dir, &api)
                .args(["list", "--search", "borrow"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "stderr: {}", stderr);
        assert!(stdout.contains("Borrowing basics"));
        assert!(stdout.contains("Borrow checker tales"));
        assert!(stdout.contains("2 article(s)"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_show_missing_article() {
        let server = MockServer::start().await;
        let missing = json!({"detail": "Not found."});
        Mock::given(method("GET"))
            .and(path("/api/articles/42/"))
            .respond_with(ResponseTemplate::new(404).set_body_json(missing))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let api = format!("{}/api", server.uri());
        let output = tokio::task::spawn_blocking(move || {
            folio(&dir, &api).args(["show", "42"]).output().unwrap()
        })
        .await
        .unwrap();

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Article 42 not found"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_confirmed_delete_points_back_to_list() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/articles/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let api = format!("{}/api", server.uri());
        let output = tokio::task::spawn_blocking(move || {
            folio(&dir, &api)
                .args(["--yes", "delete", "3"])
                .output()
                .unwrap()
        })
        .await
        .unwrap();

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success());
        assert!(stdout.contains("Deleted article #3"));
        assert!(stdout.contains("folio list"));
    }

    #[test]
    fn test_delete_declined_without_terminal() {
        let dir = TempDir::new().unwrap();
        // No TTY: the prompt cannot be answered, so nothing is deleted.
        folio(&dir, UNREACHABLE)
            .args(["delete", "3"])
            .write_stdin("")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cancelled."));
    }
}
