use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;

use tempfile::TempDir;

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    /// The generated admin password printed by `admin init`; the admin
    /// account starts with a forced password change.
    pub admin_password: String,
    server_process: Option<Child>,
}

static BUILD_RELEASE: LazyLock<()> = LazyLock::new(|| {
    let build_status = Command::new("cargo")
        .args(["build", "--release"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("build release binary");
    assert!(build_status.success(), "Failed to build release binary");
});

fn binary_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("target/release/rosterd")
}

/// The init output prints the generated password on its own indented line.
fn parse_admin_password(stdout: &str) -> String {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        if line.starts_with("Admin password") {
            for candidate in lines.by_ref() {
                let trimmed = candidate.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }
    panic!("admin password not found in init output:\n{stdout}");
}

impl TestServer {
    pub async fn start() -> Self {
        LazyLock::force(&BUILD_RELEASE);

        let temp_dir = TempDir::new().expect("create temp dir");
        let config_path = temp_dir.path().join("rosterd.toml");
        let binary = binary_path();

        let init_output = Command::new(&binary)
            .args(["admin", "init", "--config"])
            .arg(&config_path)
            .args(["--demo-data", "--non-interactive"])
            .output()
            .expect("run init");
        assert!(
            init_output.status.success(),
            "Failed to initialize: {}",
            String::from_utf8_lossy(&init_output.stderr)
        );
        let admin_password = parse_admin_password(&String::from_utf8_lossy(&init_output.stdout));

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(&binary)
            .args(["serve", "--config"])
            .arg(&config_path)
            .args(["--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            admin_password,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
