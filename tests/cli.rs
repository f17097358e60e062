use std::process::Stdio;

use tokio::process::Command;
use wiremock::MockServer;

async fn run_without_credential(server: &MockServer, credential_args: &[&str]) -> std::process::Output {
    let uri = server.uri();
    Command::new(env!("CARGO_BIN_EXE_mcp-vercel-repo"))
        .env_remove("VERCEL_API_KEY")
        .env_remove("GITHUB_TOKEN")
        .args(credential_args)
        .args([
            "--github-api-url",
            uri.as_str(),
            "--vercel-api-url",
            uri.as_str(),
            "--vercel-url",
            uri.as_str(),
            "provision",
            "demo",
        ])
        .stdin(Stdio::null())
        .output()
        .await
        .unwrap()
}

async fn assert_exits_without_calls(credential_args: &[&str]) {
    let server = MockServer::start().await;

    let output = run_without_credential(&server, credential_args).await;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Missing required parameters"),
        "stderr: {}",
        stderr
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_github_token_exits_with_code_1() {
    assert_exits_without_calls(&["--vercel-api-key", "vk"]).await;
}

#[tokio::test]
async fn test_missing_vercel_key_exits_with_code_1() {
    assert_exits_without_calls(&["--github-token", "gh"]).await;
}
