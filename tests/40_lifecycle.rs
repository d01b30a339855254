mod common;

use std::time::Duration;

use anyhow::Result;

#[tokio::test]
async fn server_exits_when_stdin_closes() -> Result<()> {
    let mut server = common::TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;

    let status = server.close_stdin(Duration::from_secs(10)).await?;
    assert!(status.success(), "server exited with {status}");

    // Nothing is listening on the port any more
    let res = common::client().get(server.url("/health")).send().await;
    assert!(res.is_err());
    Ok(())
}
