mod common;

use async_trait::async_trait;
use common::{start_server, FtpClient, IO_TIMEOUT, STUB_CONFIG};
use mockftpd::core_ftpcommand::stub::RetrStubHandler;
use mockftpd::{Command, CommandHandler, HandlerError, Session};
use std::sync::Arc;
use tokio::time::timeout;

#[tokio::test]
async fn test_stub_login_accepts_anything() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    let mut client = FtpClient::connect(addr).await;

    assert_eq!(client.code("USER alice").await, 331);
    assert_eq!(client.code("PASS wrong").await, 230);
    assert_eq!(client.send("PWD").await, "257 \"/\" is current directory.");

    let user = server.registry().get_handler("USER");
    let record = user.invocations().unwrap().last().unwrap();
    assert_eq!(record.get_text("username"), Some("alice"));
    assert_eq!(record.command().verb(), "USER");

    server.stop().await;
}

#[tokio::test]
async fn test_unsupported_and_blank_lines() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    let mut client = FtpClient::connect(addr).await;

    assert_eq!(client.code("EPSV").await, 502);
    assert_eq!(client.code("xyzzy now").await, 502);
    assert_eq!(client.code("").await, 500);
    assert_eq!(client.send("syst").await, "215 \"WINDOWS\" system type.");

    server.stop().await;
}

#[tokio::test]
async fn test_stor_records_uploaded_bytes() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    let mut client = FtpClient::connect(addr).await;

    let reply = client.upload("STOR my file.txt", b"recorded bytes").await;
    assert!(reply.starts_with("226 "), "{}", reply);

    let stor = server.registry().get_handler("STOR");
    let history = stor.invocations().unwrap();
    assert_eq!(history.len(), 1);
    let record = history.get(0).unwrap();
    assert_eq!(record.get_text("pathname"), Some("my file.txt"));
    assert_eq!(record.get_bytes("file_contents"), Some(&b"recorded bytes"[..]));
    assert!(record.client_host().unwrap().is_loopback());

    history.clear();
    assert!(history.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_replaced_retr_handler() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    let retr = Arc::new(RetrStubHandler::new().with_file_contents("canned"));
    server.registry().set_shared_handler("RETR", retr.clone());

    let mut client = FtpClient::connect(addr).await;
    let (contents, reply) = client.download("RETR anything").await;
    assert_eq!(contents, b"canned");
    assert!(reply.starts_with("226 "));
    assert_eq!(
        retr.invocations().unwrap().get(0).unwrap().get_text("pathname"),
        Some("anything")
    );

    server.stop().await;
}

struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn handle(&self, _: &Command, _: &mut Session) -> Result<(), HandlerError> {
        Err(HandlerError::Internal("simulated failure".to_string()))
    }
}

#[tokio::test]
async fn test_handler_error_replies_451() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    server.registry().set_handler("NOOP", FailingHandler);

    let mut client = FtpClient::connect(addr).await;
    assert_eq!(client.code("NOOP").await, 451);
    assert_eq!(client.code("SYST").await, 215);

    server.stop().await;
}

#[tokio::test]
async fn test_multi_line_help() {
    let config = format!("{}help_text = \"Commands:\\nUSER PASS QUIT\"\n", STUB_CONFIG);
    let (mut server, addr) = start_server(&config).await;

    let mut client = FtpClient::connect(addr).await;
    assert_eq!(client.send("HELP").await, "214-Commands:\n214 USER PASS QUIT");

    server.stop().await;
}

#[tokio::test]
async fn test_stop_unblocks_waiting_transfer() {
    let (mut server, addr) = start_server(STUB_CONFIG).await;
    let mut client = FtpClient::connect(addr).await;

    client.pasv().await;
    // Never connect: the handler waits for the data connection.
    assert!(client.send("RETR file").await.starts_with("150 "));

    timeout(IO_TIMEOUT, server.stop()).await.unwrap();
    assert!(client.read_line().await.is_none());
    assert!(server.local_addr().is_none());
}
