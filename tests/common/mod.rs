#![allow(dead_code)]

use mockftpd::core_log::logger::init_test_logger;
use mockftpd::{Config, FtpServer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

pub const FAKE_CONFIG: &str = r#"
[server]
listen_address = "127.0.0.1"
listen_port = 0
mode = "fake"
data_accept_timeout_secs = 5

[[accounts]]
username = "alice"
password = "secret"
home_directory = "/home/alice"
groups = ["users"]

[[accounts]]
username = "bob"
password = "hunter2"
home_directory = "/home/bob"

[[filesystem]]
path = "/home/alice/readme.txt"
contents = "hello from the fake filesystem"
owner = "alice"
group = "users"
permissions = "rw-r-----"

[[filesystem]]
path = "/home/alice"
kind = "directory"
owner = "alice"
group = "users"

[[filesystem]]
path = "/home/bob"
kind = "directory"
owner = "bob"

[[filesystem]]
path = "/pub"
kind = "directory"
owner = "root"
permissions = "rwxr-xr-x"
"#;

pub const STUB_CONFIG: &str = r#"
[server]
listen_address = "127.0.0.1"
listen_port = 0
mode = "stub"
data_accept_timeout_secs = 30
"#;

pub async fn start_server(config_text: &str) -> (FtpServer, SocketAddr) {
    init_test_logger();
    let config = Config::from_toml_str(config_text).unwrap();
    let mut server = FtpServer::from_config(config).unwrap();
    let addr = server.start().await.unwrap();
    (server, addr)
}

/// Minimal line-based FTP client.
pub struct FtpClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl FtpClient {
    /// Connects and consumes the 220 greeting.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = timeout(IO_TIMEOUT, TcpStream::connect(addr))
            .await
            .unwrap()
            .unwrap();
        let (reader, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(reader),
            writer,
        };
        let greeting = client.read_reply().await;
        assert!(greeting.starts_with("220"), "greeting: {}", greeting);
        client
    }

    pub async fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match timeout(IO_TIMEOUT, self.reader.read_line(&mut line)).await {
            Ok(Ok(0)) | Ok(Err(_)) => None,
            Ok(Ok(_)) => Some(line.trim_end().to_string()),
            Err(_) => panic!("timed out waiting for a reply"),
        }
    }

    /// Reads one reply; the lines of a multi-line reply are joined with `\n`.
    pub async fn read_reply(&mut self) -> String {
        let first = self.read_line().await.expect("connection closed");
        if first.as_bytes().get(3) != Some(&b'-') {
            return first;
        }
        let terminator = format!("{} ", &first[..3]);
        let mut lines = vec![first];
        loop {
            let line = self.read_line().await.expect("connection closed");
            let done = line.starts_with(&terminator);
            lines.push(line);
            if done {
                return lines.join("\n");
            }
        }
    }

    pub async fn write_line(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    pub async fn send(&mut self, line: &str) -> String {
        self.write_line(line).await;
        self.read_reply().await
    }

    pub async fn code(&mut self, line: &str) -> u16 {
        self.send(line).await[..3].parse().unwrap()
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        assert_eq!(self.code(&format!("USER {}", username)).await, 331);
        assert_eq!(self.code(&format!("PASS {}", password)).await, 230);
    }

    /// Sends PASV and returns the advertised data address.
    pub async fn pasv(&mut self) -> SocketAddr {
        let reply = self.send("PASV").await;
        assert!(reply.starts_with("227 "), "PASV: {}", reply);
        let start = reply.find('(').unwrap() + 1;
        let end = reply.find(')').unwrap();
        let numbers: Vec<u16> = reply[start..end]
            .split(',')
            .map(|n| n.trim().parse().unwrap())
            .collect();
        let ip = format!("{}.{}.{}.{}", numbers[0], numbers[1], numbers[2], numbers[3]);
        SocketAddr::new(ip.parse().unwrap(), numbers[4] * 256 + numbers[5])
    }

    /// Passive upload of `contents` with `command`; returns the final reply.
    pub async fn upload(&mut self, command: &str, contents: &[u8]) -> String {
        let data_addr = self.pasv().await;
        let preliminary = self.send(command).await;
        assert!(preliminary.starts_with("150 "), "{}: {}", command, preliminary);
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        data.write_all(contents).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);
        self.read_reply().await
    }

    /// Passive download with `command`; returns the bytes and the final reply.
    pub async fn download(&mut self, command: &str) -> (Vec<u8>, String) {
        let data_addr = self.pasv().await;
        let preliminary = self.send(command).await;
        assert!(preliminary.starts_with("150 "), "{}: {}", command, preliminary);
        let mut data = TcpStream::connect(data_addr).await.unwrap();
        let mut contents = Vec::new();
        timeout(IO_TIMEOUT, data.read_to_end(&mut contents))
            .await
            .unwrap()
            .unwrap();
        (contents, self.read_reply().await)
    }
}
