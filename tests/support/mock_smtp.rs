//! Scripted SMTP server for probe tests.
//!
//! Listens on an ephemeral loopback port and answers each command from
//! a fixed script. Every received command line is recorded so tests
//! can assert on the exact dialogue.

#![allow(dead_code)] // test utility, not every knob is used in every test

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

/// One scripted reply: a code plus a single text line.
#[derive(Debug, Clone)]
struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    fn render(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }
}

#[derive(Debug, Clone)]
struct Script {
    greeting: Reply,
    ehlo_code: u16,
    ehlo_lines: Vec<String>,
    helo: Reply,
    mail_from: Reply,
    rcpt_to: Reply,
    quit: Reply,
    /// Upper-case command keyword the server hangs on instead of
    /// replying.
    hang_on: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            greeting: Reply::new(220, "mock ready"),
            ehlo_code: 250,
            ehlo_lines: vec!["mock greets you".to_string(), "PIPELINING".to_string()],
            helo: Reply::new(250, "mock"),
            mail_from: Reply::new(250, "sender ok"),
            rcpt_to: Reply::new(250, "recipient ok"),
            quit: Reply::new(221, "bye"),
            hang_on: None,
        }
    }
}

/// EHLO answers are multi-line: `NNN-line` for all but the last line.
fn render_ehlo(code: u16, lines: &[String]) -> String {
    if lines.is_empty() {
        return format!("{code} ready\r\n");
    }
    let mut out = String::new();
    for (index, line) in lines.iter().enumerate() {
        let separator = if index + 1 < lines.len() { '-' } else { ' ' };
        out.push_str(&format!("{code}{separator}{line}\r\n"));
    }
    out
}

/// Mock SMTP endpoint running on a background task.
pub struct MockSmtpServer {
    addr: SocketAddr,
    commands: Arc<RwLock<Vec<String>>>,
    connections: Arc<AtomicUsize>,
}

impl MockSmtpServer {
    pub fn builder() -> MockSmtpServerBuilder {
        MockSmtpServerBuilder::new()
    }

    /// Starts a server that answers everything positively.
    pub async fn start() -> Self {
        Self::builder().build().await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every command line received, in order, across all connections.
    pub async fn commands(&self) -> Vec<String> {
        self.commands.read().await.clone()
    }

    /// Number of accepted connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    async fn handle_client(
        stream: TcpStream,
        script: Arc<Script>,
        commands: Arc<RwLock<Vec<String>>>,
    ) {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        if writer
            .write_all(script.greeting.render().as_bytes())
            .await
            .is_err()
        {
            return;
        }

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
            let received = line.trim().to_string();
            let keyword = received
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_uppercase();
            commands.write().await.push(received);

            if script.hang_on.as_deref() == Some(keyword.as_str()) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                return;
            }

            let response = match keyword.as_str() {
                "EHLO" => render_ehlo(script.ehlo_code, &script.ehlo_lines),
                "HELO" => script.helo.render(),
                "MAIL" => script.mail_from.render(),
                "RCPT" => script.rcpt_to.render(),
                "QUIT" => {
                    let _ = writer.write_all(script.quit.render().as_bytes()).await;
                    return;
                }
                _ => "500 unknown command\r\n".to_string(),
            };
            if writer.write_all(response.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}

/// Builder configuring a [`MockSmtpServer`] script.
pub struct MockSmtpServerBuilder {
    script: Script,
}

impl MockSmtpServerBuilder {
    fn new() -> Self {
        Self {
            script: Script::default(),
        }
    }

    pub fn with_greeting(mut self, code: u16, text: &str) -> Self {
        self.script.greeting = Reply::new(code, text);
        self
    }

    pub fn with_ehlo_response(mut self, code: u16, lines: &[&str]) -> Self {
        self.script.ehlo_code = code;
        self.script.ehlo_lines = lines.iter().map(|line| line.to_string()).collect();
        self
    }

    pub fn with_helo_response(mut self, code: u16, text: &str) -> Self {
        self.script.helo = Reply::new(code, text);
        self
    }

    pub fn with_mail_from_response(mut self, code: u16, text: &str) -> Self {
        self.script.mail_from = Reply::new(code, text);
        self
    }

    pub fn with_rcpt_to_response(mut self, code: u16, text: &str) -> Self {
        self.script.rcpt_to = Reply::new(code, text);
        self
    }

    /// Hang (never reply) once the given command keyword arrives.
    pub fn with_hang_on(mut self, command: &str) -> Self {
        self.script.hang_on = Some(command.to_uppercase());
        self
    }

    pub async fn build(self) -> MockSmtpServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock SMTP server");
        let addr = listener.local_addr().expect("mock SMTP server address");

        let script = Arc::new(self.script);
        let commands = Arc::new(RwLock::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let accept_script = Arc::clone(&script);
        let accept_commands = Arc::clone(&commands);
        let accept_connections = Arc::clone(&connections);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _peer)) = listener.accept().await else {
                    break;
                };
                accept_connections.fetch_add(1, Ordering::Relaxed);
                let script = Arc::clone(&accept_script);
                let commands = Arc::clone(&accept_commands);
                tokio::spawn(async move {
                    MockSmtpServer::handle_client(stream, script, commands).await;
                });
            }
        });

        MockSmtpServer {
            addr,
            commands,
            connections,
        }
    }
}
