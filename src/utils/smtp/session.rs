//! Line-level SMTP client dialogue used by the mailbox probe.
//!
//! Speaks just enough of RFC 5321 for a verification handshake: read
//! the banner, exchange single-line commands, parse single- and
//! multi-line replies. Every read and write sits behind a timeout so a
//! stalled server can never wedge a worker.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// One server reply: the three-digit code plus every text line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SmtpReply {
    pub(crate) code: u16,
    pub(crate) lines: Vec<String>,
}

impl SmtpReply {
    pub(crate) fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub(crate) fn is_transient(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub(crate) fn is_permanent(&self) -> bool {
        (500..600).contains(&self.code)
    }

    /// Code plus first text line, used in reasons and logs.
    pub(crate) fn summary(&self) -> String {
        match self.lines.first() {
            Some(line) if !line.is_empty() => format!("{} {}", self.code, line),
            _ => self.code.to_string(),
        }
    }
}

/// Splits one raw reply line into `(code, text, more)` where `more`
/// marks a `NNN-` continuation line. Returns `None` for anything that
/// is not a well-formed reply line.
pub(crate) fn parse_reply_line(line: &str) -> Option<(u16, &str, bool)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.len() < 3 || !line.is_char_boundary(3) {
        return None;
    }
    let (digits, rest) = line.split_at(3);
    let code: u16 = digits.parse().ok()?;
    if !(100..600).contains(&code) {
        return None;
    }
    match rest.as_bytes().first() {
        None => Some((code, "", false)),
        Some(b' ') => Some((code, rest[1..].trim(), false)),
        Some(b'-') => Some((code, rest[1..].trim(), true)),
        _ => None,
    }
}

/// How a session attempt failed, before any protocol verdict was reached.
#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),
    #[error("timed out during {0}")]
    Timeout(&'static str),
    #[error("{0}")]
    Protocol(String),
    #[error("i/o failure: {0}")]
    Io(#[source] io::Error),
}

/// An established SMTP session with one mail exchanger.
pub(crate) struct SmtpSession {
    stream: BufStream<TcpStream>,
    command_timeout: Duration,
}

impl SmtpSession {
    /// Connects to `host:port`. The greeting banner is not consumed
    /// here; read it with [`banner`](Self::banner).
    pub(crate) async fn connect(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let stream = match timeout(connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(error)) => return Err(SessionError::Connect(error)),
            Err(_) => return Err(SessionError::Timeout("connect")),
        };
        Ok(Self {
            stream: BufStream::new(stream),
            command_timeout,
        })
    }

    /// Reads the greeting the server sends on connect.
    pub(crate) async fn banner(&mut self) -> Result<SmtpReply, SessionError> {
        self.read_reply("banner").await
    }

    /// Sends one command line and reads the complete reply. `stage`
    /// names the handshake step for timeout and protocol errors.
    pub(crate) async fn command(
        &mut self,
        line: &str,
        stage: &'static str,
    ) -> Result<SmtpReply, SessionError> {
        let deadline = self.command_timeout;
        let write = async {
            self.stream.write_all(line.as_bytes()).await?;
            self.stream.write_all(b"\r\n").await?;
            self.stream.flush().await
        };
        match timeout(deadline, write).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => return Err(SessionError::Io(error)),
            Err(_) => return Err(SessionError::Timeout(stage)),
        }
        self.read_reply(stage).await
    }

    async fn read_reply(&mut self, stage: &'static str) -> Result<SmtpReply, SessionError> {
        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let bytes = match timeout(self.command_timeout, self.stream.read_line(&mut line)).await
            {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(error)) => return Err(SessionError::Io(error)),
                Err(_) => return Err(SessionError::Timeout(stage)),
            };
            if bytes == 0 {
                return Err(SessionError::Protocol(format!(
                    "connection closed during {stage}"
                )));
            }
            let Some((code, text, more)) = parse_reply_line(&line) else {
                return Err(SessionError::Protocol(format!(
                    "unparsable reply during {stage}: {:?}",
                    line.trim_end()
                )));
            };
            lines.push(text.to_string());
            if !more {
                return Ok(SmtpReply { code, lines });
            }
        }
    }

    /// Sends QUIT and discards the outcome; the session is finished
    /// either way.
    pub(crate) async fn quit(mut self) {
        let _ = self.command("QUIT", "quit").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_final_reply_lines() {
        assert_eq!(parse_reply_line("250 OK\r\n"), Some((250, "OK", false)));
        assert_eq!(parse_reply_line("250 "), Some((250, "", false)));
        assert_eq!(parse_reply_line("250"), Some((250, "", false)));
        assert_eq!(
            parse_reply_line("550 5.1.1 User unknown\r\n"),
            Some((550, "5.1.1 User unknown", false))
        );
    }

    #[test]
    fn parses_continuation_lines() {
        assert_eq!(
            parse_reply_line("250-STARTTLS\r\n"),
            Some((250, "STARTTLS", true))
        );
        assert_eq!(
            parse_reply_line("250-mx.example.test greets you"),
            Some((250, "mx.example.test greets you", true))
        );
    }

    #[test]
    fn rejects_garbage_lines() {
        assert_eq!(parse_reply_line(""), None);
        assert_eq!(parse_reply_line("ab"), None);
        assert_eq!(parse_reply_line("abc def"), None);
        assert_eq!(parse_reply_line("99 too short"), None);
        assert_eq!(parse_reply_line("700 out of range"), None);
        assert_eq!(parse_reply_line("250OK"), None);
        assert_eq!(parse_reply_line("ab\u{00e9} accent"), None);
    }

    #[test]
    fn classifies_reply_codes() {
        let reply = |code| SmtpReply {
            code,
            lines: vec![String::new()],
        };
        assert!(reply(250).is_positive());
        assert!(!reply(250).is_transient());
        assert!(reply(450).is_transient());
        assert!(reply(550).is_permanent());
        assert!(!reply(354).is_positive());
        assert!(!reply(354).is_transient());
        assert!(!reply(354).is_permanent());
    }

    #[test]
    fn summary_includes_the_first_text_line() {
        let reply = SmtpReply {
            code: 250,
            lines: vec!["2.1.5 Recipient ok".to_string(), "ignored".to_string()],
        };
        assert_eq!(reply.summary(), "250 2.1.5 Recipient ok");

        let bare = SmtpReply {
            code: 220,
            lines: vec![String::new()],
        };
        assert_eq!(bare.summary(), "220");
    }
}
