//! FTP existence probing
//!
//! Only the control connection is used: log in, then ask the server for the
//! file's size (or modification time when SIZE is not implemented). No data
//! connection is ever opened.

use std::time::Duration;

use percent_encoding::percent_decode_str;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::debug;
use url::{Host, Url};

use crate::probe::error::ProbeError;
use crate::probe::prober::ProbeOutcome;

const DEFAULT_FTP_PORT: u16 = 21;
const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

/// Reply codes meaning "command not implemented / not understood"
const UNSUPPORTED_COMMAND_CODES: [u16; 3] = [500, 502, 504];

/// Prober for ftp URLs
#[derive(Debug, Clone)]
pub struct FtpProbe {
    timeout: Duration,
}

impl FtpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn probe(&self, url: &Url) -> Result<ProbeOutcome, ProbeError> {
        let exists = tokio::time::timeout(self.timeout, file_exists(url))
            .await
            .map_err(|_| ProbeError::Timeout)??;

        Ok(ProbeOutcome {
            exists,
            content_type: None,
        })
    }
}

async fn file_exists(url: &Url) -> Result<bool, ProbeError> {
    let (host, port) = control_address(url)?;

    let stream = TcpStream::connect((host.as_str(), port)).await?;
    let mut control = ControlConnection::new(stream);

    control.expect_reply(&[220]).await?;
    control.login(url).await?;

    let path = remote_path(url);
    let mut reply = control.command(&format!("SIZE {}", path)).await?;
    if UNSUPPORTED_COMMAND_CODES.contains(&reply.code) {
        debug!("{} does not implement SIZE, falling back to MDTM", host);
        reply = control.command(&format!("MDTM {}", path)).await?;
    }
    debug!("FTP {} answered {} {}", url, reply.code, reply.text);

    // Best effort; the answer is already known
    let _ = control.command("QUIT").await;

    Ok(reply.code == 213)
}

/// Host and port of the control connection; IPv6 literals lose their brackets
fn control_address(url: &Url) -> Result<(String, u16), ProbeError> {
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(ProbeError::MissingHost(url.to_string())),
    };
    Ok((host, url.port().unwrap_or(DEFAULT_FTP_PORT)))
}

/// File path as the server names it (the URL keeps it percent-encoded)
fn remote_path(url: &Url) -> String {
    percent_decode_str(url.path())
        .decode_utf8_lossy()
        .into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Reply {
    code: u16,
    text: String,
}

struct ControlConnection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl ControlConnection {
    fn new(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    async fn login(&mut self, url: &Url) -> Result<(), ProbeError> {
        let user = match url.username() {
            "" => ANONYMOUS_USER,
            user => user,
        };
        let reply = self.command(&format!("USER {}", user)).await?;
        match reply.code {
            230 => Ok(()),
            331 | 332 => {
                let password = url.password().unwrap_or(ANONYMOUS_PASSWORD);
                let reply = self.command(&format!("PASS {}", password)).await?;
                match reply.code {
                    202 | 230 => Ok(()),
                    _ => Err(ProbeError::Ftp(format!(
                        "login rejected: {} {}",
                        reply.code, reply.text
                    ))),
                }
            }
            _ => Err(ProbeError::Ftp(format!(
                "USER rejected: {} {}",
                reply.code, reply.text
            ))),
        }
    }

    async fn command(&mut self, command: &str) -> Result<Reply, ProbeError> {
        self.writer
            .write_all(format!("{}\r\n", command).as_bytes())
            .await?;
        self.read_reply().await
    }

    async fn expect_reply(&mut self, codes: &[u16]) -> Result<Reply, ProbeError> {
        let reply = self.read_reply().await?;
        if codes.contains(&reply.code) {
            Ok(reply)
        } else {
            Err(ProbeError::Ftp(format!(
                "unexpected reply: {} {}",
                reply.code, reply.text
            )))
        }
    }

    /// Read one (possibly multi-line) reply
    async fn read_reply(&mut self) -> Result<Reply, ProbeError> {
        let first = self.read_line().await?;
        let (code, separator, text) = split_reply_line(&first)?;
        if separator != '-' {
            return Ok(Reply { code, text });
        }

        // Multi-line: "123-first", ..., "123 last"
        let terminator = format!("{} ", code);
        let mut text = text;
        loop {
            let line = self.read_line().await?;
            if let Some(rest) = line.strip_prefix(&terminator) {
                text.push('\n');
                text.push_str(rest);
                return Ok(Reply { code, text });
            }
            text.push('\n');
            text.push_str(&line);
        }
    }

    async fn read_line(&mut self) -> Result<String, ProbeError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(ProbeError::Ftp("connection closed".to_string()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn split_reply_line(line: &str) -> Result<(u16, char, String), ProbeError> {
    let code = line
        .get(..3)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| ProbeError::Ftp(format!("malformed reply: {}", line)))?;
    let separator = line[3..].chars().next().unwrap_or(' ');
    let text = line.get(4..).unwrap_or("").to_string();
    Ok((code, separator, text))
}
