//! Twitch chat (IRC) client used to see who is in a channel and to post
//! announcements.
//!
//! Each call opens its own short-lived connection. Every read is bounded by
//! the configured timeout, and a whole call by [`ChatConfig::deadline`], so a
//! silent or chatty-but-useless server surfaces as [`ChatError::Timeout`]
//! instead of stalling the caller.

pub mod message;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, warn};

use crate::message::{Message, names_from_reply};

pub const DEFAULT_ADDR: &str = "irc.chat.twitch.tv:6667";

const RPL_WELCOME: &str = "001";
const RPL_NAMREPLY: &str = "353";
const RPL_ENDOFNAMES: &str = "366";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat request timed out after {0:?}")]
    Timeout(Duration),
    #[error("chat server closed the connection during {0}")]
    Closed(&'static str),
    #[error("chat login rejected: {0}")]
    AuthFailed(String),
    #[error("announcements need an authenticated chat account")]
    Anonymous,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub addr: String,
    /// Login name; ignored without a token.
    pub nick: Option<String>,
    /// OAuth token, with or without the `oauth:` prefix. `None` logs in
    /// anonymously, which can read but not post.
    pub token: Option<String>,
    /// Per-read limit.
    pub timeout: Duration,
    /// Limit for a whole fetch or announce, PING traffic included.
    pub deadline: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            nick: None,
            token: None,
            timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct ChatClient {
    config: Arc<ChatConfig>,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.token.is_some() && self.config.nick.is_some()
    }

    /// Everyone currently in `channel`, lowercased.
    ///
    /// Reads until the end-of-names marker. If the server hangs up first,
    /// whatever was collected so far is returned.
    pub async fn fetch_chatters(&self, channel: &str) -> Result<BTreeSet<String>, ChatError> {
        let channel = channel.trim_start_matches('#').to_lowercase();
        self.within_deadline(self.collect_chatters(&channel)).await
    }

    async fn collect_chatters(&self, channel: &str) -> Result<BTreeSet<String>, ChatError> {
        let mut session = Session::connect(&self.config).await?;

        session.login(&self.config).await?;
        session.send("CAP REQ :twitch.tv/membership").await?;
        session.send(&format!("JOIN #{}", channel)).await?;

        let mut names = BTreeSet::new();
        while let Some(line) = session.next_line().await? {
            let Some(msg) = Message::parse(&line) else {
                continue;
            };
            match msg.command {
                RPL_NAMREPLY => {
                    if let Some(trailing) = msg.trailing() {
                        names.extend(names_from_reply(trailing));
                    }
                }
                RPL_ENDOFNAMES => break,
                "NOTICE" => check_login_notice(&msg)?,
                _ => {}
            }
        }

        session.quit().await;
        debug!("Fetched {} chatters in #{}", names.len(), channel);
        Ok(names)
    }

    /// Posts `text` to `channel`. Needs a nick and token.
    pub async fn announce(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        if !self.is_authenticated() {
            return Err(ChatError::Anonymous);
        }
        let channel = channel.trim_start_matches('#').to_lowercase();
        self.within_deadline(self.post(&channel, text)).await
    }

    async fn post(&self, channel: &str, text: &str) -> Result<(), ChatError> {
        let mut session = Session::connect(&self.config).await?;

        session.login(&self.config).await?;
        loop {
            let line = session
                .next_line()
                .await?
                .ok_or(ChatError::Closed("login"))?;
            let Some(msg) = Message::parse(&line) else {
                continue;
            };
            match msg.command {
                RPL_WELCOME => break,
                "NOTICE" => check_login_notice(&msg)?,
                _ => {}
            }
        }

        session.send(&format!("JOIN #{}", channel)).await?;
        // IRC lines cannot carry newlines
        let text = text.replace(['\r', '\n'], " ");
        session.send(&format!("PRIVMSG #{} :{}", channel, text)).await?;
        session.quit().await;

        debug!("Announced in #{}: {}", channel, text);
        Ok(())
    }

    async fn within_deadline<T>(
        &self,
        call: impl Future<Output = Result<T, ChatError>>,
    ) -> Result<T, ChatError> {
        let deadline = self.config.deadline;
        tokio::time::timeout(deadline, call)
            .await
            .map_err(|_| ChatError::Timeout(deadline))?
    }
}

fn check_login_notice(msg: &Message<'_>) -> Result<(), ChatError> {
    let text = msg.trailing().unwrap_or_default();
    if text.contains("authentication failed") || text.contains("Improperly formatted auth") {
        return Err(ChatError::AuthFailed(text.to_string()));
    }
    Ok(())
}

struct Session {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    timeout: Duration,
}

impl Session {
    async fn connect(config: &ChatConfig) -> Result<Self, ChatError> {
        let stream = tokio::time::timeout(config.timeout, TcpStream::connect(&config.addr))
            .await
            .map_err(|_| ChatError::Timeout(config.timeout))??;
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        Ok(Self {
            lines: BufReader::new(reader).lines(),
            writer,
            timeout: config.timeout,
        })
    }

    async fn login(&mut self, config: &ChatConfig) -> Result<(), ChatError> {
        match (&config.token, &config.nick) {
            (Some(token), Some(nick)) => {
                let token = token.strip_prefix("oauth:").unwrap_or(token);
                self.send(&format!("PASS oauth:{}", token)).await?;
                self.send(&format!("NICK {}", nick.to_lowercase())).await?;
            }
            _ => {
                let anon = rand::rng().random_range(10_000..100_000);
                self.send(&format!("NICK justinfan{}", anon)).await?;
            }
        }
        Ok(())
    }

    async fn send(&mut self, line: &str) -> Result<(), ChatError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        Ok(())
    }

    /// Next non-PING line. PINGs are answered in place.
    async fn next_line(&mut self) -> Result<Option<String>, ChatError> {
        loop {
            let line = tokio::time::timeout(self.timeout, self.lines.next_line())
                .await
                .map_err(|_| ChatError::Timeout(self.timeout))??;

            let Some(line) = line else {
                return Ok(None);
            };
            if let Some(payload) = line.strip_prefix("PING") {
                self.send(&format!("PONG{}", payload)).await?;
                continue;
            }
            return Ok(Some(line));
        }
    }

    async fn quit(mut self) {
        if let Err(e) = self.send("QUIT").await {
            warn!("Chat QUIT failed: {}", e);
        }
        let _ = self.writer.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn fake_server() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        (listener, addr)
    }

    fn config(addr: String) -> ChatConfig {
        ChatConfig {
            addr,
            timeout: Duration::from_secs(2),
            ..ChatConfig::default()
        }
    }

    #[tokio::test]
    async fn fetches_names_and_answers_ping() {
        let (listener, addr) = fake_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            let mut received = Vec::new();

            while let Some(line) = lines.next_line().await.unwrap() {
                let joined = line.starts_with("JOIN");
                received.push(line);
                if joined {
                    break;
                }
            }

            writer.write_all(b"PING :tmi.twitch.tv\r\n").await.unwrap();
            received.push(lines.next_line().await.unwrap().unwrap());

            writer
                .write_all(b":me.tmi.twitch.tv 353 me = #shrimpchan :@Streamer +vipguy alice\r\n")
                .await
                .unwrap();
            writer
                .write_all(b":me.tmi.twitch.tv 353 me = #shrimpchan :bob alice\r\n")
                .await
                .unwrap();
            writer
                .write_all(b":me.tmi.twitch.tv 366 me #shrimpchan :End of /NAMES list\r\n")
                .await
                .unwrap();
            received
        });

        let client = ChatClient::new(config(addr));
        let names = client.fetch_chatters("#ShrimpChan").await.unwrap();
        let expected: BTreeSet<String> = ["alice", "bob", "streamer", "vipguy"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, expected);

        let received = server.await.unwrap();
        assert!(received[0].starts_with("NICK justinfan"));
        assert!(received.contains(&"CAP REQ :twitch.tv/membership".to_string()));
        assert!(received.contains(&"JOIN #shrimpchan".to_string()));
        assert_eq!(received.last().unwrap(), "PONG :tmi.twitch.tv");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let (listener, addr) = fake_server().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let client = ChatClient::new(ChatConfig {
            timeout: Duration::from_millis(100),
            ..config(addr)
        });
        let err = client.fetch_chatters("chan").await.unwrap_err();
        assert!(matches!(err, ChatError::Timeout(_)));
        server.abort();
    }

    #[tokio::test]
    async fn endless_pings_hit_the_deadline() {
        let (listener, addr) = fake_server().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            while let Some(line) = lines.next_line().await.unwrap() {
                if line.starts_with("JOIN") {
                    break;
                }
            }
            // Never sends the end-of-names marker
            while writer.write_all(b"PING :tmi.twitch.tv\r\n").await.is_ok() {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
        });

        let client = ChatClient::new(ChatConfig {
            timeout: Duration::from_millis(200),
            deadline: Duration::from_millis(500),
            ..config(addr)
        });
        let started = tokio::time::Instant::now();
        let err = client.fetch_chatters("chan").await.unwrap_err();
        assert!(matches!(err, ChatError::Timeout(d) if d == Duration::from_millis(500)));
        assert!(started.elapsed() < Duration::from_secs(2));
        server.abort();
    }

    #[tokio::test]
    async fn hangup_returns_partial_names() {
        let (listener, addr) = fake_server().await;
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            while let Some(line) = lines.next_line().await.unwrap() {
                if line.starts_with("JOIN") {
                    break;
                }
            }
            writer
                .write_all(b":me.tmi.twitch.tv 353 me = #chan :only_one\r\n")
                .await
                .unwrap();
        });

        let client = ChatClient::new(config(addr));
        let names = client.fetch_chatters("chan").await.unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["only_one".to_string()]);
    }

    #[tokio::test]
    async fn anonymous_cannot_announce() {
        let client = ChatClient::new(ChatConfig::default());
        assert!(matches!(
            client.announce("chan", "hello").await,
            Err(ChatError::Anonymous)
        ));
    }

    #[tokio::test]
    async fn announce_waits_for_welcome() {
        let (listener, addr) = fake_server().await;
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            let pass = lines.next_line().await.unwrap().unwrap();
            let nick = lines.next_line().await.unwrap().unwrap();
            writer
                .write_all(b":tmi.twitch.tv 001 shrimpbot :Welcome, GLHF!\r\n")
                .await
                .unwrap();
            let mut rest = Vec::new();
            while let Some(line) = lines.next_line().await.unwrap() {
                rest.push(line);
            }
            (pass, nick, rest)
        });

        let client = ChatClient::new(ChatConfig {
            nick: Some("ShrimpBot".into()),
            token: Some("oauth:secret".into()),
            ..config(addr)
        });
        client.announce("chan", "raffle over\nno winners").await.unwrap();

        let (pass, nick, rest) = server.await.unwrap();
        assert_eq!(pass, "PASS oauth:secret");
        assert_eq!(nick, "NICK shrimpbot");
        assert_eq!(
            rest,
            vec![
                "JOIN #chan".to_string(),
                "PRIVMSG #chan :raffle over no winners".to_string(),
                "QUIT".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn rejected_login_is_reported() {
        let (listener, addr) = fake_server().await;
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (_reader, mut writer) = stream.into_split();
            writer
                .write_all(b":tmi.twitch.tv NOTICE * :Login authentication failed\r\n")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(1)).await;
        });

        let client = ChatClient::new(ChatConfig {
            nick: Some("bot".into()),
            token: Some("bad".into()),
            ..config(addr)
        });
        assert!(matches!(
            client.announce("chan", "hi").await,
            Err(ChatError::AuthFailed(_))
        ));
    }
}
