use crate::model::{PeerId, RoomId};
use crate::protocol::ProtocolError;
use std::fmt;
use std::str::{FromStr, SplitWhitespace};

/// Placeholder for "no owner" wherever a peer id is expected.
pub const NO_OWNER: &str = "-";

/// Splits off the first space-separated token. The remainder keeps its inner
/// spacing so payloads are relayed verbatim.
pub fn split_head(line: &str) -> (&str, &str) {
    let line = line.trim_start();
    match line.find(' ') {
        Some(idx) => (&line[..idx], line[idx + 1..].trim_start()),
        None => (line, ""),
    }
}

/// Turns free text into a single wire token: structural separators are
/// stripped and whitespace becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '|')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Strips line terminators so a payload can never split into two frames.
pub fn single_line(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Decodes one raw line read up to `\n`, without its terminator. A line
/// that is not UTF-8 comes back lossily decoded in `Err` so it can still be
/// reported.
pub fn decode_line(raw: &[u8]) -> Result<&str, String> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    std::str::from_utf8(raw).map_err(|_| String::from_utf8_lossy(raw).into_owned())
}

pub(crate) struct OptionalPeer(pub Option<PeerId>);

impl fmt::Display for OptionalPeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(peer) => write!(f, "{}", peer),
            None => f.write_str(NO_OWNER),
        }
    }
}

/// Typed cursor over whitespace-separated arguments.
pub(crate) struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    pub fn word(&mut self, verb: &'static str) -> Result<&'a str, ProtocolError> {
        self.inner
            .next()
            .ok_or(ProtocolError::MissingArgument { verb })
    }

    pub fn number<T: FromStr>(&mut self, verb: &'static str) -> Result<T, ProtocolError> {
        let raw = self.word(verb)?;
        raw.parse().map_err(|_| ProtocolError::InvalidNumber {
            verb,
            value: raw.to_string(),
        })
    }

    pub fn flag(&mut self, verb: &'static str) -> Result<bool, ProtocolError> {
        match self.word(verb)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(ProtocolError::InvalidNumber {
                verb,
                value: other.to_string(),
            }),
        }
    }

    pub fn peer_id(&mut self, verb: &'static str) -> Result<PeerId, ProtocolError> {
        let raw = self.word(verb)?;
        parse_peer(verb, raw)
    }

    pub fn room_id(&mut self, verb: &'static str) -> Result<RoomId, ProtocolError> {
        let raw = self.word(verb)?;
        raw.parse().map_err(|_| ProtocolError::InvalidId {
            verb,
            value: raw.to_string(),
        })
    }

    pub fn optional_peer(&mut self, verb: &'static str) -> Result<Option<PeerId>, ProtocolError> {
        match self.word(verb)? {
            NO_OWNER => Ok(None),
            raw => parse_peer(verb, raw).map(Some),
        }
    }

    /// Remaining tokens, for variadic tails such as member lists.
    pub fn rest(self) -> SplitWhitespace<'a> {
        self.inner
    }
}

pub(crate) fn parse_peer(verb: &'static str, raw: &str) -> Result<PeerId, ProtocolError> {
    raw.parse().map_err(|_| ProtocolError::InvalidId {
        verb,
        value: raw.to_string(),
    })
}
