use super::*;
use crate::table::CallKind;
use crate::table::Claim;
use crate::tiles::Tile;

/// Message type tags the server waits on or dispatches.
pub const HELO: &str = "helo";
pub const AUTH: &str = "auth";
pub const PXR: &str = "pxr";
pub const JOIN: &str = "join";
pub const GOK: &str = "gok";
pub const NEXTREADY: &str = "nextready";
pub const REACH: &str = "reach";
pub const DISCARD: &str = "d";
pub const CALL: &str = "n";
pub const KEEPALIVE: &str = "z";
pub const EXIT: &str = "exit";

/// Lobby flavour requested by `pxr V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameType {
    Tournament,
    Anonymous,
    Regular,
    Other(String),
}

impl From<&str> for GameType {
    fn from(v: &str) -> Self {
        match v {
            "-1" => Self::Tournament,
            "1" => Self::Anonymous,
            "9" => Self::Regular,
            v => Self::Other(v.to_string()),
        }
    }
}

/// Client-to-server messages, parsed at the boundary.
///
/// Well-typed variants carry validated payloads; anything else is kept as
/// `Invalid` (known type, bad payload) or `Unknown` (unrecognised or empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Helo { name: String, tid: String, sx: String },
    Auth { val: String },
    Pxr(GameType),
    Join { table: String },
    Gok,
    NextReady,
    KeepAlive,
    Reach { tile: Option<Tile> },
    Discard { tile: Tile },
    /// Answer to a call window on someone else's discard.
    Claim(Claim),
    /// Concealed kan declared on one's own turn.
    ClosedKan { tile: Option<Tile> },
    /// Self-drawn win declared on one's own turn.
    Tsumo,
    Exit,
    Invalid { kind: String, reason: String },
    Unknown(Message),
}

impl Inbound {
    fn invalid(message: &Message, reason: &str) -> Self {
        Self::Invalid {
            kind: message.kind().to_string(),
            reason: reason.to_string(),
        }
    }
    fn tile(message: &Message, key: &str) -> Option<Tile> {
        message.get(key).and_then(|v| Tile::try_from(v).ok())
    }
    fn text(message: &Message, key: &str) -> String {
        message.get(key).unwrap_or_default().to_string()
    }
    /// Meld request codes: 0 cancel, 1 pon, 2 open kan, 3 chii, 4 closed kan,
    /// 5 added kan (treated as open kan), 6 ron, 7 and 9 self-drawn win.
    fn call(message: &Message) -> Self {
        let tiles = ["hai0", "hai1", "hai2"]
            .iter()
            .filter_map(|k| Self::tile(message, k))
            .collect::<Vec<_>>();
        match message.get("type").unwrap_or("0") {
            "0" => Self::Claim(Claim::Decline),
            "1" => Self::Claim(Claim::Call(CallKind::Pon, tiles)),
            "2" | "5" => Self::Claim(Claim::Call(CallKind::Kan, tiles)),
            "3" => Self::Claim(Claim::Call(CallKind::Chii, tiles)),
            "4" => Self::ClosedKan {
                tile: tiles.first().copied(),
            },
            "6" => Self::Claim(Claim::ron()),
            "7" | "9" => Self::Tsumo,
            _ => Self::invalid(message, "unknown meld type"),
        }
    }
}

impl From<&Message> for Inbound {
    fn from(message: &Message) -> Self {
        match message.kind() {
            HELO => Self::Helo {
                name: Self::text(message, "name"),
                tid: Self::text(message, "tid"),
                sx: Self::text(message, "sx"),
            },
            AUTH => match message.get("val") {
                Some(val) if !val.is_empty() => Self::Auth {
                    val: val.to_string(),
                },
                _ => Self::invalid(message, "missing auth value"),
            },
            PXR => match message.get("V") {
                Some(v) => Self::Pxr(GameType::from(v)),
                None => Self::invalid(message, "missing game type"),
            },
            JOIN => Self::Join {
                table: Self::text(message, "t"),
            },
            GOK => Self::Gok,
            NEXTREADY => Self::NextReady,
            KEEPALIVE => Self::KeepAlive,
            REACH => Self::Reach {
                tile: Self::tile(message, "hai"),
            },
            DISCARD => match Self::tile(message, "p") {
                Some(tile) => Self::Discard { tile },
                None => Self::invalid(message, "missing or bad discard tile"),
            },
            CALL => Self::call(message),
            EXIT => Self::Exit,
            _ => Self::Unknown(message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn inbound(frame: &str) -> Inbound {
        Inbound::from(&Message::decode(frame))
    }
    #[test]
    fn handshake_messages() {
        assert_eq!(
            inbound(r#"<HELO name="bot" tid="f0" sx="M"/>"#),
            Inbound::Helo {
                name: "bot".into(),
                tid: "f0".into(),
                sx: "M".into()
            }
        );
        assert_eq!(inbound(r#"<PXR V="-1"/>"#), Inbound::Pxr(GameType::Tournament));
        assert!(matches!(inbound("<AUTH/>"), Inbound::Invalid { .. }));
    }
    #[test]
    fn discard_requires_tile() {
        assert_eq!(
            inbound(r#"<D p="17"/>"#),
            Inbound::Discard {
                tile: Tile::try_from(17).unwrap()
            }
        );
        assert!(matches!(inbound(r#"<D p="200"/>"#), Inbound::Invalid { .. }));
        assert!(matches!(inbound("<D/>"), Inbound::Invalid { .. }));
    }
    #[test]
    fn meld_codes() {
        assert_eq!(inbound(r#"<N type="0"/>"#), Inbound::Claim(Claim::Decline));
        assert_eq!(inbound("<N/>"), Inbound::Claim(Claim::Decline));
        assert_eq!(inbound(r#"<N type="6"/>"#), Inbound::Claim(Claim::ron()));
        assert_eq!(inbound(r#"<N type="7"/>"#), Inbound::Tsumo);
        let pon = inbound(r#"<N type="1" hai0="4" hai1="5"/>"#);
        assert_eq!(
            pon,
            Inbound::Claim(Claim::Call(
                CallKind::Pon,
                vec![Tile::try_from(4).unwrap(), Tile::try_from(5).unwrap()]
            ))
        );
        assert_eq!(
            inbound(r#"<N type="4" hai0="8"/>"#),
            Inbound::ClosedKan {
                tile: Tile::try_from(8).ok()
            }
        );
        assert!(matches!(inbound(r#"<N type="42"/>"#), Inbound::Invalid { .. }));
    }
    #[test]
    fn malformed_and_unknown() {
        assert!(matches!(inbound("<D p=\"1\" bad/>"), Inbound::Unknown(m) if m.is_empty()));
        assert!(matches!(inbound("<FOO/>"), Inbound::Unknown(_)));
        assert_eq!(inbound("<exit/>"), Inbound::Exit);
    }
}
