use super::*;
use crate::N;
use crate::Points;
use crate::table::MeldKind;
use crate::tiles::Hand;
use crate::tiles::Tile;

/// Server-to-client messages.
///
/// Seat fields (`who`, `from`, `dealer`) are already relative to the viewer:
/// 0 is the client itself, 1..4 the following seats in rotation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerMessage {
    /// Handshake answer with the issued auth challenge.
    Helo { auth: String, rating: u32 },
    /// Authentication accepted.
    Ln,
    /// Protocol-level error notice; the connection stays open.
    Err { msg: String },
    /// Lobby accepted the join request.
    Go { kind: String },
    /// Table setup: the client's seat as dealer reference and the log id.
    Taikyoku { oya: usize, log: String },
    /// Participant names, ranks and sex codes, client first.
    Un {
        names: [String; N],
        dans: [u32; N],
        sexes: [String; N],
    },
    /// Round initialisation for the viewer.
    Init {
        seed: Vec<String>,
        scores: [Points; N],
        dealer: usize,
        hand: Hand,
    },
    /// Someone drew. The tile is only revealed to its owner.
    Draw {
        who: usize,
        tile: Option<Tile>,
        flags: u8,
    },
    /// Someone discarded. `flags` advertises the viewer's call eligibility.
    Discard { who: usize, tile: Tile, flags: u8 },
    /// A call was applied to the table.
    Meld {
        who: usize,
        from: usize,
        kind: MeldKind,
        tiles: Vec<Tile>,
    },
    /// A new bonus indicator was revealed.
    Dora { tile: Tile },
    /// Riichi declaration.
    Reach { who: usize, step: u8 },
    /// Round won.
    Agari {
        who: usize,
        from: usize,
        machi: Tile,
        hand: Hand,
        scores: [Points; N],
    },
    /// Round ended on an exhausted deck; every hand revealed.
    Ryuukyoku { hands: [Hand; N] },
    /// Game over with final scores.
    Owari { scores: [Points; N] },
}

impl ServerMessage {
    pub fn err(msg: &str) -> Self {
        Self::Err {
            msg: msg.to_string(),
        }
    }
    fn list<T>(items: &[T]) -> String
    where
        T: ToString,
    {
        items
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
    /// Draw tags are T/U/V/W and discard tags D/E/F/G, by relative seat.
    fn tagged(letters: &[u8; N], who: usize, tile: Option<Tile>) -> Message {
        let letter = letters[who % N] as char;
        match tile {
            Some(tile) => Message::new(&format!("{}{}", letter, tile)),
            None => Message::new(&letter.to_string()),
        }
    }
    pub fn to_message(&self) -> Message {
        match self {
            Self::Helo { auth, rating } => Message::new("helo")
                .with("auth", auth)
                .with("PF4", rating)
                .with("nintei", 1),
            Self::Ln => Message::new("ln"),
            Self::Err { msg } => Message::new("err").with("msg", msg),
            Self::Go { kind } => Message::new("go").with("type", kind),
            Self::Taikyoku { oya, log } => Message::new("taikyoku")
                .with("oya", oya)
                .with("log", log),
            Self::Un { names, dans, sexes } => names
                .iter()
                .enumerate()
                .fold(Message::new("un"), |m, (i, n)| m.with(&format!("n{}", i), n))
                .with("dan", Self::list(dans))
                .with("sx", Self::list(sexes)),
            Self::Init {
                seed,
                scores,
                dealer,
                hand,
            } => Message::new("init")
                .with("seed", seed.join(","))
                .with("ten", Self::list(scores))
                .with("oya", dealer)
                .with("hai", hand),
            Self::Draw { who, tile, flags } => {
                let message = Self::tagged(b"tuvw", *who, *tile);
                match flags {
                    0 => message,
                    f => message.with("t", f),
                }
            }
            Self::Discard { who, tile, flags } => {
                let message = Self::tagged(b"defg", *who, Some(*tile));
                match flags {
                    0 => message,
                    f => message.with("t", f),
                }
            }
            Self::Meld {
                who,
                from,
                kind,
                tiles,
            } => Message::new("n")
                .with("who", who)
                .with("from_who", from)
                .with("type", kind)
                .with("m", Self::list(tiles)),
            Self::Dora { tile } => Message::new("dora").with("hai", tile),
            Self::Reach { who, step } => Message::new("reach").with("who", who).with("step", step),
            Self::Agari {
                who,
                from,
                machi,
                hand,
                scores,
            } => Message::new("agari")
                .with("who", who)
                .with("fromWho", from)
                .with("machi", machi)
                .with("hai", hand)
                .with("ten", Self::list(scores)),
            Self::Ryuukyoku { hands } => hands
                .iter()
                .enumerate()
                .fold(Message::new("ryuukyoku"), |m, (i, h)| {
                    m.with(&format!("hai{}", i), h)
                }),
            Self::Owari { scores } => Message::new("owari").with("sc", Self::list(scores)),
        }
    }
}

impl From<ServerMessage> for Message {
    fn from(message: ServerMessage) -> Self {
        message.to_message()
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn tile(n: u8) -> Tile {
        Tile::try_from(n).unwrap()
    }
    #[test]
    fn draw_tags_by_relative_seat() {
        let own = ServerMessage::Draw {
            who: 0,
            tile: Some(tile(42)),
            flags: 0,
        };
        let other = ServerMessage::Draw {
            who: 2,
            tile: None,
            flags: 0,
        };
        assert_eq!(own.to_message().encode(), "<T42/>");
        assert_eq!(other.to_message().encode(), "<V/>");
    }
    #[test]
    fn discard_advertises_flags() {
        let m = ServerMessage::Discard {
            who: 3,
            tile: tile(7),
            flags: 3,
        }
        .to_message();
        assert_eq!(m.encode(), r#"<G7 t="3"/>"#);
        let quiet = ServerMessage::Discard {
            who: 1,
            tile: tile(7),
            flags: 0,
        };
        assert_eq!(quiet.to_message().encode(), "<E7/>");
    }
    #[test]
    fn meld_list_is_reparseable() {
        let m = Message::from(ServerMessage::Meld {
            who: 0,
            from: 3,
            kind: MeldKind::Pon,
            tiles: vec![tile(4), tile(5), tile(6)],
        });
        let back = Message::decode(&m.encode());
        assert_eq!(back.get("m"), Some("4,5,6"));
        assert_eq!(back.get("type"), Some("pon"));
    }
    #[test]
    fn lobby_messages() {
        let un = Message::from(ServerMessage::Un {
            names: ["me".into(), "a".into(), "b".into(), "c".into()],
            dans: [0, 1, 2, 3],
            sexes: ["F".into(), "C".into(), "C".into(), "C".into()],
        });
        assert_eq!(un.get("n0"), Some("me"));
        assert_eq!(un.get("n3"), Some("c"));
        assert_eq!(un.get("dan"), Some("0,1,2,3"));
        assert_eq!(un.get("sx"), Some("F,C,C,C"));
        assert_eq!(Message::from(ServerMessage::err("x")).encode(), r#"<ERR msg="x"/>"#);
    }
    #[test]
    fn error_text_reaches_the_client() {
        let wire = Message::from(ServerMessage::err("not your turn")).encode();
        let back = Message::decode(&wire);
        assert_eq!(back.kind(), "err");
        assert_eq!(back.get("msg"), Some("not your turn"));
    }
}
