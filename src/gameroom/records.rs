use super::*;
use crate::ID;
use crate::N;
use crate::Participant;
use crate::Points;
use crate::Seat;
use crate::table::MeldKind;
use crate::table::Round;
use crate::table::RoundInfo;
use crate::tiles::Tile;
use std::path::Path;
use std::path::PathBuf;

/// One recorded table event, in seat terms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "play", rename_all = "snake_case")]
pub enum Play {
    Draw { seat: Seat, tile: Tile },
    Discard { seat: Seat, tile: Tile },
    Call {
        seat: Seat,
        from: Seat,
        kind: MeldKind,
        tiles: Vec<Tile>,
    },
    Riichi { seat: Seat },
    Indicator { tile: Tile },
    Win { seat: Seat, from: Seat, tile: Tile },
    Exhausted,
    Aborted,
}

/// Complete history of one round, enough to replay it.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Record {
    table: ID<Engine>,
    round: u32,
    honba: u32,
    dealer: Seat,
    /// Participant sitting at each seat.
    seating: [Participant; N],
    hands: [Vec<Tile>; N],
    plays: Vec<Play>,
    scores: [Points; N],
}

impl Record {
    /// Snapshot of a freshly dealt round.
    pub fn new(table: ID<Engine>, info: &RoundInfo, round: &Round) -> Self {
        Self {
            table,
            round: info.round(),
            honba: info.honba(),
            dealer: info.dealer(),
            seating: std::array::from_fn(|s| round.player(s).participant()),
            hands: std::array::from_fn(|s| round.player(s).hand().tiles().to_vec()),
            plays: Vec::new(),
            scores: info.scores(),
        }
    }
    pub fn push(&mut self, play: Play) {
        self.plays.push(play);
    }
    pub fn plays(&self) -> &[Play] {
        &self.plays
    }
    /// Closes the record with the scores the round ended on.
    pub fn close(&mut self, scores: [Points; N]) {
        self.scores = scores;
    }
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
    /// `<table>-<round>-<honba>.json` under `dir`.
    pub fn filename(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}-{}-{}.json", self.table, self.round, self.honba))
    }
    pub fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = self.filename(dir);
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn record() -> Record {
        let info = RoundInfo::default();
        let round = Round::deal(Some(42)).unwrap();
        Record::new(ID::default(), &info, &round)
    }
    #[test]
    fn plays_serialize_tagged() {
        let mut record = record();
        record.push(Play::Discard {
            seat: 2,
            tile: Tile::try_from(17).unwrap(),
        });
        record.push(Play::Exhausted);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["plays"][0]["play"], "discard");
        assert_eq!(json["plays"][0]["tile"], 17);
        assert_eq!(json["plays"][1]["play"], "exhausted");
        assert_eq!(json["hands"][0].as_array().map(|h| h.len()), Some(13));
    }
    #[test]
    fn saves_under_table_round_honba() {
        let record = record();
        let dir = std::env::temp_dir().join(format!("records-{}", ID::<Record>::default()));
        let path = record.save(&dir).unwrap();
        assert!(path.ends_with(format!("{}-0-0.json", record.table)));
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"plays\""));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
