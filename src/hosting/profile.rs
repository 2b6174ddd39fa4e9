use crate::gameroom::ProtocolError;
use crate::protocol::GameType;
use crate::protocol::ServerMessage;

/// Rating advertised in the handshake answer.
const RATING: u32 = 1;

/// What the server knows about the remote client, built up by the handshake.
///
/// The profile outlives connections: a client that reconnects after fully
/// initialising is already known and must not greet again.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    name: String,
    tid: String,
    sex: String,
    dan: u32,
    greeted: bool,
    authenticated: bool,
    game: Option<GameType>,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn tid(&self) -> &str {
        &self.tid
    }
    pub fn sex(&self) -> &str {
        &self.sex
    }
    pub fn dan(&self) -> u32 {
        self.dan
    }
    pub fn game(&self) -> Option<&GameType> {
        self.game.as_ref()
    }
    pub fn is_greeted(&self) -> bool {
        self.greeted
    }
    /// Authenticated with a game type chosen.
    pub fn is_initialized(&self) -> bool {
        self.authenticated && self.game.is_some()
    }
}

impl Profile {
    /// `helo` starts over with a fresh profile and an auth challenge.
    pub fn helo(&mut self, name: String, tid: String, sex: String) -> Result<ServerMessage, ProtocolError> {
        if self.is_initialized() {
            return Err(ProtocolError::violation("already authenticated"));
        }
        *self = Self {
            name,
            tid,
            sex,
            greeted: true,
            ..Self::default()
        };
        log::info!("[session] hello from {} ({}, {})", self.name, self.tid, self.sex);
        Ok(ServerMessage::Helo {
            auth: uuid::Uuid::now_v7().simple().to_string(),
            rating: RATING,
        })
    }
    pub fn auth(&mut self, val: &str) -> Result<ServerMessage, ProtocolError> {
        if !self.greeted {
            return Err(ProtocolError::violation("not authenticated"));
        }
        log::debug!("[session] auth token {}", val);
        self.authenticated = true;
        Ok(ServerMessage::Ln)
    }
    pub fn pxr(&mut self, game: GameType) -> Result<(), ProtocolError> {
        if !self.greeted {
            return Err(ProtocolError::violation("not authenticated"));
        }
        log::debug!("[session] game type {:?}", game);
        self.game = Some(game);
        Ok(())
    }
    pub fn gok(&self) {
        log::debug!("[session] {} accepted the game", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn greet(profile: &mut Profile) -> Result<ServerMessage, ProtocolError> {
        profile.helo("me".into(), "0".into(), "M".into())
    }
    #[test]
    fn handshake_in_order() {
        let ref mut profile = Profile::default();
        assert!(matches!(greet(profile), Ok(ServerMessage::Helo { rating: 1, .. })));
        assert_eq!(profile.auth("x"), Ok(ServerMessage::Ln));
        assert!(!profile.is_initialized());
        assert_eq!(profile.pxr(GameType::from("9")), Ok(()));
        assert!(profile.is_initialized());
        assert_eq!(profile.game(), Some(&GameType::Regular));
        assert_eq!(profile.name(), "me");
    }
    #[test]
    fn auth_and_pxr_need_helo() {
        let ref mut profile = Profile::default();
        assert_eq!(profile.auth("x"), Err(ProtocolError::violation("not authenticated")));
        assert_eq!(
            profile.pxr(GameType::Anonymous),
            Err(ProtocolError::violation("not authenticated"))
        );
    }
    #[test]
    fn second_helo_after_init_is_refused() {
        let ref mut profile = Profile::default();
        greet(profile).unwrap();
        greet(profile).unwrap();
        profile.auth("x").unwrap();
        profile.pxr(GameType::Tournament).unwrap();
        assert_eq!(greet(profile), Err(ProtocolError::violation("already authenticated")));
        assert!(profile.is_initialized());
    }
}
