//! Wire message codec
//!
//! A closed, versionless set of message kinds. Every message is a single
//! line of whitespace-separated tokens beginning with an integer type tag;
//! each kind has a fixed, ordered field list with nothing optional. A
//! message that fails to decode is discarded by the caller and the session
//! continues; a bad message never takes the connection down by itself.
//!
//! String fields (player and game names) are single tokens; whitespace in
//! a name is encoded as underscores.

use thiserror::Error;

use crate::sim::entities::ObjectId;

/// Everything that can cross the wire
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    BallSpawned {
        id: ObjectId,
    },
    BallData {
        id: ObjectId,
        pos_x: f32,
        pos_y: f32,
        dir_x: f32,
        dir_y: f32,
    },
    BallKilled {
        id: ObjectId,
    },
    TileHit {
        id: ObjectId,
        destroyed: bool,
    },
    PaddlePosition {
        x: f32,
    },
    BonusBoxSpawned {
        id: ObjectId,
        pos_x: f32,
        pos_y: f32,
        dir_x: f32,
        dir_y: f32,
    },
    BonusBoxPickup {
        id: ObjectId,
    },
    BulletFire {
        left_id: ObjectId,
        right_id: ObjectId,
        y: f32,
    },
    BulletKilled {
        id: ObjectId,
    },
    GameSettings {
        board_width: f32,
        board_height: f32,
        scale: f64,
    },
    GameStateChanged {
        state_code: u32,
    },
    LevelDone,
    PlayerName {
        name: String,
    },
    NewGame {
        ip: String,
        port: u16,
        name: String,
    },
    JoinGame {
        game_id: i32,
    },
    EndGame {
        game_id: i32,
        ip: String,
        port: u16,
    },
    GameListRequest,
}

/// Per-message decode failure. The offending message is discardable; the
/// session is not torn down on these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,
    #[error("unrecognized message tag {0}")]
    UnknownTag(String),
    #[error("field count mismatch for tag {tag}: expected {expected}, got {got}")]
    FieldCount {
        tag: u32,
        expected: usize,
        got: usize,
    },
    #[error("invalid field {index} for tag {tag}: {token:?}")]
    InvalidField {
        tag: u32,
        index: usize,
        token: String,
    },
}

impl Message {
    /// The integer type tag written first on the wire
    pub fn tag(&self) -> u32 {
        match self {
            Message::BallSpawned { .. } => 0,
            Message::BallData { .. } => 1,
            Message::BallKilled { .. } => 2,
            Message::TileHit { .. } => 3,
            Message::PaddlePosition { .. } => 4,
            Message::BonusBoxSpawned { .. } => 5,
            Message::BonusBoxPickup { .. } => 6,
            Message::BulletFire { .. } => 7,
            Message::BulletKilled { .. } => 8,
            Message::GameSettings { .. } => 9,
            Message::GameStateChanged { .. } => 10,
            Message::LevelDone => 11,
            Message::PlayerName { .. } => 12,
            Message::NewGame { .. } => 13,
            Message::JoinGame { .. } => 14,
            Message::EndGame { .. } => 15,
            Message::GameListRequest => 16,
        }
    }

    /// Encode as a single line of whitespace-separated tokens
    pub fn encode(&self) -> String {
        let tag = self.tag();
        match self {
            Message::BallSpawned { id }
            | Message::BallKilled { id }
            | Message::BonusBoxPickup { id }
            | Message::BulletKilled { id } => format!("{tag} {id}"),
            Message::BallData {
                id,
                pos_x,
                pos_y,
                dir_x,
                dir_y,
            }
            | Message::BonusBoxSpawned {
                id,
                pos_x,
                pos_y,
                dir_x,
                dir_y,
            } => format!("{tag} {id} {pos_x} {pos_y} {dir_x} {dir_y}"),
            Message::TileHit { id, destroyed } => {
                format!("{tag} {id} {}", u8::from(*destroyed))
            }
            Message::PaddlePosition { x } => format!("{tag} {x}"),
            Message::BulletFire {
                left_id,
                right_id,
                y,
            } => format!("{tag} {left_id} {right_id} {y}"),
            Message::GameSettings {
                board_width,
                board_height,
                scale,
            } => format!("{tag} {board_width} {board_height} {scale}"),
            Message::GameStateChanged { state_code } => format!("{tag} {state_code}"),
            Message::LevelDone | Message::GameListRequest => format!("{tag}"),
            Message::PlayerName { name } => format!("{tag} {}", tokenize(name)),
            Message::NewGame { ip, port, name } => {
                format!("{tag} {ip} {port} {}", tokenize(name))
            }
            Message::JoinGame { game_id } => format!("{tag} {game_id}"),
            Message::EndGame { game_id, ip, port } => format!("{tag} {game_id} {ip} {port}"),
        }
    }

    /// Decode a single message line. An unknown tag or a field count
    /// mismatch for a known tag fails this message only.
    pub fn decode(line: &str) -> Result<Message, DecodeError> {
        let mut tokens = line.split_whitespace();
        let tag_token = tokens.next().ok_or(DecodeError::Empty)?;
        let tag: u32 = tag_token
            .parse()
            .map_err(|_| DecodeError::UnknownTag(tag_token.to_string()))?;
        let fields: Vec<&str> = tokens.collect();

        let expect = |n: usize| -> Result<(), DecodeError> {
            if fields.len() != n {
                Err(DecodeError::FieldCount {
                    tag,
                    expected: n,
                    got: fields.len(),
                })
            } else {
                Ok(())
            }
        };

        macro_rules! field {
            ($idx:expr, $ty:ty) => {
                fields[$idx]
                    .parse::<$ty>()
                    .map_err(|_| DecodeError::InvalidField {
                        tag,
                        index: $idx,
                        token: fields[$idx].to_string(),
                    })?
            };
        }

        let msg = match tag {
            0 => {
                expect(1)?;
                Message::BallSpawned {
                    id: field!(0, ObjectId),
                }
            }
            1 => {
                expect(5)?;
                Message::BallData {
                    id: field!(0, ObjectId),
                    pos_x: field!(1, f32),
                    pos_y: field!(2, f32),
                    dir_x: field!(3, f32),
                    dir_y: field!(4, f32),
                }
            }
            2 => {
                expect(1)?;
                Message::BallKilled {
                    id: field!(0, ObjectId),
                }
            }
            3 => {
                expect(2)?;
                let flag = field!(1, u8);
                if flag > 1 {
                    return Err(DecodeError::InvalidField {
                        tag,
                        index: 1,
                        token: fields[1].to_string(),
                    });
                }
                Message::TileHit {
                    id: field!(0, ObjectId),
                    destroyed: flag == 1,
                }
            }
            4 => {
                expect(1)?;
                Message::PaddlePosition { x: field!(0, f32) }
            }
            5 => {
                expect(5)?;
                Message::BonusBoxSpawned {
                    id: field!(0, ObjectId),
                    pos_x: field!(1, f32),
                    pos_y: field!(2, f32),
                    dir_x: field!(3, f32),
                    dir_y: field!(4, f32),
                }
            }
            6 => {
                expect(1)?;
                Message::BonusBoxPickup {
                    id: field!(0, ObjectId),
                }
            }
            7 => {
                expect(3)?;
                Message::BulletFire {
                    left_id: field!(0, ObjectId),
                    right_id: field!(1, ObjectId),
                    y: field!(2, f32),
                }
            }
            8 => {
                expect(1)?;
                Message::BulletKilled {
                    id: field!(0, ObjectId),
                }
            }
            9 => {
                expect(3)?;
                Message::GameSettings {
                    board_width: field!(0, f32),
                    board_height: field!(1, f32),
                    scale: field!(2, f64),
                }
            }
            10 => {
                expect(1)?;
                Message::GameStateChanged {
                    state_code: field!(0, u32),
                }
            }
            11 => {
                expect(0)?;
                Message::LevelDone
            }
            12 => {
                expect(1)?;
                Message::PlayerName {
                    name: fields[0].to_string(),
                }
            }
            13 => {
                expect(3)?;
                Message::NewGame {
                    ip: fields[0].to_string(),
                    port: field!(1, u16),
                    name: fields[2].to_string(),
                }
            }
            14 => {
                expect(1)?;
                Message::JoinGame {
                    game_id: field!(0, i32),
                }
            }
            15 => {
                expect(3)?;
                Message::EndGame {
                    game_id: field!(0, i32),
                    ip: fields[1].to_string(),
                    port: field!(2, u16),
                }
            }
            16 => {
                expect(0)?;
                Message::GameListRequest
            }
            _ => return Err(DecodeError::UnknownTag(tag_token.to_string())),
        };
        Ok(msg)
    }
}

/// Collapse whitespace so string fields stay single tokens on the wire
fn tokenize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_messages() -> Vec<Message> {
        vec![
            Message::BallSpawned { id: 3 },
            Message::BallData {
                id: 3,
                pos_x: 120.5,
                pos_y: 633.25,
                dir_x: 0.25,
                dir_y: -0.96875,
            },
            Message::BallKilled { id: 3 },
            Message::TileHit {
                id: 17,
                destroyed: true,
            },
            Message::TileHit {
                id: 18,
                destroyed: false,
            },
            Message::PaddlePosition { x: 480.0 },
            Message::BonusBoxSpawned {
                id: 2,
                pos_x: 230.0,
                pos_y: 115.0,
                dir_x: 0.0,
                dir_y: 1.0,
            },
            Message::BonusBoxPickup { id: 2 },
            Message::BulletFire {
                left_id: 0,
                right_id: 1,
                y: 605.0,
            },
            Message::BulletKilled { id: 1 },
            Message::GameSettings {
                board_width: 1280.0,
                board_height: 720.0,
                scale: 1.0,
            },
            Message::GameStateChanged { state_code: 1 },
            Message::LevelDone,
            Message::PlayerName {
                name: "tuxedo".to_string(),
            },
            Message::NewGame {
                ip: "192.168.1.10".to_string(),
                port: 3113,
                name: "tuxedo".to_string(),
            },
            Message::JoinGame { game_id: 4 },
            Message::EndGame {
                game_id: 4,
                ip: "192.168.1.10".to_string(),
                port: 3113,
            },
            Message::GameListRequest,
        ]
    }

    #[test]
    fn test_round_trip_every_kind() {
        for msg in sample_messages() {
            let encoded = msg.encode();
            let decoded = Message::decode(&encoded)
                .unwrap_or_else(|e| panic!("decode of {encoded:?} failed: {e}"));
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<u32> = sample_messages().iter().map(|m| m.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        // 18 samples but TileHit appears twice
        assert_eq!(tags.len(), 17);
    }

    #[test]
    fn test_unknown_tag_is_error() {
        assert!(matches!(
            Message::decode("99 1 2 3"),
            Err(DecodeError::UnknownTag(_))
        ));
        assert!(matches!(
            Message::decode("banana 1"),
            Err(DecodeError::UnknownTag(_))
        ));
    }

    #[test]
    fn test_field_count_mismatch_is_error() {
        // BallData wants 5 fields
        assert!(matches!(
            Message::decode("1 3 120.5"),
            Err(DecodeError::FieldCount {
                tag: 1,
                expected: 5,
                got: 2
            })
        ));
        // Trailing extra field is a mismatch too
        assert!(matches!(
            Message::decode("2 3 extra"),
            Err(DecodeError::FieldCount { tag: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_field_is_error() {
        assert!(matches!(
            Message::decode("4 not_a_float"),
            Err(DecodeError::InvalidField { tag: 4, .. })
        ));
        // TileHit destroyed flag must be 0 or 1
        assert!(matches!(
            Message::decode("3 17 2"),
            Err(DecodeError::InvalidField { tag: 3, .. })
        ));
    }

    #[test]
    fn test_empty_is_error() {
        assert_eq!(Message::decode(""), Err(DecodeError::Empty));
        assert_eq!(Message::decode("   "), Err(DecodeError::Empty));
    }

    #[test]
    fn test_name_whitespace_becomes_single_token() {
        let msg = Message::PlayerName {
            name: "two words".to_string(),
        };
        let decoded = Message::decode(&msg.encode()).unwrap();
        assert_eq!(
            decoded,
            Message::PlayerName {
                name: "two_words".to_string()
            }
        );
    }

    proptest! {
        #[test]
        fn ball_data_round_trips(
            id in 0u32..10_000,
            px in -5000.0f32..5000.0,
            py in -5000.0f32..5000.0,
            dx in -1.0f32..1.0,
            dy in -1.0f32..1.0,
        ) {
            let msg = Message::BallData { id, pos_x: px, pos_y: py, dir_x: dx, dir_y: dy };
            prop_assert_eq!(Message::decode(&msg.encode()).unwrap(), msg);
        }

        #[test]
        fn paddle_position_round_trips(x in -10_000.0f32..10_000.0) {
            let msg = Message::PaddlePosition { x };
            prop_assert_eq!(Message::decode(&msg.encode()).unwrap(), msg);
        }

        #[test]
        fn decode_never_panics(line in "\\PC{0,60}") {
            let _ = Message::decode(&line);
        }
    }
}
