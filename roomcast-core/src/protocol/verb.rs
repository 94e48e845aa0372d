//! Reserved words of the line protocol.

// client -> server
pub const TO: &str = "TO";
pub const TO_ROOM: &str = "TO_ROOM";
pub const ADD_ROOM: &str = "ADD_ROOM";
pub const REMOVE_ROOM: &str = "REMOVE_ROOM";
pub const JOIN_ROOM: &str = "JOIN_ROOM";
pub const LEAVE_ROOM: &str = "LEAVE_ROOM";
pub const CLOSE_ROOM: &str = "CLOSE_ROOM";
pub const OPEN_ROOM: &str = "OPEN_ROOM";

// peer lifecycle, written after a peer id (DC doubles as the disconnect request)
pub const ID: &str = "ID";
pub const JOINED: &str = "JOINED";
pub const DC: &str = "DC";

// server -> client
pub const ROOM_ADDED: &str = "ROOM_ADDED";
pub const ADD_ROOM_FAILED: &str = "ADD_ROOM_FAILED";
pub const ROOM_REMOVED: &str = "ROOM_REMOVED";
pub const JOINED_ROOM: &str = "JOINED_ROOM";
pub const JOIN_ROOM_FAIL: &str = "JOIN_ROOM_FAIL";
pub const LEFT_ROOM: &str = "LEFT_ROOM";
pub const ROOM_OWNER: &str = "ROOM_OWNER";
pub const ROOM_CLOSED: &str = "ROOM_CLOSED";
pub const ROOM_OPENED: &str = "ROOM_OPENED";
pub const INVALID_CMD: &str = "INVALID_CMD";

pub const RESERVED: [&str; 21] = [
    ID,
    JOINED,
    DC,
    TO,
    TO_ROOM,
    ADD_ROOM,
    REMOVE_ROOM,
    JOIN_ROOM,
    LEAVE_ROOM,
    CLOSE_ROOM,
    OPEN_ROOM,
    ROOM_ADDED,
    ADD_ROOM_FAILED,
    ROOM_REMOVED,
    JOINED_ROOM,
    JOIN_ROOM_FAIL,
    LEFT_ROOM,
    ROOM_OWNER,
    ROOM_CLOSED,
    ROOM_OPENED,
    INVALID_CMD,
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}
