use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::linked_data::Cid;

use super::NetworkError;

/// Requests a peer can send over the virtual wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Ask for a single block by cid
    WantBlock { cid: Vec<u8> },
}

/// Answers to a [`Message`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Reply {
    Block { data: Bytes },
    DontHave,
    /// The remote store failed while serving
    Failed { reason: String },
}

impl Message {
    pub fn want_block(cid: &Cid) -> Self {
        Message::WantBlock { cid: cid.to_bytes() }
    }

    pub fn to_frame(&self) -> Result<Vec<u8>, NetworkError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_frame(frame: &[u8]) -> Result<Self, NetworkError> {
        Ok(bincode::deserialize(frame)?)
    }
}

impl Reply {
    pub fn to_frame(&self) -> Result<Vec<u8>, NetworkError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_frame(frame: &[u8]) -> Result<Self, NetworkError> {
        Ok(bincode::deserialize(frame)?)
    }
}

/// Parse the cid carried by a [`Message::WantBlock`]
pub fn decode_cid(bytes: &[u8]) -> Result<Cid, NetworkError> {
    Cid::try_from(bytes).map_err(|err| NetworkError::MalformedFrame(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linked_data::Block;

    #[test]
    fn test_want_block_frame() {
        let block = Block::new(b"wanted".to_vec());
        let frame = Message::want_block(block.cid()).to_frame().unwrap();
        let Message::WantBlock { cid } = Message::from_frame(&frame).unwrap();
        assert_eq!(decode_cid(&cid).unwrap(), *block.cid());
    }

    #[test]
    fn test_garbage_frame_is_rejected() {
        assert!(Reply::from_frame(&[0xff, 0xff, 0xff, 0xff, 0xff]).is_err());
        assert!(matches!(
            decode_cid(b"not a cid"),
            Err(NetworkError::MalformedFrame(_))
        ));
    }
}
