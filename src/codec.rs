//! The serializer capability and the serde-backed adapters that implement it.
//!
//! An adapter owns one scratch buffer. [`Serializer::marshal`] returns a slice
//! borrowed from that buffer, so it stays valid only until the next call on the
//! same adapter; callers that keep bytes around must copy them.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// What a codec must provide to take part in a benchmark run.
pub trait Serializer<T> {
    /// Encode one record into the adapter's scratch buffer.
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError>;

    /// Decode `bytes` into `out`, replacing its contents.
    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError>;

    /// Short label used in reports.
    fn name(&self) -> &'static str;
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for Box<S> {
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError> {
        (**self).marshal(value)
    }

    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError> {
        (**self).unmarshal(bytes, out)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// serde_json, compact output.
#[derive(Debug, Default)]
pub struct JsonCodec {
    buf: Vec<u8>,
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for JsonCodec {
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError> {
        self.buf.clear();
        serde_json::to_writer(&mut self.buf, value)?;
        Ok(&self.buf)
    }

    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError> {
        *out = serde_json::from_slice(bytes)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// bincode 1.x with its default (fixed-int, little-endian) options.
#[derive(Debug, Default)]
pub struct BincodeCodec {
    buf: Vec<u8>,
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for BincodeCodec {
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError> {
        self.buf.clear();
        bincode::serialize_into(&mut self.buf, value)?;
        Ok(&self.buf)
    }

    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError> {
        *out = bincode::deserialize(bytes)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bincode"
    }
}

/// MessagePack via rmp-serde, structs written as maps keyed by field name.
#[derive(Debug, Default)]
pub struct MsgpackCodec {
    buf: Vec<u8>,
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for MsgpackCodec {
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError> {
        self.buf.clear();
        rmp_serde::encode::write_named(&mut self.buf, value)?;
        Ok(&self.buf)
    }

    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError> {
        *out = rmp_serde::from_slice(bytes)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "msgpack"
    }
}

/// postcard (varint, non-self-describing).
#[derive(Debug, Default)]
pub struct PostcardCodec {
    buf: Vec<u8>,
}

impl<T: Serialize + DeserializeOwned> Serializer<T> for PostcardCodec {
    fn marshal(&mut self, value: &T) -> Result<&[u8], CodecError> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        self.buf = postcard::to_extend(value, buf)?;
        Ok(&self.buf)
    }

    fn unmarshal(&mut self, bytes: &[u8], out: &mut T) -> Result<(), CodecError> {
        *out = postcard::from_bytes(bytes)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postcard"
    }
}

/// Available codec adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CodecKind {
    Json,
    Bincode,
    Msgpack,
    Postcard,
}

impl CodecKind {
    pub fn all() -> [CodecKind; 4] {
        [
            CodecKind::Json,
            CodecKind::Bincode,
            CodecKind::Msgpack,
            CodecKind::Postcard,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::Json => "json",
            CodecKind::Bincode => "bincode",
            CodecKind::Msgpack => "msgpack",
            CodecKind::Postcard => "postcard",
        }
    }

    /// A fresh adapter with empty scratch state.
    pub fn instantiate<T>(&self) -> Box<dyn Serializer<T>>
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        match self {
            CodecKind::Json => Box::new(JsonCodec::default()),
            CodecKind::Bincode => Box::new(BincodeCodec::default()),
            CodecKind::Msgpack => Box::new(MsgpackCodec::default()),
            CodecKind::Postcard => Box::new(PostcardCodec::default()),
        }
    }
}
