use glam::{Quat, Vec3};
use uuid::Uuid;

use crate::object::ObjectId;

use super::protocol::{ObjectCommand, ServiceId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("unexpected end of packet: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },
    #[error("string field is not valid utf-8")]
    InvalidUtf8,
    #[error("unknown {kind} id {value}")]
    UnknownId { kind: &'static str, value: u8 },
}

/// Appends the wire form of a value to a packet body.
pub trait Encode {
    fn encode(&self, buf: &mut Vec<u8>);
}

/// Consumes the wire form of a value from the read cursor.
pub trait Decode: Sized {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError>;
}

/// Ordered byte buffer with a read cursor.
///
/// Nothing on the wire describes the field layout: readers must call `read`
/// in exactly the order the writer called `write`. The only detectable
/// corruption is running off the end of the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    buffer: Vec<u8>,
    read_pos: usize,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            read_pos: 0,
        }
    }

    /// Starts a packet with its `(service, command)` routing header.
    pub fn command(service: ServiceId, command: impl Into<u8>) -> Self {
        let command: u8 = command.into();
        let mut packet = Self::new();
        packet.write(service).write(command);
        packet
    }

    pub fn write<T: Encode>(&mut self, value: T) -> &mut Self {
        value.encode(&mut self.buffer);
        self
    }

    pub fn read<T: Decode>(&mut self) -> Result<T, PacketError> {
        T::decode(self)
    }

    /// Splices `value` in at byte `index`.
    ///
    /// A read cursor strictly past `index` moves with the bytes it pointed at,
    /// so fields that were unread stay unread and in their original order.
    pub fn insert<T: Encode>(&mut self, index: usize, value: T) -> &mut Self {
        let mut encoded = Vec::new();
        value.encode(&mut encoded);
        self.insert_bytes(index, &encoded);
        self
    }

    pub fn insert_bytes(&mut self, index: usize, bytes: &[u8]) {
        let index = index.min(self.buffer.len());
        self.buffer.splice(index..index, bytes.iter().copied());
        if self.read_pos > index {
            self.read_pos += bytes.len();
        }
    }

    /// Inserts a top-level routing header in front of an already built body.
    pub fn prepend_header(&mut self, service: ServiceId, command: impl Into<u8>) -> &mut Self {
        self.insert_bytes(0, &[service as u8, command.into()]);
        self
    }

    /// Turns a built body into an object-communication envelope addressed to
    /// `target`, whose own dispatch will see `(service, command)`.
    pub fn wrap_for_object(
        &mut self,
        target: ObjectId,
        service: ServiceId,
        command: impl Into<u8>,
    ) -> &mut Self {
        let command: u8 = command.into();
        let mut header = Packet::command(ServiceId::Object, ObjectCommand::Communication);
        header.write(target).write(service).write(command);
        self.insert_bytes(0, header.as_bytes());
        self
    }

    pub fn read_header(&mut self) -> Result<(u8, u8), PacketError> {
        let service = self.read::<u8>()?;
        let command = self.read::<u8>()?;
        Ok((service, command))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&[u8], PacketError> {
        let remaining = self.unread_length();
        if count > remaining {
            return Err(PacketError::UnexpectedEnd {
                needed: count,
                remaining,
            });
        }
        let start = self.read_pos;
        self.read_pos += count;
        Ok(&self.buffer[start..start + count])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Bytes left between the cursor and the end of the buffer. Trailing
    /// optional fields are present exactly when this is non-zero.
    pub fn unread_length(&self) -> usize {
        self.buffer.len() - self.read_pos
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

macro_rules! impl_fixed_width {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode(&self, buf: &mut Vec<u8>) {
                    buf.extend_from_slice(&self.to_le_bytes());
                }
            }

            impl Decode for $ty {
                fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
                    packet.read_array().map(<$ty>::from_le_bytes)
                }
            }
        )+
    };
}

impl_fixed_width!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, buf: &mut Vec<u8>) {
        (**self).encode(buf);
    }
}

impl Encode for bool {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(*self));
    }
}

impl Decode for bool {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        Ok(packet.read::<u8>()? != 0)
    }
}

impl Encode for str {
    fn encode(&self, buf: &mut Vec<u8>) {
        (self.len() as u32).encode(buf);
        buf.extend_from_slice(self.as_bytes());
    }
}

impl Encode for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.as_str().encode(buf);
    }
}

impl Decode for String {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        let start = packet.read_pos;
        let len = packet.read::<u32>()? as usize;
        let bytes = match packet.read_bytes(len) {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                packet.read_pos = start;
                return Err(e);
            }
        };
        String::from_utf8(bytes).map_err(|_| PacketError::InvalidUtf8)
    }
}

impl Encode for Vec3 {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.x.encode(buf);
        self.y.encode(buf);
        self.z.encode(buf);
    }
}

impl Decode for Vec3 {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        if packet.unread_length() < 12 {
            return Err(PacketError::UnexpectedEnd {
                needed: 12,
                remaining: packet.unread_length(),
            });
        }
        Ok(Vec3::new(packet.read()?, packet.read()?, packet.read()?))
    }
}

impl Encode for Quat {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.x.encode(buf);
        self.y.encode(buf);
        self.z.encode(buf);
        self.w.encode(buf);
    }
}

impl Decode for Quat {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        if packet.unread_length() < 16 {
            return Err(PacketError::UnexpectedEnd {
                needed: 16,
                remaining: packet.unread_length(),
            });
        }
        Ok(Quat::from_xyzw(
            packet.read()?,
            packet.read()?,
            packet.read()?,
            packet.read()?,
        ))
    }
}

impl Encode for Uuid {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl Decode for Uuid {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        packet.read_array().map(Uuid::from_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::{InteractableCommand, PlayerCommand};

    #[test]
    fn mixed_sequence_reads_back_in_order() {
        let guid = Uuid::new_v4();
        let mut packet = Packet::new();
        packet
            .write(true)
            .write(7u8)
            .write(-3i16)
            .write(70_000u32)
            .write(u64::MAX - 1)
            .write(1.5f32)
            .write("grab")
            .write(Vec3::new(1.0, -2.0, 3.5))
            .write(Quat::from_rotation_y(0.5))
            .write(guid);

        assert!(packet.read::<bool>().unwrap());
        assert_eq!(packet.read::<u8>().unwrap(), 7);
        assert_eq!(packet.read::<i16>().unwrap(), -3);
        assert_eq!(packet.read::<u32>().unwrap(), 70_000);
        assert_eq!(packet.read::<u64>().unwrap(), u64::MAX - 1);
        assert_eq!(packet.read::<f32>().unwrap(), 1.5);
        assert_eq!(packet.read::<String>().unwrap(), "grab");
        assert_eq!(packet.read::<Vec3>().unwrap(), Vec3::new(1.0, -2.0, 3.5));
        assert_eq!(packet.read::<Quat>().unwrap(), Quat::from_rotation_y(0.5));
        assert_eq!(packet.read::<Uuid>().unwrap(), guid);
        assert_eq!(packet.unread_length(), 0);
    }

    #[test]
    fn header_inserted_after_body_is_read_first() {
        let mut packet = Packet::new();
        packet.write(300u16).write(Vec3::ONE);
        packet.prepend_header(ServiceId::Player, PlayerCommand::GrabRequest);

        let (service, command) = packet.read_header().unwrap();
        assert_eq!(service, ServiceId::Player as u8);
        assert_eq!(command, PlayerCommand::GrabRequest as u8);
        assert_eq!(packet.read::<u16>().unwrap(), 300);
        assert_eq!(packet.read::<Vec3>().unwrap(), Vec3::ONE);
    }

    #[test]
    fn object_envelope_layout() {
        let mut packet = Packet::new();
        packet.write(4u8);
        packet.wrap_for_object(500, ServiceId::Interactable, InteractableCommand::Grab);

        assert_eq!(packet.read::<ServiceId>().unwrap(), ServiceId::Object);
        assert_eq!(
            packet.read::<ObjectCommand>().unwrap(),
            ObjectCommand::Communication
        );
        assert_eq!(packet.read::<u16>().unwrap(), 500);
        assert_eq!(packet.read::<ServiceId>().unwrap(), ServiceId::Interactable);
        assert_eq!(
            packet.read::<InteractableCommand>().unwrap(),
            InteractableCommand::Grab
        );
        assert_eq!(packet.read::<u8>().unwrap(), 4);
    }

    #[test]
    fn insert_before_cursor_keeps_unread_fields() {
        let mut packet = Packet::new();
        packet.write(1u8).write(2u8).write(3u8);
        assert_eq!(packet.read::<u8>().unwrap(), 1);

        packet.insert(0, 0xAAu16);

        assert_eq!(packet.unread_length(), 2);
        assert_eq!(packet.read::<u8>().unwrap(), 2);
        assert_eq!(packet.read::<u8>().unwrap(), 3);
    }

    #[test]
    fn optional_trailing_field() {
        let mut with = Packet::new();
        with.write(9u16).write(0.5f32).write(Vec3::X);
        let mut without = Packet::new();
        without.write(9u16).write(0.5f32);

        for (packet, expected) in [(&mut with, Some(Vec3::X)), (&mut without, None)] {
            let _id = packet.read::<u16>().unwrap();
            let _volume = packet.read::<f32>().unwrap();
            let position = if packet.unread_length() > 0 {
                Some(packet.read::<Vec3>().unwrap())
            } else {
                None
            };
            assert_eq!(position, expected);
        }
    }

    #[test]
    fn truncated_read_does_not_advance() {
        let mut packet = Packet::from_bytes(vec![1, 2, 3]);
        assert!(matches!(
            packet.read::<u32>(),
            Err(PacketError::UnexpectedEnd {
                needed: 4,
                remaining: 3
            })
        ));
        assert_eq!(packet.read_pos(), 0);

        let mut short_string = Packet::new();
        short_string.write(10u32).write(1u8);
        assert!(short_string.read::<String>().is_err());
        assert_eq!(short_string.read_pos(), 0);
    }

    #[test]
    fn unknown_wire_id_is_reported() {
        let mut packet = Packet::from_bytes(vec![200]);
        assert!(matches!(
            packet.read::<ServiceId>(),
            Err(PacketError::UnknownId { value: 200, .. })
        ));
    }
}
