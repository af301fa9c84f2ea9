use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SerializerError {
    #[error("Unexpected end of state data: wanted {wanted} bytes at offset {offset}, {available} left")]
    UnexpectedEof {
        wanted: usize,
        offset: usize,
        available: usize,
    },

    #[error("Invalid boolean byte: 0x{0:02X}")]
    InvalidBool(u8),

    #[error("String is not valid UTF-8")]
    InvalidString,

    #[error("Field of {0} bytes does not fit a 32-bit length")]
    TooLong(usize),
}

// Encoding of a stored bool, anything else is corruption
const TRUE_FLAG: u8 = 0xFE;
const FALSE_FLAG: u8 = 0x01;

/// Symmetric little-endian encoder/decoder for save states
///
/// Every `put_*` has a matching `get_*`; a state is read back with the same
/// sequence of calls it was written with. There is no framing at this layer,
/// callers establish what is being loaded before they start reading.
#[derive(Debug, Default, Clone)]
pub struct Serializer {
    data: Vec<u8>,
    pos: usize,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Start reading again from the beginning
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Drop all contents
    pub fn reset(&mut self) {
        self.data.clear();
        self.pos = 0;
    }

    pub fn put_byte(&mut self, value: u8) -> Result<(), SerializerError> {
        self.data.push(value);
        Ok(())
    }

    pub fn get_byte(&mut self) -> Result<u8, SerializerError> {
        Ok(self.take(1)?[0])
    }

    pub fn put_short(&mut self, value: u16) -> Result<(), SerializerError> {
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn get_short(&mut self) -> Result<u16, SerializerError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn put_int(&mut self, value: u32) -> Result<(), SerializerError> {
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn get_int(&mut self) -> Result<u32, SerializerError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn put_bool(&mut self, value: bool) -> Result<(), SerializerError> {
        self.put_byte(if value { TRUE_FLAG } else { FALSE_FLAG })
    }

    pub fn get_bool(&mut self) -> Result<bool, SerializerError> {
        match self.get_byte()? {
            TRUE_FLAG => Ok(true),
            FALSE_FLAG => Ok(false),
            other => Err(SerializerError::InvalidBool(other)),
        }
    }

    pub fn put_string(&mut self, value: &str) -> Result<(), SerializerError> {
        let len = u32::try_from(value.len()).map_err(|_| SerializerError::TooLong(value.len()))?;
        self.put_int(len)?;
        self.data.extend_from_slice(value.as_bytes());
        Ok(())
    }

    pub fn get_string(&mut self) -> Result<String, SerializerError> {
        let len = self.get_int()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerializerError::InvalidString)
    }

    /// Raw bytes, no length prefix
    pub fn put_byte_array(&mut self, values: &[u8]) -> Result<(), SerializerError> {
        self.data.extend_from_slice(values);
        Ok(())
    }

    /// Fills `values` completely or fails without touching it
    pub fn get_byte_array(&mut self, values: &mut [u8]) -> Result<(), SerializerError> {
        let bytes = self.take(values.len())?;
        values.copy_from_slice(bytes);
        Ok(())
    }

    fn take(&mut self, wanted: usize) -> Result<&[u8], SerializerError> {
        let available = self.data.len() - self.pos;
        if wanted > available {
            return Err(SerializerError::UnexpectedEof {
                wanted,
                offset: self.pos,
                available,
            });
        }
        let start = self.pos;
        self.pos += wanted;
        Ok(&self.data[start..self.pos])
    }
}
