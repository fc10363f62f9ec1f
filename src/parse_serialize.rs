use nom::IResult;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("insufficient data")]
    InsufficientData,
    #[error("unexpected data")]
    UnexpectedData,
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),
    #[error("data left after parsing")]
    DataLeft,
    #[error("value out of range: {0}")]
    OutOfRange(&'static str),
    #[error("parser error: {0:?}")]
    NomError(nom::error::ErrorKind),
}

impl From<enum_tryfrom::InvalidEnumValue> for SerializeError {
    fn from(_: enum_tryfrom::InvalidEnumValue) -> Self {
        SerializeError::UnexpectedData
    }
}

#[derive(Debug)]
pub struct DeserializeError<I>(pub I, pub SerializeError);
pub type DeserializeResult<'lt, T> = IResult<&'lt [u8], T, DeserializeError<&'lt [u8]>>;

impl<I> nom::error::ParseError<I> for DeserializeError<I> {
    fn from_error_kind(input: I, kind: nom::error::ErrorKind) -> Self {
        DeserializeError(input, SerializeError::NomError(kind))
    }

    fn append(input: I, kind: nom::error::ErrorKind, _other: Self) -> Self {
        Self::from_error_kind(input, kind)
    }
}

impl<I> DeserializeError<I> {
    pub fn new(input: I, error: SerializeError) -> Self {
        DeserializeError(input, error)
    }

    pub fn unexpected_data(input: I) -> Self {
        Self::new(input, SerializeError::UnexpectedData)
    }

    pub fn unimplemented(input: I, text: &'static str) -> Self {
        Self::new(input, SerializeError::Unimplemented(text))
    }
}

pub trait Deserialize: Sized {
    fn deserialize(input: &[u8]) -> DeserializeResult<Self>;
    fn deserialize_complete(input: &[u8]) -> SerializeResult<Self> {
        match Self::deserialize(input) {
            Ok((remaining, result)) => {
                if !remaining.is_empty() {
                    Err(SerializeError::DataLeft)
                } else {
                    Ok(result)
                }
            }
            Err(nom::Err::Incomplete(_)) => Err(SerializeError::InsufficientData),
            Err(nom::Err::Error(e)) => Err(e.1),
            Err(nom::Err::Failure(e)) => Err(e.1),
        }
    }
}

/**
 * For types whose body layout depends on a tag that was read (or will be written) elsewhere,
 * e.g. the action code preceding an action frame body.
 */
pub trait DeserializeTagged: SerializeTagged + Sized {
    fn deserialize(tag: Self::TagType, input: &[u8]) -> DeserializeResult<Self>;
}

pub type SerializeResult<T> = std::result::Result<T, SerializeError>;

pub trait Serialize: Sized {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()>;
    fn serialize(&self) -> SerializeResult<Vec<u8>> {
        let mut result = vec![];
        self.serialize_to(&mut result)?;
        Ok(result)
    }
}

pub trait SerializeTagged {
    type TagType: Copy;
    fn serialize_tag(&self) -> SerializeResult<Self::TagType>;
}

/**
 * Converts a nom error into the plain SerializeError, for callers that are not parsers
 * themselves.
 */
pub fn into_serialize_error<I>(err: nom::Err<DeserializeError<I>>) -> SerializeError {
    match err {
        nom::Err::Incomplete(_) => SerializeError::InsufficientData,
        nom::Err::Error(e) => e.1,
        nom::Err::Failure(e) => e.1,
    }
}

/* Default implementations */
macro_rules! default_impl {
    ($t:ty) => {
        impl $crate::parse_serialize::Deserialize for $t {
            fn deserialize(input: &[u8]) -> $crate::parse_serialize::DeserializeResult<$t> {
                let mut data = [0; std::mem::size_of::<$t>()];
                let (input, parsed) = nom::bytes::streaming::take(data.len())(input)?;
                data.copy_from_slice(parsed);
                std::result::Result::Ok((input, <$t>::from_le_bytes(data)))
            }
        }
        impl $crate::parse_serialize::Serialize for $t {
            fn serialize_to(
                &self,
                target: &mut Vec<u8>,
            ) -> $crate::parse_serialize::SerializeResult<()> {
                target.extend(&self.clone().to_le_bytes());
                std::result::Result::Ok(())
            }
        }
    };
}

default_impl!(u8);
default_impl!(u16);

#[macro_export]
macro_rules! default_serialization_enum {
    ($t:ident, $i:ident) => {
        impl $crate::parse_serialize::Deserialize for $t {
            fn deserialize(input: &[u8]) -> $crate::parse_serialize::DeserializeResult<$t> {
                let (input, parsed) = <$i as $crate::parse_serialize::Deserialize>::deserialize(input)?;
                let result = <$t as std::convert::TryFrom<$i>>::try_from(parsed).map_err(|_| {
                    $crate::nom::Err::Error($crate::parse_serialize::DeserializeError(
                        input,
                        $crate::parse_serialize::SerializeError::UnexpectedData,
                    ))
                })?;
                std::result::Result::Ok((input, result))
            }
        }
        impl $crate::parse_serialize::Serialize for $t {
            fn serialize_to(
                &self,
                target: &mut Vec<u8>,
            ) -> $crate::parse_serialize::SerializeResult<()> {
                $crate::parse_serialize::Serialize::serialize_to(&(*self as $i), target)
            }
        }
    };
}

#[macro_export]
macro_rules! default_serialization_newtype {
    ($t:ident, $i:ty) => {
        impl $crate::parse_serialize::Deserialize for $t {
            fn deserialize(input: &[u8]) -> $crate::parse_serialize::DeserializeResult<$t> {
                $crate::nom::combinator::map(
                    <$i as $crate::parse_serialize::Deserialize>::deserialize,
                    $t,
                )(input)
            }
        }
        impl $crate::parse_serialize::Serialize for $t {
            fn serialize_to(
                &self,
                target: &mut Vec<u8>,
            ) -> $crate::parse_serialize::SerializeResult<()> {
                $crate::parse_serialize::Serialize::serialize_to(&self.0, target)
            }
        }
    };
}

impl Serialize for bool {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        (*self as u8).serialize_to(target)
    }
}

impl Deserialize for bool {
    fn deserialize(input: &[u8]) -> DeserializeResult<bool> {
        nom::combinator::map(u8::deserialize, |v: u8| v != 0)(input)
    }
}

impl<T: Serialize> Serialize for &T {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        (*self).serialize_to(target)
    }
}

impl Serialize for [u8; 6] {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        target.extend_from_slice(&self[..]);
        Ok(())
    }
}

impl Deserialize for [u8; 6] {
    fn deserialize(input: &[u8]) -> DeserializeResult<[u8; 6]> {
        let mut data = [0; 6];
        let (input, parsed) = nom::bytes::streaming::take(data.len())(input)?;
        data.copy_from_slice(parsed);
        Ok((input, data))
    }
}

impl<T1: Deserialize, T2: Deserialize> Deserialize for (T1, T2) {
    fn deserialize(input: &[u8]) -> DeserializeResult<(T1, T2)> {
        nom::sequence::tuple((T1::deserialize, T2::deserialize))(input)
    }
}
impl<T1: Deserialize, T2: Deserialize, T3: Deserialize, T4: Deserialize> Deserialize
    for (T1, T2, T3, T4)
{
    fn deserialize(input: &[u8]) -> DeserializeResult<(T1, T2, T3, T4)> {
        nom::sequence::tuple((
            T1::deserialize,
            T2::deserialize,
            T3::deserialize,
            T4::deserialize,
        ))(input)
    }
}

impl<T1: Serialize, T2: Serialize> Serialize for (T1, T2) {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        self.0.serialize_to(target)?;
        self.1.serialize_to(target)?;
        Ok(())
    }
}
impl<T1: Serialize, T2: Serialize, T3: Serialize, T4: Serialize> Serialize for (T1, T2, T3, T4) {
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        self.0.serialize_to(target)?;
        self.1.serialize_to(target)?;
        self.2.serialize_to(target)?;
        self.3.serialize_to(target)?;
        Ok(())
    }
}

impl<T1: Serialize, T2: Serialize, T3: Serialize, T4: Serialize, T5: Serialize> Serialize
    for (T1, T2, T3, T4, T5)
{
    fn serialize_to(&self, target: &mut Vec<u8>) -> SerializeResult<()> {
        self.0.serialize_to(target)?;
        self.1.serialize_to(target)?;
        self.2.serialize_to(target)?;
        self.3.serialize_to(target)?;
        self.4.serialize_to(target)?;
        Ok(())
    }
}

#[test]
fn test_integers_little_endian() {
    assert_eq!(0x1234u16.serialize().unwrap(), vec![0x34, 0x12]);
    assert_eq!(u16::deserialize_complete(&[0x34, 0x12]).unwrap(), 0x1234);
    assert_eq!(
        u16::deserialize_complete(&[0x01]),
        Err(SerializeError::InsufficientData)
    );
    assert_eq!(
        u8::deserialize_complete(&[0x01, 0x02]),
        Err(SerializeError::DataLeft)
    );
}

#[test]
fn test_bool() {
    assert_eq!(bool::deserialize_complete(&[0]).unwrap(), false);
    assert_eq!(bool::deserialize_complete(&[2]).unwrap(), true);
    assert_eq!(true.serialize().unwrap(), vec![1]);
}

#[test]
fn test_tuple_serialization() {
    let input: [u8; 6] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    let parsed = <(u8, u16, u16, u8)>::deserialize_complete(&input).unwrap();
    assert_eq!(parsed, (0x01, 0x0302, 0x0504, 0x06));
    assert_eq!(parsed.serialize().unwrap(), input);
}
