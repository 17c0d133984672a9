use std::fmt::{self, Display};

use crate::error::Error;

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Kind {
    End = 0,
    Int8 = 1,
    Int16 = 2,
    Int32 = 3,
    Int64 = 4,
    Float32 = 5,
    Float64 = 6,
    Int8Array = 7,
    String = 8,
    List = 9,
    Compound = 10,
    Int32Array = 11,
    Int64Array = 12,
}

impl Kind {
    pub fn try_from_u8(value: u8) -> Result<Kind, Error> {
        Ok(match value {
            0 => Kind::End,
            1 => Kind::Int8,
            2 => Kind::Int16,
            3 => Kind::Int32,
            4 => Kind::Int64,
            5 => Kind::Float32,
            6 => Kind::Float64,
            7 => Kind::Int8Array,
            8 => Kind::String,
            9 => Kind::List,
            10 => Kind::Compound,
            11 => Kind::Int32Array,
            12 => Kind::Int64Array,
            other => return Err(Error::InvalidTagKind(other)),
        })
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn is_container(self) -> bool {
        matches!(self, Kind::List | Kind::Compound)
    }

    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Kind::Int8 => Some(1),
            Kind::Int16 => Some(2),
            Kind::Int32 => Some(4),
            Kind::Int64 => Some(8),
            Kind::Float32 => Some(4),
            Kind::Float64 => Some(8),
            _ => None,
        }
    }

    pub fn array_element_width(self) -> Option<usize> {
        match self {
            Kind::Int8Array => Some(1),
            Kind::Int32Array => Some(4),
            Kind::Int64Array => Some(8),
            _ => None,
        }
    }

    pub fn xml_name(self) -> &'static str {
        match self {
            Kind::End => "TEnd",
            Kind::Int8 => "TInt8",
            Kind::Int16 => "TInt16",
            Kind::Int32 => "TInt32",
            Kind::Int64 => "TInt64",
            Kind::Float32 => "TFloat32",
            Kind::Float64 => "TFloat64",
            Kind::Int8Array => "TInt8Array",
            Kind::String => "TString",
            Kind::List => "TList",
            Kind::Compound => "TCompound",
            Kind::Int32Array => "TInt32Array",
            Kind::Int64Array => "TInt64Array",
        }
    }

    pub fn from_xml_name(name: &str) -> Option<Kind> {
        Some(match name {
            "TEnd" => Kind::End,
            "TInt8" => Kind::Int8,
            "TInt16" => Kind::Int16,
            "TInt32" => Kind::Int32,
            "TInt64" => Kind::Int64,
            "TFloat32" => Kind::Float32,
            "TFloat64" => Kind::Float64,
            "TInt8Array" => Kind::Int8Array,
            "TString" => Kind::String,
            "TList" => Kind::List,
            "TCompound" => Kind::Compound,
            "TInt32Array" => Kind::Int32Array,
            "TInt64Array" => Kind::Int64Array,
            _ => return None,
        })
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.xml_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_valid_byte() {
        for byte in 0u8..=12 {
            let kind = Kind::try_from_u8(byte).unwrap();
            assert_eq!(kind.to_u8(), byte);
        }
    }

    #[test]
    fn rejects_unknown_byte() {
        match Kind::try_from_u8(13) {
            Err(Error::InvalidTagKind(13)) => {}
            other => panic!("expected InvalidTagKind(13), got {:?}", other),
        }
    }

    #[test]
    fn xml_name_round_trips() {
        for byte in 0u8..=12 {
            let kind = Kind::try_from_u8(byte).unwrap();
            assert_eq!(Kind::from_xml_name(kind.xml_name()), Some(kind));
        }
    }
}
