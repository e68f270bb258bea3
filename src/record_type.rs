/// The only class this crate ever asks for.
pub const CLASS_IN: u16 = 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Ns,
    Md,
    Mf,
    Cname,
    Soa,
    Mb,
    Mg,
    Mr,
    Null,
    Wks,
    Ptr,
    Hinfo,
    Minfo,
    Mx,
    Txt,
    Aaaa,
    Opt,
    Unknown(u16),
}

impl RecordType {
    pub fn from_int(value: u16) -> Self {
        match value {
            1 => Self::A,
            2 => Self::Ns,
            3 => Self::Md,
            4 => Self::Mf,
            5 => Self::Cname,
            6 => Self::Soa,
            7 => Self::Mb,
            8 => Self::Mg,
            9 => Self::Mr,
            10 => Self::Null,
            11 => Self::Wks,
            12 => Self::Ptr,
            13 => Self::Hinfo,
            14 => Self::Minfo,
            15 => Self::Mx,
            16 => Self::Txt,
            28 => Self::Aaaa,
            41 => Self::Opt,
            other => Self::Unknown(other),
        }
    }

    pub fn to_int(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Md => 3,
            Self::Mf => 4,
            Self::Cname => 5,
            Self::Soa => 6,
            Self::Mb => 7,
            Self::Mg => 8,
            Self::Mr => 9,
            Self::Null => 10,
            Self::Wks => 11,
            Self::Ptr => 12,
            Self::Hinfo => 13,
            Self::Minfo => 14,
            Self::Mx => 15,
            Self::Txt => 16,
            Self::Aaaa => 28,
            Self::Opt => 41,
            Self::Unknown(other) => other,
        }
    }
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        Self::from_int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::RecordType;

    #[test]
    fn maps_known_codes() {
        assert_eq!(RecordType::from_int(1), RecordType::A);
        assert_eq!(RecordType::from_int(2), RecordType::Ns);
        assert_eq!(RecordType::Aaaa.to_int(), 28);
    }

    #[test]
    fn keeps_unknown_codes() {
        let type_ = RecordType::from_int(65);
        assert_eq!(type_, RecordType::Unknown(65));
        assert_eq!(type_.to_int(), 65);
    }
}
