use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, SecondsFormat};

// `%#z` takes `Z`, `+hh`, `+hhmm` and `+hh:mm`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const NAIVE_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// An ISO-8601 datetime, with or without a UTC offset. The form of the input
/// is kept so predicted timestamps look like the ones the caller sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Timestamp {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Timestamp::Offset(dt));
        }

        let extended = expand_basic(raw).unwrap_or_else(|| raw.to_ascii_uppercase());
        let offset = OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(&extended, fmt).ok())
            .map(Timestamp::Offset);
        offset
            .or_else(|| {
                NAIVE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(&extended, fmt).ok())
                    .map(Timestamp::Naive)
            })
            .ok_or_else(|| format!("invalid ISO-8601 timestamp: {:?}", raw))
    }

    /// Mixing offset and naive timestamps has no defined delta.
    pub fn signed_duration_since(&self, earlier: &Timestamp) -> Result<Duration, String> {
        match (self, earlier) {
            (Timestamp::Offset(a), Timestamp::Offset(b)) => Ok(a.signed_duration_since(*b)),
            (Timestamp::Naive(a), Timestamp::Naive(b)) => Ok(a.signed_duration_since(*b)),
            _ => Err("cannot compare timestamps with and without a UTC offset".to_string()),
        }
    }

    pub fn checked_add(&self, delta: Duration) -> Option<Timestamp> {
        match self {
            Timestamp::Offset(dt) => dt.checked_add_signed(delta).map(Timestamp::Offset),
            Timestamp::Naive(dt) => dt.checked_add_signed(delta).map(Timestamp::Naive),
        }
    }

    pub fn to_iso8601(&self) -> String {
        match self {
            Timestamp::Offset(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Timestamp::Naive(dt) => dt.format(NAIVE_OUTPUT).to_string(),
        }
    }
}

/// Rewrites the basic form `YYYYMMDDTHHMM[SS]...` into the extended form,
/// leaving fractional seconds and offset untouched.
fn expand_basic(raw: &str) -> Option<String> {
    let upper = raw.to_ascii_uppercase();
    let (date, rest) = upper.split_once('T')?;
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let time_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (time, tail) = rest.split_at(time_len);
    let time = match time_len {
        4 => format!("{}:{}", &time[..2], &time[2..]),
        6 => format!("{}:{}:{}", &time[..2], &time[2..4], &time[4..]),
        _ => return None,
    };
    Some(format!("{}-{}-{}T{}{}", &date[..4], &date[4..6], &date[6..], time, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_keeps_z_suffix() {
        let ts = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn offset_is_preserved() {
        let ts = Timestamp::parse("2021-06-15T08:30:00+02:00").unwrap();
        let later = ts.checked_add(Duration::minutes(90)).unwrap();
        assert_eq!(later.to_iso8601(), "2021-06-15T10:00:00+02:00");
    }

    #[test]
    fn naive_round_trips_without_offset() {
        let ts = Timestamp::parse("2020-01-01 12:00:00.250").unwrap();
        assert!(matches!(ts, Timestamp::Naive(_)));
        assert_eq!(ts.to_iso8601(), "2020-01-01T12:00:00.250");
    }

    #[test]
    fn delta_across_offsets_uses_instants() {
        let a = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        let b = Timestamp::parse("2020-01-01T02:00:00+01:00").unwrap();
        assert_eq!(b.signed_duration_since(&a).unwrap(), Duration::hours(1));
    }

    #[test]
    fn mixed_forms_are_rejected() {
        let a = Timestamp::parse("2020-01-01T00:00:00Z").unwrap();
        let b = Timestamp::parse("2020-01-01T00:01:00").unwrap();
        assert!(b.signed_duration_since(&a).is_err());
    }

    #[test]
    fn accepts_common_iso8601_forms() {
        let cases = [
            ("2020-01-01T00:00:00+0100", "2020-01-01T00:00:00+01:00"),
            ("2020-01-01T00:00:00+01", "2020-01-01T00:00:00+01:00"),
            ("2020-01-01T00:00Z", "2020-01-01T00:00:00Z"),
            ("2020-01-01T00:00+05:30", "2020-01-01T00:00:00+05:30"),
            ("2020-01-01t00:00:00z", "2020-01-01T00:00:00Z"),
            ("20200101T000000Z", "2020-01-01T00:00:00Z"),
            ("20200101T0000+0200", "2020-01-01T00:00:00+02:00"),
            ("20200101T120000.5Z", "2020-01-01T12:00:00.500Z"),
            ("2020-01-01T00:00", "2020-01-01T00:00:00"),
            ("2020-01-01 08:15", "2020-01-01T08:15:00"),
            ("20200101T000000", "2020-01-01T00:00:00"),
        ];
        for (raw, expected) in cases {
            let ts = Timestamp::parse(raw).unwrap_or_else(|e| panic!("{raw}: {e}"));
            assert_eq!(ts.to_iso8601(), expected, "{raw}");
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("2020-13-01T00:00:00Z").is_err());
        assert!(Timestamp::parse("2020-01-01").is_err());
        assert!(Timestamp::parse("20200101T00Z").is_err());
    }
}
