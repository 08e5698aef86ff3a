use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;
use serde::{Deserialize, Deserializer, de};
use serde::{Serialize, Serializer};

use crate::SecurityIdentifier;

impl Serialize for SecurityIdentifier {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

// Deserializes anything that parses from SID text or from the binary form.
fn deserialize_sid_like<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    for<'a> T: FromStr + TryFrom<&'a [u8]>,
{
    struct Visitor<T> {
        _marker: PhantomData<T>,
    }

    impl<T> de::Visitor<'_> for Visitor<T>
    where
        for<'a> T: FromStr + TryFrom<&'a [u8]>,
    {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a Windows SID as a string (e.g., \"S-1-...\") or as raw binary")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::from_str(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            T::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Bytes(v), &self))
        }
    }

    let visitor = Visitor::<T> {
        _marker: PhantomData,
    };
    if deserializer.is_human_readable() {
        deserializer.deserialize_str(visitor)
    } else {
        deserializer.deserialize_bytes(visitor)
    }
}

impl<'de> Deserialize<'de> for SecurityIdentifier {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_sid_like(deserializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Unwrap is not an issue in test")]
mod test {
    use crate::{Principal, SecurityIdentifier, SidType};
    use serde_test::{self, Configure, Token};

    const BYTES: &[u8] = &[1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0];

    fn administrators() -> SecurityIdentifier {
        "S-1-5-32-544".parse().unwrap()
    }

    #[test]
    fn test_binary_owned() {
        serde_test::assert_tokens(&administrators().compact(), &[Token::Bytes(BYTES)]);
    }

    #[test]
    fn test_human_owned() {
        serde_test::assert_tokens(
            &administrators().readable(),
            &[Token::Str("S-1-5-32-544")],
        );
    }

    #[test]
    fn rejects_malformed_text() {
        serde_test::assert_de_tokens_error::<serde_test::Readable<SecurityIdentifier>>(
            &[Token::Str("S-1-5-x")],
            "invalid value: string \"S-1-5-x\", expected a Windows SID as a string (e.g., \"S-1-...\") or as raw binary",
        );
    }

    #[test]
    fn principal_as_json() {
        let principal = Principal {
            sid: "S-1-5-32-544".to_owned(),
            domain: Some("BUILTIN".to_owned()),
            name: Some("Administrators".to_owned()),
            sid_type: SidType::Alias,
        };
        let json = serde_json::to_string(&principal).unwrap();
        assert_eq!(
            json,
            r#"{"sid":"S-1-5-32-544","domain":"BUILTIN","name":"Administrators","sid_type":"Alias"}"#
        );
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, principal);
    }
}
