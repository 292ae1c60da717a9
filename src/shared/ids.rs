use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Identifiers end up as path segments and placeholder names, so they are
/// restricted to `[A-Za-z0-9_-]` and must start with a letter or digit.
pub fn validate_identifier_value(kind: &str, value: &str) -> Result<(), String> {
    let Some(first) = value.chars().next() else {
        return Err(format!("{kind} must be non-empty"));
    };
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "{kind} must be at most {MAX_IDENTIFIER_LEN} characters"
        ));
    }
    if !first.is_ascii_alphanumeric() {
        return Err(format!(
            "{kind} `{value}` must start with an ASCII letter or digit"
        ));
    }
    if let Some(bad) = value
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        return Err(format!(
            "{kind} `{value}` contains `{bad}`; only ASCII letters, digits, '-' and '_' are allowed"
        ));
    }
    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub const KIND: &'static str = $kind;

            pub fn parse(raw: &str) -> Result<Self, String> {
                validate_identifier_value(Self::KIND, raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::parse(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw)
                    .map_err(|err| D::Error::custom(format!("invalid {} `{raw}`: {err}", Self::KIND)))
            }
        }
    };
}

identifier!(
    /// Directory name of one bundle below the bundles root.
    BundleId,
    "bundle id"
);
identifier!(
    /// Name used inside a `{…}` placeholder.
    VariableName,
    "variable name"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_id_accepts_plain_identifiers() {
        assert_eq!(BundleId::parse("bmm").expect("bundle").as_str(), "bmm");
        assert!(BundleId::parse("creative_writing-2").is_ok());
        assert!("cis".parse::<BundleId>().is_ok());
    }

    #[test]
    fn bundle_id_rejects_separators_and_dots() {
        for raw in ["", "a/b", "..", "a\\b", "x.y", "has space", "-flag", "_x"] {
            assert!(BundleId::parse(raw).is_err(), "accepted `{raw}`");
        }
    }

    #[test]
    fn identifiers_have_a_length_limit() {
        let long = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        let err = VariableName::parse(&long).expect_err("too long");
        assert!(err.contains("at most"), "unexpected error: {err}");
        assert!(VariableName::parse(&long[1..]).is_ok());
    }

    #[test]
    fn variable_name_rejects_braces() {
        let err = VariableName::parse("{bundle-root}").expect_err("braces");
        assert!(err.contains("variable name"), "unexpected error: {err}");
    }

    #[test]
    fn deserialize_reports_kind_and_raw_value() {
        let err = serde_yaml::from_str::<VariableName>("\"bad name\"").expect_err("must fail");
        assert!(err.to_string().contains("invalid variable name `bad name`"));
    }
}
