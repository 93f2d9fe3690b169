//! Serde helpers for wire formats that carry integers as decimal strings

/// Serialize/deserialize an integer amount as a decimal string.
///
/// Provider APIs exchange base-unit amounts as strings to avoid
/// floating-point drift; domain types keep them as `u128` and go through
/// this module at the serde boundary.
pub mod string_amount {
	use std::fmt::Display;
	use std::str::FromStr;

	use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
	where
		T: Display,
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
	where
		T: FromStr,
		T::Err: Display,
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		raw.parse()
			.map_err(|err| de::Error::custom(format!("invalid amount string: {}", err)))
	}
}

/// Same as [`string_amount`] but for optional fields; `None` serializes as
/// a missing field and absent/null deserializes to `None`.
pub mod option_string_amount {
	use std::fmt::Display;
	use std::str::FromStr;

	use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
	where
		T: Display,
		S: Serializer,
	{
		match value {
			Some(v) => v.to_string().serialize(serializer),
			None => serializer.serialize_none(),
		}
	}

	pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
	where
		T: FromStr,
		T::Err: Display,
		D: Deserializer<'de>,
	{
		let raw: Option<String> = Option::deserialize(deserializer)?;
		match raw {
			Some(s) if !s.is_empty() => s
				.parse()
				.map(Some)
				.map_err(|err| de::Error::custom(format!("invalid amount string: {}", err))),
			_ => Ok(None),
		}
	}
}

#[cfg(test)]
mod tests {
	use serde::{Deserialize, Serialize};

	#[derive(Debug, PartialEq, Serialize, Deserialize)]
	struct Amounts {
		#[serde(with = "super::string_amount")]
		value: u128,
		#[serde(with = "super::option_string_amount", default)]
		maybe: Option<u128>,
	}

	#[test]
	fn test_string_amount_round_trip() {
		let amounts = Amounts {
			value: 340_282_366_920_938_463_463_374_607_431_768_211_455,
			maybe: Some(150_000_000),
		};
		let json = serde_json::to_string(&amounts).unwrap();
		assert!(json.contains("\"340282366920938463463374607431768211455\""));
		assert_eq!(serde_json::from_str::<Amounts>(&json).unwrap(), amounts);
	}

	#[test]
	fn test_missing_optional_amount() {
		let amounts: Amounts = serde_json::from_str(r#"{"value":"42"}"#).unwrap();
		assert_eq!(amounts.value, 42);
		assert_eq!(amounts.maybe, None);
	}
}
