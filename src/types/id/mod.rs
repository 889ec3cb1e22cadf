use serde::de::{Error as DeError, Unexpected};
use std::{
  fmt::{Debug, Display},
  hash::Hash,
  marker::PhantomData,
  num::NonZeroU64,
};
use thiserror::Error;

use self::marker::Marker;

pub mod marker;

/// Row id of a record, tagged with the kind of record it points to
/// so a user id can't be passed where an invitation id is expected.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Id<T: Marker> {
  value: NonZeroU64,
  phantom: PhantomData<T>,
}

impl<T: Marker> Id<T> {
  /// # Panics
  ///
  /// It will panic if the value is 0.
  #[must_use]
  #[track_caller]
  pub const fn new(n: u64) -> Self {
    if let Some(id) = Self::new_checked(n) {
      id
    } else {
      panic!("value is zero")
    }
  }

  #[must_use]
  pub const fn new_checked(n: u64) -> Option<Self> {
    if let Some(value) = NonZeroU64::new(n) {
      Some(Self {
        value,
        phantom: PhantomData,
      })
    } else {
      None
    }
  }

  /// Converts a row id assigned by Postgres (`BIGSERIAL`).
  #[must_use]
  pub fn from_db(n: i64) -> Option<Self> {
    u64::try_from(n).ok().and_then(Self::new_checked)
  }

  #[must_use]
  pub const fn get(self) -> u64 {
    self.value.get()
  }
}

impl<T: Marker> Debug for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    // All markers live in `marker` so the last path segment is enough
    let type_name = std::any::type_name::<T>();
    let type_name = type_name.rsplit("::").next().unwrap_or(type_name);
    write!(f, "Id::<{type_name}>({})", self.value.get())
  }
}

impl<T: Marker> Display for Id<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.value.get(), f)
  }
}

impl<T: Marker> Hash for Id<T> {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    state.write_u64(self.value.get());
  }
}

impl<T: Marker> std::str::FromStr for Id<T> {
  type Err = InvalidId;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse::<u64>()
      .ok()
      .and_then(Self::new_checked)
      .ok_or(InvalidId)
  }
}

#[derive(Debug, Error)]
#[error("id must be a positive integer")]
pub struct InvalidId;

impl<'de, T: Marker> serde::Deserialize<'de> for Id<T> {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    struct Visitor<T: Marker>(PhantomData<T>);

    impl<'de, T: Marker> serde::de::Visitor<'de> for Visitor<T> {
      type Value = Id<T>;

      fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a positive id")
      }

      fn visit_i64<E: DeError>(self, v: i64) -> Result<Self::Value, E> {
        Id::from_db(v).ok_or_else(|| DeError::invalid_value(Unexpected::Signed(v), &self))
      }

      fn visit_u64<E: DeError>(self, v: u64) -> Result<Self::Value, E> {
        Id::new_checked(v).ok_or_else(|| DeError::invalid_value(Unexpected::Unsigned(v), &self))
      }

      fn visit_str<E: DeError>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
          .map_err(|_| DeError::invalid_value(Unexpected::Str(v), &self))
      }
    }

    deserializer.deserialize_any(Visitor(PhantomData))
  }
}

// Ids are sent as strings, JavaScript clients lose precision above 2^53.
impl<T: Marker> serde::Serialize for Id<T> {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.collect_str(&self.value.get())
  }
}

impl<'q, T: Marker> sqlx::Encode<'q, sqlx::Postgres> for Id<T> {
  fn encode_by_ref(
    &self,
    buf: &mut <sqlx::Postgres as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
  ) -> sqlx::encode::IsNull {
    match i64::try_from(self.value.get()) {
      Ok(value) => <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&value, buf),
      Err(..) => sqlx::encode::IsNull::Yes,
    }
  }
}

impl<'r, T: Marker> sqlx::Decode<'r, sqlx::Postgres> for Id<T> {
  fn decode(
    value: <sqlx::Postgres as sqlx::database::HasValueRef<'r>>::ValueRef,
  ) -> Result<Self, sqlx::error::BoxDynError> {
    let value = <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
    Id::from_db(value).ok_or_else(|| Box::new(InvalidId) as sqlx::error::BoxDynError)
  }
}

impl<T: Marker> sqlx::Type<sqlx::Postgres> for Id<T> {
  fn type_info() -> <sqlx::Postgres as sqlx::Database>::TypeInfo {
    <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
  }
}
