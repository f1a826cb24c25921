use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

/// Flat numeric identifier used by exporters.
pub type EntityCode = u64;

/// Each packed field below `group` occupies three decimal digits of the code.
const FIELD_RADIX: EntityCode = 1_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentityCodeError {
    #[error("{field} = {value} does not fit in three decimal digits")]
    FieldOutOfRange { field: &'static str, value: u32 },
}

/// The structured key of an analysed entity.
///
/// This is the only key used inside the pipeline. A flat [EntityCode] is
/// derived from it on demand by [EntityIdentity::code], which should only be
/// called where records leave the pipeline.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub struct EntityIdentity {
    pub group: u32,
    pub batch: u32,
    pub timepoint: u32,
    pub entity_index: u32,
}

impl EntityIdentity {
    pub fn new(group: u32, batch: u32, timepoint: u32, entity_index: u32) -> Self {
        Self {
            group,
            batch,
            timepoint,
            entity_index,
        }
    }

    /// Packs the identity as `group·10⁹ + batch·10⁶ + timepoint·10³ + entity_index`.
    ///
    /// # Errors
    /// If any of `batch`, `timepoint` or `entity_index` is 1000 or more, as the
    /// code would then be ambiguous.
    pub fn code(&self) -> Result<EntityCode, IdentityCodeError> {
        let digits = |field: &'static str, value: u32| {
            let packed = EntityCode::from(value);
            if packed < FIELD_RADIX {
                Ok(packed)
            } else {
                Err(IdentityCodeError::FieldOutOfRange { field, value })
            }
        };
        let batch = digits("batch", self.batch)?;
        let timepoint = digits("timepoint", self.timepoint)?;
        let entity_index = digits("entity_index", self.entity_index)?;
        Ok(((EntityCode::from(self.group) * FIELD_RADIX + batch) * FIELD_RADIX + timepoint)
            * FIELD_RADIX
            + entity_index)
    }
}

impl Display for EntityIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "group {0}, batch {1}, timepoint {2}, entity {3}",
            self.group, self.batch, self.timepoint, self.entity_index
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_packs_fields() {
        let identity = EntityIdentity::new(2, 13, 4, 95);
        assert_eq!(identity.code(), Ok(2_013_004_095));
    }

    #[test]
    fn code_of_default_is_zero() {
        assert_eq!(EntityIdentity::default().code(), Ok(0));
    }

    #[test]
    fn code_rejects_wide_fields() {
        let identity = EntityIdentity::new(1, 2, 1000, 3);
        assert_eq!(
            identity.code(),
            Err(IdentityCodeError::FieldOutOfRange {
                field: "timepoint",
                value: 1000
            })
        );
    }

    #[test]
    fn large_group_does_not_overflow() {
        let identity = EntityIdentity::new(u32::MAX, 999, 999, 999);
        assert_eq!(identity.code(), Ok(4_294_967_295_999_999_999));
    }

    #[test]
    fn deserialize_kebab_case() {
        let identity: EntityIdentity = serde_json::from_str(
            r#"{ "group": 1, "batch": 2, "timepoint": 3, "entity-index": 4 }"#,
        )
        .unwrap();
        assert_eq!(identity, EntityIdentity::new(1, 2, 3, 4));
    }
}
