//! Capability checks.
//!
//! Every privileged operation calls [`require_role`] before it reads or
//! writes anything else. There is no other place where role membership is
//! interpreted.

use solarfund_protocol::model::{Entity, Role};

use crate::error::GuaranteeError;

/// Fails with [`GuaranteeError::Authorization`] unless `entity` holds `role`.
pub fn require_role(entity: &Entity, role: Role) -> Result<(), GuaranteeError> {
    if entity.has_role(role) {
        Ok(())
    } else {
        tracing::debug!(entity = entity.index(), %role, "authorization refused");
        Err(GuaranteeError::Authorization {
            index: entity.index(),
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solarfund_protocol::model::{Account, Wallet};
    use solarfund_protocol::vault::EncryptedSeed;

    fn entity() -> Entity {
        Entity::new(Account::new(
            12,
            "Helios Builders",
            Wallet {
                public_key: "11".repeat(32),
                encrypted_seed: EncryptedSeed {
                    salt: String::new(),
                    sealed: String::new(),
                },
            },
        ))
    }

    #[test]
    fn held_role_passes() {
        assert!(require_role(&entity(), Role::Entity).is_ok());
    }

    #[test]
    fn missing_role_is_refused_with_index() {
        match require_role(&entity(), Role::Guarantor) {
            Err(GuaranteeError::Authorization { index, role }) => {
                assert_eq!(index, 12);
                assert_eq!(role, Role::Guarantor);
            }
            other => panic!("expected authorization error, got {other:?}"),
        }
    }
}
